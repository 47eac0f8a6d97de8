//! Storefront Cart - the session shopping cart.
//!
//! A [`CartStore`] owns the ordered list of line items, writes it to a
//! durable key-value slot after every change, tells listeners about each
//! change, and reloads when another session rewrites the slot.
//!
//! # Modules
//!
//! - [`storage`] - Durable slot backends (in-process shared memory, files)
//! - [`listeners`] - Change subscriptions with failure isolation
//! - [`pricing`] - Shipping and tax for the checkout summary
//! - [`config`] - Environment-driven configuration
//! - [`export`] - Portable cart snapshots
//! - [`error`] - Operation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod export;
pub mod listeners;
pub mod pricing;
pub mod storage;
mod store;
mod sync;

pub use config::{CartConfig, ConfigError};
pub use error::CartError;
pub use export::CartExport;
pub use listeners::{ListenerError, ListenerId};
pub use pricing::{OrderSummary, PricingConfig};
pub use storage::{Storage, StorageError, StorageEvent};
pub use store::{CartStore, Persistence};
