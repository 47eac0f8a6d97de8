//! Storefront Core - Shared types library.
//!
//! This crate provides the domain types used across the storefront cart:
//! - `cart` - The cart store, its durable slot and change notifications
//! - `cli` - Command-line binding over the cart store
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no logging. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, quantities, line items and summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
