//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CART_STORAGE_KEY` - Durable slot key (default: ecommerce-cart)
//! - `CART_DATA_DIR` - Directory for file-backed storage (default: .cart)
//! - `CART_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 50.00)
//! - `CART_FLAT_SHIPPING` - Shipping charged below the threshold (default: 5.99)
//! - `CART_TAX_RATE` - Tax rate applied to the subtotal (default: 0.08)
//! - `CART_CURRENCY` - ISO 4217 display currency (default: USD)

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use storefront_core::CurrencyCode;
use thiserror::Error;

use crate::pricing::PricingConfig;

/// Default durable slot key.
pub const DEFAULT_STORAGE_KEY: &str = "ecommerce-cart";

/// Default data directory for file-backed storage.
pub const DEFAULT_DATA_DIR: &str = ".cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key of the durable slot holding the serialized cart
    pub storage_key: String,
    /// Directory used by file-backed storage
    pub data_dir: PathBuf,
    /// Checkout shipping and tax rules
    pub pricing: PricingConfig,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            pricing: PricingConfig::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PricingConfig::default();

        let storage_key = get_env_or_default(&lookup, "CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let data_dir = PathBuf::from(get_env_or_default(
            &lookup,
            "CART_DATA_DIR",
            DEFAULT_DATA_DIR,
        ));

        let pricing = PricingConfig {
            free_shipping_threshold: get_decimal(
                &lookup,
                "CART_FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold,
            )?,
            flat_shipping: get_decimal(&lookup, "CART_FLAT_SHIPPING", defaults.flat_shipping)?,
            tax_rate: get_decimal(&lookup, "CART_TAX_RATE", defaults.tax_rate)?,
            currency: match lookup("CART_CURRENCY") {
                Some(raw) => CurrencyCode::from_str(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("CART_CURRENCY".to_string(), e.to_string())
                })?,
                None => defaults.currency,
            },
        };

        Ok(Self {
            storage_key,
            data_dir,
            pricing,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Get a non-negative decimal variable with a default value.
fn get_decimal<F>(lookup: &F, key: &str, default: Decimal) -> Result<Decimal, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value = Decimal::from_str(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if value.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(value)
}
