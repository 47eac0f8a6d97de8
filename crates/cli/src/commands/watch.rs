//! Follow changes other sessions make to the cart.
//!
//! # Usage
//!
//! ```bash
//! # In one terminal
//! sf-cart watch
//!
//! # In another
//! sf-cart add --id sku1 --title Shirt --price 20 --image shirt.jpg
//! ```

use std::time::Duration;

use storefront_cart::{CartStore, Storage};
use storefront_core::{CartSummary, CurrencyCode};
use tokio::time::MissedTickBehavior;

use crate::output;

/// Poll for foreign writes every `interval` until Ctrl+C or SIGTERM.
///
/// Prints the cart badge once at startup and again after every reload.
pub async fn run<S: Storage>(cart: &mut CartStore<S>, interval: Duration, currency: CurrencyCode) {
    if !cart.is_persistent() {
        tracing::warn!("Storage is unavailable, there is nothing to watch");
        return;
    }

    output::print_badge(&cart.summary());
    let listener = cart.add_listener(move |items| {
        output::print_badge(&CartSummary::from_items(items, currency));
        Ok(())
    });

    tracing::info!(
        key = %cart.storage_key(),
        interval_ms = interval.as_millis(),
        "Watching cart"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if cart.sync_external_changes() {
                    tracing::debug!(lines = cart.len(), "Cart reloaded from storage");
                }
            }
            () = &mut shutdown => break,
        }
    }

    cart.remove_listener(listener);
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping watch");
}
