//! Storefront cart CLI - inspect and edit the persisted cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! sf-cart list
//!
//! # Add a product variant
//! sf-cart add --id sku1 --title Shirt --price 20 --image shirt.jpg --size M --color red
//!
//! # Change the quantity of the first line
//! sf-cart set-qty 0 3
//!
//! # Follow changes made by other sessions
//! sf-cart watch
//! ```
//!
//! # Commands
//!
//! - `list` - Show line items
//! - `add` / `remove` / `set-qty` / `bump` / `clear` - Edit the cart
//! - `summary` - Subtotal, shipping, tax and total
//! - `validate` - Drop lines that fail validation
//! - `export` / `import` - Move a cart between sessions
//! - `watch` - Reload whenever another session rewrites the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use storefront_cart::storage::FileStorage;
use storefront_cart::{CartConfig, CartStore};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CliError;

#[derive(Parser)]
#[command(name = "sf-cart")]
#[command(author, version, about = "Storefront cart tools")]
struct Cli {
    /// Directory holding the cart file (overrides `CART_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show line items
    List {
        /// Print the raw line items as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a product variant, merging with an existing line
    Add {
        /// Product id
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Image URL
        #[arg(long)]
        image: String,

        /// Size variant
        #[arg(long)]
        size: Option<String>,

        /// Color variant
        #[arg(long)]
        color: Option<String>,

        /// Quantity to add (values below 1 count as 1)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove the line at INDEX
    Remove {
        /// Zero-based line index
        index: usize,
    },
    /// Set the quantity of the line at INDEX
    SetQty {
        /// Zero-based line index
        index: usize,

        /// New quantity, parsed leniently (`2.7` is 2, junk is 1)
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Change the quantity of the line at INDEX by DELTA
    Bump {
        /// Zero-based line index
        index: usize,

        /// Amount to add (negative to decrease, never below 1)
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove every line
    Clear,
    /// Show subtotal, shipping, tax and total
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop lines that fail validation
    Validate,
    /// Write a portable snapshot of the cart
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the cart from a snapshot or a line item array
    Import {
        /// JSON file produced by `export`, or a bare array of line items
        file: PathBuf,
    },
    /// Reload and print whenever another session changes the cart
    Watch {
        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("storefront_cli=info,storefront_cart=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = CartConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let mut cart = CartStore::with_config(FileStorage::new(&config.data_dir), &config);

    match cli.command {
        Commands::List { json } => commands::cart::list(&cart, &config, json)?,
        Commands::Add {
            id,
            title,
            price,
            image,
            size,
            color,
            quantity,
        } => {
            let product = commands::cart::product(id, title, price, image, size, color, quantity);
            commands::cart::add(&mut cart, product)?;
        }
        Commands::Remove { index } => commands::cart::remove(&mut cart, index)?,
        Commands::SetQty { index, quantity } => {
            commands::cart::set_quantity(&mut cart, index, &quantity)?;
        }
        Commands::Bump { index, delta } => commands::cart::bump(&mut cart, index, delta)?,
        Commands::Clear => commands::cart::clear(&mut cart),
        Commands::Summary { json } => commands::cart::summary(&cart, json)?,
        Commands::Validate => commands::cart::validate(&mut cart),
        Commands::Export { output } => commands::cart::export(&cart, output.as_deref())?,
        Commands::Import { file } => commands::cart::import(&mut cart, &file)?,
        Commands::Watch { interval_ms } => {
            let interval = std::time::Duration::from_millis(interval_ms);
            commands::watch::run(&mut cart, interval, config.pricing.currency).await;
        }
    }
    Ok(())
}
