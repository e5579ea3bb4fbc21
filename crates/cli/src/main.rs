//! Trailer CLI - back-office tools for the food trailer.
//!
//! # Usage
//!
//! ```bash
//! # Receive stock
//! trailer stock add -n buns -q 24 --expires 2024-06-12
//!
//! # Use stock, oldest lot first
//! trailer stock consume -n buns -q 10
//!
//! # Stock totals and expiry warnings
//! trailer stock summary
//!
//! # Customers with unpaid orders
//! trailer pending list
//!
//! # Mark orders paid
//! trailer pending settle abc123 def456
//! ```
//!
//! # Commands
//!
//! - `stock` - Add, consume and review stock lots
//! - `pending` - Review and settle unpaid orders
//! - `customers` - List customers and their phone keys
//!
//! Configuration is read from the environment; see [`config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "trailer")]
#[command(author, version, about = "Food trailer back-office tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stock lots
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },
    /// Review and settle unpaid orders
    Pending {
        #[command(subcommand)]
        action: PendingAction,
    },
    /// Review customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
}

#[derive(Subcommand)]
enum StockAction {
    /// Add stock, merging into a lot with the same name and expiry
    Add {
        /// Item name
        #[arg(short, long)]
        name: String,

        /// Quantity received (decimals allowed)
        #[arg(short, long)]
        quantity: Decimal,

        /// Date received, YYYY-MM-DD (default: today)
        #[arg(long)]
        inserted: Option<NaiveDate>,

        /// Expiry date, YYYY-MM-DD
        #[arg(long)]
        expires: NaiveDate,
    },
    /// Consume stock, oldest lot first
    Consume {
        /// Item name
        #[arg(short, long)]
        name: String,

        /// Quantity to consume
        #[arg(short, long)]
        quantity: Decimal,
    },
    /// Show totals and nearest expiry per item
    Summary {
        /// Warn about items expiring within this many days
        #[arg(long, default_value_t = 3)]
        warn_days: i64,
    },
    /// List lots of one item that still hold stock
    Available {
        /// Item name
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum PendingAction {
    /// List customers with unpaid orders
    List,
    /// Mark orders paid
    Settle {
        /// Order IDs (sales or scheduled orders)
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List customers
    List,
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trailer_cli=info,trailer_core=info".into());

    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    init_tracing(config.log_json);

    let cli = Cli::parse();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CliConfig) -> Result<(), commands::CommandError> {
    let session = &config.session;
    let path = config.data_file.as_path();

    match cli.command {
        Commands::Stock { action } => match action {
            StockAction::Add {
                name,
                quantity,
                inserted,
                expires,
            } => {
                commands::stock::add(session, path, &name, quantity, inserted, expires).await?;
            }
            StockAction::Consume { name, quantity } => {
                commands::stock::consume(session, path, &name, quantity).await?;
            }
            StockAction::Summary { warn_days } => {
                commands::stock::summary(session, path, warn_days).await?;
            }
            StockAction::Available { name } => {
                commands::stock::available(session, path, &name).await?;
            }
        },
        Commands::Pending { action } => match action {
            PendingAction::List => {
                commands::pending::list(session, path).await?;
            }
            PendingAction::Settle { ids } => {
                commands::pending::settle(session, path, &ids).await?;
            }
        },
        Commands::Customers { action } => match action {
            CustomerAction::List => commands::customers::list(session, path).await?,
        },
    }
    Ok(())
}
