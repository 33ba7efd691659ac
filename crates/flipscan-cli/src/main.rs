mod commands;
mod input;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "flipscan")]
#[command(about = "Retail listing search and resale scoring")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search one source's listings, expanding the query when nothing matches
    Search {
        /// Source name to search (case-insensitive), e.g. walmart
        #[arg(long)]
        source: String,
        /// Free-text search query
        #[arg(long)]
        query: String,
        /// JSON array of listings; reads stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// Skip the query-expansion stage
        #[arg(long)]
        no_expand: bool,
    },
    /// Score listings for resale profitability
    Score {
        /// JSON array of listings
        #[arg(long)]
        input: PathBuf,
        /// JSON object mapping listing identifiers to reference resale prices
        #[arg(long)]
        reference_prices: Option<PathBuf>,
        /// JSON array of listings from a resale source; each scored listing
        /// takes its best counterpart's price as the reference
        #[arg(long)]
        counterparts: Option<PathBuf>,
    },
    /// Show the stored snapshot and score history for a listing
    History {
        /// Listing identifier
        #[arg(long)]
        identifier: String,
        /// Maximum number of scores to show
        #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Connects when `DATABASE_URL` is configured.
///
/// Search and score work without storage, so a failed connection is logged
/// and treated like an unconfigured database.
async fn optional_pool(config: &flipscan_core::AppConfig) -> Option<sqlx::PgPool> {
    config.database_url.as_ref()?;
    match flipscan_db::connect_pool_from_config(config).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            tracing::warn!(error = %e, "database unavailable; results will not be recorded");
            None
        }
    }
}

async fn run_db(config: &flipscan_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    config.require_database_url()?;
    let pool = flipscan_db::connect_pool_from_config(config).await?;

    match command {
        DbCommands::Ping => {
            flipscan_db::ping(&pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = flipscan_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = flipscan_core::load_app_config()?;
    init_tracing(&config.log_level);
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Some(Commands::Search {
            source,
            query,
            input,
            no_expand,
        }) => {
            let pool = optional_pool(&config).await;
            commands::run_search(
                &config,
                pool.as_ref(),
                &source,
                &query,
                input.as_deref(),
                no_expand,
            )
            .await?;
        }
        Some(Commands::Score {
            input,
            reference_prices,
            counterparts,
        }) => {
            let pool = optional_pool(&config).await;
            commands::run_score(
                &config,
                pool.as_ref(),
                &input,
                reference_prices.as_deref(),
                counterparts.as_deref(),
            )
            .await?;
        }
        Some(Commands::History { identifier, limit }) => {
            config.require_database_url()?;
            let pool = flipscan_db::connect_pool_from_config(&config).await?;
            commands::run_history(&pool, &identifier, limit).await?;
        }
        Some(Commands::Db { command }) => run_db(&config, command).await?,
        None => println!("flipscan: run with --help to list commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
