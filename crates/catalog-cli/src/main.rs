mod cart;
mod distecna;
mod sync;
mod verify_images;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{cart::CartCommands, distecna::DistecnaCommands, sync::SyncCommands};

#[derive(Debug, Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Supplier catalog maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Pull supplier feeds into the catalog
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
    /// Parse saved Distecna listing pages
    Distecna {
        #[command(subcommand)]
        command: DistecnaCommands,
    },
    /// HEAD-check stored product images
    VerifyImages {
        /// Only check one supplier (nb, elit)
        #[arg(long)]
        supplier: Option<String>,

        /// Maximum concurrent requests
        #[arg(long, default_value_t = 12)]
        concurrency: usize,
    },
    /// Cart utilities
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Delete every product, category and brand
    Clear {
        /// Confirm the delete
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let default_level =
        std::env::var("CATALOG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => run_db(command).await,
        Some(Commands::Sync { command }) => {
            let (config, pool) = connect().await?;
            sync::run_sync(&pool, &config, command).await
        }
        Some(Commands::Distecna { command }) => distecna::run_distecna(command),
        Some(Commands::VerifyImages {
            supplier,
            concurrency,
        }) => {
            let (config, pool) = connect().await?;
            verify_images::run_verify_images(&pool, &config, supplier.as_deref(), concurrency)
                .await
        }
        Some(Commands::Cart { command }) => cart::run_cart(command),
        None => {
            println!("catalog-cli: no command given; see --help");
            Ok(())
        }
    }
}

/// Load config and open the pool.
async fn connect() -> anyhow::Result<(catalog_core::AppConfig, sqlx::PgPool)> {
    let config = catalog_core::load_app_config()?;
    let pool_config = catalog_db::PoolConfig::from_app_config(&config);
    let pool = catalog_db::connect_pool(&config.database_url, pool_config).await?;
    Ok((config, pool))
}

async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    if let DbCommands::Clear { yes: false } = command {
        anyhow::bail!("refusing to clear the catalog without --yes");
    }

    let (_config, pool) = connect().await?;
    match command {
        DbCommands::Ping => {
            catalog_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = catalog_db::run_migrations(&pool).await?;
            println!("applied {applied} migrations");
        }
        DbCommands::Clear { .. } => {
            let cleared = catalog_sync::clear_catalog(&pool).await?;
            println!(
                "deleted {} products, {} categories, {} brands",
                cleared.products, cleared.categories, cleared.brands
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
