//! Sync command handlers for the CLI.
//!
//! Every non-dry run is recorded in `sync_runs` with trigger source `cli`.
//! Item-level failures end up in the report and, for the NB product and
//! price runs, in the error log file.

use std::future::Future;
use std::path::{Path, PathBuf};

use clap::Subcommand;

use catalog_sync::{clients, run_type, SyncError, SyncOptions, SyncReport, DEFAULT_ERROR_LOG};

/// Sub-commands available under `sync`.
#[derive(Debug, Subcommand)]
pub enum SyncCommands {
    /// Import the NB feed: create, refresh and soft-delete products
    NbProducts {
        /// Fetch and compare without writing to the database
        #[arg(long)]
        dry_run: bool,

        /// Where to write one line per failed item
        #[arg(long, default_value = DEFAULT_ERROR_LOG)]
        error_log: PathBuf,
    },
    /// Refresh stock and prices of known NB products
    NbPrices {
        /// Where to write one line per failed item
        #[arg(long, default_value = DEFAULT_ERROR_LOG)]
        error_log: PathBuf,
    },
    /// Import the paginated Elit feed
    ElitProducts {
        /// Fetch and compare without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Build sheets for NB products that lack one
    NbSheets {
        /// Maximum number of products to process
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Build sheets for Elit products from their product pages
    ElitSheets {
        /// Maximum number of products to process
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Upsert the NB brand list
    NbBrands,
    /// Upsert the NB category list
    NbCategories,
    /// Fill in missing category slugs, merging duplicates
    CategorySlugs,
}

pub(crate) async fn run_sync(
    pool: &sqlx::PgPool,
    config: &catalog_core::AppConfig,
    command: SyncCommands,
) -> anyhow::Result<()> {
    let base = SyncOptions::from_app_config(config);

    match command {
        SyncCommands::NbProducts { dry_run, error_log } => {
            let client = clients::nb_client(config)?;
            let host = clients::image_host(config)?;
            let options = SyncOptions { dry_run, ..base };
            let report = tracked(
                pool,
                run_type::NB_PRODUCTS,
                dry_run,
                catalog_sync::sync_nb_products(pool, &client, host.as_ref(), &options),
            )
            .await?;
            finish(run_type::NB_PRODUCTS, dry_run, &report, Some(&error_log))
        }
        SyncCommands::NbPrices { error_log } => {
            let client = clients::nb_client(config)?;
            let report = tracked(
                pool,
                run_type::NB_PRICES,
                false,
                catalog_sync::refresh_nb_prices(pool, &client, &base),
            )
            .await?;
            finish(run_type::NB_PRICES, false, &report, Some(&error_log))
        }
        SyncCommands::ElitProducts { dry_run } => {
            let client = clients::elit_client(config)?;
            let host = clients::image_host(config)?;
            let options = SyncOptions { dry_run, ..base };
            let report = tracked(
                pool,
                run_type::ELIT_PRODUCTS,
                dry_run,
                catalog_sync::sync_elit_products(pool, &client, host.as_ref(), &options),
            )
            .await?;
            finish(run_type::ELIT_PRODUCTS, dry_run, &report, None)
        }
        SyncCommands::NbSheets { limit } => {
            let client = clients::nb_client(config)?;
            let host = clients::image_host(config)?;
            let http = clients::http_client(config)?;
            let options = SyncOptions { limit, ..base };
            let report = tracked(
                pool,
                run_type::NB_SHEETS,
                false,
                catalog_sync::sync_nb_sheets(pool, &client, host.as_ref(), &http, &options),
            )
            .await?;
            finish(run_type::NB_SHEETS, false, &report, None)
        }
        SyncCommands::ElitSheets { limit } => {
            let client = clients::elit_client(config)?;
            let host = clients::image_host(config)?;
            let options = SyncOptions { limit, ..base };
            let report = tracked(
                pool,
                run_type::ELIT_SHEETS,
                false,
                catalog_sync::sync_elit_sheets(pool, &client, host.as_ref(), &options),
            )
            .await?;
            finish(run_type::ELIT_SHEETS, false, &report, None)
        }
        SyncCommands::NbBrands => {
            let client = clients::nb_client(config)?;
            let report = tracked(
                pool,
                run_type::NB_BRANDS,
                false,
                catalog_sync::seed_nb_brands(pool, &client, &base),
            )
            .await?;
            finish(run_type::NB_BRANDS, false, &report, None)
        }
        SyncCommands::NbCategories => {
            let client = clients::nb_client(config)?;
            let report = tracked(
                pool,
                run_type::NB_CATEGORIES,
                false,
                catalog_sync::seed_nb_categories(pool, &client, &base),
            )
            .await?;
            finish(run_type::NB_CATEGORIES, false, &report, None)
        }
        SyncCommands::CategorySlugs => {
            let report = tracked(
                pool,
                run_type::CATEGORY_SLUGS,
                false,
                catalog_sync::backfill_category_slugs(pool, &base),
            )
            .await?;
            finish(run_type::CATEGORY_SLUGS, false, &report, None)
        }
    }
}

/// Dry runs write nothing, so they are not recorded as sync runs either.
async fn tracked<Fut>(
    pool: &sqlx::PgPool,
    run_type: &'static str,
    dry_run: bool,
    pipeline: Fut,
) -> Result<SyncReport, SyncError>
where
    Fut: Future<Output = Result<SyncReport, SyncError>>,
{
    if dry_run {
        pipeline.await
    } else {
        catalog_sync::run_tracked(pool, run_type, "cli", pipeline).await
    }
}

fn finish(
    run_type: &str,
    dry_run: bool,
    report: &SyncReport,
    error_log: Option<&Path>,
) -> anyhow::Result<()> {
    let prefix = if dry_run { "dry-run: " } else { "" };
    println!("{prefix}{run_type}: {}", report.summary());

    if let Some(path) = error_log {
        if report.write_error_log(path)? {
            println!("{} failed items written to {}", report.failed, path.display());
        }
    }
    Ok(())
}
