//! `sync_runs` bookkeeping around a pipeline.

use std::future::Future;

use sqlx::PgPool;

use crate::{SyncError, SyncReport};

/// Run kinds recorded in `sync_runs.run_type`.
pub mod run_type {
    pub const NB_PRODUCTS: &str = "nb_products";
    pub const NB_PRICES: &str = "nb_prices";
    pub const ELIT_PRODUCTS: &str = "elit_products";
    pub const NB_SHEETS: &str = "nb_sheets";
    pub const ELIT_SHEETS: &str = "elit_sheets";
    pub const NB_BRANDS: &str = "nb_brands";
    pub const NB_CATEGORIES: &str = "nb_categories";
    pub const CATEGORY_SLUGS: &str = "category_slugs";
}

/// Creates a `sync_runs` row, marks it running, awaits `pipeline`, then
/// completes or fails the row.
///
/// The run is failed, and [`SyncError::AllItemsFailed`] returned, when every
/// processed item failed.
///
/// # Errors
///
/// Returns the pipeline's own error, a [`SyncError::Db`] from the run
/// bookkeeping, or [`SyncError::AllItemsFailed`].
pub async fn run_tracked<Fut>(
    pool: &PgPool,
    run_type: &'static str,
    trigger_source: &str,
    pipeline: Fut,
) -> Result<SyncReport, SyncError>
where
    Fut: Future<Output = Result<SyncReport, SyncError>>,
{
    let run = catalog_db::create_sync_run(pool, run_type, trigger_source).await?;
    if let Err(e) = catalog_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, run_type, &e.to_string()).await;
        return Err(e.into());
    }

    let report = match pipeline.await {
        Ok(report) => report,
        Err(e) => {
            fail_run_best_effort(pool, run.id, run_type, &e.to_string()).await;
            return Err(e);
        }
    };

    if report.all_failed() {
        let err = SyncError::AllItemsFailed {
            run_type: run_type.to_string(),
            failed: report.failed,
        };
        fail_run_best_effort(pool, run.id, run_type, &err.to_string()).await;
        return Err(err);
    }

    let processed = i32::try_from(report.processed).unwrap_or(i32::MAX);
    let failed = i32::try_from(report.failed).unwrap_or(i32::MAX);
    if let Err(e) = catalog_db::complete_sync_run(pool, run.id, processed, failed).await {
        fail_run_best_effort(pool, run.id, run_type, &e.to_string()).await;
        return Err(e.into());
    }

    tracing::info!(
        run_id = run.id,
        run_type,
        trigger_source,
        processed = report.processed,
        failed = report.failed,
        "sync run completed"
    );
    Ok(report)
}

async fn fail_run_best_effort(pool: &PgPool, run_id: i64, run_type: &str, message: &str) {
    if let Err(mark_err) = catalog_db::fail_sync_run(pool, run_id, message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark {run_type} run as failed"
        );
    }
}
