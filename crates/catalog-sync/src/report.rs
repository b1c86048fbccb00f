//! Options and counters shared by every sync pipeline.

use std::fmt::Display;
use std::path::Path;

use catalog_suppliers::RejectedItem;

use crate::SyncError;

/// Default path for per-run error lines.
pub const DEFAULT_ERROR_LOG: &str = "errores-sync.log";

/// Knobs every pipeline accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Items processed concurrently per chunk.
    pub chunk_size: usize,
    /// Fetch and decide, but write nothing.
    pub dry_run: bool,
    /// Sleep between paginated supplier requests.
    pub inter_page_delay_ms: u64,
    /// Upper bound on items a sheet pipeline picks up.
    pub limit: Option<i64>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            chunk_size: 25,
            dry_run: false,
            inter_page_delay_ms: 0,
            limit: None,
        }
    }
}

impl SyncOptions {
    #[must_use]
    pub fn from_app_config(config: &catalog_core::AppConfig) -> Self {
        Self {
            chunk_size: config.sync_chunk_size.max(1),
            dry_run: false,
            inter_page_delay_ms: config.sync_inter_page_delay_ms,
            limit: None,
        }
    }

    pub(crate) fn concurrency(&self) -> usize {
        self.chunk_size.max(1)
    }
}

/// What happened to a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Created,
    Updated,
    Unchanged,
    Skipped,
}

/// Counters returned by a pipeline. Failed items are kept in `errors` as one
/// line each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub soft_deleted: u64,
    pub errors: Vec<String>,
}

impl SyncReport {
    pub fn record(&mut self, outcome: ItemOutcome) {
        self.processed += 1;
        match outcome {
            ItemOutcome::Created => self.created += 1,
            ItemOutcome::Updated => self.updated += 1,
            ItemOutcome::Unchanged => self.unchanged += 1,
            ItemOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn record_failure(&mut self, label: impl Display, error: impl Display) {
        self.processed += 1;
        self.failed += 1;
        self.errors.push(format!("{label}: {error}"));
    }

    /// Counts feed entries that could not be decoded as failed items.
    pub fn record_rejected(&mut self, supplier: &str, rejected: &[RejectedItem]) {
        for item in rejected {
            self.record_failure(format!("{supplier} {}", item.label()), &item.reason);
        }
    }

    /// Whether at least one item was processed and none succeeded.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.processed > 0 && self.failed == self.processed
    }

    /// Writes one line per failed item to `path`. Nothing is written when no
    /// item failed. Returns whether the file was written.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ErrorLog`] if the file cannot be written.
    pub fn write_error_log(&self, path: &Path) -> Result<bool, SyncError> {
        if self.errors.is_empty() {
            return Ok(false);
        }
        let mut body = self.errors.join("\n");
        body.push('\n');
        std::fs::write(path, body).map_err(|source| SyncError::ErrorLog {
            path: path.display().to_string(),
            source,
        })?;
        Ok(true)
    }

    /// One-line summary for CLI output and logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "processed {}: {} created, {} updated, {} unchanged, {} skipped, {} failed, {} soft-deleted",
            self.processed,
            self.created,
            self.updated,
            self.unchanged,
            self.skipped,
            self.failed,
            self.soft_deleted
        )
    }
}
