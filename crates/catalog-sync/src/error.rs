use thiserror::Error;

use catalog_db::DbError;
use catalog_suppliers::SupplierError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Supplier(#[from] SupplierError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("all {failed} items failed in {run_type}")]
    AllItemsFailed { run_type: String, failed: usize },

    #[error("failed to write error log {path}: {source}")]
    ErrorLog {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
