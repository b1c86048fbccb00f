//! Reconciliation pipelines shared by the CLI and the server scheduler.
//!
//! Each pipeline pulls from a supplier, writes through `catalog-db`, and
//! returns a [`SyncReport`]. Item-level failures are logged and counted, never
//! propagated; only failures that stop the whole pipeline (feed unreachable,
//! database down) are returned as [`SyncError`].

pub mod clients;
pub mod elit_products;
pub mod error;
pub(crate) mod lookups;
pub mod nb_products;
pub mod report;
pub mod run;
pub mod seed;
pub mod sheets;
pub mod verify;

pub use elit_products::{sync_elit_products, ELIT_PAGE_SIZE};
pub use error::SyncError;
pub use nb_products::{refresh_nb_prices, sync_nb_products};
pub use report::{ItemOutcome, SyncOptions, SyncReport, DEFAULT_ERROR_LOG};
pub use run::{run_tracked, run_type};
pub use seed::{backfill_category_slugs, clear_catalog, seed_nb_brands, seed_nb_categories};
pub use sheets::{sync_elit_sheets, sync_nb_sheets};
pub use verify::{verify_images, BadImage, ImageCheckReport};
