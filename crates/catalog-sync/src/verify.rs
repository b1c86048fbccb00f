//! HEAD-checks stored product images.

use futures::stream::{self, StreamExt};
use reqwest::Client;
use sqlx::PgPool;

use catalog_core::Supplier;

use crate::SyncError;

/// An image URL that did not answer with a success status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadImage {
    pub supplier: String,
    pub external_id: i64,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCheckReport {
    pub ok: usize,
    pub bad: Vec<BadImage>,
}

/// Sends a HEAD request to every non-deleted product's `main_image`, at most
/// `concurrency` at a time.
///
/// # Errors
///
/// Returns [`SyncError::Db`] if the image list cannot be loaded.
pub async fn verify_images(
    pool: &PgPool,
    client: &Client,
    supplier: Option<Supplier>,
    concurrency: usize,
) -> Result<ImageCheckReport, SyncError> {
    let targets = catalog_db::list_image_targets(pool, supplier).await?;

    let checks = stream::iter(targets.into_iter().map(|row| {
        let client = client.clone();
        async move {
            let result = client.head(&row.main_image).send().await;
            (row, result)
        }
    }))
    .buffer_unordered(concurrency.max(1))
    .collect::<Vec<_>>()
    .await;

    let mut report = ImageCheckReport::default();
    for (row, result) in checks {
        let reason = match result {
            Ok(resp) if resp.status().is_success() => {
                report.ok += 1;
                continue;
            }
            Ok(resp) => format!("HTTP {}", resp.status().as_u16()),
            Err(e) => e.to_string(),
        };
        tracing::warn!(
            supplier = %row.supplier,
            external_id = row.external_id,
            url = %row.main_image,
            reason = %reason,
            "image URL verification failed"
        );
        report.bad.push(BadImage {
            supplier: row.supplier,
            external_id: row.external_id,
            url: row.main_image,
            reason,
        });
    }

    Ok(report)
}
