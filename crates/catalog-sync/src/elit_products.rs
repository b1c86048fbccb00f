//! Elit catalog import.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use sqlx::PgPool;

use catalog_core::{NormalizedProduct, Supplier};
use catalog_suppliers::{
    normalize_elit, rehost_or_keep, should_rehost_elit, ElitClient, ImageHost,
};

use crate::{ItemOutcome, SyncError, SyncOptions, SyncReport};

/// Items requested per feed page.
pub const ELIT_PAGE_SIZE: usize = 100;

/// Imports the paginated Elit feed.
///
/// Brands are matched by exact name and categories by trimmed,
/// case-insensitive name; both are created when missing. Products are
/// upserted, and Elit rows absent from the feed are soft-deleted.
///
/// # Errors
///
/// Returns [`SyncError::Supplier`] if a feed page cannot be fetched, or
/// [`SyncError::Db`] if the existing rows cannot be listed or the soft-delete
/// fails. Per-product failures are recorded in the report instead.
pub async fn sync_elit_products(
    pool: &PgPool,
    client: &ElitClient,
    host: &dyn ImageHost,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let feed = client
        .fetch_all(ELIT_PAGE_SIZE, options.inter_page_delay_ms)
        .await?;
    tracing::info!(
        items = feed.items.len(),
        rejected = feed.rejected.len(),
        "fetched elit product feed"
    );

    let products: Vec<NormalizedProduct> = feed.items.iter().map(normalize_elit).collect();
    let existing: HashMap<i64, Option<String>> =
        catalog_db::list_products_by_supplier(pool, Supplier::Elit)
            .await?
            .into_iter()
            .map(|row| (row.external_id, row.main_image))
            .collect();

    let mut report = SyncReport::default();
    report.record_rejected("elit", &feed.rejected);

    if options.dry_run {
        for product in &products {
            report.record(if existing.contains_key(&product.external_id) {
                ItemOutcome::Updated
            } else {
                ItemOutcome::Created
            });
        }
        return Ok(report);
    }

    let names = resolve_names(pool, &products).await;

    let results = stream::iter(products.iter())
        .map(|product| {
            let stored = existing.get(&product.external_id);
            let names = &names;
            async move {
                let outcome = sync_elit_product(pool, host, product, stored, names).await;
                (product.external_id, outcome)
            }
        })
        .buffer_unordered(options.concurrency())
        .boxed()
        .collect::<Vec<_>>()
        .await;

    for (external_id, outcome) in results {
        match outcome {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                tracing::error!(supplier = "elit", external_id, error = %e, "product sync failed");
                report.record_failure(format!("elit {external_id}"), e);
            }
        }
    }

    let keep: Vec<i64> = products
        .iter()
        .map(|p| p.external_id)
        .chain(feed.rejected_ids())
        .collect();
    report.soft_deleted = catalog_db::soft_delete_missing(pool, Supplier::Elit, &keep).await?;

    tracing::info!(summary = %report.summary(), "elit product sync finished");
    Ok(report)
}

#[derive(Debug, Default)]
struct ResolvedNames {
    /// Keyed by exact brand name.
    brands: HashMap<String, i64>,
    /// Keyed by trimmed, lowercased category name.
    categories: HashMap<String, i64>,
}

async fn resolve_names(pool: &PgPool, products: &[NormalizedProduct]) -> ResolvedNames {
    let mut names = ResolvedNames::default();

    for product in products {
        if let Some(brand) = product.brand_name.as_deref() {
            if !names.brands.contains_key(brand) {
                match catalog_db::get_or_create_brand_by_name(pool, Supplier::Elit, brand).await {
                    Ok(id) => {
                        names.brands.insert(brand.to_owned(), id);
                    }
                    Err(e) => tracing::warn!(brand, error = %e, "elit brand create failed"),
                }
            }
        }

        if let Some(category) = product.category_name.as_deref() {
            let key = category_key(category);
            if !key.is_empty() && !names.categories.contains_key(&key) {
                match catalog_db::get_or_create_category_by_name(pool, Supplier::Elit, category)
                    .await
                {
                    Ok(id) => {
                        names.categories.insert(key, id);
                    }
                    Err(e) => tracing::warn!(category, error = %e, "elit category create failed"),
                }
            }
        }
    }

    names
}

fn category_key(name: &str) -> String {
    name.trim().to_lowercase()
}

async fn sync_elit_product(
    pool: &PgPool,
    host: &dyn ImageHost,
    product: &NormalizedProduct,
    stored: Option<&Option<String>>,
    names: &ResolvedNames,
) -> Result<ItemOutcome, SyncError> {
    let stored_image = stored.and_then(Option::as_deref);

    let mut row = product.clone();
    row.main_image = resolve_image(host, stored_image, product.main_image.as_deref()).await;

    let brand_id = product
        .brand_name
        .as_deref()
        .and_then(|b| names.brands.get(b).copied());
    let category_id = product
        .category_name
        .as_deref()
        .and_then(|c| names.categories.get(&category_key(c)).copied());

    catalog_db::upsert_product(pool, &row, brand_id, category_id).await?;

    Ok(if stored.is_some() {
        ItemOutcome::Updated
    } else {
        ItemOutcome::Created
    })
}

/// A product that already has an image keeps it; otherwise Elit-hosted
/// feed images are uploaded.
async fn resolve_image(
    host: &dyn ImageHost,
    stored: Option<&str>,
    incoming: Option<&str>,
) -> Option<String> {
    if let Some(stored) = stored.filter(|s| !s.trim().is_empty()) {
        return Some(stored.to_owned());
    }
    let incoming = incoming.filter(|s| !s.is_empty())?;
    if should_rehost_elit(stored, incoming) {
        Some(rehost_or_keep(host, incoming).await)
    } else {
        Some(incoming.to_owned())
    }
}
