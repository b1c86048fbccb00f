//! NB catalog import and price/stock refresh.

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};
use sqlx::PgPool;

use catalog_core::{NormalizedProduct, Supplier};
use catalog_db::{PriceStockUpdate, ProductRefresh, SupplierProductRow};
use catalog_suppliers::nb::images::PLACEHOLDER_IMAGE;
use catalog_suppliers::{normalize_nb, rehost_or_keep, should_rehost_nb, ImageHost, NbClient};

use crate::lookups::Lookups;
use crate::{ItemOutcome, SyncError, SyncOptions, SyncReport};

/// Imports the NB feed.
///
/// Brands and categories are resolved by the slug of their name and created
/// from the feed ids when missing. Existing products get fresh prices and
/// images; new products are inserted. NB rows absent from the feed are
/// soft-deleted afterwards.
///
/// # Errors
///
/// Returns [`SyncError::Supplier`] if the feed cannot be fetched, or
/// [`SyncError::Db`] if the existing rows cannot be listed or the soft-delete
/// fails. Per-product failures are recorded in the report instead.
pub async fn sync_nb_products(
    pool: &PgPool,
    client: &NbClient,
    host: &dyn ImageHost,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let feed = client.fetch_products().await?;
    tracing::info!(
        items = feed.items.len(),
        rejected = feed.rejected.len(),
        "fetched nb product feed"
    );

    let products: Vec<NormalizedProduct> = feed.items.iter().map(normalize_nb).collect();
    let existing: HashMap<i64, SupplierProductRow> =
        catalog_db::list_products_by_supplier(pool, Supplier::Nb)
            .await?
            .into_iter()
            .map(|row| (row.external_id, row))
            .collect();

    let mut report = SyncReport::default();
    report.record_rejected("nb", &feed.rejected);

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

    let lookups = Lookups::resolve(pool, Supplier::Nb, &products).await?;

    let results = stream::iter(products.iter())
        .map(|product| {
            let stored = existing.get(&product.external_id);
            let lookups = &lookups;
            async move {
                let outcome = sync_nb_product(pool, host, product, stored, lookups).await;
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
                tracing::error!(supplier = "nb", external_id, error = %e, "product sync failed");
                report.record_failure(format!("nb {external_id}"), e);
            }
        }
    }

    // Rejected entries are still listed upstream, so they are kept too.
    let keep: Vec<i64> = products
        .iter()
        .map(|p| p.external_id)
        .chain(feed.rejected_ids())
        .collect();
    report.soft_deleted = catalog_db::soft_delete_missing(pool, Supplier::Nb, &keep).await?;

    tracing::info!(summary = %report.summary(), "nb product sync finished");
    Ok(report)
}

async fn sync_nb_product(
    pool: &PgPool,
    host: &dyn ImageHost,
    product: &NormalizedProduct,
    stored: Option<&SupplierProductRow>,
    lookups: &Lookups,
) -> Result<ItemOutcome, SyncError> {
    if let Some(row) = stored {
        let refresh = ProductRefresh {
            price: product.price,
            final_price: product.final_price,
            iva: product.iva,
            cotizacion: product.cotizacion,
            main_image: existing_image(
                host,
                row.main_image.as_deref(),
                product.main_image.as_deref(),
            )
            .await,
            main_image_exp: existing_image(
                host,
                row.main_image_exp.as_deref(),
                product.main_image_exp.as_deref(),
            )
            .await,
        };
        let found =
            catalog_db::update_product_refresh(pool, Supplier::Nb, product.external_id, &refresh)
                .await?;
        return Ok(if found {
            ItemOutcome::Updated
        } else {
            ItemOutcome::Unchanged
        });
    }

    let mut fresh = product.clone();
    fresh.main_image = new_image(host, fresh.main_image.take()).await;
    fresh.main_image_exp = new_image(host, fresh.main_image_exp.take()).await;

    catalog_db::upsert_product(
        pool,
        &fresh,
        lookups.brand_id(fresh.brand_name.as_deref()),
        lookups.category_id(fresh.category_name.as_deref()),
    )
    .await?;
    Ok(ItemOutcome::Created)
}

/// Image for a product already in the catalog: upload the feed image while
/// the stored one still points at NB, otherwise keep what is stored.
async fn existing_image(
    host: &dyn ImageHost,
    stored: Option<&str>,
    incoming: Option<&str>,
) -> Option<String> {
    let Some(incoming) = incoming.filter(|url| !url.is_empty()) else {
        return stored.map(str::to_owned);
    };
    if incoming != PLACEHOLDER_IMAGE && should_rehost_nb(stored, incoming, host) {
        return Some(rehost_or_keep(host, incoming).await);
    }
    Some(stored.unwrap_or(incoming).to_owned())
}

async fn new_image(host: &dyn ImageHost, incoming: Option<String>) -> Option<String> {
    match incoming {
        Some(url) if url != PLACEHOLDER_IMAGE && should_rehost_nb(None, &url, host) => {
            Some(rehost_or_keep(host, &url).await)
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Price and stock refresh
// ---------------------------------------------------------------------------

/// Rewrites stock and prices of NB products already in the catalog, one
/// transaction per `chunk_size` items.
///
/// Feed items with no local row are counted as skipped. Feed entries that
/// do not decode, and every item of a failed chunk, count as failed.
///
/// # Errors
///
/// Returns [`SyncError::Supplier`] if the feed cannot be fetched, or
/// [`SyncError::Db`] if the local products cannot be listed.
pub async fn refresh_nb_prices(
    pool: &PgPool,
    client: &NbClient,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let feed = client.fetch_products().await?;
    let local: HashSet<i64> = catalog_db::list_products_by_supplier(pool, Supplier::Nb)
        .await?
        .into_iter()
        .map(|row| row.external_id)
        .collect();

    let mut report = SyncReport::default();
    report.record_rejected("nb", &feed.rejected);
    let mut updates = Vec::with_capacity(feed.items.len());
    for item in &feed.items {
        if local.contains(&item.id) {
            updates.push(price_stock_update(&normalize_nb(item)));
        } else {
            report.record(ItemOutcome::Skipped);
        }
    }

    for chunk in updates.chunks(options.concurrency()) {
        if options.dry_run {
            chunk
                .iter()
                .for_each(|_| report.record(ItemOutcome::Updated));
            continue;
        }
        match catalog_db::update_price_stock_chunk(pool, Supplier::Nb, chunk).await {
            Ok(_) => chunk
                .iter()
                .for_each(|_| report.record(ItemOutcome::Updated)),
            Err(e) => {
                tracing::error!(supplier = "nb", items = chunk.len(), error = %e, "price chunk failed");
                for update in chunk {
                    report.record_failure(format!("nb {}", update.external_id), &e);
                }
            }
        }
    }

    tracing::info!(summary = %report.summary(), "nb price refresh finished");
    Ok(report)
}

fn price_stock_update(product: &NormalizedProduct) -> PriceStockUpdate {
    PriceStockUpdate {
        external_id: product.external_id,
        stock: product.stock.clone(),
        amount_stock: product.amount_stock,
        price: product.price,
        final_price: product.final_price,
        iva: product.iva,
        cotizacion: product.cotizacion,
    }
}
