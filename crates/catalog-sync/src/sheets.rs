//! Product sheet (description, gallery, specs) pipelines.

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use sqlx::PgPool;

use catalog_core::{NormalizedSheet, OriginalImage, Supplier};
use catalog_db::SheetTargetRow;
use catalog_suppliers::nb::images::{hd_image_url, thumb_image_url};
use catalog_suppliers::{
    is_available, parse_product_sheet, rehost_or_keep, ElitClient, ImageHost, NbClient,
    NbItemDetail, SupplierError,
};

use crate::{ItemOutcome, SyncError, SyncOptions, SyncReport};

// ---------------------------------------------------------------------------
// NB
// ---------------------------------------------------------------------------

/// Builds sheets for NB products that have none with images.
///
/// Each item detail is fetched with the client's shared token. Unavailable
/// images are dropped, the rest re-hosted. Items without images are skipped.
///
/// # Errors
///
/// Returns [`SyncError::Db`] if the targets cannot be listed. Per-product
/// failures are recorded in the report.
pub async fn sync_nb_sheets(
    pool: &PgPool,
    client: &NbClient,
    host: &dyn ImageHost,
    http: &Client,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let targets =
        catalog_db::list_products_without_sheet(pool, Supplier::Nb, options.limit).await?;
    tracing::info!(targets = targets.len(), "nb sheet targets loaded");

    let results = stream::iter(targets.iter())
        .map(|target| async move {
            let outcome = sync_nb_sheet(pool, client, host, http, target, options.dry_run).await;
            (target, outcome)
        })
        .buffer_unordered(options.concurrency())
        .boxed()
        .collect::<Vec<_>>()
        .await;

    let report = tally("nb", results);
    tracing::info!(summary = %report.summary(), "nb sheet sync finished");
    Ok(report)
}

async fn sync_nb_sheet(
    pool: &PgPool,
    client: &NbClient,
    host: &dyn ImageHost,
    http: &Client,
    target: &SheetTargetRow,
    dry_run: bool,
) -> Result<ItemOutcome, SyncError> {
    let Some(detail) = client.fetch_item(target.external_id).await? else {
        tracing::warn!(external_id = target.external_id, "nb item not found");
        return Ok(ItemOutcome::Skipped);
    };
    if detail.images.is_empty() {
        tracing::warn!(external_id = target.external_id, title = %target.title, "nb item has no images");
        return Ok(ItemOutcome::Skipped);
    }

    let mut sheet = nb_sheet(&target.title, &detail);
    if dry_run {
        return Ok(ItemOutcome::Created);
    }

    sheet.image_urls_hd = upload_available(http, host, &sheet.image_urls_hd).await;
    sheet.image_urls_thumb = upload_available(http, host, &sheet.image_urls_thumb).await;

    catalog_db::upsert_sheet(pool, target.id, &sheet).await?;
    Ok(ItemOutcome::Created)
}

/// Sheet with NB's own image URLs, before availability checks and uploads.
fn nb_sheet(title: &str, detail: &NbItemDetail) -> NormalizedSheet {
    let mut images = detail.images.clone();
    images.sort_by_key(|img| img.order);

    let attributes: BTreeMap<String, String> = detail
        .attributes
        .iter()
        .filter_map(|attr| {
            let name = attr.name.as_deref()?.trim();
            let value = attr.value.as_deref()?.trim();
            (!name.is_empty() && !value.is_empty()).then(|| (name.to_owned(), value.to_owned()))
        })
        .collect();

    NormalizedSheet {
        description: detail
            .description
            .as_ref()
            .and_then(|d| d.value.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned),
        original_images: images
            .iter()
            .map(|img| OriginalImage {
                url: hd_image_url(&img.checksum),
                checksum: Some(img.checksum.clone()),
                order: img.order,
            })
            .collect(),
        image_urls_hd: images
            .iter()
            .map(|img| hd_image_url(&img.checksum))
            .collect(),
        image_urls_thumb: images
            .iter()
            .map(|img| thumb_image_url(title, &img.checksum))
            .collect(),
        attributes,
    }
}

async fn upload_available(http: &Client, host: &dyn ImageHost, urls: &[String]) -> Vec<String> {
    let mut hosted = Vec::with_capacity(urls.len());
    for url in urls {
        if !is_available(http, url).await {
            tracing::warn!(url = %url, "image not available, dropping");
            continue;
        }
        hosted.push(rehost_or_keep(host, url).await);
    }
    hosted
}

// ---------------------------------------------------------------------------
// Elit
// ---------------------------------------------------------------------------

/// Builds sheets for Elit products from their public product pages.
///
/// Products whose sheet already has images are left alone. A page that no
/// longer exists is skipped.
///
/// # Errors
///
/// Returns [`SyncError::Db`] if the targets cannot be listed. Per-product
/// failures are recorded in the report.
pub async fn sync_elit_sheets(
    pool: &PgPool,
    client: &ElitClient,
    host: &dyn ImageHost,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let targets =
        catalog_db::list_products_without_sheet(pool, Supplier::Elit, options.limit).await?;
    tracing::info!(targets = targets.len(), "elit sheet targets loaded");

    let results = stream::iter(targets.iter())
        .map(|target| async move {
            let outcome = sync_elit_sheet(pool, client, host, target, options.dry_run).await;
            (target, outcome)
        })
        .buffer_unordered(options.concurrency())
        .boxed()
        .collect::<Vec<_>>()
        .await;

    let report = tally("elit", results);
    tracing::info!(summary = %report.summary(), "elit sheet sync finished");
    Ok(report)
}

async fn sync_elit_sheet(
    pool: &PgPool,
    client: &ElitClient,
    host: &dyn ImageHost,
    target: &SheetTargetRow,
    dry_run: bool,
) -> Result<ItemOutcome, SyncError> {
    if catalog_db::sheet_has_images(pool, target.id).await? {
        return Ok(ItemOutcome::Unchanged);
    }

    let html = match client.fetch_product_page(&target.slug).await {
        Ok(html) => html,
        Err(SupplierError::NotFound { url }) => {
            tracing::warn!(external_id = target.external_id, url = %url, "elit product page gone");
            return Ok(ItemOutcome::Skipped);
        }
        Err(e) => return Err(e.into()),
    };

    let parsed = parse_product_sheet(&html);
    if dry_run {
        return Ok(ItemOutcome::Created);
    }

    let mut image_urls_hd = Vec::with_capacity(parsed.hd_images.len());
    for src in &parsed.hd_images {
        image_urls_hd.push(rehost_or_keep(host, src).await);
    }
    let mut image_urls_thumb = Vec::with_capacity(parsed.thumb_images.len());
    for src in &parsed.thumb_images {
        image_urls_thumb.push(rehost_or_keep(host, src).await);
    }

    let sheet = NormalizedSheet {
        description: Some(parsed.description).filter(|d| !d.is_empty()),
        original_images: parsed
            .hd_images
            .iter()
            .enumerate()
            .map(|(i, url)| OriginalImage {
                url: url.clone(),
                checksum: None,
                order: i32::try_from(i).unwrap_or(i32::MAX),
            })
            .collect(),
        image_urls_hd,
        image_urls_thumb,
        attributes: parsed.attributes,
    };

    catalog_db::upsert_sheet(pool, target.id, &sheet).await?;
    Ok(ItemOutcome::Created)
}

fn tally(
    supplier: &str,
    results: Vec<(&SheetTargetRow, Result<ItemOutcome, SyncError>)>,
) -> SyncReport {
    let mut report = SyncReport::default();
    for (target, outcome) in results {
        match outcome {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                tracing::error!(
                    supplier,
                    external_id = target.external_id,
                    error = %e,
                    "sheet sync failed"
                );
                report.record_failure(format!("{supplier} {}", target.external_id), e);
            }
        }
    }
    report
}
