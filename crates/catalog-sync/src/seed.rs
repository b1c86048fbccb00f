//! NB brand/category seeding and catalog maintenance.

use sqlx::PgPool;

use catalog_core::{slugify, Supplier};
use catalog_db::{CategoryRow, ClearedCounts};
use catalog_suppliers::NbClient;

use crate::{ItemOutcome, SyncError, SyncOptions, SyncReport};

/// Upserts every NB brand by its NB id.
///
/// # Errors
///
/// Returns [`SyncError::Supplier`] if the brand list cannot be fetched.
pub async fn seed_nb_brands(
    pool: &PgPool,
    client: &NbClient,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let brands = client.fetch_brands().await?;
    let mut report = SyncReport::default();

    for brand in &brands {
        if options.dry_run {
            report.record(ItemOutcome::Updated);
            continue;
        }
        let image = brand.imagen.as_deref().filter(|s| !s.trim().is_empty());
        match catalog_db::upsert_brand_by_external_id(
            pool,
            Supplier::Nb,
            brand.id,
            &brand.description,
            image,
        )
        .await
        {
            Ok(_) => report.record(ItemOutcome::Updated),
            Err(e) => {
                tracing::error!(external_id = brand.id, error = %e, "nb brand upsert failed");
                report.record_failure(format!("nb brand {}", brand.id), e);
            }
        }
    }

    tracing::info!(summary = %report.summary(), "nb brands seeded");
    Ok(report)
}

/// Upserts every NB category by its NB id, keeping any slug already set.
///
/// # Errors
///
/// Returns [`SyncError::Supplier`] if the category list cannot be fetched.
pub async fn seed_nb_categories(
    pool: &PgPool,
    client: &NbClient,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let categories = client.fetch_categories().await?;
    let mut report = SyncReport::default();

    for category in &categories {
        if options.dry_run {
            report.record(ItemOutcome::Updated);
            continue;
        }
        match catalog_db::upsert_category_by_external_id(
            pool,
            Supplier::Nb,
            category.id,
            &category.description,
            category.initial_b.unwrap_or(0),
            category.initial_c.unwrap_or(0),
        )
        .await
        {
            Ok(_) => report.record(ItemOutcome::Updated),
            Err(e) => {
                tracing::error!(external_id = category.id, error = %e, "nb category upsert failed");
                report.record_failure(format!("nb category {}", category.id), e);
            }
        }
    }

    tracing::info!(summary = %report.summary(), "nb categories seeded");
    Ok(report)
}

/// What to do with a category that has no slug.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SlugAction {
    /// Another category already owns the slug; fold into it.
    MergeInto(i64),
    Assign(String),
    /// The name has no sluggable characters.
    Skip,
}

fn slug_action(category: &CategoryRow, owner: Option<&CategoryRow>) -> SlugAction {
    let slug = slugify(&category.name);
    if slug.is_empty() {
        return SlugAction::Skip;
    }
    match owner {
        Some(owner) if owner.id != category.id => SlugAction::MergeInto(owner.id),
        _ => SlugAction::Assign(slug),
    }
}

/// Gives every slug-less category `slugify(name)`, merging it into the
/// category that already owns that slug when there is one.
///
/// # Errors
///
/// Returns [`SyncError::Db`] if the slug-less categories cannot be listed.
pub async fn backfill_category_slugs(
    pool: &PgPool,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let pending = catalog_db::list_categories_without_slug(pool).await?;
    let mut report = SyncReport::default();

    for category in &pending {
        let result = backfill_one(pool, category, options.dry_run).await;
        match result {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                tracing::error!(category_id = category.id, name = %category.name, error = %e, "slug backfill failed");
                report.record_failure(format!("category {}", category.id), e);
            }
        }
    }

    tracing::info!(summary = %report.summary(), "category slugs backfilled");
    Ok(report)
}

async fn backfill_one(
    pool: &PgPool,
    category: &CategoryRow,
    dry_run: bool,
) -> Result<ItemOutcome, SyncError> {
    let owner = catalog_db::find_category_by_slug(pool, &slugify(&category.name)).await?;
    let action = slug_action(category, owner.as_ref());
    if dry_run {
        return Ok(match action {
            SlugAction::Skip => ItemOutcome::Skipped,
            _ => ItemOutcome::Updated,
        });
    }

    match action {
        SlugAction::MergeInto(target) => {
            let moved = catalog_db::merge_category_into(pool, category.id, target).await?;
            tracing::info!(
                duplicate = category.id,
                target,
                moved,
                "merged duplicate category"
            );
            Ok(ItemOutcome::Updated)
        }
        SlugAction::Assign(slug) => {
            catalog_db::set_category_slug(pool, category.id, &slug).await?;
            Ok(ItemOutcome::Updated)
        }
        SlugAction::Skip => Ok(ItemOutcome::Skipped),
    }
}

/// Deletes every product, category and brand.
///
/// # Errors
///
/// Returns [`SyncError::Db`] if the delete fails.
pub async fn clear_catalog(pool: &PgPool) -> Result<ClearedCounts, SyncError> {
    let cleared = catalog_db::clear_catalog(pool).await?;
    tracing::warn!(
        products = cleared.products,
        categories = cleared.categories,
        brands = cleared.brands,
        "catalog cleared"
    );
    Ok(cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(id: i64, name: &str, slug: Option<&str>) -> CategoryRow {
        CategoryRow {
            id,
            supplier: Some("nb".to_string()),
            external_id: Some(id),
            name: name.to_string(),
            slug: slug.map(str::to_string),
            initial_b: 0,
            initial_c: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn free_slug_is_assigned() {
        let cat = category(1, "Placas de Video", None);
        assert_eq!(
            slug_action(&cat, None),
            SlugAction::Assign("placas-de-video".to_string())
        );
    }

    #[test]
    fn taken_slug_merges_into_owner() {
        let cat = category(1, "Notebooks", None);
        let owner = category(7, "notebooks", Some("notebooks"));
        assert_eq!(slug_action(&cat, Some(&owner)), SlugAction::MergeInto(7));
    }

    #[test]
    fn unsluggable_name_is_skipped() {
        let cat = category(1, "***", None);
        assert_eq!(slug_action(&cat, None), SlugAction::Skip);
    }
}
