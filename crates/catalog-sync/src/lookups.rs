//! Brand and category resolution for a batch of feed products.

use std::collections::HashMap;

use sqlx::PgPool;

use catalog_core::{slugify, NormalizedProduct, Supplier};

use crate::SyncError;

/// Brand and category ids keyed by the slug of their name.
#[derive(Debug, Default)]
pub(crate) struct Lookups {
    brands: HashMap<String, i64>,
    categories: HashMap<String, i64>,
}

impl Lookups {
    /// Loads the current brands and categories, then creates whatever the
    /// batch references that does not exist yet. Rows are created with the
    /// feed's external id when it has one and by name otherwise.
    ///
    /// A row that cannot be created is logged and left unresolved.
    pub(crate) async fn resolve(
        pool: &PgPool,
        supplier: Supplier,
        products: &[NormalizedProduct],
    ) -> Result<Self, SyncError> {
        let mut lookups = Self::default();

        for brand in catalog_db::list_brands(pool).await? {
            lookups
                .brands
                .entry(slugify(&brand.name))
                .or_insert(brand.id);
        }
        for category in catalog_db::list_categories(pool).await? {
            lookups
                .categories
                .entry(slugify(&category.name))
                .or_insert(category.id);
        }

        for product in products {
            if let Some(name) = product.brand_name.as_deref() {
                let key = slugify(name);
                if !key.is_empty() && !lookups.brands.contains_key(&key) {
                    let created = match product.brand_external_id {
                        Some(ext) => {
                            catalog_db::upsert_brand_by_external_id(pool, supplier, ext, name, None)
                                .await
                        }
                        None => catalog_db::get_or_create_brand_by_name(pool, supplier, name).await,
                    };
                    match created {
                        Ok(id) => {
                            lookups.brands.insert(key, id);
                        }
                        Err(e) => {
                            tracing::warn!(%supplier, brand = %name, error = %e, "brand create failed")
                        }
                    }
                }
            }

            if let Some(name) = product.category_name.as_deref() {
                let key = slugify(name);
                if !key.is_empty() && !lookups.categories.contains_key(&key) {
                    let created = match product.category_external_id {
                        Some(ext) => {
                            catalog_db::upsert_category_by_external_id(
                                pool, supplier, ext, name, 0, 0,
                            )
                            .await
                        }
                        None => {
                            catalog_db::get_or_create_category_by_name(pool, supplier, name).await
                        }
                    };
                    match created {
                        Ok(id) => {
                            lookups.categories.insert(key, id);
                        }
                        Err(e) => {
                            tracing::warn!(%supplier, category = %name, error = %e, "category create failed")
                        }
                    }
                }
            }
        }

        Ok(lookups)
    }

    pub(crate) fn brand_id(&self, name: Option<&str>) -> Option<i64> {
        name.and_then(|n| self.brands.get(&slugify(n)).copied())
    }

    pub(crate) fn category_id(&self, name: Option<&str>) -> Option<i64> {
        name.and_then(|n| self.categories.get(&slugify(n)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_match_by_slug_of_name() {
        let mut lookups = Lookups::default();
        lookups.brands.insert(slugify("Logitech"), 3);
        lookups.categories.insert(slugify("Mouses y Teclados"), 9);

        assert_eq!(lookups.brand_id(Some("LOGITECH ")), Some(3));
        assert_eq!(lookups.category_id(Some("mouses y teclados")), Some(9));
        assert_eq!(lookups.brand_id(Some("Genius")), None);
        assert_eq!(lookups.brand_id(None), None);
    }
}
