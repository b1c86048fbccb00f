use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Upstream catalog a product row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Supplier {
    Nb,
    Elit,
    Distecna,
}

impl Supplier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Supplier::Nb => "nb",
            Supplier::Elit => "elit",
            Supplier::Distecna => "distecna",
        }
    }
}

impl std::fmt::Display for Supplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Supplier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nb" => Ok(Supplier::Nb),
            "elit" => Ok(Supplier::Elit),
            "distecna" => Ok(Supplier::Distecna),
            other => Err(CoreError::UnknownSupplier(other.to_string())),
        }
    }
}

/// Package dimensions as published by the supplier, rounded to whole units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub high: Option<Decimal>,
    pub width: Option<Decimal>,
    pub length: Option<Decimal>,
    pub weight: Option<Decimal>,
}

/// A supplier product mapped onto the storefront's product columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProduct {
    pub supplier: Supplier,
    pub external_id: i64,
    pub title: String,
    pub slug: String,
    pub sku: Option<String>,
    pub main_image: Option<String>,
    pub main_image_exp: Option<String>,
    pub warranty: Option<String>,
    /// Free-text stock level, e.g. `"Sin stock"` or `"Alto"`.
    pub stock: Option<String>,
    pub amount_stock: Option<i32>,
    pub dimensions: Dimensions,
    pub price: Decimal,
    pub final_price: Decimal,
    pub iva: Decimal,
    pub cotizacion: Option<Decimal>,
    pub utility: Option<Decimal>,
    pub brand_name: Option<String>,
    pub brand_external_id: Option<i64>,
    pub category_name: Option<String>,
    pub category_external_id: Option<i64>,
    pub attributes: serde_json::Value,
    pub deleted: bool,
}

/// Source image before re-hosting. NB identifies images by checksum; Elit
/// only exposes the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub order: i32,
}

/// Detail sheet attached to a product: long description, gallery, specs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSheet {
    pub description: Option<String>,
    pub original_images: Vec<OriginalImage>,
    pub image_urls_hd: Vec<String>,
    pub image_urls_thumb: Vec<String>,
    pub attributes: BTreeMap<String, String>,
}

impl NormalizedSheet {
    #[must_use]
    pub fn has_images(&self) -> bool {
        !self.image_urls_hd.is_empty() || !self.image_urls_thumb.is_empty()
    }
}
