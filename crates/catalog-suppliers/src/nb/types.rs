//! Wire types for the NB supplier API.

use serde::Deserialize;

use crate::feed::{flexible_id, lenient_f64, lenient_i64};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NbPrice {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(rename = "finalPrice", default, deserialize_with = "lenient_f64")]
    pub final_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub iva: Option<f64>,
}

/// One entry of the NB product feed (`GET /v1/`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NbProduct {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub main_image_exp: Option<String>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub stock: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount_stock: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub high_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub width_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub length_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight_average: Option<f64>,
    #[serde(default)]
    pub price: Option<NbPrice>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cotizacion: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub utility: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NbBrand {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub imagen: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NbCategory {
    pub id: i64,
    pub description: String,
    #[serde(rename = "initialB", default)]
    pub initial_b: Option<i32>,
    #[serde(rename = "initialC", default)]
    pub initial_c: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NbItemImage {
    pub checksum: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NbItemDescription {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NbItemAttribute {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Detail record from `GET /v1/item/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct NbItemDetail {
    #[serde(default)]
    pub images: Vec<NbItemImage>,
    #[serde(default)]
    pub description: Option<NbItemDescription>,
    #[serde(default)]
    pub attributes: Vec<NbItemAttribute>,
}
