//! Wire types for the Elit `productos` endpoint.

use serde::{Deserialize, Serialize};

use crate::feed::{flexible_id, lenient_f64};

#[derive(Debug, Serialize)]
pub(crate) struct ElitAuthBody<'a> {
    pub user_id: &'a str,
    pub token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ElitPage {
    #[serde(default)]
    pub resultado: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElitDimensions {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub largo: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ancho: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub alto: Option<f64>,
}

/// One product row from `POST /productos`.
#[derive(Debug, Clone, Deserialize)]
pub struct ElitProduct {
    #[serde(deserialize_with = "flexible_id")]
    pub id: i64,
    #[serde(default)]
    pub codigo_producto: Option<String>,
    pub nombre: String,
    #[serde(default)]
    pub marca: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub precio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cotizacion: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pvp_ars: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub iva: Option<f64>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub imagenes: Vec<String>,
    #[serde(default)]
    pub nivel_stock: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub stock_total: Option<f64>,
    #[serde(default)]
    pub garantia: Option<serde_json::Value>,
    #[serde(default)]
    pub atributos: serde_json::Value,
    #[serde(default)]
    pub dimensiones: Option<ElitDimensions>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub markup: Option<f64>,
    #[serde(default)]
    pub sub_categoria: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
}
