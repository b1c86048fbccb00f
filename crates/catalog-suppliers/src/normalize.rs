//! Normalization from supplier wire types to [`catalog_core::NormalizedProduct`].

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use catalog_core::{product_slug, round2, Dimensions, NormalizedProduct, Supplier};

use crate::elit::types::{ElitDimensions, ElitProduct};
use crate::nb::images::PLACEHOLDER_IMAGE;
use crate::nb::types::NbProduct;

/// Maps an NB feed entry onto the product columns. Prices NB leaves out are
/// stored as zero; an empty main image becomes NB's placeholder.
#[must_use]
pub fn normalize_nb(item: &NbProduct) -> NormalizedProduct {
    let price = item.price.as_ref();
    let money = |v: Option<f64>| v.and_then(round2).unwrap_or(Decimal::ZERO);

    NormalizedProduct {
        supplier: Supplier::Nb,
        external_id: item.id,
        title: item.title.trim().to_owned(),
        slug: product_slug(&item.title, item.id),
        sku: non_empty(item.sku.as_deref()),
        main_image: Some(
            non_empty(item.main_image.as_deref()).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
        ),
        main_image_exp: non_empty(item.main_image_exp.as_deref()),
        warranty: non_empty(item.warranty.as_deref()),
        stock: non_empty(item.stock.as_deref()),
        amount_stock: item.amount_stock.and_then(to_i32),
        dimensions: Dimensions {
            high: whole(item.high_average),
            width: whole(item.width_average),
            length: whole(item.length_average),
            weight: whole(item.weight_average),
        },
        price: money(price.and_then(|p| p.value)),
        final_price: money(price.and_then(|p| p.final_price)),
        iva: money(price.and_then(|p| p.iva)),
        cotizacion: item.cotizacion.and_then(round2),
        utility: item.utility.and_then(round2),
        brand_name: non_empty(item.brand.as_deref()),
        brand_external_id: item.brand_id,
        category_name: non_empty(item.category.as_deref()),
        category_external_id: item.category_id,
        attributes: serde_json::Value::Null,
        deleted: false,
    }
}

/// Maps an Elit feed entry onto the product columns.
///
/// Elit publishes its margin as a fraction, so `utility` is `markup * 100`.
/// A product with no stock is stored soft-deleted.
#[must_use]
pub fn normalize_elit(item: &ElitProduct) -> NormalizedProduct {
    let money = |v: Option<f64>| v.and_then(round2).unwrap_or(Decimal::ZERO);
    let dims = item.dimensiones.clone().unwrap_or_default();

    let category_name = non_empty(item.sub_categoria.as_deref())
        .or_else(|| non_empty(item.categoria.as_deref()));

    let slug = non_empty(item.uri.as_deref())
        .unwrap_or_else(|| product_slug(&item.nombre, item.id));

    NormalizedProduct {
        supplier: Supplier::Elit,
        external_id: item.id,
        title: item.nombre.trim().to_owned(),
        slug,
        sku: non_empty(item.codigo_producto.as_deref()),
        main_image: item
            .imagenes
            .first()
            .and_then(|url| non_empty(Some(url.as_str()))),
        main_image_exp: None,
        warranty: item.garantia.as_ref().and_then(warranty_text),
        stock: non_empty(item.nivel_stock.as_deref()),
        amount_stock: item.stock_total.and_then(to_i32),
        dimensions: elit_dimensions(&dims),
        price: money(item.precio),
        final_price: money(item.pvp_ars),
        iva: money(item.iva),
        cotizacion: item.cotizacion.filter(|v| *v != 0.0).and_then(round2),
        utility: item
            .markup
            .filter(|v| *v != 0.0)
            .and_then(|m| round2(m * 100.0)),
        brand_name: non_empty(item.marca.as_deref()),
        brand_external_id: None,
        category_name,
        category_external_id: None,
        attributes: match &item.atributos {
            serde_json::Value::Array(a) if !a.is_empty() => item.atributos.clone(),
            serde_json::Value::Object(o) if !o.is_empty() => item.atributos.clone(),
            _ => serde_json::Value::Null,
        },
        deleted: item.stock_total.is_none_or(|s| s == 0.0),
    }
}

/// Elit's `dimensiones` map onto our columns as largo → length,
/// ancho → width and alto → weight. There is no height.
fn elit_dimensions(dims: &ElitDimensions) -> Dimensions {
    Dimensions {
        high: None,
        width: whole(dims.ancho),
        length: whole(dims.largo),
        weight: whole(dims.alto),
    }
}

/// Rounds a dimension to a whole number. Zero means "unknown" upstream.
fn whole(value: Option<f64>) -> Option<Decimal> {
    value
        .filter(|v| v.is_finite() && *v != 0.0)
        .and_then(|v| Decimal::from_f64(v.round()))
}

fn to_i32(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let rounded = value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
    Some(rounded)
}

fn warranty_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => non_empty(Some(s)),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
