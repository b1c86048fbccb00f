use super::*;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// -----------------------------------------------------------------------
// normalize_nb
// -----------------------------------------------------------------------

fn nb_item() -> NbProduct {
    serde_json::from_value(serde_json::json!({
        "id": 4521,
        "title": "Mouse Logitech M90 Óptico",
        "sku": "910-001795",
        "mainImage": "https://static.nb.com.ar/i/nb_mouse_ver_abc",
        "mainImageExp": "",
        "warranty": "12 meses",
        "stock": "Alto",
        "amountStock": 35.0,
        "highAverage": 3.6,
        "widthAverage": 6.2,
        "lengthAverage": 11.4,
        "weightAverage": 0.0,
        "price": { "value": 5.2561, "finalPrice": 6.3587, "iva": 21.0 },
        "cotizacion": 1180.5,
        "utility": 12.0,
        "categoryId": 17,
        "category": "Mouses",
        "brandId": 3,
        "brand": "Logitech"
    }))
    .expect("valid nb item")
}

#[test]
fn nb_maps_identity_and_slug() {
    let p = normalize_nb(&nb_item());
    assert_eq!(p.supplier, Supplier::Nb);
    assert_eq!(p.external_id, 4521);
    assert_eq!(p.slug, "mouse-logitech-m90-optico-4521");
    assert_eq!(p.sku.as_deref(), Some("910-001795"));
    assert!(!p.deleted);
}

#[test]
fn nb_rounds_prices_and_dimensions() {
    let p = normalize_nb(&nb_item());
    assert_eq!(p.price, dec("5.26"));
    assert_eq!(p.final_price, dec("6.36"));
    assert_eq!(p.iva, dec("21"));
    assert_eq!(p.cotizacion, Some(dec("1180.5")));
    assert_eq!(p.dimensions.high, Some(dec("4")));
    assert_eq!(p.dimensions.width, Some(dec("6")));
    assert_eq!(p.dimensions.length, Some(dec("11")));
    assert_eq!(p.dimensions.weight, None);
    assert_eq!(p.amount_stock, Some(35));
}

#[test]
fn nb_keeps_brand_and_category_ids() {
    let p = normalize_nb(&nb_item());
    assert_eq!(p.brand_name.as_deref(), Some("Logitech"));
    assert_eq!(p.brand_external_id, Some(3));
    assert_eq!(p.category_name.as_deref(), Some("Mouses"));
    assert_eq!(p.category_external_id, Some(17));
    assert_eq!(p.main_image_exp, None);
}

#[test]
fn nb_missing_price_and_image_fall_back() {
    let item: NbProduct = serde_json::from_value(serde_json::json!({
        "id": 1,
        "title": "Sin precio"
    }))
    .expect("valid nb item");
    let p = normalize_nb(&item);
    assert_eq!(p.price, Decimal::ZERO);
    assert_eq!(p.final_price, Decimal::ZERO);
    assert_eq!(p.main_image.as_deref(), Some(PLACEHOLDER_IMAGE));
    assert_eq!(p.cotizacion, None);
}

// -----------------------------------------------------------------------
// normalize_elit
// -----------------------------------------------------------------------

fn elit_item() -> ElitProduct {
    serde_json::from_value(serde_json::json!({
        "id": 98765,
        "codigo_producto": "LEN82H8",
        "nombre": "Notebook Lenovo IdeaPad 3",
        "marca": "LENOVO",
        "precio": 512.344,
        "cotizacion": 1185.0,
        "pvp_ars": 789012.3461,
        "iva": 10.5,
        "uri": "notebook-lenovo-ideapad-3-len82h8",
        "imagenes": ["https://images.elit.com.ar/p/LEN82H8.jpg"],
        "nivel_stock": "medio",
        "stock_total": 14,
        "garantia": 12,
        "atributos": [{ "nombre": "RAM", "valor": "8 GB" }],
        "dimensiones": { "largo": 36.4, "ancho": 25.1, "alto": 2.0 },
        "markup": 0.185,
        "sub_categoria": "  Notebooks ",
        "categoria": "Computación"
    }))
    .expect("valid elit item")
}

#[test]
fn elit_maps_prices_and_utility() {
    let p = normalize_elit(&elit_item());
    assert_eq!(p.supplier, Supplier::Elit);
    assert_eq!(p.price, dec("512.34"));
    assert_eq!(p.final_price, dec("789012.35"));
    assert_eq!(p.iva, dec("10.5"));
    assert_eq!(p.cotizacion, Some(dec("1185")));
    assert_eq!(p.utility, Some(dec("18.5")));
}

#[test]
fn elit_prefers_sub_category_and_uses_uri_slug() {
    let p = normalize_elit(&elit_item());
    assert_eq!(p.category_name.as_deref(), Some("Notebooks"));
    assert_eq!(p.slug, "notebook-lenovo-ideapad-3-len82h8");
    assert_eq!(p.brand_name.as_deref(), Some("LENOVO"));
    assert_eq!(p.brand_external_id, None);
    assert_eq!(p.warranty.as_deref(), Some("12"));
    assert_eq!(
        p.main_image.as_deref(),
        Some("https://images.elit.com.ar/p/LEN82H8.jpg")
    );
}

#[test]
fn elit_dimensions_follow_column_mapping() {
    let p = normalize_elit(&elit_item());
    assert_eq!(p.dimensions.length, Some(dec("36")));
    assert_eq!(p.dimensions.width, Some(dec("25")));
    assert_eq!(p.dimensions.weight, Some(dec("2")));
    assert_eq!(p.dimensions.high, None);
}

#[test]
fn elit_without_stock_is_soft_deleted() {
    let mut item = elit_item();
    assert!(!normalize_elit(&item).deleted);

    item.stock_total = Some(0.0);
    assert!(normalize_elit(&item).deleted);

    item.stock_total = None;
    let p = normalize_elit(&item);
    assert!(p.deleted);
    assert_eq!(p.amount_stock, None);
}

#[test]
fn elit_falls_back_to_category_and_generated_slug() {
    let mut item = elit_item();
    item.sub_categoria = Some("   ".to_owned());
    item.uri = None;
    item.atributos = serde_json::Value::Array(vec![]);
    let p = normalize_elit(&item);
    assert_eq!(p.category_name.as_deref(), Some("Computación"));
    assert_eq!(p.slug, "notebook-lenovo-ideapad-3-98765");
    assert_eq!(p.attributes, serde_json::Value::Null);
}
