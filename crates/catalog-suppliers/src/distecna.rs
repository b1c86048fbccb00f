//! Parser for saved Distecna catalog listing pages.
//!
//! The Distecna portal is an ASP.NET WebForms app behind a login, so pages
//! are captured by an operator and parsed offline. Each listing page holds a
//! grid of product cards and a pager label of the form `Page 3 of 41`.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use catalog_core::price_with_taxes;

static CARDS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".contenedorProductos .NewitemProduct").expect("valid card selector")
});
static CODE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".NewtxtProductRef").expect("valid code selector"));
static NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".NewtxtProductName").expect("valid name selector"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".PriceWithoutDiscount_Panel2 span").expect("valid price selector")
});
static STOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".StockBox").expect("valid stock selector"));
static PRICE_BOX: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".NewtxtProductPrice").expect("valid price box selector"));
static IVA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span[id*='PercentIva']").expect("valid iva selector"));
static INTERNAL_TAX: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span[id*='PercentImpInterno']").expect("valid internal tax selector")
});
static EXCHANGE_RATE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#ctl00_ClientSelector_lbl_TipoCambio").expect("valid exchange rate selector")
});
static IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("valid image selector"));
static BRAND: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".Marca_Panel span").expect("valid brand selector"));
static PAGER_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.rdpPagerLabel").expect("valid pager selector"));
static PAGE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"of\s+(\d+)").expect("valid page count regex"));

/// One product card from a Distecna listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistecnaProduct {
    pub codigo: String,
    pub nombre: String,
    pub precio: Decimal,
    pub stock: i64,
    pub iva: Decimal,
    pub impuesto_interno: Decimal,
    pub cotizacion: Decimal,
    pub precio_final: Decimal,
    pub imagen: String,
    pub marca: String,
}

/// Parse every product card on a listing page. Cards without a product code
/// are skipped.
#[must_use]
pub fn parse_listing(html: &str) -> Vec<DistecnaProduct> {
    let document = Html::parse_document(html);

    let cotizacion = document
        .select(&EXCHANGE_RATE)
        .next()
        .map(|el| parse_number(&element_text(el)))
        .unwrap_or_default();

    document
        .select(&CARDS)
        .filter_map(|card| parse_card(card, cotizacion))
        .collect()
}

fn parse_card(card: ElementRef<'_>, cotizacion: Decimal) -> Option<DistecnaProduct> {
    let codigo = first_text(card, &CODE);
    if codigo.is_empty() {
        return None;
    }

    let precio = parse_number(&first_text(card, &PRICE));
    let (iva, impuesto_interno) = card
        .select(&PRICE_BOX)
        .next()
        .map(|price_box| {
            (
                parse_number(&first_text(price_box, &IVA)),
                parse_number(&first_text(price_box, &INTERNAL_TAX)),
            )
        })
        .unwrap_or_default();

    let stock_digits: String = first_text(card, &STOCK)
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    Some(DistecnaProduct {
        codigo,
        nombre: first_text(card, &NAME),
        precio,
        stock: stock_digits.parse().unwrap_or(0),
        iva,
        impuesto_interno,
        cotizacion,
        precio_final: price_with_taxes(precio, iva, impuesto_interno),
        imagen: card
            .select(&IMAGE)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default()
            .to_owned(),
        marca: first_text(card, &BRAND),
    })
}

/// Number of listing pages announced by the pager, or 1 without a pager.
#[must_use]
pub fn total_pages(html: &str) -> u32 {
    let document = Html::parse_document(html);
    document
        .select(&PAGER_LABEL)
        .map(element_text)
        .find(|text| text.contains("of"))
        .and_then(|text| {
            PAGE_COUNT
                .captures(&text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        })
        .unwrap_or(1)
}

/// Parse a price or percentage as printed by the portal: `$ 1.234,56`,
/// `1234.56`, `21,00 %`. Unparseable input yields zero.
#[must_use]
pub fn parse_number(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.matches('.').count() > 1 {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    normalized.parse().unwrap_or_default()
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const PAGE: &str = r#"
<html><body>
  <span id="ctl00_ClientSelector_lbl_TipoCambio">U$S 1.050,50</span>
  <span class="rdpPagerLabel">Page size:</span>
  <span class="rdpPagerLabel">Page 2 of 17</span>
  <div class="contenedorProductos">
    <div class="NewitemProduct">
      <img src="https://commerce.distecna.com/img/p/ABC-1.jpg">
      <span class="NewtxtProductRef"> ABC-1 </span>
      <span class="NewtxtProductName">Switch TP-Link 8 bocas</span>
      <div class="PriceWithoutDiscount_Panel2"><span>U$S 1.234,56</span></div>
      <div class="NewtxtProductPrice">
        <span id="ctl00_rpt_ctl01_lbl_PercentIva">21,00 %</span>
        <span id="ctl00_rpt_ctl01_lbl_PercentImpInterno">10 %</span>
      </div>
      <div class="StockBox">Stock: 35 u.</div>
      <div class="Marca_Panel"><span>TP-LINK</span></div>
    </div>
    <div class="NewitemProduct">
      <span class="NewtxtProductRef"></span>
      <span class="NewtxtProductName">Sin código</span>
    </div>
    <div class="NewitemProduct">
      <span class="NewtxtProductRef">XYZ-9</span>
      <span class="NewtxtProductName">Cable UTP</span>
      <div class="PriceWithoutDiscount_Panel2"><span>consultar</span></div>
      <div class="StockBox">Sin stock</div>
    </div>
  </div>
</body></html>
"#;

    #[test]
    fn parses_cards_and_skips_those_without_code() {
        let products = parse_listing(PAGE);
        assert_eq!(products.len(), 2);

        let first = &products[0];
        assert_eq!(first.codigo, "ABC-1");
        assert_eq!(first.nombre, "Switch TP-Link 8 bocas");
        assert_eq!(first.precio, dec("1234.56"));
        assert_eq!(first.iva, dec("21"));
        assert_eq!(first.impuesto_interno, dec("10"));
        assert_eq!(first.stock, 35);
        assert_eq!(first.cotizacion, dec("1050.50"));
        assert_eq!(first.marca, "TP-LINK");
        assert_eq!(first.imagen, "https://commerce.distecna.com/img/p/ABC-1.jpg");
        // 1234.56 + 21% + 10% = 1617.27
        assert_eq!(first.precio_final, dec("1617.27"));
    }

    #[test]
    fn missing_fields_default_to_zero_or_empty() {
        let products = parse_listing(PAGE);
        let second = &products[1];
        assert_eq!(second.codigo, "XYZ-9");
        assert_eq!(second.precio, Decimal::ZERO);
        assert_eq!(second.stock, 0);
        assert_eq!(second.iva, Decimal::ZERO);
        assert_eq!(second.imagen, "");
        assert_eq!(second.marca, "");
    }

    #[test]
    fn total_pages_reads_pager_label() {
        assert_eq!(total_pages(PAGE), 17);
        assert_eq!(total_pages("<html><body></body></html>"), 1);
    }

    #[test]
    fn parse_number_handles_both_decimal_styles() {
        assert_eq!(parse_number("$ 1.234,56"), dec("1234.56"));
        assert_eq!(parse_number("1234.56"), dec("1234.56"));
        assert_eq!(parse_number("1.234.567"), dec("1234567"));
        assert_eq!(parse_number("21 %"), dec("21"));
        assert_eq!(parse_number(""), Decimal::ZERO);
        assert_eq!(parse_number("n/a"), Decimal::ZERO);
    }
}
