//! Parser for Elit's public product pages.
//!
//! The pages are server-rendered Next.js output. Gallery `<img>` tags point
//! at the `/_next/image` optimizer, so the real asset URL has to be pulled out
//! of the `url=` query parameter.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1.text-xl").expect("valid title selector"));
static ATTRIBUTE_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.list-disc li").expect("valid attribute selector"));
static STRONG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("strong").expect("valid strong selector"));
static HD_IMAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".embla__slide img").expect("valid gallery selector"));
static THUMB_IMAGES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".flex-none img").expect("valid thumbnail selector"));
static NEXT_IMAGE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"url=([^&]+)").expect("valid next-image regex"));
/// A `:` that is followed by some non-blank text.
static KEY_VALUE_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*\S").expect("valid key-value regex"));

/// Everything the sync job needs from an Elit product page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElitSheet {
    pub description: String,
    pub attributes: BTreeMap<String, String>,
    pub hd_images: Vec<String>,
    pub thumb_images: Vec<String>,
}

#[must_use]
pub fn parse_product_sheet(html: &str) -> ElitSheet {
    let document = Html::parse_document(html);

    let description = document
        .select(&TITLE)
        .next()
        .map(|h1| collapse_whitespace(&h1.text().collect::<String>()))
        .unwrap_or_default();

    let mut attributes = BTreeMap::new();
    for li in document.select(&ATTRIBUTE_ITEMS) {
        if let Some((key, value)) = parse_attribute(li) {
            attributes.entry(key).or_insert(value);
        }
    }

    ElitSheet {
        description,
        attributes,
        hd_images: image_sources(&document, &HD_IMAGES),
        thumb_images: image_sources(&document, &THUMB_IMAGES),
    }
}

/// `Clave: valor` lines split at the first colon. Lines whose value only
/// lives in a `<strong>` child use the element's own text as the key.
fn parse_attribute(li: ElementRef<'_>) -> Option<(String, String)> {
    let text = li.text().collect::<String>();

    if let Some(m) = KEY_VALUE_COLON.find(&text) {
        let key = text[..m.start()].trim();
        let value = text[m.start() + 1..].trim();
        if !key.is_empty() && !value.is_empty() {
            return Some((key.to_owned(), value.to_owned()));
        }
    }

    let strong = li
        .select(&STRONG)
        .next()
        .map(|s| s.text().collect::<String>().trim().to_owned())
        .unwrap_or_default();
    let own_text: String = li
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect();
    let key = own_text
        .trim()
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace())
        .to_owned();

    if key.is_empty() || strong.is_empty() {
        None
    } else {
        Some((key, strong))
    }
}

fn image_sources(document: &Html, selector: &Selector) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for img in document.select(selector) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        let Some(url) = real_image_url(src) else {
            continue;
        };
        if url.starts_with("https://") && !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

/// Unwraps `/_next/image?url=<encoded>&w=..` into the encoded URL.
/// Returns `None` for sources without a `url=` parameter.
#[must_use]
pub fn real_image_url(src: &str) -> Option<String> {
    let encoded = NEXT_IMAGE_URL.captures(src)?.get(1)?.as_str();
    Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
