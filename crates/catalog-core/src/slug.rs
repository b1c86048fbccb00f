//! URL slugs for products, categories and supplier image paths.

/// Separator used by the older `title_-_id` product slug format.
const LEGACY_ID_SEPARATOR: &str = "_-_";

/// Build a lowercase ASCII slug: accents folded, every run of characters
/// outside `[a-z0-9]` collapsed to a single `-`, no leading or trailing `-`.
#[must_use]
pub fn slugify(input: &str) -> String {
    collapse(&fold_diacritics(&input.to_lowercase()), false)
}

/// Slug for a supplier product: `"{slugify(title)}-{external_id}"`.
#[must_use]
pub fn product_slug(title: &str, external_id: i64) -> String {
    let base = slugify(title);
    if base.is_empty() {
        external_id.to_string()
    } else {
        format!("{base}-{external_id}")
    }
}

/// Older slug format that keeps the title's case and appends `_-_{id}`.
#[must_use]
pub fn legacy_product_slug(title: &str, id: i64) -> String {
    let base = collapse(&fold_diacritics(title), true);
    format!("{base}{LEGACY_ID_SEPARATOR}{id}")
}

/// Extract the numeric id from a slug built by [`legacy_product_slug`].
#[must_use]
pub fn id_from_legacy_slug(slug: &str) -> Option<i64> {
    slug.rsplit_once(LEGACY_ID_SEPARATOR)?.1.parse().ok()
}

/// Slug embedded in NB thumbnail URLs.
#[must_use]
pub fn image_slug(title: &str) -> String {
    slugify(title)
}

fn collapse(input: &str, keep_case: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.trim().chars() {
        let keep = if keep_case {
            c.is_ascii_alphanumeric()
        } else {
            c.is_ascii_lowercase() || c.is_ascii_digit()
        };
        if keep {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Replace precomposed Latin letters with their base letter and drop
/// combining marks (U+0300..=U+036F).
fn fold_diacritics(input: &str) -> String {
    input
        .chars()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .map(fold_char)
        .collect()
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_folds_accents_and_collapses_separators() {
        assert_eq!(
            slugify("Teclado Logitéch K120 (ES)"),
            "teclado-logitech-k120-es"
        );
        assert_eq!(slugify("  Cámaras  &  Vigilancia  "), "camaras-vigilancia");
        assert_eq!(slugify("Niño"), "nino");
    }

    #[test]
    fn slugify_strips_combining_marks() {
        assert_eq!(slugify("Cafe\u{0301}"), "cafe");
    }

    #[test]
    fn slugify_of_symbols_only_is_empty() {
        assert_eq!(slugify("--- ¿? ---"), "");
    }

    #[test]
    fn product_slug_appends_external_id() {
        assert_eq!(
            product_slug("Mouse Óptico USB", 4821),
            "mouse-optico-usb-4821"
        );
        assert_eq!(product_slug("???", 7), "7");
    }

    #[test]
    fn legacy_slug_keeps_case_and_round_trips_id() {
        let slug = legacy_product_slug("Monitor LG 24\"", 991);
        assert_eq!(slug, "Monitor-LG-24_-_991");
        assert_eq!(id_from_legacy_slug(&slug), Some(991));
    }

    #[test]
    fn id_from_legacy_slug_rejects_non_numeric_suffix() {
        assert_eq!(id_from_legacy_slug("monitor-lg-24"), None);
        assert_eq!(id_from_legacy_slug("Monitor_-_abc"), None);
        assert_eq!(id_from_legacy_slug("12345"), None, "needs the separator");
    }
}
