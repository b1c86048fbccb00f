use catalog_core::image_slug;

pub const NB_STATIC_HOST: &str = "static.nb.com.ar";

/// Shown by NB when a product has no photo. Never worth re-hosting.
pub const PLACEHOLDER_IMAGE: &str = "https://static.nb.com.ar/img/no-image.png";

#[must_use]
pub fn hd_image_url(checksum: &str) -> String {
    format!("https://{NB_STATIC_HOST}/i/nb__ver_{checksum}")
}

#[must_use]
pub fn thumb_image_url(title: &str, checksum: &str) -> String {
    format!(
        "https://{NB_STATIC_HOST}/i/nb_{}_size_h120_{checksum}",
        image_slug(title)
    )
}
