//! Image re-hosting.
//!
//! Supplier CDNs hot-link poorly and rotate URLs, so product images are
//! copied to our own asset host. [`ImageHost`] is the seam: production uses
//! [`HttpImageHost`], and [`KeepOriginal`] stands in when no upload endpoint
//! is configured.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use catalog_core::ImageUploadConfig;

use crate::error::SupplierError;
use crate::http::{build_http_client, parse_json, read_body};
use crate::nb::images::NB_STATIC_HOST;

/// Host of Elit's product image CDN.
pub const ELIT_IMAGE_HOST: &str = "images.elit.com.ar";

const DEFAULT_EXTENSION: &str = "jpg";

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Copy `source_url` to the asset host and return the hosted URL.
    async fn rehost(&self, source_url: &str) -> Result<String, SupplierError>;

    /// Whether `url` already points at this host.
    fn is_hosted(&self, url: &str) -> bool;

    /// `false` for hosts that never upload anything.
    fn enabled(&self) -> bool {
        true
    }
}

/// Leaves every URL untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepOriginal;

#[async_trait]
impl ImageHost for KeepOriginal {
    async fn rehost(&self, source_url: &str) -> Result<String, SupplierError> {
        Ok(source_url.to_owned())
    }

    fn is_hosted(&self, _url: &str) -> bool {
        false
    }

    fn enabled(&self) -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

/// Downloads the source image and uploads it as `multipart/form-data` to a
/// generic "upload bytes, get URL" endpoint.
pub struct HttpImageHost {
    client: Client,
    upload_url: String,
    token: Option<String>,
    hosted_domain: String,
}

impl HttpImageHost {
    /// # Errors
    ///
    /// - [`SupplierError::ImageHost`] if `upload_url` is not an absolute URL.
    /// - [`SupplierError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        upload_url: &str,
        token: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SupplierError> {
        let parsed = Url::parse(upload_url).map_err(|e| SupplierError::ImageHost {
            url: upload_url.to_owned(),
            reason: format!("invalid upload URL: {e}"),
        })?;
        let hosted_domain = parsed
            .host_str()
            .ok_or_else(|| SupplierError::ImageHost {
                url: upload_url.to_owned(),
                reason: "upload URL has no host".to_owned(),
            })?
            .to_owned();

        Ok(Self {
            client: build_http_client(timeout_secs, user_agent)?,
            upload_url: upload_url.to_owned(),
            token,
            hosted_domain,
        })
    }

    #[must_use]
    pub fn hosted_domain(&self) -> &str {
        &self.hosted_domain
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn rehost(&self, source_url: &str) -> Result<String, SupplierError> {
        let download = self.client.get(source_url).send().await?;
        let status = download.status();
        if !status.is_success() {
            return Err(SupplierError::UnexpectedStatus {
                status: status.as_u16(),
                url: source_url.to_owned(),
            });
        }
        let content_type = download
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = download.bytes().await?;

        let file_name = upload_file_name(source_url, content_type.as_deref());
        let mut part = Part::bytes(bytes.to_vec()).file_name(file_name);
        if let Some(mime) = content_type.as_deref() {
            part = part.mime_str(mime)?;
        }
        let form = Form::new().part("file", part);

        let mut request = self.client.post(&self.upload_url).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let body = read_body(response, "image-host", &self.upload_url).await?;

        let parsed: UploadResponse =
            parse_json(&body, || format!("upload response for {source_url}"))?;
        parsed
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| SupplierError::ImageHost {
                url: source_url.to_owned(),
                reason: "upload response carried no url".to_owned(),
            })
    }

    fn is_hosted(&self, url: &str) -> bool {
        url.contains(&self.hosted_domain)
    }
}

/// Build the configured image host, or [`KeepOriginal`] when uploads are off.
///
/// # Errors
///
/// Propagates construction errors from [`HttpImageHost::new`].
pub fn image_host_from_config(
    upload: Option<&ImageUploadConfig>,
    timeout_secs: u64,
    user_agent: &str,
) -> Result<Box<dyn ImageHost>, SupplierError> {
    match upload {
        Some(cfg) => Ok(Box::new(HttpImageHost::new(
            &cfg.url,
            cfg.token.clone(),
            timeout_secs,
            user_agent,
        )?)),
        None => Ok(Box::new(KeepOriginal)),
    }
}

/// Re-host `source_url`, falling back to the original URL when the upload
/// fails.
pub async fn rehost_or_keep(host: &dyn ImageHost, source_url: &str) -> String {
    if !host.enabled() {
        return source_url.to_owned();
    }
    match host.rehost(source_url).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(url = %source_url, error = %e, "image re-host failed, keeping original");
            source_url.to_owned()
        }
    }
}

/// HEAD-check an image URL. NB's static host is trusted without a request.
pub async fn is_available(client: &Client, url: &str) -> bool {
    if url.contains(NB_STATIC_HOST) {
        return true;
    }
    match client.head(url).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "image HEAD request failed");
            false
        }
    }
}

/// Decide whether an NB product image should be uploaded.
///
/// Existing products are only re-hosted while their stored image still
/// points at NB's CDN. New products are re-hosted whenever the feed image
/// does.
#[must_use]
pub fn should_rehost_nb(
    existing_main_image: Option<&str>,
    incoming: &str,
    host: &dyn ImageHost,
) -> bool {
    match existing_main_image {
        Some(stored) => stored.contains(NB_STATIC_HOST) && !host.is_hosted(stored),
        None => incoming.contains(NB_STATIC_HOST),
    }
}

/// Decide whether an Elit product image should be uploaded. A product that
/// already has a main image keeps it.
#[must_use]
pub fn should_rehost_elit(existing_main_image: Option<&str>, incoming: &str) -> bool {
    match existing_main_image {
        Some(stored) if !stored.trim().is_empty() => false,
        _ => incoming.contains(ELIT_IMAGE_HOST),
    }
}

/// `sha256(source_url)` truncated to 16 hex chars, plus an extension taken
/// from the URL path or the content type.
#[must_use]
pub fn upload_file_name(source_url: &str, content_type: Option<&str>) -> String {
    let digest = format!("{:x}", Sha256::digest(source_url.as_bytes()));
    let ext = extension_from_url(source_url)
        .or_else(|| content_type.and_then(extension_from_mime))
        .unwrap_or(DEFAULT_EXTENSION);
    format!("{}.{ext}", &digest[..16])
}

fn extension_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let last_segment = path.rsplit('/').next()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    let valid = (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then_some(ext)
}

fn extension_from_mime(mime: &str) -> Option<&'static str> {
    match mime.split(';').next()?.trim() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}
