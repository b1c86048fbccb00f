//! Supplier clients built from [`AppConfig`], shared by the CLI and the
//! server scheduler.

use catalog_core::AppConfig;
use catalog_suppliers::{
    build_http_client, image_host_from_config, ElitClient, ImageHost, NbClient, SupplierError,
};

/// Build the NB client from config.
///
/// # Errors
///
/// Returns [`SupplierError::MissingCredentials`] when `NB_USER`/`NB_PASSWORD`
/// are not set, or [`SupplierError::Http`] if the HTTP client cannot be built.
pub fn nb_client(config: &AppConfig) -> Result<NbClient, SupplierError> {
    let credentials =
        config
            .nb_credentials
            .clone()
            .ok_or_else(|| SupplierError::MissingCredentials {
                supplier: "nb".to_string(),
            })?;
    NbClient::new(
        &config.nb_api_base_url,
        credentials,
        config.http_timeout_secs,
        &config.http_user_agent,
        config.http_max_retries,
        config.http_backoff_base_ms,
        config.nb_token_refresh_every,
    )
}

/// Build the Elit client from config.
///
/// # Errors
///
/// Returns [`SupplierError::MissingCredentials`] when the Elit user id or
/// token is not set, or [`SupplierError::Http`] if the HTTP client cannot be
/// built.
pub fn elit_client(config: &AppConfig) -> Result<ElitClient, SupplierError> {
    let credentials =
        config
            .elit_credentials
            .clone()
            .ok_or_else(|| SupplierError::MissingCredentials {
                supplier: "elit".to_string(),
            })?;
    ElitClient::new(
        &config.elit_api_base_url,
        &config.elit_site_base_url,
        credentials,
        config.http_timeout_secs,
        &config.http_user_agent,
        config.http_max_retries,
        config.http_backoff_base_ms,
    )
}

/// The configured image host; uploads are off when no upload URL is set.
///
/// # Errors
///
/// Returns [`SupplierError::Http`] if the upload client cannot be built.
pub fn image_host(config: &AppConfig) -> Result<Box<dyn ImageHost>, SupplierError> {
    image_host_from_config(
        config.image_upload.as_ref(),
        config.http_timeout_secs,
        &config.http_user_agent,
    )
}

/// Plain HTTP client for availability and HEAD checks.
///
/// # Errors
///
/// Returns [`SupplierError::Http`] if the client cannot be built.
pub fn http_client(config: &AppConfig) -> Result<reqwest::Client, SupplierError> {
    build_http_client(config.http_timeout_secs, &config.http_user_agent)
}
