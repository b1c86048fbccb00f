//! HTTP client for the Elit wholesale API and public product pages.

pub mod sheet;
pub mod types;

use std::time::Duration;

use reqwest::Client;

use catalog_core::ElitCredentials;

use crate::error::SupplierError;
use crate::feed::{decode_items, Feed};
use crate::http::{build_http_client, parse_json, read_body};
use crate::retry::retry_with_backoff;
use types::{ElitAuthBody, ElitPage, ElitProduct};

const SUPPLIER: &str = "elit";

/// Maximum number of pages to fetch before returning an error.
/// Guards against a feed that never returns an empty page.
const MAX_PAGES: usize = 500;

/// Elit offsets are 1-based.
const FIRST_OFFSET: usize = 1;

pub struct ElitClient {
    client: Client,
    api_base_url: String,
    site_base_url: String,
    credentials: ElitCredentials,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ElitClient {
    /// # Errors
    ///
    /// Returns [`SupplierError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_base_url: &str,
        site_base_url: &str,
        credentials: ElitCredentials,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, SupplierError> {
        Ok(Self {
            client: build_http_client(timeout_secs, user_agent)?,
            api_base_url: api_base_url.trim_end_matches('/').to_owned(),
            site_base_url: site_base_url.trim_end_matches('/').to_owned(),
            credentials,
            max_retries,
            backoff_base_ms,
        })
    }

    /// # Errors
    ///
    /// Returns [`SupplierError::MissingCredentials`] when `ELIT_USER_ID` and
    /// `ELIT_TOKEN` are not configured.
    pub fn from_app_config(config: &catalog_core::AppConfig) -> Result<Self, SupplierError> {
        let credentials =
            config
                .elit_credentials
                .clone()
                .ok_or_else(|| SupplierError::MissingCredentials {
                    supplier: SUPPLIER.to_owned(),
                })?;
        Self::new(
            &config.elit_api_base_url,
            &config.elit_site_base_url,
            credentials,
            config.http_timeout_secs,
            &config.http_user_agent,
            config.http_max_retries,
            config.http_backoff_base_ms,
        )
    }

    /// Fetches one page of the product feed. An absent `resultado` is
    /// returned as an empty page. Entries that do not decode are returned in
    /// [`Feed::rejected`].
    ///
    /// # Errors
    ///
    /// - [`SupplierError::RateLimited`] / [`SupplierError::Http`] after all retries.
    /// - [`SupplierError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`SupplierError::Deserialize`] if the page envelope is not the expected JSON.
    pub async fn fetch_page(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Feed<ElitProduct>, SupplierError> {
        let url = format!(
            "{}/productos?limit={limit}&offset={offset}",
            self.api_base_url
        );
        let auth = ElitAuthBody {
            user_id: &self.credentials.user_id,
            token: &self.credentials.token,
        };

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            let auth = &auth;
            async move {
                let response = self.client.post(&url).json(auth).send().await?;
                read_body(response, SUPPLIER, &url).await
            }
        })
        .await?;

        let page: ElitPage = parse_json(&body, || format!("elit productos offset {offset}"))?;
        Ok(decode_items(
            page.resultado.unwrap_or_default(),
            offset.saturating_sub(FIRST_OFFSET),
            SUPPLIER,
        ))
    }

    /// Pages through the whole feed, `limit` items at a time, sleeping
    /// `inter_page_delay_ms` between requests.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`]. Returns
    /// [`SupplierError::PaginationLimit`] after [`MAX_PAGES`] non-empty pages.
    pub async fn fetch_all(
        &self,
        limit: usize,
        inter_page_delay_ms: u64,
    ) -> Result<Feed<ElitProduct>, SupplierError> {
        let limit = limit.max(1);
        let mut all = Feed::default();
        let mut offset = FIRST_OFFSET;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(SupplierError::PaginationLimit {
                    supplier: SUPPLIER.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            if page_count > 1 && inter_page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_page_delay_ms)).await;
            }

            let page = self.fetch_page(limit, offset).await?;
            if page.is_empty() {
                break;
            }
            tracing::info!(offset, items = page.len(), "fetched elit page");
            all.append(page);
            offset += limit;
        }

        Ok(all)
    }

    /// Fetches the public product page HTML for `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`SupplierError::NotFound`] on 404 and the usual transport
    /// errors otherwise.
    pub async fn fetch_product_page(&self, slug: &str) -> Result<String, SupplierError> {
        let url = format!(
            "{}/producto/{}",
            self.site_base_url,
            slug.trim_start_matches('/')
        );
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                read_body(response, SUPPLIER, &url).await
            }
        })
        .await
    }
}
