//! HTTP client for the NB distributor API.
//!
//! Every endpoint except login needs a bearer token. The token is acquired
//! lazily, reused for `refresh_every` requests and then re-acquired. A 401
//! drops the cached token, logs in again and retries the request once.

pub mod images;
pub mod types;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use catalog_core::NbCredentials;

use crate::error::SupplierError;
use crate::feed::{decode_items, Feed};
use crate::http::{build_http_client, parse_json, read_body};
use crate::retry::retry_with_backoff;
use types::{LoginResponse, NbBrand, NbCategory, NbItemDetail, NbProduct};

const SUPPLIER: &str = "nb";

#[derive(Debug, Default)]
struct TokenState {
    token: Option<String>,
    uses: u32,
}

/// Client for the NB REST API.
pub struct NbClient {
    client: Client,
    base_url: String,
    credentials: NbCredentials,
    max_retries: u32,
    backoff_base_ms: u64,
    refresh_every: u32,
    token: Mutex<TokenState>,
}

impl NbClient {
    /// Creates a client for `base_url` (e.g. `https://api.nb.com.ar/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`SupplierError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_url: &str,
        credentials: NbCredentials,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
        refresh_every: u32,
    ) -> Result<Self, SupplierError> {
        Ok(Self {
            client: build_http_client(timeout_secs, user_agent)?,
            base_url: base_url.trim_end_matches('/').to_owned(),
            credentials,
            max_retries,
            backoff_base_ms,
            refresh_every: refresh_every.max(1),
            token: Mutex::new(TokenState::default()),
        })
    }

    /// Builds a client from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`SupplierError::MissingCredentials`] when `NB_USER` and
    /// `NB_PASSWORD` are not configured.
    pub fn from_app_config(config: &catalog_core::AppConfig) -> Result<Self, SupplierError> {
        let credentials =
            config
                .nb_credentials
                .clone()
                .ok_or_else(|| SupplierError::MissingCredentials {
                    supplier: SUPPLIER.to_owned(),
                })?;
        Self::new(
            &config.nb_api_base_url,
            credentials,
            config.http_timeout_secs,
            &config.http_user_agent,
            config.http_max_retries,
            config.http_backoff_base_ms,
            config.nb_token_refresh_every,
        )
    }

    /// Exchanges the configured credentials for a fresh bearer token.
    ///
    /// # Errors
    ///
    /// - [`SupplierError::Auth`] on a non-2xx response or a body without a token.
    /// - [`SupplierError::Http`] on network failure.
    pub async fn login(&self) -> Result<String, SupplierError> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("user", self.credentials.user.as_str()),
                ("password", self.credentials.password.as_str()),
                ("mode", "api"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SupplierError::Auth {
                supplier: SUPPLIER.to_owned(),
                reason: format!("login returned HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await?;
        let parsed: LoginResponse = parse_json(&body, || "nb login response".to_owned())?;
        match parsed.token {
            Some(token) if !token.trim().is_empty() => {
                tracing::debug!("nb login succeeded");
                Ok(token)
            }
            _ => Err(SupplierError::Auth {
                supplier: SUPPLIER.to_owned(),
                reason: "login response carried no token".to_owned(),
            }),
        }
    }

    /// Fetches the full product feed. Entries that do not decode are
    /// returned in [`Feed::rejected`] rather than failing the pull.
    ///
    /// # Errors
    ///
    /// Propagates transport and status errors after retries, and
    /// [`SupplierError::Deserialize`] when the body is not a JSON array.
    pub async fn fetch_products(&self) -> Result<Feed<NbProduct>, SupplierError> {
        let values: Vec<serde_json::Value> = self.get_json("", "nb product feed").await?;
        Ok(decode_items(values, 0, SUPPLIER))
    }

    /// # Errors
    ///
    /// Propagates transport, status and deserialization errors after retries.
    pub async fn fetch_brands(&self) -> Result<Vec<NbBrand>, SupplierError> {
        self.get_json("brands", "nb brands").await
    }

    /// # Errors
    ///
    /// Propagates transport, status and deserialization errors after retries.
    pub async fn fetch_categories(&self) -> Result<Vec<NbCategory>, SupplierError> {
        self.get_json("categories", "nb categories").await
    }

    /// Fetches the detail record for one product. Returns `Ok(None)` when NB
    /// answers 404.
    ///
    /// # Errors
    ///
    /// Propagates every other transport, status and deserialization error.
    pub async fn fetch_item(&self, external_id: i64) -> Result<Option<NbItemDetail>, SupplierError> {
        match self
            .get_json::<NbItemDetail>(&format!("item/{external_id}"), "nb item detail")
            .await
        {
            Ok(item) => Ok(Some(item)),
            Err(SupplierError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns a token, logging in when none is cached or the cached one has
    /// been used `refresh_every` times.
    async fn bearer_token(&self) -> Result<String, SupplierError> {
        let mut state = self.token.lock().await;
        let needs_login = state.token.is_none() || state.uses >= self.refresh_every;
        if needs_login {
            let fresh = self.login().await?;
            state.token = Some(fresh);
            state.uses = 0;
        }
        state.uses += 1;
        state.token.clone().ok_or_else(|| SupplierError::Auth {
            supplier: SUPPLIER.to_owned(),
            reason: "token unavailable after login".to_owned(),
        })
    }

    async fn invalidate_token(&self) {
        let mut state = self.token.lock().await;
        state.token = None;
        state.uses = 0;
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        context: &str,
    ) -> Result<T, SupplierError> {
        let url = format!("{}/{path}", self.base_url);

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let token = self.bearer_token().await?;
                match self.send_authorized(&url, &token).await {
                    Err(SupplierError::Unauthorized { .. }) => {
                        tracing::warn!(url = %url, "nb token rejected, logging in again");
                        self.invalidate_token().await;
                        let token = self.bearer_token().await?;
                        self.send_authorized(&url, &token).await
                    }
                    other => other,
                }
            }
        })
        .await?;

        parse_json(&body, || format!("{context} from {url}"))
    }

    async fn send_authorized(&self, url: &str, token: &str) -> Result<String, SupplierError> {
        let response = self.client.get(url).bearer_auth(token).send().await?;
        read_body(response, SUPPLIER, url).await
    }
}
