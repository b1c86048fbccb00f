use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Credentials for the NB supplier API.
#[derive(Clone)]
pub struct NbCredentials {
    pub user: String,
    pub password: String,
}

/// Credentials for the Elit supplier API.
#[derive(Clone)]
pub struct ElitCredentials {
    pub user_id: String,
    pub token: String,
}

/// Endpoint that accepts image uploads and answers with the hosted URL.
#[derive(Clone)]
pub struct ImageUploadConfig {
    pub url: String,
    pub token: Option<String>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub storefront_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub nb_api_base_url: String,
    pub nb_credentials: Option<NbCredentials>,
    pub elit_api_base_url: String,
    pub elit_site_base_url: String,
    pub elit_credentials: Option<ElitCredentials>,
    pub image_upload: Option<ImageUploadConfig>,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub http_max_retries: u32,
    pub http_backoff_base_ms: u64,
    pub sync_chunk_size: usize,
    pub sync_inter_page_delay_ms: u64,
    pub nb_token_refresh_every: u32,
    pub image_check_concurrency: usize,
    pub price_refresh_cron: String,
    pub catalog_sync_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("storefront_path", &self.storefront_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("nb_api_base_url", &self.nb_api_base_url)
            .field(
                "nb_credentials",
                &self.nb_credentials.as_ref().map(|c| (&c.user, "[redacted]")),
            )
            .field("elit_api_base_url", &self.elit_api_base_url)
            .field("elit_site_base_url", &self.elit_site_base_url)
            .field(
                "elit_credentials",
                &self
                    .elit_credentials
                    .as_ref()
                    .map(|c| (&c.user_id, "[redacted]")),
            )
            .field(
                "image_upload",
                &self
                    .image_upload
                    .as_ref()
                    .map(|u| (&u.url, u.token.as_ref().map(|_| "[redacted]"))),
            )
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("http_max_retries", &self.http_max_retries)
            .field("http_backoff_base_ms", &self.http_backoff_base_ms)
            .field("sync_chunk_size", &self.sync_chunk_size)
            .field("sync_inter_page_delay_ms", &self.sync_inter_page_delay_ms)
            .field("nb_token_refresh_every", &self.nb_token_refresh_every)
            .field("image_check_concurrency", &self.image_check_concurrency)
            .field("price_refresh_cron", &self.price_refresh_cron)
            .field("catalog_sync_cron", &self.catalog_sync_cron)
            .finish()
    }
}
