use crate::app_config::{
    AppConfig, ElitCredentials, Environment, ImageUploadConfig, NbCredentials,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Kept separate from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CATALOG_ENV", "development"))?;

    let bind_addr = or_default("CATALOG_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("CATALOG_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("CATALOG_LOG_LEVEL", "info");
    let storefront_path = PathBuf::from(or_default(
        "CATALOG_STOREFRONT_PATH",
        "./config/storefront.yaml",
    ));

    let db_max_connections = parse_u32("CATALOG_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CATALOG_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CATALOG_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let nb_api_base_url = trim_base_url(&or_default("NB_API_BASE_URL", "https://api.nb.com.ar/v1"));
    let nb_credentials = match (optional("NB_USER"), optional("NB_PASSWORD")) {
        (Some(user), Some(password)) => Some(NbCredentials { user, password }),
        (None, None) => None,
        _ => {
            return Err(ConfigError::Validation(
                "NB_USER and NB_PASSWORD must be set together".to_string(),
            ))
        }
    };

    let elit_api_base_url = trim_base_url(&or_default(
        "ELIT_API_BASE_URL",
        "https://clientes.elit.com.ar/v1/api",
    ));
    let elit_site_base_url =
        trim_base_url(&or_default("ELIT_SITE_BASE_URL", "https://www.elit.com.ar"));
    let elit_credentials = match (optional("ELIT_USER_ID"), optional("ELIT_TOKEN")) {
        (Some(user_id), Some(token)) => Some(ElitCredentials { user_id, token }),
        (None, None) => None,
        _ => {
            return Err(ConfigError::Validation(
                "ELIT_USER_ID and ELIT_TOKEN must be set together".to_string(),
            ))
        }
    };

    let image_upload = optional("CATALOG_IMAGE_UPLOAD_URL").map(|url| ImageUploadConfig {
        url,
        token: optional("CATALOG_IMAGE_UPLOAD_TOKEN"),
    });

    let http_timeout_secs = parse_u64("CATALOG_HTTP_TIMEOUT_SECS", "30")?;
    let http_user_agent = or_default("CATALOG_HTTP_USER_AGENT", "catalog-sync/0.1");
    let http_max_retries = parse_u32("CATALOG_HTTP_MAX_RETRIES", "3")?;
    let http_backoff_base_ms = parse_u64("CATALOG_HTTP_BACKOFF_BASE_MS", "500")?;

    let sync_chunk_size = parse_usize("CATALOG_SYNC_CHUNK_SIZE", "25")?;
    if sync_chunk_size == 0 {
        return Err(invalid("CATALOG_SYNC_CHUNK_SIZE", "must be at least 1".to_string()));
    }
    let sync_inter_page_delay_ms = parse_u64("CATALOG_SYNC_INTER_PAGE_DELAY_MS", "2000")?;
    let nb_token_refresh_every = parse_u32("CATALOG_NB_TOKEN_REFRESH_EVERY", "25")?;
    if nb_token_refresh_every == 0 {
        return Err(invalid(
            "CATALOG_NB_TOKEN_REFRESH_EVERY",
            "must be at least 1".to_string(),
        ));
    }
    let image_check_concurrency = parse_usize("CATALOG_IMAGE_CHECK_CONCURRENCY", "12")?;

    let price_refresh_cron = or_default("CATALOG_PRICE_REFRESH_CRON", "0 0 */6 * * *");
    let catalog_sync_cron = or_default("CATALOG_CATALOG_SYNC_CRON", "0 30 3 * * *");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        storefront_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        nb_api_base_url,
        nb_credentials,
        elit_api_base_url,
        elit_site_base_url,
        elit_credentials,
        image_upload,
        http_timeout_secs,
        http_user_agent,
        http_max_retries,
        http_backoff_base_ms,
        sync_chunk_size,
        sync_inter_page_delay_ms,
        nb_token_refresh_every,
        image_check_concurrency,
        price_refresh_cron,
        catalog_sync_cron,
    })
}

fn trim_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CATALOG_ENV".to_string(),
            reason: format!("expected development, test or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
