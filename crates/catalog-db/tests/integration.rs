//! Offline tests for catalog-db pool configuration and row types.
//! These tests do not require a live database connection.

use catalog_core::{AppConfig, Environment};
use catalog_db::{ClearedCounts, PoolConfig, ProductSheetRow, SyncRunRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        storefront_path: PathBuf::from("./config/storefront.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        nb_api_base_url: "https://api.nb.com.ar/v1".to_string(),
        nb_credentials: None,
        elit_api_base_url: "https://clientes.elit.com.ar/v1/api".to_string(),
        elit_site_base_url: "https://www.elit.com.ar".to_string(),
        elit_credentials: None,
        image_upload: None,
        http_timeout_secs: 30,
        http_user_agent: "ua".to_string(),
        http_max_retries: 3,
        http_backoff_base_ms: 500,
        sync_chunk_size: 25,
        sync_inter_page_delay_ms: 2000,
        nb_token_refresh_every: 25,
        image_check_concurrency: 12,
        price_refresh_cron: "0 0 */6 * * *".to_string(),
        catalog_sync_cron: "0 30 3 * * *".to_string(),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn sync_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = SyncRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        run_type: "nb_products".to_string(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        records_processed: 0_i32,
        records_failed: 0_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.run_type, "nb_products");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert_eq!(row.records_failed, 0);
}

#[test]
fn sheet_row_reports_images_from_either_gallery() {
    use chrono::Utc;

    let mut row = ProductSheetRow {
        id: 1,
        product_id: 10,
        description: None,
        original_images: serde_json::json!([]),
        image_urls_hd: vec![],
        image_urls_thumb: vec![],
        attributes: serde_json::json!({}),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    assert!(!row.has_images());

    row.image_urls_thumb = vec!["https://cdn.example.com/t.jpg".to_string()];
    assert!(row.has_images());
}

#[test]
fn cleared_counts_default_to_zero() {
    assert_eq!(
        ClearedCounts::default(),
        ClearedCounts {
            products: 0,
            categories: 0,
            brands: 0
        }
    );
}
