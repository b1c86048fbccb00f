pub mod app_config;
pub mod cart;
pub mod config;
pub mod listing;
pub mod pricing;
pub mod products;
pub mod slug;
pub mod storefront;

use thiserror::Error;

pub use app_config::{AppConfig, ElitCredentials, Environment, ImageUploadConfig, NbCredentials};
pub use cart::{
    validate_amount, CartLine, CartRules, CartStore, CartSummary, PaymentMethod, MAX_AMOUNT,
    MAX_LINE_QUANTITY,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{page_window, total_pages, PageRequest, PageWindow, SortOrder};
pub use pricing::{
    default_markup_tiers, markup, price_with_taxes, retail_price, round2, MarkupTier,
};
pub use products::{Dimensions, NormalizedProduct, NormalizedSheet, OriginalImage, Supplier};
pub use slug::{id_from_legacy_slug, image_slug, legacy_product_slug, product_slug, slugify};
pub use storefront::{load_storefront_settings, validate_storefront_settings, StorefrontSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("configuration validation failed: {0}")]
    Validation(String),

    #[error("failed to read storefront settings from {path}: {source}")]
    SettingsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse storefront settings: {0}")]
    SettingsFileParse(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown supplier: {0}")]
    UnknownSupplier(String),

    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("cart file {path}: {reason}")]
    CartFile { path: String, reason: String },

    #[error("invalid cart: {0}")]
    InvalidCart(String),
}
