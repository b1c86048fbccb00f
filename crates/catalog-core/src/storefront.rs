use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartRules;
use crate::pricing::{default_markup_tiers, MarkupTier};
use crate::ConfigError;

/// Merchandising knobs for the storefront, loaded from `config/storefront.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontSettings {
    /// Category names hidden from the main product listing.
    #[serde(default = "default_listing_exclusions")]
    pub excluded_categories: Vec<String>,
    /// Category names hidden from category pages and the category list.
    #[serde(default = "default_category_exclusions")]
    pub category_excluded: Vec<String>,
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Decimal,
    #[serde(default = "default_payment_discounts")]
    pub payment_discounts: BTreeMap<String, Decimal>,
    #[serde(default = "default_markup_tiers")]
    pub markup_tiers: Vec<MarkupTier>,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            excluded_categories: default_listing_exclusions(),
            category_excluded: default_category_exclusions(),
            free_shipping_threshold: default_free_shipping_threshold(),
            payment_discounts: default_payment_discounts(),
            markup_tiers: default_markup_tiers(),
        }
    }
}

impl StorefrontSettings {
    #[must_use]
    pub fn cart_rules(&self) -> CartRules {
        CartRules {
            free_shipping_threshold: self.free_shipping_threshold,
            payment_discounts: self.payment_discounts.clone(),
        }
    }
}

fn default_listing_exclusions() -> Vec<String> {
    vec!["outlet".to_string(), "hogar".to_string()]
}

fn default_category_exclusions() -> Vec<String> {
    vec![
        "hogar".to_string(),
        "outlet".to_string(),
        "CONTADORAS Y CLASIFICADORAS DE BILLETES".to_string(),
    ]
}

fn default_free_shipping_threshold() -> Decimal {
    Decimal::from(60_000)
}

fn default_payment_discounts() -> BTreeMap<String, Decimal> {
    CartRules::default().payment_discounts
}

/// Load and validate storefront settings from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_storefront_settings(path: &Path) -> Result<StorefrontSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SettingsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let settings: StorefrontSettings = serde_yaml::from_str(&content)?;
    validate_storefront_settings(&settings)?;

    Ok(settings)
}

/// Validate semantic constraints that serde cannot express.
///
/// # Errors
///
/// Returns `ConfigError::Validation` describing the first violated constraint.
pub fn validate_storefront_settings(settings: &StorefrontSettings) -> Result<(), ConfigError> {
    if settings.free_shipping_threshold < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "free_shipping_threshold must not be negative".to_string(),
        ));
    }

    for (method, pct) in &settings.payment_discounts {
        if *pct < Decimal::ZERO || *pct > Decimal::ONE_HUNDRED {
            return Err(ConfigError::Validation(format!(
                "payment discount for '{method}' must be between 0 and 100, got {pct}"
            )));
        }
    }

    for (idx, tier) in settings.markup_tiers.iter().enumerate() {
        if tier.multiplier <= Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "markup tier {idx} has a non-positive multiplier"
            )));
        }
        if tier.max.is_some_and(|max| max < tier.min) {
            return Err(ConfigError::Validation(format!(
                "markup tier {idx} has max below min"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings: StorefrontSettings = serde_yaml::from_str("{}").expect("parse");
        assert_eq!(settings, StorefrontSettings::default());
        assert_eq!(settings.excluded_categories, vec!["outlet", "hogar"]);
        assert_eq!(settings.category_excluded.len(), 3);
        assert_eq!(settings.free_shipping_threshold, Decimal::from(60_000));
    }

    #[test]
    fn yaml_overrides_are_applied() {
        let yaml = r#"
excluded_categories: ["outlet"]
free_shipping_threshold: "80000"
payment_discounts:
  efectivo: "15"
"#;
        let settings: StorefrontSettings = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(settings.excluded_categories, vec!["outlet"]);
        assert_eq!(settings.free_shipping_threshold, Decimal::from(80_000));
        assert_eq!(
            settings.cart_rules().payment_discounts.get("efectivo"),
            Some(&Decimal::from(15))
        );
        assert!(validate_storefront_settings(&settings).is_ok());
    }

    #[test]
    fn validation_rejects_discount_above_hundred() {
        let mut settings = StorefrontSettings::default();
        settings
            .payment_discounts
            .insert("efectivo".to_string(), Decimal::from(120));
        assert!(matches!(
            validate_storefront_settings(&settings),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validation_rejects_zero_multiplier() {
        let mut settings = StorefrontSettings::default();
        settings.markup_tiers[0].multiplier = Decimal::ZERO;
        assert!(validate_storefront_settings(&settings).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_storefront_settings(Path::new("/nonexistent/storefront.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::SettingsFileIo { .. }));
    }

    #[test]
    fn bundled_settings_file_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/storefront.yaml");
        let settings = load_storefront_settings(&path).expect("bundled settings load");
        assert_eq!(settings.markup_tiers.len(), 3);
    }
}
