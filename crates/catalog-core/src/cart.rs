//! Shopper cart state with checkout summaries.
//!
//! The store is a flat list of lines keyed by product id. Every mutation
//! except [`CartStore::clear`] re-evaluates free shipping against the
//! configured threshold.
//!
//! The persisted shape is the storefront's: camelCase fields inside a
//! `{"state": .., "version": 0}` envelope, optionally keyed by
//! [`STORAGE_KEY`] as in a browser storage export.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Key the cart is persisted under.
pub const STORAGE_KEY: &str = "shopping-cart-candy";

/// Version written in the persisted envelope.
pub const STORAGE_VERSION: u32 = 0;

/// Shipping weight assigned to every unit in the cart.
pub const UNIT_WEIGHT: i64 = 21;

/// Largest quantity a single line may carry.
pub const MAX_LINE_QUANTITY: i64 = 10_000;

/// Upper bound for unit prices and shipping costs.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: i64,
    pub quantity: i64,
    pub price: Decimal,
    #[serde(rename = "stockMaximo", alias = "stock_max")]
    pub stock_max: i64,
    pub title: String,
}

impl CartLine {
    /// Checks that the line can be summed without leaving sane bounds.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCart`] when the quantity is outside
    /// `1..=MAX_LINE_QUANTITY` or the price is negative or above [`MAX_AMOUNT`].
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=MAX_LINE_QUANTITY).contains(&self.quantity) {
            return Err(CoreError::InvalidCart(format!(
                "quantity for item {} must be between 1 and {MAX_LINE_QUANTITY}, got {}",
                self.id, self.quantity
            )));
        }
        validate_amount(&format!("price for item {}", self.id), self.price)
    }
}

/// Checks a price or shipping cost against `0..=MAX_AMOUNT`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidCart`] when `amount` is out of range.
pub fn validate_amount(label: &str, amount: Decimal) -> Result<(), CoreError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CoreError::InvalidCart(format!(
            "{label} must not be negative, got {amount}"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(CoreError::InvalidCart(format!(
            "{label} must be at most {MAX_AMOUNT}, got {amount}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Efectivo,
    Transferencia,
    Otro,
}

impl FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "efectivo" => Ok(Self::Efectivo),
            "transferencia" => Ok(Self::Transferencia),
            "otro" => Ok(Self::Otro),
            other => Err(CoreError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Thresholds and discounts the summary is computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRules {
    pub free_shipping_threshold: Decimal,
    /// Discount percentage per payment method. Methods not listed get none.
    pub payment_discounts: BTreeMap<String, Decimal>,
}

impl Default for CartRules {
    fn default() -> Self {
        let mut payment_discounts = BTreeMap::new();
        payment_discounts.insert("efectivo".to_string(), Decimal::from(10));
        payment_discounts.insert("transferencia".to_string(), Decimal::from(5));
        Self {
            free_shipping_threshold: Decimal::from(60_000),
            payment_discounts,
        }
    }
}

impl CartRules {
    fn discount_pct(&self, payment: Option<PaymentMethod>) -> Decimal {
        let key = match payment {
            Some(PaymentMethod::Efectivo) => "efectivo",
            Some(PaymentMethod::Transferencia) => "transferencia",
            Some(PaymentMethod::Otro) | None => return Decimal::ZERO,
        };
        self.payment_discounts
            .get(key)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSummary {
    pub sub_total: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub items_in_cart: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartStore {
    #[serde(rename = "cart")]
    lines: Vec<CartLine>,
    selected_shipping: Decimal,
    postal_code_destination: String,
    free_shipping: bool,
    #[serde(skip)]
    rules: CartRules,
}

#[derive(Serialize, Deserialize)]
struct CartEnvelope {
    state: CartStore,
    #[serde(default)]
    version: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PersistedCart {
    Keyed {
        #[serde(rename = "shopping-cart-candy")]
        envelope: CartEnvelope,
    },
    Bare(CartEnvelope),
}

impl PersistedCart {
    fn into_store(self) -> CartStore {
        match self {
            Self::Keyed { envelope } | Self::Bare(envelope) => envelope.state,
        }
    }
}

impl CartStore {
    #[must_use]
    pub fn new(rules: CartRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Build a store from existing lines, as when quoting a cart sent by a client.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>, selected_shipping: Decimal, rules: CartRules) -> Self {
        let mut store = Self {
            lines,
            selected_shipping,
            rules,
            ..Self::default()
        };
        store.check_free_shipping();
        store
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.free_shipping
    }

    #[must_use]
    pub fn selected_shipping(&self) -> Decimal {
        self.selected_shipping
    }

    #[must_use]
    pub fn postal_code_destination(&self) -> &str {
        &self.postal_code_destination
    }

    /// Add a line. An existing line with the same id takes the new quantity.
    pub fn add(&mut self, line: CartLine) {
        match self.lines.iter_mut().find(|l| l.id == line.id) {
            Some(existing) => existing.quantity = line.quantity,
            None => self.lines.push(line),
        }
        self.check_free_shipping();
    }

    pub fn update_quantity(&mut self, id: i64, quantity: i64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            line.quantity = quantity;
        }
        self.check_free_shipping();
    }

    pub fn remove(&mut self, id: i64) {
        self.lines.retain(|l| l.id != id);
        self.check_free_shipping();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.free_shipping = false;
    }

    pub fn set_selected_shipping(&mut self, cost: Decimal) {
        self.selected_shipping = cost;
        self.check_free_shipping();
    }

    pub fn set_postal_code(&mut self, postal_code: impl Into<String>) {
        self.postal_code_destination = postal_code.into();
    }

    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.lines
            .iter()
            .fold(0_i64, |acc, l| acc.saturating_add(l.quantity))
    }

    #[must_use]
    pub fn total_weight(&self) -> i64 {
        self.lines.iter().fold(0_i64, |acc, l| {
            acc.saturating_add(UNIT_WEIGHT.saturating_mul(l.quantity))
        })
    }

    /// Saturates instead of overflowing; validated lines never get close.
    fn sub_total(&self) -> Decimal {
        self.lines.iter().fold(Decimal::ZERO, |acc, l| {
            acc.saturating_add(l.price.saturating_mul(Decimal::from(l.quantity)))
        })
    }

    /// Checks every line and the selected shipping cost.
    ///
    /// # Errors
    ///
    /// Returns the first [`CoreError::InvalidCart`] found.
    pub fn validate(&self) -> Result<(), CoreError> {
        for line in &self.lines {
            line.validate()?;
        }
        validate_amount("selected shipping", self.selected_shipping)
    }

    #[must_use]
    pub fn summary(&self, payment: Option<PaymentMethod>) -> CartSummary {
        let sub_total = self.sub_total();
        let discount = sub_total
            .saturating_mul(self.rules.discount_pct(payment))
            / Decimal::ONE_HUNDRED;
        let shipping = if self.free_shipping {
            Decimal::ZERO
        } else {
            self.selected_shipping
        };
        CartSummary {
            sub_total,
            discount,
            shipping,
            total: sub_total.saturating_sub(discount).saturating_add(shipping),
            items_in_cart: self.total_items(),
        }
    }

    fn check_free_shipping(&mut self) {
        self.free_shipping = self.sub_total() >= self.rules.free_shipping_threshold;
    }

    /// Persist the cart as JSON under [`STORAGE_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CartFile`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let doc = PersistedCart::Keyed {
            envelope: CartEnvelope {
                state: self.clone(),
                version: STORAGE_VERSION,
            },
        };
        let body = serde_json::to_string_pretty(&doc).map_err(|e| cart_file_error(path, &e))?;
        std::fs::write(path, body).map_err(|e| cart_file_error(path, &e))
    }

    /// Load a cart saved by [`CartStore::save`] or exported from the
    /// storefront, with or without the [`STORAGE_KEY`] wrapper. A missing
    /// file yields an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CartFile`] if the file exists but cannot be read
    /// or parsed.
    pub fn load(path: &Path, rules: CartRules) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::new(rules));
        }
        let raw = std::fs::read_to_string(path).map_err(|e| cart_file_error(path, &e))?;
        let doc: PersistedCart =
            serde_json::from_str(&raw).map_err(|e| cart_file_error(path, &e))?;
        let mut store = doc.into_store();
        store.rules = rules;
        store.check_free_shipping();
        Ok(store)
    }
}

fn cart_file_error(path: &Path, err: &dyn std::fmt::Display) -> CoreError {
    CoreError::CartFile {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
