//! Retail price calculation.
//!
//! Supplier feeds publish a USD `final_price` plus the exchange rate
//! (`cotizacion`) they used. The storefront shows
//! `markup(final_price) * cotizacion`, where the markup multiplier depends on
//! which price band the base price falls into.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price band and the multiplier applied to prices inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupTier {
    pub min: Decimal,
    #[serde(default)]
    pub min_inclusive: bool,
    #[serde(default)]
    pub max: Option<Decimal>,
    #[serde(default)]
    pub max_inclusive: bool,
    pub multiplier: Decimal,
}

impl MarkupTier {
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        let above_min = if self.min_inclusive {
            price >= self.min
        } else {
            price > self.min
        };
        let below_max = match self.max {
            None => true,
            Some(max) if self.max_inclusive => price <= max,
            Some(max) => price < max,
        };
        above_min && below_max
    }
}

/// Default bands: `(1, 200)` x1.6, `[201, 999]` x1.3, `(1000, ..)` x1.2.
///
/// Prices outside every band (including `[200, 201)` and `(999, 1000]`)
/// are left unchanged.
#[must_use]
pub fn default_markup_tiers() -> Vec<MarkupTier> {
    vec![
        MarkupTier {
            min: Decimal::ONE,
            min_inclusive: false,
            max: Some(Decimal::from(200)),
            max_inclusive: false,
            multiplier: Decimal::new(16, 1),
        },
        MarkupTier {
            min: Decimal::from(201),
            min_inclusive: true,
            max: Some(Decimal::from(999)),
            max_inclusive: true,
            multiplier: Decimal::new(13, 1),
        },
        MarkupTier {
            min: Decimal::from(1000),
            min_inclusive: false,
            max: None,
            max_inclusive: false,
            multiplier: Decimal::new(12, 1),
        },
    ]
}

/// Apply the first matching tier's multiplier to `base`.
#[must_use]
pub fn markup(base: Decimal, tiers: &[MarkupTier]) -> Decimal {
    tiers
        .iter()
        .find(|tier| tier.contains(base))
        .map_or(base, |tier| base.saturating_mul(tier.multiplier))
}

/// Price shown to shoppers, in local currency when an exchange rate is known.
#[must_use]
pub fn retail_price(
    final_price: Decimal,
    cotizacion: Option<Decimal>,
    tiers: &[MarkupTier],
) -> Decimal {
    let marked_up = markup(final_price, tiers);
    let local = match cotizacion {
        Some(rate) if rate > Decimal::ZERO => marked_up.saturating_mul(rate),
        _ => marked_up,
    };
    round_decimal(local)
}

/// Convert a supplier float to a two-decimal `Decimal`.
///
/// Returns `None` for NaN and infinities.
#[must_use]
pub fn round2(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(round_decimal)
}

/// `price + price*iva/100 + price*internal_tax/100`, rounded to two decimals.
#[must_use]
pub fn price_with_taxes(price: Decimal, iva_pct: Decimal, internal_tax_pct: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    round_decimal(price + price * iva_pct / hundred + price * internal_tax_pct / hundred)
}

fn round_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
