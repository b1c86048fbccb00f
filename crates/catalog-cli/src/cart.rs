//! Cart quotes from a saved cart file.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use catalog_core::{CartStore, CartSummary, PaymentMethod, StorefrontSettings};

/// Sub-commands available under `cart`.
#[derive(Debug, Subcommand)]
pub enum CartCommands {
    /// Print the totals of a saved cart
    Quote {
        /// Cart JSON exported from the storefront's `shopping-cart-candy` storage
        #[arg(long)]
        cart: PathBuf,

        /// Payment method: efectivo, transferencia or otro
        #[arg(long)]
        payment: Option<String>,

        /// Storefront settings with the free-shipping threshold and discounts
        #[arg(long, default_value = "config/storefront.yaml")]
        settings: PathBuf,
    },
}

pub(crate) fn run_cart(command: CartCommands) -> anyhow::Result<()> {
    let CartCommands::Quote {
        cart,
        payment,
        settings,
    } = command;

    let payment = payment
        .as_deref()
        .map(str::parse::<PaymentMethod>)
        .transpose()?;
    let settings = load_settings(&settings)?;
    let summary = quote(&cart, &settings, payment)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Settings from `path`, or the built-in defaults when the file is absent.
fn load_settings(path: &Path) -> anyhow::Result<StorefrontSettings> {
    if path.exists() {
        Ok(catalog_core::load_storefront_settings(path)?)
    } else {
        tracing::warn!(path = %path.display(), "storefront settings not found, using defaults");
        Ok(StorefrontSettings::default())
    }
}

fn quote(
    cart: &Path,
    settings: &StorefrontSettings,
    payment: Option<PaymentMethod>,
) -> anyhow::Result<CartSummary> {
    let store = CartStore::load(cart, settings.cart_rules())?;
    store.validate()?;
    Ok(store.summary(payment))
}
