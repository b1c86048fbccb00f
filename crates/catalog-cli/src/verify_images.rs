//! Image URL verification for stored product images.

use catalog_core::Supplier;
use catalog_sync::clients;

/// HEAD-check every stored `main_image` and log the ones that fail.
pub(crate) async fn run_verify_images(
    pool: &sqlx::PgPool,
    config: &catalog_core::AppConfig,
    supplier: Option<&str>,
    concurrency: usize,
) -> anyhow::Result<()> {
    let supplier = supplier.map(str::parse::<Supplier>).transpose()?;
    let client = clients::http_client(config)?;

    let report = catalog_sync::verify_images(pool, &client, supplier, concurrency).await?;

    for bad in &report.bad {
        println!(
            "{} {}\t{}\t{}",
            bad.supplier, bad.external_id, bad.reason, bad.url
        );
    }
    println!(
        "verified image URLs: {} OK, {} bad",
        report.ok,
        report.bad.len()
    );
    Ok(())
}
