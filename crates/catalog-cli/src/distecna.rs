//! Offline parsing of saved Distecna listing pages into JSON.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;

use catalog_suppliers::{parse_listing, total_pages, DistecnaProduct};

/// Sub-commands available under `distecna`.
#[derive(Debug, Subcommand)]
pub enum DistecnaCommands {
    /// Extract product cards from listing pages saved as HTML
    Parse {
        /// Listing pages, in page order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// JSON file to write
        #[arg(long, default_value = "productos-distecna.json")]
        output: PathBuf,
    },
}

pub(crate) fn run_distecna(command: DistecnaCommands) -> anyhow::Result<()> {
    let DistecnaCommands::Parse { files, output } = command;

    let mut pages = Vec::with_capacity(files.len());
    for file in &files {
        let html = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        pages.push(html);
    }

    if let Some(announced) = missing_pages(&pages) {
        tracing::warn!(
            announced,
            given = pages.len(),
            "listing pager announces more pages than were given; output is partial"
        );
    }

    let products = collect_products(&pages);
    let body = serde_json::to_string_pretty(&products)?;
    std::fs::write(&output, body)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "parsed {} products from {} pages into {}",
        products.len(),
        files.len(),
        output.display()
    );
    Ok(())
}

/// Page count announced by the largest pager among `pages`, when it exceeds
/// the number of pages given.
fn missing_pages(pages: &[String]) -> Option<u32> {
    let announced = pages.iter().map(|html| total_pages(html)).max()?;
    let given = u32::try_from(pages.len()).unwrap_or(u32::MAX);
    (announced > given).then_some(announced)
}

/// Products from every page, first occurrence of each code wins.
fn collect_products(pages: &[String]) -> Vec<DistecnaProduct> {
    let mut seen = HashSet::new();
    pages
        .iter()
        .flat_map(|html| parse_listing(html))
        .filter(|product| seen.insert(product.codigo.clone()))
        .collect()
}
