//! The `refresh` subcommand: snapshot in, crawl, snapshot out.

use std::sync::Arc;

use pricewatch_core::AppConfig;
use pricewatch_engine::{
    CatalogStore, CategoryLocks, Crawler, EngineError, MemoryCatalog, Orchestrator,
    ProductFilter, RefreshOptions, RefreshSummary,
};
use pricewatch_scraper::Dispatcher;

use crate::catalog;

pub async fn run(config: &AppConfig, filter: ProductFilter) -> anyhow::Result<()> {
    let products = catalog::load(&config.catalog_path)?;
    tracing::info!(
        count = products.len(),
        path = %config.catalog_path.display(),
        "catalog snapshot loaded"
    );

    let store = Arc::new(MemoryCatalog::new(products));
    let dispatcher = Arc::new(Dispatcher::new(config)?);
    let orchestrator = Orchestrator::new(
        Arc::clone(&dispatcher) as Arc<dyn Crawler>,
        Arc::clone(&store) as Arc<dyn CatalogStore>,
        CategoryLocks::new(),
    );

    let options = RefreshOptions::from_config(config);
    let outcome = orchestrator.refresh(&filter, &options).await;

    // The pool owns a browser process; tear it down before exiting on
    // every path.
    dispatcher.shutdown().await;

    let summary = match outcome {
        Ok(summary) => summary,
        Err(EngineError::CategoryBusy(category)) => {
            eprintln!("refresh already running for category \"{category}\"");
            std::process::exit(2);
        }
        Err(err) => return Err(err.into()),
    };

    catalog::save(&config.catalog_path, &store.snapshot())?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RefreshSummary) {
    println!(
        "refreshed {} of {} products ({} skipped)",
        summary.refreshed, summary.total, summary.skipped
    );

    for product in &summary.products {
        let price = product
            .aggregate
            .lowest_price
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        println!(
            "  {}  lowest: {}  status: {}",
            product.name, price, product.aggregate.crawl_status
        );
    }

    if !summary.errors.is_empty() {
        eprintln!("{} crawl error(s):", summary.errors.len());
        for error in &summary.errors {
            eprintln!("  {error}");
        }
    }
}
