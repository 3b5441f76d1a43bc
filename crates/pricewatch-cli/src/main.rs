use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pricewatch_engine::ProductFilter;
use pricewatch_scraper::SiteId;

mod catalog;
mod refresh;

#[derive(Debug, Parser)]
#[command(name = "pricewatch")]
#[command(about = "Multi-site retail price tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl current prices for the selected products and update the
    /// catalog snapshot.
    Refresh {
        /// Refresh only this category (holds the category lock).
        #[arg(long)]
        category: Option<String>,
        /// Refresh only this brand.
        #[arg(long)]
        brand: Option<String>,
        /// Refresh a single product by id.
        #[arg(long)]
        product: Option<Uuid>,
        /// Cap the number of products processed.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List registered site extractors.
    Sites,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pricewatch_core::load_app_config_from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Refresh {
            category,
            brand,
            product,
            limit,
        } => {
            let filter = ProductFilter {
                category,
                brand,
                product_id: product,
                limit,
            };
            refresh::run(&config, filter).await
        }
        Commands::Sites => {
            for site in SiteId::ALL {
                let strategy = if site.is_rendered() { "rendered" } else { "static" };
                println!("{site:<12} {strategy}");
            }
            Ok(())
        }
    }
}
