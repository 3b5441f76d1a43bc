//! JSON catalog snapshot read/write.
//!
//! The CLI works against a local snapshot file standing in for the
//! external catalog store; the engine itself only sees the
//! `CatalogStore` trait.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use pricewatch_core::TrackedProduct;

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    products: Vec<TrackedProduct>,
}

/// Loads the snapshot at `path`.
pub fn load(path: &Path) -> anyhow::Result<Vec<TrackedProduct>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    let file: CatalogFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse catalog {}", path.display()))?;
    Ok(file.products)
}

/// Writes `products` back to `path`, pretty-printed so snapshots stay
/// hand-editable.
pub fn save(path: &Path, products: &[TrackedProduct]) -> anyhow::Result<()> {
    let file = CatalogFile {
        products: products.to_vec(),
    };
    let raw = serde_json::to_string_pretty(&file).context("failed to serialize catalog")?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write catalog {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pricewatch_core::ProductUrlEntry;
    use uuid::Uuid;

    fn temp_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pricewatch-catalog-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn snapshot_round_trips() {
        let path = temp_path();
        let products = vec![TrackedProduct {
            id: Uuid::new_v4(),
            name: "گوشی موبایل سامسونگ".to_string(),
            category: Some("phones".to_string()),
            brand: Some("samsung".to_string()),
            disabled: false,
            updated_at: Utc::now(),
            urls: vec![ProductUrlEntry::with_site(
                "https://www.digikala.com/product/dkp-1",
                "digikala",
            )],
        }];

        save(&path, &products).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, products[0].name);
        assert_eq!(loaded[0].urls[0].site.as_deref(), Some("digikala"));
    }

    #[test]
    fn missing_file_is_a_readable_error() {
        let err = load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read catalog"));
    }
}
