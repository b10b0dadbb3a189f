//! Catalog persistence.
//!
//! Products are stored as a JSONL file where each line is one committed
//! record. Reads are tolerant: unparseable lines are skipped.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::paths;
use crate::product::Product;

/// Append-only JSONL product store.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    /// Opens the store at the default catalog path.
    pub fn open_default() -> Self {
        Self::open(paths::catalog_path())
    }

    /// Opens the store at a specific path.
    pub fn open(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the path to the catalog file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Appends a committed product to the catalog.
    pub fn insert(&self, product: &Product) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).context("Failed to create catalog directory")?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open catalog file")?;

        let json = serde_json::to_string(product).context("Failed to serialize product")?;
        writeln!(file, "{json}").context("Failed to write to catalog file")?;

        Ok(())
    }

    /// Reads every committed product, in insertion order.
    pub fn list_all(&self) -> Result<Vec<Product>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path).context("Failed to open catalog file")?;
        let reader = BufReader::new(file);
        let mut products = Vec::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line")?;
            if line.trim().is_empty() {
                continue;
            }

            if let Ok(product) = serde_json::from_str::<Product>(&line) {
                products.push(product);
            }
            // Skip unparseable lines (best-effort)
        }

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::CatalogStore;
    use crate::product::{ProductCategory, ProductDraft};

    fn sample(name: &str) -> crate::product::Product {
        ProductDraft {
            category: Some(ProductCategory::Boots),
            name: Some(name.to_string()),
            size: Some(Decimal::new(425, 1)),
            description: Some("Barely worn, heat-molded liners".to_string()),
            price: Some(Decimal::from(2200)),
        }
        .finish(vec!["https://img/boots.jpg".to_string()])
        .unwrap()
    }

    #[test]
    fn list_all_on_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(dir.path().join("catalog").join("products.jsonl"));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn insert_then_list_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(dir.path().join("catalog").join("products.jsonl"));

        store.insert(&sample("Salomon S/Pro 120")).unwrap();
        store.insert(&sample("Nordica Speedmachine")).unwrap();

        let products = store.list_all().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Salomon S/Pro 120");
        assert_eq!(products[1].name, "Nordica Speedmachine");
    }

    #[test]
    fn unparseable_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.jsonl");
        let store = CatalogStore::open(path.clone());

        store.insert(&sample("Salomon S/Pro 120")).unwrap();
        std::fs::write(
            &path,
            format!("{}\nnot json\n", std::fs::read_to_string(&path).unwrap().trim()),
        )
        .unwrap();

        assert_eq!(store.list_all().unwrap().len(), 1);
    }
}
