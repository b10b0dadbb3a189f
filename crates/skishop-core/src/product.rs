//! Product model: categories, the in-progress draft, and committed records.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product category. Sizes are centimeters for skis, EU sizes for boots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Skis,
    Boots,
}

impl ProductCategory {
    /// The fixed keyboard label for this category.
    pub fn label(self) -> &'static str {
        match self {
            ProductCategory::Skis => "⛷ Skis",
            ProductCategory::Boots => "🥾 Boots",
        }
    }

    /// Resolves a keyboard label back to a category.
    pub fn from_label(text: &str) -> Option<Self> {
        match text.trim() {
            "⛷ Skis" => Some(ProductCategory::Skis),
            "🥾 Boots" => Some(ProductCategory::Boots),
            _ => None,
        }
    }
}

/// A committed catalog record. Always carries at least one photo URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub category: ProductCategory,
    pub name: String,
    pub size: Decimal,
    pub description: String,
    pub price: Decimal,
    pub photo_urls: Vec<String>,
    pub added_at: DateTime<Utc>,
}

impl Product {
    /// Markdown caption used for previews and catalog listings.
    pub fn summary(&self) -> String {
        format!(
            "📦 *Category:* {}\n🏷 *Name:* {}\n📏 *Size:* {}\n📄 *Description:* {}\n💰 *Price:* {}\n",
            self.category.label(),
            self.name,
            self.size,
            self.description,
            self.price,
        )
    }
}

/// Partially populated product being built by the conversation flow.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub category: Option<ProductCategory>,
    pub name: Option<String>,
    pub size: Option<Decimal>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

impl ProductDraft {
    /// Markdown caption for the pre-commit preview; mirrors `Product::summary`.
    pub fn summary(&self) -> String {
        let category = self.category.map_or("—", ProductCategory::label);
        let name = self.name.as_deref().unwrap_or("—");
        let size = self.size.map_or_else(|| "—".to_string(), |s| s.to_string());
        let description = self.description.as_deref().unwrap_or("—");
        let price = self
            .price
            .map_or_else(|| "—".to_string(), |p| p.to_string());
        format!(
            "📦 *Category:* {category}\n🏷 *Name:* {name}\n📏 *Size:* {size}\n📄 *Description:* {description}\n💰 *Price:* {price}\n"
        )
    }

    /// Completes the draft into a catalog record with its durable photo URLs.
    ///
    /// # Errors
    /// Returns an error if any field is still unset or no URL survived upload.
    pub fn finish(self, photo_urls: Vec<String>) -> Result<Product> {
        if photo_urls.is_empty() {
            return Err(anyhow!("a product needs at least one photo"));
        }
        Ok(Product {
            id: Uuid::new_v4(),
            category: self.category.ok_or_else(|| anyhow!("category not set"))?,
            name: self.name.ok_or_else(|| anyhow!("name not set"))?,
            size: self.size.ok_or_else(|| anyhow!("size not set"))?,
            description: self
                .description
                .ok_or_else(|| anyhow!("description not set"))?,
            price: self.price.ok_or_else(|| anyhow!("price not set"))?,
            photo_urls,
            added_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{ProductCategory, ProductDraft};

    fn full_draft() -> ProductDraft {
        ProductDraft {
            category: Some(ProductCategory::Skis),
            name: Some("Atomic Redster 170".to_string()),
            size: Some(Decimal::from(170)),
            description: Some("Great condition, used one season".to_string()),
            price: Some(Decimal::from(4500)),
        }
    }

    #[test]
    fn labels_round_trip() {
        for category in [ProductCategory::Skis, ProductCategory::Boots] {
            assert_eq!(ProductCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(ProductCategory::from_label("snowboard"), None);
    }

    #[test]
    fn finish_requires_photos() {
        assert!(full_draft().finish(Vec::new()).is_err());
    }

    #[test]
    fn finish_requires_all_fields() {
        let mut draft = full_draft();
        draft.price = None;
        assert!(draft.finish(vec!["https://img/1.jpg".to_string()]).is_err());
    }

    #[test]
    fn finish_builds_a_committed_product() {
        let product = full_draft()
            .finish(vec!["https://img/1.jpg".to_string()])
            .unwrap();
        assert_eq!(product.category, ProductCategory::Skis);
        assert_eq!(product.photo_urls.len(), 1);

        let summary = product.summary();
        assert!(summary.contains("⛷ Skis"));
        assert!(summary.contains("Atomic Redster 170"));
        assert!(summary.contains("4500"));
    }
}
