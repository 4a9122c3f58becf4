//! Catalog Aggregates
//!
//! Categories and products exactly as the backend hands them out. Both are
//! immutable once fetched; identity is the backend id.

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::value_objects::{Money, ProductId};

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Filter value the UI uses for "every category".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub category_id: String,
    pub category: Category,
    #[serde(default)]
    pub image_url: String,
}

impl Product {
    pub fn image_or_placeholder(&self) -> &str {
        if self.image_url.trim().is_empty() { PLACEHOLDER_IMAGE } else { &self.image_url }
    }
}

/// Product read filter; also the catalog cache key.
///
/// Absent fields mean "no restriction". Use [`ProductFilter::new`] so the
/// "all" category and blank search text collapse to the same key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn new(category_id: Option<&str>, search: Option<&str>) -> Self {
        let category_id = category_id
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);
        let search = search.filter(|s| !s.trim().is_empty()).map(str::to_string);
        Self { category_id, search }
    }

    pub fn all() -> Self { Self::default() }

    pub fn normalized(&self) -> Self { Self::new(self.category_id.as_deref(), self.search.as_deref()) }

    pub fn is_unrestricted(&self) -> bool { self.category_id.is_none() && self.search.is_none() }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Payload for the product write collaborator.
#[derive(Clone, Debug, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "product name is required"))]
    pub name: String,
    pub price: Money,
    #[validate(length(min = 1, message = "category is required"))]
    pub category_id: String,
    pub image: Option<ProductImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalizes_all_and_blank() {
        assert_eq!(ProductFilter::new(Some("all"), Some("   ")), ProductFilter::all());
        assert_eq!(ProductFilter::new(Some(""), None), ProductFilter::all());
        let f = ProductFilter::new(Some("c1"), Some("tea"));
        assert_eq!(f.category_id.as_deref(), Some("c1"));
        assert_eq!(f.search.as_deref(), Some("tea"));
        assert!(!f.is_unrestricted());
    }

    #[test]
    fn test_filter_query_names() {
        let f = ProductFilter::new(Some("c1"), None);
        assert_eq!(serde_json::to_value(&f).unwrap(), serde_json::json!({ "categoryId": "c1" }));
    }

    #[test]
    fn test_product_from_backend_json() {
        let p: Product = serde_json::from_value(serde_json::json!({
            "id": "p1", "name": "Coffee", "price": 25000, "category_id": "c1",
            "category": { "id": "c1", "name": "Drinks" }, "image_url": ""
        })).unwrap();
        assert_eq!(p.id.as_str(), "p1");
        assert_eq!(p.price, Money::from_minor(25000));
        assert_eq!(p.image_or_placeholder(), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_new_product_validation() {
        let p = NewProduct { name: String::new(), price: Money::ZERO, category_id: "c1".into(), image: None };
        assert!(p.validate().is_err());
        let p = NewProduct { name: "Tea".into(), ..p };
        assert!(p.validate().is_ok());
    }
}
