//! Data models for crawled catalog entities.
//!
//! This module defines the two record types the crawler produces:
//! - [`Category`]: one entry from the catalog's category filter menu
//! - [`Design`]: the flat field record extracted from one item detail page
//!
//! Both serialize with camelCase field names to stay byte-compatible with the
//! JSON artifacts earlier versions of this tool produced (`categories.json`,
//! `designs.json`, and the per-page design shards), hence the
//! `#[serde(rename_all = "camelCase")]` attributes.

use serde::{Deserialize, Serialize};

/// One category discovered in the catalog's category filter menu.
///
/// Categories are created once during the root visit and never mutated.
/// Identity is the `url`; menu entries are assumed unique so no
/// deduplication is performed.
///
/// The `children` field is always empty today: the catalog exposes a flat
/// menu, but the artifact schema reserves room for a nested taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The category's listing path, relative to the site root.
    pub url: String,
    /// Human-readable category name as shown in the menu.
    pub name: String,
    /// Nested sub-categories. Always empty in the current catalog.
    pub children: Vec<Category>,
}

impl Category {
    /// Build a leaf category (empty `children`).
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// The flat record extracted from one item detail page.
///
/// Every field is an opaque string copied from the page markup. A field the
/// page does not carry stays empty; absence is never an error. No parsing or
/// normalization happens here (prices, dates, and tag lists are passed
/// through verbatim for downstream consumers to interpret).
///
/// A `Design` in the output means its detail page was fetched and matched
/// the detail container selector; it does not mean every field is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    /// The detail page URL this record was extracted from.
    pub url: String,
    /// Name of the category whose listing linked to this item.
    pub cat_name: String,
    /// Link to the live preview of the item.
    pub preview_url: String,
    /// Item name from the detail page header.
    pub name: String,
    /// Preview image URL.
    pub image: String,
    /// Listed price, currency formatting included.
    pub price: String,
    /// Sales count as displayed in the sidebar stats.
    pub sales: String,
    /// Comment count as displayed in the sidebar stats.
    pub comments: String,
    /// Seller display name.
    pub seller_name: String,
    /// Link to the seller's profile.
    pub seller_url: String,
    /// "Created" attribute row value.
    pub created: String,
    /// "Last Update" attribute row value (the `datetime` attribute).
    pub last_updated: String,
    /// Raw inner markup of the item description container.
    pub description: String,
    /// "High Resolution" attribute row value.
    pub high_resolution: String,
    /// "Compatible Browsers" attribute row value.
    pub compatible_browser: String,
    /// "Compatible With" attribute row value.
    pub compatible_with: String,
    /// "ThemeForest Files Included" attribute row value.
    pub included: String,
    /// "Columns" attribute row value.
    pub column: String,
    /// "Documentation" attribute row value.
    pub documentation: String,
    /// "Layout" attribute row value.
    pub layout: String,
    /// "Tags" attribute row value.
    pub tags: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new_has_empty_children() {
        let cat = Category::new("/category/wordpress/blog", "Blog / Magazine");
        assert_eq!(cat.url, "/category/wordpress/blog");
        assert_eq!(cat.name, "Blog / Magazine");
        assert!(cat.children.is_empty());
    }

    #[test]
    fn test_category_serializes_camel_case() {
        let cat = Category::new("/category/wordpress/blog", "Blog");
        let json = serde_json::to_string(&cat).unwrap();
        assert!(json.contains(r#""url":"/category/wordpress/blog""#));
        assert!(json.contains(r#""name":"Blog""#));
        assert!(json.contains(r#""children":[]"#));
    }

    #[test]
    fn test_design_default_is_all_empty() {
        let design = Design::default();
        assert_eq!(design.url, "");
        assert_eq!(design.price, "");
        assert_eq!(design.tags, "");
    }

    #[test]
    fn test_design_serializes_historical_field_names() {
        let design = Design {
            url: "https://themeforest.net/item/porto/9047518".to_string(),
            cat_name: "Corporate".to_string(),
            preview_url: "https://preview.themeforest.net/porto".to_string(),
            last_updated: "2025-04-01T00:00:00Z".to_string(),
            high_resolution: "Yes".to_string(),
            compatible_browser: "Firefox, Safari, Chrome".to_string(),
            ..Design::default()
        };

        let json = serde_json::to_string(&design).unwrap();
        assert!(json.contains(r#""catName":"Corporate""#));
        assert!(json.contains(r#""previewUrl":"https://preview.themeforest.net/porto""#));
        assert!(json.contains(r#""lastUpdated":"2025-04-01T00:00:00Z""#));
        assert!(json.contains(r#""highResolution":"Yes""#));
        assert!(json.contains(r#""compatibleBrowser":"Firefox, Safari, Chrome""#));
    }

    #[test]
    fn test_design_roundtrip() {
        let design = Design {
            url: "https://themeforest.net/item/x/1".to_string(),
            name: "X".to_string(),
            description: "<p>Rich <strong>markup</strong></p>".to_string(),
            ..Design::default()
        };

        let json = serde_json::to_string(&design).unwrap();
        let back: Design = serde_json::from_str(&json).unwrap();
        assert_eq!(back, design);
    }
}
