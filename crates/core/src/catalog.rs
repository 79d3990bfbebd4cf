//! Catalog filter, search, and sort.
//!
//! Pure functions over an in-memory product list. The storefront fetches the
//! catalog wholesale (tens of items) and applies these client-side-style
//! filters per request; there is no pagination or index.

use serde::Deserialize;

use crate::records::Product;
use crate::types::{CategoryId, Price};

/// Filter criteria for a catalog listing. All criteria are optional and
/// combine as an intersection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    /// Keep only products in this category.
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring match on name or description.
    pub query: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
}

/// Sort order for a catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Alphabetical by name.
    #[default]
    Name,
    /// Cheapest first.
    Price,
    /// Popular products first, then by name.
    Popular,
}

impl CatalogFilter {
    fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = &self.category_id
            && product.category_id.as_ref() != Some(category_id)
        {
            return false;
        }

        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            if !needle.is_empty()
                && !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(min) = &self.min_price
            && product.price < *min
        {
            return false;
        }
        if let Some(max) = &self.max_price
            && product.price > *max
        {
            return false;
        }

        true
    }
}

/// Apply a filter to a product list, preserving input order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], filter: &CatalogFilter) -> Vec<&'a Product> {
    products.iter().filter(|p| filter.matches(p)).collect()
}

/// Sort a filtered listing in place.
pub fn sort_products(products: &mut [&Product], key: SortKey) {
    match key {
        SortKey::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Price => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::Popular => {
            products.sort_by(|a, b| b.popular.cmp(&a.popular).then_with(|| a.name.cmp(&b.name)));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ProductId;
    use crate::types::price::CurrencyCode;
    use chrono::Utc;

    fn product(id: &str, name: &str, category: Option<&str>, cents: i64, popular: bool) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: format!("{name} for parties"),
            category_id: category.map(CategoryId::new),
            price: Price::from_cents(cents, CurrencyCode::USD).unwrap(),
            image_url: None,
            popular,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fixture() -> Vec<Product> {
        vec![
            product("p1", "Bounce House", Some("inflatables"), 150_00, true),
            product("p2", "Cotton Candy Machine", Some("concessions"), 65_00, false),
            product("p3", "Water Slide", Some("inflatables"), 220_00, true),
            product("p4", "Folding Chair", Some("furniture"), 2_50, false),
        ]
    }

    #[test]
    fn test_filter_by_category_only_matches() {
        let products = fixture();
        let filter = CatalogFilter {
            category_id: Some(CategoryId::new("inflatables")),
            ..CatalogFilter::default()
        };
        let result = filter_products(&products, &filter);
        assert_eq!(result.len(), 2);
        assert!(
            result
                .iter()
                .all(|p| p.category_id == Some(CategoryId::new("inflatables")))
        );
    }

    #[test]
    fn test_category_and_price_range_intersect() {
        let products = fixture();
        let filter = CatalogFilter {
            category_id: Some(CategoryId::new("inflatables")),
            min_price: Some(Price::zero(CurrencyCode::USD)),
            max_price: Some(Price::from_cents(100_00, CurrencyCode::USD).unwrap()),
            ..CatalogFilter::default()
        };
        // Both inflatables cost more than $100, so the intersection is empty.
        assert!(filter_products(&products, &filter).is_empty());
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let products = fixture();
        let filter = CatalogFilter {
            min_price: Some(Price::from_cents(65_00, CurrencyCode::USD).unwrap()),
            max_price: Some(Price::from_cents(150_00, CurrencyCode::USD).unwrap()),
            ..CatalogFilter::default()
        };
        let result = filter_products(&products, &filter);
        let ids: Vec<&str> = result.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_text_search_matches_name_and_description() {
        let products = fixture();
        let by_name = CatalogFilter {
            query: Some("slide".to_string()),
            ..CatalogFilter::default()
        };
        assert_eq!(filter_products(&products, &by_name).len(), 1);

        // Every fixture description contains "parties".
        let by_description = CatalogFilter {
            query: Some("PARTIES".to_string()),
            ..CatalogFilter::default()
        };
        assert_eq!(filter_products(&products, &by_description).len(), 4);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let products = fixture();
        assert_eq!(
            filter_products(&products, &CatalogFilter::default()).len(),
            products.len()
        );
    }

    #[test]
    fn test_sort_by_price() {
        let products = fixture();
        let mut listing = filter_products(&products, &CatalogFilter::default());
        sort_products(&mut listing, SortKey::Price);
        let ids: Vec<&str> = listing.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p4", "p2", "p1", "p3"]);
    }

    #[test]
    fn test_sort_popular_first_then_name() {
        let products = fixture();
        let mut listing = filter_products(&products, &CatalogFilter::default());
        sort_products(&mut listing, SortKey::Popular);
        let ids: Vec<&str> = listing.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3", "p2", "p4"]);
    }
}
