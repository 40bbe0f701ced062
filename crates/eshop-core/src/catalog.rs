//! Catalog filtering, search and sorting for the products view.
//!
//! The view owns a `CatalogQuery` and passes it explicitly; search text
//! from the header reaches the products list through the same value.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::Product;
use crate::utils::contains_ignore_case;

/// Category tabs shown above the product grid
pub const CATEGORY_TABS: [&str; 5] = ["ALL", "APPAREL", "ELECTRONICS", "FOOTWEAR", "PERSONAL CARE"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(trimmed.to_uppercase())
        }
    }

    /// Terms a product category may contain to fall under this tab.
    /// Catalog data is inconsistent ("Footwear", "Shoes", "foot wear"),
    /// so each tab matches a set of synonyms.
    fn match_terms(name: &str) -> Vec<String> {
        let terms: &[&str] = match name {
            "APPAREL" => &["apparel", "clothing", "clothes"],
            "ELECTRONICS" => &["electronics", "electronic", "gadget", "tech"],
            "FOOTWEAR" => &["footwear", "shoes", "shoe", "foot wear", "foot"],
            "PERSONAL CARE" => &["personal care", "personalcare", "care", "personal"],
            other => return vec![other.to_lowercase()],
        };
        terms.iter().map(|t| t.to_string()).collect()
    }

    pub fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => match product.category.as_deref() {
                Some(category) => Self::match_terms(name)
                    .iter()
                    .any(|term| contains_ignore_case(category, term)),
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "default" => Ok(SortOrder::Default),
            "price_asc" | "price-asc" => Ok(SortOrder::PriceAsc),
            "price_desc" | "price-desc" => Ok(SortOrder::PriceDesc),
            "newest" => Ok(SortOrder::Newest),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortOrder::Default => "Default",
            SortOrder::PriceAsc => "Price: Low to High",
            SortOrder::PriceDesc => "Price: High to Low",
            SortOrder::Newest => "Newest",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: CategoryFilter,
    pub search: String,
    pub sort: SortOrder,
}

impl CatalogQuery {
    fn matches_search(&self, product: &Product) -> bool {
        let query = self.search.trim();
        if query.is_empty() {
            return true;
        }
        contains_ignore_case(&product.name, query)
            || product
                .description
                .as_deref()
                .map(|d| contains_ignore_case(d, query))
                .unwrap_or(false)
    }

    /// Filter then sort. The default order keeps the server's order.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut filtered: Vec<Product> = products
            .iter()
            .filter(|p| self.category.matches(p) && self.matches_search(p))
            .cloned()
            .collect();

        match self.sort {
            SortOrder::Default => {}
            SortOrder::PriceAsc => filtered.sort_by(|a, b| cmp_price(a, b)),
            SortOrder::PriceDesc => filtered.sort_by(|a, b| cmp_price(b, a)),
            SortOrder::Newest => {
                filtered.sort_by(|a, b| b.created_at_or_epoch().cmp(&a.created_at_or_epoch()))
            }
        }
        filtered
    }
}

fn cmp_price(a: &Product, b: &Product) -> Ordering {
    a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal)
}
