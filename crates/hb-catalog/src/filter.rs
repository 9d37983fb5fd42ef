use hb_api_types::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category sentinel that disables category scoping.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortMode {
    pub const ALL: [SortMode; 5] = [
        SortMode::Featured,
        SortMode::PriceAsc,
        SortMode::PriceDesc,
        SortMode::NameAsc,
        SortMode::NameDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| format!("unknown sort mode '{value}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub active_category: String,
    pub search_text: String,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub sort_mode: SortMode,
    pub wishlist_only: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            active_category: ALL_CATEGORIES.to_owned(),
            search_text: String::new(),
            price_min: None,
            price_max: None,
            sort_mode: SortMode::Featured,
            wishlist_only: false,
        }
    }
}

impl FilterState {
    fn in_scope(&self, product: &Product, is_wishlisted: &impl Fn(&Product) -> bool) -> bool {
        if self.wishlist_only {
            is_wishlisted(product)
        } else {
            self.active_category == ALL_CATEGORIES || product.category == self.active_category
        }
    }

    fn in_price_range(&self, product: &Product) -> bool {
        self.price_min.is_none_or(|min| product.price >= min)
            && self.price_max.is_none_or(|max| product.price <= max)
    }
}

fn matches_query(product: &Product, query: &str) -> bool {
    query.is_empty()
        || product.name.to_lowercase().contains(query)
        || product.category.to_lowercase().contains(query)
        || product.details.to_lowercase().contains(query)
}

/// Produces the display list: scope, then text search, then price range, then sort.
///
/// The input slice is left untouched; sorting is stable, so `Featured` and ties
/// keep catalog order.
pub fn apply<'a>(
    products: &'a [Product],
    filter: &FilterState,
    is_wishlisted: impl Fn(&Product) -> bool,
) -> Vec<&'a Product> {
    let query = filter.search_text.trim().to_lowercase();

    let mut list: Vec<&Product> = products
        .iter()
        .filter(|product| filter.in_scope(product, &is_wishlisted))
        .filter(|product| matches_query(product, &query))
        .filter(|product| filter.in_price_range(product))
        .collect();

    match filter.sort_mode {
        SortMode::Featured => {}
        SortMode::PriceAsc => list.sort_by(|a, b| a.price.cmp(&b.price)),
        SortMode::PriceDesc => list.sort_by(|a, b| b.price.cmp(&a.price)),
        SortMode::NameAsc => list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortMode::NameDesc => {
            list.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()))
        }
    }

    list
}
