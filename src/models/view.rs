use serde::Serialize;

use super::{Product, ProductId, UploadState};

/// Maximum number of text matches shown in the result grid
pub const MAX_TEXT_RESULTS: usize = 8;

/// Number of products shown in the new arrivals rail
pub const NEW_ARRIVALS_LIMIT: usize = 3;

/// Formats a price the way product tiles show it, e.g. `$38.00`
pub fn format_price(currency: &str, price: f64) -> String {
    format!("{}{:.2}", currency, price)
}

/// Display-ready product tile
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub price_label: String,
    pub image: Option<String>,
    pub detail_path: String,
    pub wishlisted: bool,
}

impl ProductCard {
    pub fn new(product: &Product, currency: &str, wishlisted: bool) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            price_label: format_price(currency, product.price),
            image: product.primary_image().map(str::to_string),
            detail_path: product.detail_path(),
            wishlisted,
        }
    }

    /// Fills in a fallback image when the product has none
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        if self.image.is_none() {
            self.image = Some(placeholder.to_string());
        }
        self
    }
}

/// Outcome of the text search
///
/// Zero matches is its own state so the empty grid is never rendered silently.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchResults {
    Matches {
        items: Vec<ProductCard>,
        /// Matches before the display cap was applied
        total: usize,
    },
    NoResults {
        query: String,
        message: String,
    },
}

impl SearchResults {
    pub fn no_results(query: &str) -> Self {
        SearchResults::NoResults {
            query: query.to_string(),
            message: format!("No results found for \"{}\"", query),
        }
    }

    /// Cards to render, empty for the no-results state
    pub fn items(&self) -> &[ProductCard] {
        match self {
            SearchResults::Matches { items, .. } => items,
            SearchResults::NoResults { .. } => &[],
        }
    }
}

/// Everything the search page renders at one instant
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchView {
    pub query: String,
    pub popup_visible: bool,
    pub selected_file: Option<String>,
    /// Whether the "Search by Image" action is available
    pub can_submit: bool,
    pub upload: UploadState,
    pub recommendations: Vec<ProductCard>,
    pub results: SearchResults,
}
