use crate::models::Product;

/// Current free-text search string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    text: String,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the query verbatim; an empty string means "no filter"
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn current_query(&self) -> &str {
        &self.text
    }

    pub fn filter<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        filter(products, &self.text)
    }
}

/// Products whose name contains `query`, ignoring case, in input order
pub fn filter<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    if query.is_empty() {
        return products.iter().collect();
    }

    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|product| product.name.to_lowercase().contains(&needle))
        .collect()
}
