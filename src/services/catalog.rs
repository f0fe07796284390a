use std::path::Path;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Product, ProductId},
};

/// Read-only product collection plus the currency it is priced in
///
/// Cloning is cheap; all clones share one snapshot.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    products: Arc<[Product]>,
    currency: Arc<str>,
}

impl CatalogStore {
    pub fn new(products: Vec<Product>, currency: impl Into<String>) -> Self {
        let currency: String = currency.into();
        Self {
            products: products.into(),
            currency: currency.into(),
        }
    }

    /// Loads a JSON array of products from disk
    pub async fn from_json_file(path: impl AsRef<Path>, currency: &str) -> AppResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json(&data, currency)?;

        tracing::info!(
            path = %path.display(),
            products = catalog.products.len(),
            "Loaded product catalog"
        );

        Ok(catalog)
    }

    pub fn from_json(data: &str, currency: &str) -> AppResult<Self> {
        let products: Vec<Product> = serde_json::from_str(data)
            .map_err(|e| AppError::Catalog(format!("Invalid catalog JSON: {}", e)))?;

        for product in &products {
            product.validate().map_err(AppError::Catalog)?;
        }

        Ok(Self::new(products, currency))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// Most recently added products, in catalog order
    pub fn latest(&self, limit: usize) -> &[Product] {
        &self.products[..limit.min(self.products.len())]
    }
}
