use serde::{Deserialize, Serialize};

use super::{Product, ProductId};

/// Size key used when a product carries no explicit size
pub const DEFAULT_SIZE: &str = "default";

/// Name of the event published on every wishlist mutation
pub const WISHLIST_UPDATED: &str = "wishlistUpdated";

/// Maps an optional size onto the wishlist key space
///
/// Absent and empty sizes both become `"default"`, so "no size" and
/// `"default"` can never end up as two different keys.
pub fn normalize_size(size: Option<&str>) -> String {
    match size {
        Some(size) if !size.is_empty() => size.to_string(),
        _ => DEFAULT_SIZE.to_string(),
    }
}

/// One liked (product, size) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: ProductId,
    pub size: String,
}

impl WishlistEntry {
    pub fn new(id: impl Into<ProductId>, size: Option<&str>) -> Self {
        Self {
            id: id.into(),
            size: normalize_size(size),
        }
    }

    /// Entry a toggle on this product would add or remove
    pub fn for_product(product: &Product) -> Self {
        Self::new(product.id.clone(), product.size.as_deref())
    }
}

/// What a single mutation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "entry", rename_all = "lowercase")]
pub enum WishlistChange {
    Added(WishlistEntry),
    Removed(WishlistEntry),
}

/// Broadcast to every subscriber after a successful add or remove
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistEvent {
    pub name: &'static str,
    pub change: WishlistChange,
    /// Wishlist contents after the change was applied
    pub snapshot: Vec<WishlistEntry>,
}
