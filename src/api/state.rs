use std::sync::Arc;

use tokio::sync::RwLock;

use crate::services::{CatalogStore, ImageRecommender, SearchCoordinator, WishlistStore};

/// Default cap on an uploaded image request body
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state
///
/// One process hosts one discovery session: a single coordinator plus the
/// stores it reads from.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogStore,
    pub wishlist: WishlistStore,
    pub coordinator: Arc<RwLock<SearchCoordinator>>,
    pub placeholder_image: Arc<str>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        catalog: CatalogStore,
        wishlist: WishlistStore,
        recommender: Arc<dyn ImageRecommender>,
        placeholder_image: impl Into<String>,
    ) -> Self {
        let coordinator = SearchCoordinator::new(catalog.clone(), wishlist.clone(), recommender);
        let placeholder_image: String = placeholder_image.into();

        Self {
            catalog,
            wishlist,
            coordinator: Arc::new(RwLock::new(coordinator)),
            placeholder_image: placeholder_image.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
