use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::UploadError,
    models::{
        ImageUpload, Product, ProductCard, ProductId, SearchResults, SearchView, UploadState,
        MAX_TEXT_RESULTS,
    },
    services::{
        catalog::CatalogStore, query::QueryState, recommender::ImageRecommender,
        wishlist::WishlistStore,
    },
};

/// An upload that has left the Idle state and owns the image being sent
#[derive(Debug)]
pub struct UploadTicket {
    pub upload_id: Uuid,
    pub image: ImageUpload,
}

/// Result of trying to start an upload
#[derive(Debug)]
pub enum BeginUpload {
    Started(UploadTicket),
    NoFileSelected,
    /// Another upload is still in flight
    InFlight(Uuid),
}

/// Result of one `submit_search` call
#[derive(Debug)]
pub enum SubmitOutcome {
    NoFileSelected,
    InFlight(Uuid),
    Succeeded { count: usize },
    Failed(UploadError),
    /// The result belonged to an upload that is no longer in flight
    Discarded,
}

/// Abandons the upload if `submit_search` is dropped before it finishes
struct PendingUpload<'a> {
    upload_id: Uuid,
    coordinator: Option<&'a mut SearchCoordinator>,
}

impl PendingUpload<'_> {
    fn finish(mut self, result: Result<Vec<Product>, UploadError>) -> SubmitOutcome {
        match self.coordinator.take() {
            Some(coordinator) => coordinator.finish_upload(self.upload_id, result),
            None => SubmitOutcome::Discarded,
        }
    }
}

impl Drop for PendingUpload<'_> {
    fn drop(&mut self) {
        if let Some(coordinator) = self.coordinator.take() {
            tracing::warn!(upload_id = %self.upload_id, "Image search dropped mid-flight");
            coordinator.abandon_upload(self.upload_id);
        }
    }
}

/// Composes catalog, query, wishlist and image recommendations into one view
///
/// Text matches are derived from the catalog on every read and never cached.
/// Recommendations live here only, for the lifetime of the session, and are
/// never merged into the catalog.
pub struct SearchCoordinator {
    catalog: CatalogStore,
    wishlist: WishlistStore,
    recommender: Arc<dyn ImageRecommender>,
    query: QueryState,
    selected_file: Option<ImageUpload>,
    popup_visible: bool,
    recommendations: Vec<Product>,
    upload: UploadState,
}

impl SearchCoordinator {
    pub fn new(
        catalog: CatalogStore,
        wishlist: WishlistStore,
        recommender: Arc<dyn ImageRecommender>,
    ) -> Self {
        Self {
            catalog,
            wishlist,
            recommender,
            query: QueryState::new(),
            selected_file: None,
            popup_visible: false,
            recommendations: Vec::new(),
            upload: UploadState::Idle,
        }
    }

    pub fn on_query_change(&mut self, text: impl Into<String>) {
        self.query.set_query(text);
    }

    pub fn query(&self) -> &str {
        self.query.current_query()
    }

    /// Records the file to search with; does not upload it
    pub fn select_file(&mut self, file: ImageUpload) {
        tracing::debug!(file_name = %file.file_name, "Image selected");
        self.selected_file = Some(file);
    }

    pub fn selected_file(&self) -> Option<&ImageUpload> {
        self.selected_file.as_ref()
    }

    pub fn toggle_popup(&mut self) {
        self.popup_visible = !self.popup_visible;
    }

    pub fn popup_visible(&self) -> bool {
        self.popup_visible
    }

    pub fn recommendations(&self) -> &[Product] {
        &self.recommendations
    }

    pub fn upload_state(&self) -> &UploadState {
        &self.upload
    }

    pub fn recommender(&self) -> Arc<dyn ImageRecommender> {
        Arc::clone(&self.recommender)
    }

    /// Flips wishlist membership for a catalog or recommended product
    pub fn toggle_wishlist(&self, product: &Product) -> bool {
        self.wishlist.toggle(product)
    }

    /// Looks a product up in the catalog, then in the current recommendations
    pub fn find_product(&self, id: &ProductId) -> Option<&Product> {
        self.catalog
            .find(id)
            .or_else(|| self.recommendations.iter().find(|product| &product.id == id))
    }

    /// Runs the whole upload round trip for the selected file
    pub async fn submit_search(&mut self) -> SubmitOutcome {
        let ticket = match self.begin_upload() {
            BeginUpload::Started(ticket) => ticket,
            BeginUpload::NoFileSelected => return SubmitOutcome::NoFileSelected,
            BeginUpload::InFlight(upload_id) => return SubmitOutcome::InFlight(upload_id),
        };

        let recommender = Arc::clone(&self.recommender);
        let pending = PendingUpload {
            upload_id: ticket.upload_id,
            coordinator: Some(self),
        };
        let result = recommender.recommend(ticket.image).await;
        pending.finish(result)
    }

    /// Moves Idle -> Uploading and hands out the selected file
    ///
    /// Split from [`finish_upload`](Self::finish_upload) so a host sharing the
    /// coordinator behind a lock can release it while the request is in
    /// flight. The selected file is cleared on dispatch.
    pub fn begin_upload(&mut self) -> BeginUpload {
        if let Some(upload_id) = self.upload.in_flight() {
            tracing::warn!(upload_id = %upload_id, "Upload already in progress, ignoring submit");
            return BeginUpload::InFlight(upload_id);
        }

        let Some(image) = self.selected_file.take() else {
            return BeginUpload::NoFileSelected;
        };

        let upload_id = Uuid::new_v4();
        tracing::info!(
            upload_id = %upload_id,
            file_name = %image.file_name,
            "Starting image search"
        );

        self.upload = UploadState::Uploading {
            upload_id,
            file_name: image.file_name.clone(),
            started_at: Utc::now(),
        };

        BeginUpload::Started(UploadTicket { upload_id, image })
    }

    /// Applies the outcome of an upload started by [`begin_upload`](Self::begin_upload)
    ///
    /// On failure the previous recommendations stay in place.
    pub fn finish_upload(
        &mut self,
        upload_id: Uuid,
        result: Result<Vec<Product>, UploadError>,
    ) -> SubmitOutcome {
        if self.upload.in_flight() != Some(upload_id) {
            tracing::warn!(upload_id = %upload_id, "Discarding result of stale upload");
            return SubmitOutcome::Discarded;
        }

        match result {
            Ok(products) => {
                let count = products.len();
                tracing::info!(upload_id = %upload_id, count, "Image search succeeded");

                self.recommendations = products;
                self.upload = UploadState::Succeeded {
                    upload_id,
                    count,
                    completed_at: Utc::now(),
                };
                SubmitOutcome::Succeeded { count }
            }
            Err(error) => {
                tracing::warn!(
                    upload_id = %upload_id,
                    kind = ?error.kind(),
                    error = %error,
                    "Image search failed, keeping previous recommendations"
                );

                self.upload = UploadState::Failed {
                    upload_id,
                    message: error.to_string(),
                    completed_at: Utc::now(),
                };
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Fails an upload whose result will never be applied
    ///
    /// Used when the caller driving the upload goes away mid-flight. No effect
    /// unless `upload_id` is the upload in flight.
    pub fn abandon_upload(&mut self, upload_id: Uuid) {
        if self.upload.in_flight() == Some(upload_id) {
            self.finish_upload(upload_id, Err(UploadError::Cancelled));
        }
    }

    /// Returns a finished upload to Idle. No effect while uploading.
    pub fn dismiss_upload_status(&mut self) {
        if !self.upload.is_uploading() {
            self.upload = UploadState::Idle;
        }
    }

    /// Text matches for the current query, capped for display
    pub fn text_results(&self) -> SearchResults {
        let matches = self.query.filter(self.catalog.products());

        if matches.is_empty() {
            return SearchResults::no_results(self.query.current_query());
        }

        let total = matches.len();
        let items = matches
            .into_iter()
            .take(MAX_TEXT_RESULTS)
            .map(|product| self.card(product))
            .collect();

        SearchResults::Matches { items, total }
    }

    /// All current recommendations, uncapped
    pub fn recommendation_cards(&self) -> Vec<ProductCard> {
        self.recommendations
            .iter()
            .map(|product| self.card(product))
            .collect()
    }

    pub fn view(&self) -> SearchView {
        SearchView {
            query: self.query.current_query().to_string(),
            popup_visible: self.popup_visible,
            selected_file: self.selected_file.as_ref().map(|f| f.file_name.clone()),
            can_submit: self.selected_file.is_some() && !self.upload.is_uploading(),
            upload: self.upload.clone(),
            recommendations: self.recommendation_cards(),
            results: self.text_results(),
        }
    }

    fn card(&self, product: &Product) -> ProductCard {
        let wishlisted = self.wishlist.contains_product(product);
        ProductCard::new(product, self.catalog.currency(), wishlisted)
    }
}
