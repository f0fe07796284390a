use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        is_image_content_type, ImageUpload, ProductCard, ProductId, SearchView, WishlistEntry,
    },
    services::{new_arrivals, recommender::IMAGE_FIELD, BeginUpload, SearchCoordinator},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct WishlistItemRequest {
    pub id: ProductId,
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleWishlistRequest {
    pub id: ProductId,
}

#[derive(Debug, Serialize)]
pub struct ToggleWishlistResponse {
    pub id: ProductId,
    pub size: String,
    pub wishlisted: bool,
}

/// Fails the in-flight upload if the submit request is dropped before the
/// similarity service answers
struct AbandonOnDrop {
    coordinator: Arc<RwLock<SearchCoordinator>>,
    upload_id: Uuid,
    armed: bool,
}

impl AbandonOnDrop {
    fn new(coordinator: Arc<RwLock<SearchCoordinator>>, upload_id: Uuid) -> Self {
        Self {
            coordinator,
            upload_id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let upload_id = self.upload_id;
        tracing::warn!(upload_id = %upload_id, "Image search request dropped mid-flight");

        match self.coordinator.try_write() {
            Ok(mut coordinator) => coordinator.abandon_upload(upload_id),
            Err(_) => {
                let coordinator = Arc::clone(&self.coordinator);
                tokio::spawn(async move {
                    coordinator.write().await.abandon_upload(upload_id);
                });
            }
        }
    }
}

fn multipart_error(context: &str, error: MultipartError) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, error.body_text()))
    } else {
        AppError::InvalidInput(format!("{}: {}", context, error.body_text()))
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// New arrivals rail
pub async fn get_new_arrivals(State(state): State<AppState>) -> Json<Vec<ProductCard>> {
    Json(new_arrivals(
        &state.catalog,
        &state.wishlist,
        &state.placeholder_image,
    ))
}

/// Current search page
pub async fn get_search(State(state): State<AppState>) -> Json<SearchView> {
    let coordinator = state.coordinator.read().await;
    Json(coordinator.view())
}

/// Replace the text query
pub async fn set_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<SearchView> {
    let mut coordinator = state.coordinator.write().await;
    coordinator.on_query_change(request.query);
    Json(coordinator.view())
}

/// Show or hide the image upload popup
pub async fn toggle_popup(State(state): State<AppState>) -> Json<SearchView> {
    let mut coordinator = state.coordinator.write().await;
    coordinator.toggle_popup();
    Json(coordinator.view())
}

/// Select the image to search with, sent as the multipart `image` field
pub async fn select_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<SearchView>> {
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        if let Some(content_type) = content_type.as_deref() {
            if !is_image_content_type(content_type) {
                return Err(AppError::InvalidInput(format!(
                    "Unsupported content type {:?}, expected an image",
                    content_type
                )));
            }
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read image", e))?;

        let mut upload = ImageUpload::new(file_name, bytes.to_vec());
        if let Some(content_type) = content_type {
            upload = upload.with_content_type(content_type);
        }
        image = Some(upload);
        break;
    }

    let image = image.ok_or_else(|| {
        AppError::InvalidInput(format!("Multipart field '{}' is required", IMAGE_FIELD))
    })?;

    let mut coordinator = state.coordinator.write().await;
    coordinator.select_file(image);
    Ok(Json(coordinator.view()))
}

/// Run the image search for the selected file
///
/// The coordinator lock is released while the similarity service is working,
/// so the page stays readable and a second submit gets a 409 instead of
/// queueing behind the first one. If the client goes away first, the upload
/// ends as failed and its late result is discarded.
pub async fn submit_search(State(state): State<AppState>) -> AppResult<Json<SearchView>> {
    let (ticket, recommender) = {
        let mut coordinator = state.coordinator.write().await;
        match coordinator.begin_upload() {
            BeginUpload::Started(ticket) => (ticket, coordinator.recommender()),
            BeginUpload::NoFileSelected => return Ok(Json(coordinator.view())),
            BeginUpload::InFlight(upload_id) => {
                return Err(AppError::Conflict(format!(
                    "Upload {} is still in progress",
                    upload_id
                )))
            }
        }
    };

    let guard = AbandonOnDrop::new(Arc::clone(&state.coordinator), ticket.upload_id);
    let result = recommender.recommend(ticket.image).await;

    let mut coordinator = state.coordinator.write().await;
    guard.disarm();
    coordinator.finish_upload(ticket.upload_id, result);
    Ok(Json(coordinator.view()))
}

/// Clear a finished upload's success or failure notice
pub async fn dismiss_upload_status(State(state): State<AppState>) -> Json<SearchView> {
    let mut coordinator = state.coordinator.write().await;
    coordinator.dismiss_upload_status();
    Json(coordinator.view())
}

/// All wishlist entries
pub async fn get_wishlist(State(state): State<AppState>) -> Json<Vec<WishlistEntry>> {
    Json(state.wishlist.items())
}

/// Add a (product, size) pair
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Json(request): Json<WishlistItemRequest>,
) -> (StatusCode, Json<Vec<WishlistEntry>>) {
    let inserted = state.wishlist.add(request.id, request.size.as_deref());
    let status = if inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(state.wishlist.items()))
}

/// Remove a (product, size) pair
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Json(request): Json<WishlistItemRequest>,
) -> Json<Vec<WishlistEntry>> {
    state.wishlist.remove(request.id, request.size.as_deref());
    Json(state.wishlist.items())
}

/// Toggle a catalog or recommended product
pub async fn toggle_wishlist(
    State(state): State<AppState>,
    Json(request): Json<ToggleWishlistRequest>,
) -> AppResult<Json<ToggleWishlistResponse>> {
    let coordinator = state.coordinator.read().await;
    let product = coordinator
        .find_product(&request.id)
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", request.id)))?;

    let wishlisted = coordinator.toggle_wishlist(product);
    let entry = WishlistEntry::for_product(product);

    tracing::info!(
        product_id = %entry.id,
        size = %entry.size,
        wishlisted,
        "Wishlist toggled"
    );

    Ok(Json(ToggleWishlistResponse {
        id: entry.id,
        size: entry.size,
        wishlisted,
    }))
}
