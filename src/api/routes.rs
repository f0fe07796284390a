use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/new-arrivals", get(handlers::get_new_arrivals))
        // Search page
        .route("/search", get(handlers::get_search))
        .route("/search/query", put(handlers::set_query))
        .route("/search/popup", post(handlers::toggle_popup))
        .route(
            "/search/image",
            post(handlers::select_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/search/submit", post(handlers::submit_search))
        .route(
            "/search/upload-status/dismiss",
            post(handlers::dismiss_upload_status),
        )
        // Wishlist
        .route(
            "/wishlist",
            get(handlers::get_wishlist)
                .post(handlers::add_to_wishlist)
                .delete(handlers::remove_from_wishlist),
        )
        .route("/wishlist/toggle", post(handlers::toggle_wishlist))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
