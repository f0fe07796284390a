use std::sync::Arc;

use storefront_discovery::{
    api::{create_router, AppState},
    config::Config,
    services::{CatalogStore, SimilarityApiClient, WishlistStore},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let catalog = CatalogStore::from_json_file(&config.catalog_path, &config.currency).await?;
    let recommender =
        SimilarityApiClient::new(config.similarity_service_url.clone(), config.upload_timeout())?;

    tracing::info!(
        similarity_service = %recommender.endpoint(),
        "Using image similarity service"
    );

    let state = AppState::new(
        catalog,
        WishlistStore::new(),
        Arc::new(recommender),
        config.placeholder_image.clone(),
    )
    .with_max_upload_bytes(config.max_upload_bytes);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
