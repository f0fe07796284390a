//! HTTP client for the image similarity service
//!
//! Wire contract:
//! - POST `{url}` with a multipart body holding the file in the `image` field
//! - 2xx response: `{ "recommended": [ { id, name, price, image, size? }, ... ] }`
//! - anything else, or a body of another shape, is a failure

use reqwest::{
    multipart::{Form, Part},
    Client as HttpClient,
};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::UploadError,
    models::{ImageUpload, Product},
    services::recommender::{ImageRecommender, IMAGE_FIELD},
};

/// Longest error body kept from a failed response, in characters
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// Success body returned by the similarity service
#[derive(Debug, Deserialize)]
pub struct RecommendResponse {
    pub recommended: Vec<Product>,
}

#[derive(Clone)]
pub struct SimilarityApiClient {
    http_client: HttpClient,
    endpoint: String,
}

impl SimilarityApiClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
        let http_client = HttpClient::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;

        Ok(Self::with_client(http_client, endpoint))
    }

    pub fn with_client(http_client: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(image: ImageUpload) -> Result<Form, UploadError> {
        let mut part = Part::bytes(image.bytes).file_name(image.file_name);
        if let Some(content_type) = image.content_type {
            part = part.mime_str(&content_type).map_err(|_| {
                UploadError::InvalidImage(format!("bad content type {:?}", content_type))
            })?;
        }

        Ok(Form::new().part(IMAGE_FIELD, part))
    }
}

/// Keeps the head of an error body so it can be logged and shown
fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

/// Decodes a success body into validated products
pub fn parse_recommendations(body: &[u8]) -> Result<Vec<Product>, UploadError> {
    let response: RecommendResponse = serde_json::from_slice(body)?;

    for product in &response.recommended {
        product.validate().map_err(UploadError::InvalidItem)?;
    }

    Ok(response.recommended)
}

#[async_trait::async_trait]
impl ImageRecommender for SimilarityApiClient {
    async fn recommend(&self, image: ImageUpload) -> Result<Vec<Product>, UploadError> {
        let file_name = image.file_name.clone();
        let size_bytes = image.bytes.len();
        let form = Self::build_form(image)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            file_name = %file_name,
            size_bytes,
            "Uploading image for recommendations"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = response.bytes().await?;
        let products = parse_recommendations(&body)?;

        tracing::info!(
            file_name = %file_name,
            results = products.len(),
            recommender = self.name(),
            "Image recommendations received"
        );

        Ok(products)
    }

    fn name(&self) -> &'static str {
        "similarity_api"
    }
}
