//! Image similarity recommendations
//!
//! The similarity model runs in an external service. This module hides it
//! behind [`ImageRecommender`] so the coordinator can be driven by the HTTP
//! client in production and by a mock in tests.

use crate::{
    error::UploadError,
    models::{ImageUpload, Product},
};

pub mod similarity_api;

pub use similarity_api::SimilarityApiClient;

/// Multipart field the similarity service reads the image from
pub const IMAGE_FIELD: &str = "image";

/// Source of products visually similar to an uploaded image
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageRecommender: Send + Sync {
    /// Uploads one image and returns the recommended products
    ///
    /// Never retries. Transport and decoding failures come back as
    /// [`UploadError`]; the caller decides what to show.
    async fn recommend(&self, image: ImageUpload) -> Result<Vec<Product>, UploadError>;

    /// Recommender name for logging and debugging
    fn name(&self) -> &'static str;
}
