use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure of one image upload round trip
///
/// Raised only at the recommendation client boundary; callers get it back as
/// a value and never as a panic.
#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("Recommendation service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Recommendation service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Recommendation response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Recommendation response contains an invalid item: {0}")]
    InvalidItem(String),

    #[error("Image cannot be uploaded: {0}")]
    InvalidImage(String),

    #[error("Upload was cancelled before the service answered")]
    Cancelled,
}

/// Coarse classification used for logging and user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    /// The service could not be reached or did not answer with success
    Transport,
    /// A response arrived but did not have the expected shape
    Decode,
    /// The image was rejected locally and never sent
    Input,
}

impl UploadError {
    pub fn kind(&self) -> UploadErrorKind {
        match self {
            UploadError::Transport(_) | UploadError::Status { .. } | UploadError::Cancelled => {
                UploadErrorKind::Transport
            }
            UploadError::Decode(_) | UploadError::InvalidItem(_) => UploadErrorKind::Decode,
            UploadError::InvalidImage(_) => UploadErrorKind::Input,
        }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Io(_) | AppError::Catalog(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
