use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// An image picked by the user and waiting to be submitted
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Whether `content_type` is a well-formed `image/*` media type
pub fn is_image_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };

    kind.eq_ignore_ascii_case("image")
        && !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
}

/// Lifecycle of the image search round trip
///
/// Transitions run Idle -> Uploading -> {Succeeded, Failed} -> Idle. A new
/// upload may start from Succeeded or Failed, which passes through Idle.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    Uploading {
        upload_id: Uuid,
        file_name: String,
        started_at: DateTime<Utc>,
    },
    Succeeded {
        upload_id: Uuid,
        count: usize,
        completed_at: DateTime<Utc>,
    },
    Failed {
        upload_id: Uuid,
        message: String,
        completed_at: DateTime<Utc>,
    },
}

impl UploadState {
    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadState::Uploading { .. })
    }

    /// Id of the upload currently in flight
    pub fn in_flight(&self) -> Option<Uuid> {
        match self {
            UploadState::Uploading { upload_id, .. } => Some(*upload_id),
            _ => None,
        }
    }
}
