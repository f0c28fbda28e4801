mod gemini;

pub use gemini::GeminiCaptioner;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Metadata generated for an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageCaption {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("captioning request failed: {0}")]
    Request(String),
    #[error("captioning response malformed: {0}")]
    Malformed(String),
}

/// Produces pin metadata from raw image bytes.
///
/// Held in `AppState` as a trait object so tests can substitute a fake
/// that never touches the network.
#[async_trait]
pub trait Captioner: Send + Sync {
    async fn caption(&self, image: &[u8], content_type: &str)
    -> Result<ImageCaption, CaptionError>;
}
