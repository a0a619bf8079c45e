// ABOUTME: Image operations trait for the container runtime.
// ABOUTME: Pull images by fully qualified reference.

use async_trait::async_trait;

/// Image operations.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Pull an image by fully qualified reference (`name:tag`).
    async fn pull_image(&self, reference: &str) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
