// ABOUTME: Log operations trait for the container runtime.
// ABOUTME: Fetch the tail of a container's log output as text.

use async_trait::async_trait;

/// Log retrieval operations.
#[async_trait]
pub trait LogOps: Send + Sync {
    /// Return the last `tail` lines of the container's combined
    /// stdout/stderr output, or everything when `tail` is `None`.
    async fn container_logs(&self, name: &str, tail: Option<u64>) -> Result<String, LogError>;
}

/// Errors from log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
