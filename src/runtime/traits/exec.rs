// ABOUTME: Exec operations trait for the container runtime.
// ABOUTME: Execute commands inside running containers with captured output.

use super::shared_types::ExecOutput;
use async_trait::async_trait;

/// Command execution inside a running container.
#[async_trait]
pub trait ExecOps: Send + Sync {
    /// Run a command inside the named container and return its exit code
    /// and (when `capture` is set) its output streams.
    async fn exec(
        &self,
        name: &str,
        command: &[String],
        capture: bool,
    ) -> Result<ExecOutput, ExecError>;
}

/// Errors from exec operations.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("container not running: {0}")]
    ContainerNotRunning(String),

    #[error("exec failed: {0}")]
    Failed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
