// ABOUTME: Container operations trait for the container runtime.
// ABOUTME: List by exact name, inspect, start, stop, and kill containers.

use super::shared_types::{ContainerDetails, ContainerSummary};
use async_trait::async_trait;
use std::time::Duration;

/// Container lifecycle and introspection operations.
#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// List containers whose name exactly matches `name`.
    ///
    /// With `all` set, stopped containers are included.
    async fn list_containers(
        &self,
        name: &str,
        all: bool,
    ) -> Result<Vec<ContainerSummary>, ContainerError>;

    /// Inspect a container's state and health by name.
    async fn inspect_container(&self, name: &str) -> Result<ContainerDetails, ContainerError>;

    /// Start a stopped container.
    async fn start_container(&self, name: &str) -> Result<(), ContainerError>;

    /// Stop a running container gracefully within `timeout`.
    async fn stop_container(&self, name: &str, timeout: Duration) -> Result<(), ContainerError>;

    /// Forcibly terminate a container.
    async fn kill_container(&self, name: &str) -> Result<(), ContainerError>;
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container not running: {0}")]
    NotRunning(String),

    #[error("container already running: {0}")]
    AlreadyRunning(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
