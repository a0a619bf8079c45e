// ABOUTME: Application-wide error types for stakkr.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Port(#[from] crate::ports::PortError),

    #[error(transparent)]
    Compose(#[from] crate::compose::ComposeError),

    #[error(transparent)]
    Pull(#[from] crate::puller::PullError),

    #[error(transparent)]
    Control(#[from] crate::control::ControlError),

    #[error(transparent)]
    Runtime(#[from] crate::runtime::RuntimeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
