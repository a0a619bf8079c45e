// ABOUTME: Runtime error types with SNAFU pattern.
// ABOUTME: Unifies socket discovery and connection failures for callers.

use snafu::Snafu;

/// Unified runtime error for connection-level failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RuntimeError {
    #[snafu(display("docker socket not found at {path}"))]
    SocketNotFound { path: String },

    #[snafu(display("runtime connection failed: {message}"))]
    ConnectionFailed { message: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// The configured (or default) socket path does not exist.
    NoSocket,
    /// Failed to connect to or talk to the runtime socket.
    ConnectionFailed,
}

impl RuntimeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            RuntimeError::SocketNotFound { .. } => RuntimeErrorKind::NoSocket,
            RuntimeError::ConnectionFailed { .. } => RuntimeErrorKind::ConnectionFailed,
        }
    }
}
