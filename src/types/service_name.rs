// ABOUTME: Per-image service name derivation and validation.
// ABOUTME: Invalid or empty derivations fall back to service-<index+1>.

use std::fmt;
use thiserror::Error;

use super::image_ref::ImageRef;

#[derive(Debug, Error)]
pub enum ServiceNameError {
    #[error("service name cannot be empty")]
    Empty,

    #[error("service name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("invalid character in service name: '{0}'")]
    InvalidChar(char),
}

/// Service name within a compose document.
///
/// Restricted to `[a-z0-9_-]` so the name is usable as a compose service
/// key, a container-name component, and a DNS alias on the app network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: &str) -> Result<Self, ServiceNameError> {
        if value.is_empty() {
            return Err(ServiceNameError::Empty);
        }

        if value.len() > 63 {
            return Err(ServiceNameError::TooLong);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' {
                return Err(ServiceNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// The fixed name used on the single-image path.
    pub fn app() -> Self {
        Self("app".to_string())
    }

    /// Positional fallback name: `service-<index+1>`.
    pub fn fallback(index: usize) -> Self {
        Self(format!("service-{}", index + 1))
    }

    /// Derive a service name from an image reference.
    ///
    /// Strips the registry/path prefix and tag suffix, lowercases the
    /// remaining repository name, and validates it. Anything that does not
    /// survive validation becomes the positional fallback.
    pub fn derive(image: &ImageRef, index: usize) -> Self {
        let candidate = image.repo_name().to_ascii_lowercase();
        Self::new(&candidate).unwrap_or_else(|_| Self::fallback(index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
