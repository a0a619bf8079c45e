// ABOUTME: Application name validation and derived naming helpers.
// ABOUTME: The app name prefixes container names and the shared network.

use std::fmt;
use thiserror::Error;

use super::service_name::ServiceName;

#[derive(Debug, Error)]
pub enum AppNameError {
    #[error("application name cannot be empty")]
    Empty,

    #[error("application name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("application name must start with a letter or digit")]
    BadLeadingChar,

    #[error("invalid character in application name: '{0}'")]
    InvalidChar(char),
}

/// DNS/identifier-safe application name.
///
/// Containers are named `<app>-<service>` and all services share the
/// `<app>-network` bridge, so the app name has to be valid in both
/// container-name and network-name positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppName(String);

impl AppName {
    pub fn new(value: &str) -> Result<Self, AppNameError> {
        if value.is_empty() {
            return Err(AppNameError::Empty);
        }

        if value.len() > 63 {
            return Err(AppNameError::TooLong);
        }

        let first = value.chars().next().expect("checked non-empty");
        if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
            return Err(AppNameError::BadLeadingChar);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '_' {
                return Err(AppNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the shared network all services of this app attach to.
    pub fn network_name(&self) -> String {
        format!("{}-network", self.0)
    }

    /// Container name for one of this app's services.
    pub fn container_name(&self, service: &ServiceName) -> String {
        format!("{}-{}", self.0, service)
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
