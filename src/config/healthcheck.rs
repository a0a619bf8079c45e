// ABOUTME: Health check configuration: probe mode, path, and timeout.
// ABOUTME: The compose cadence (interval/retries/start period) is fixed.

use serde::Deserialize;
use std::time::Duration;

/// How a service's health is probed.
///
/// Only `http` and `tcp` are materialized into the compose file.
/// `external` checks are driven by an outside collaborator after the
/// stack is up; `none` disables checking entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthcheckMode {
    #[default]
    #[serde(alias = "disabled")]
    None,
    Http,
    Tcp,
    External,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthcheckSpec {
    #[serde(default)]
    pub mode: HealthcheckMode,

    /// Probe path for `http` mode. `"auto"` resolves to `/health`.
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_path() -> String {
    "auto".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for HealthcheckSpec {
    fn default() -> Self {
        HealthcheckSpec {
            mode: HealthcheckMode::None,
            path: default_path(),
            timeout: default_timeout(),
        }
    }
}

impl HealthcheckSpec {
    /// Whether this check is emitted into the compose document.
    pub fn materialized(&self) -> bool {
        matches!(self.mode, HealthcheckMode::Http | HealthcheckMode::Tcp)
    }

    /// HTTP probe path with the `"auto"` convention resolved.
    pub fn resolved_path(&self) -> &str {
        if self.path == "auto" {
            "/health"
        } else {
            &self.path
        }
    }
}
