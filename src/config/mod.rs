// ABOUTME: Configuration types and parsing for stakkr.yml.
// ABOUTME: One parsing step at the boundary; components see typed values only.

mod env_vars;
mod healthcheck;
mod port_spec;

pub use env_vars::EnvVars;
pub use healthcheck::{HealthcheckMode, HealthcheckSpec};
pub use port_spec::{PortSpec, PortSpecError};

use crate::error::{Error, Result};
use crate::types::{AppName, ImageRef};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "stakkr.yml";
pub const CONFIG_FILENAME_ALT: &str = "stakkr.yaml";

/// Everything needed to materialize one application stack.
///
/// Constructed once per invocation and never mutated afterwards; service
/// descriptors and the compose document are derived from it on each
/// generation call.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentSpec {
    #[serde(deserialize_with = "deserialize_app_name")]
    pub app_name: AppName,

    #[serde(deserialize_with = "deserialize_images")]
    pub images: NonEmpty<ImageRef>,

    #[serde(default = "default_tag")]
    pub tag: String,

    /// Positionally aligned with `images`; shorter lists fall back to the
    /// default service port on the multi-image path.
    #[serde(default)]
    pub ports: Vec<PortSpec>,

    #[serde(default)]
    pub env: EnvVars,

    /// `source:target[:mode]` mount specs, emitted verbatim.
    #[serde(default)]
    pub volumes: Vec<String>,

    /// `host:ip` entries for the services' extra_hosts blocks.
    #[serde(default)]
    pub extra_hosts: Vec<String>,

    #[serde(default)]
    pub use_profiles: bool,

    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub healthcheck: HealthcheckSpec,
}

fn default_tag() -> String {
    "latest".to_string()
}

fn default_schema_version() -> String {
    "3.8".to_string()
}

impl DeploymentSpec {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }
}

/// On-disk configuration: the deployment spec plus local invocation
/// settings (compose output path, runtime socket).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub spec: DeploymentSpec,

    #[serde(default = "default_compose_file")]
    pub compose_file: PathBuf,

    /// Docker socket override. Defaults to the standard local socket.
    #[serde(default)]
    pub socket: Option<String>,
}

fn default_compose_file() -> PathBuf {
    PathBuf::from("docker-compose.yml")
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_ALT)];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }
}

pub fn init_config(dir: &Path, app: Option<&str>, image: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let app = match app {
        Some(a) => AppName::new(a).map_err(|e| Error::InvalidConfig(e.to_string()))?,
        None => AppName::new("myapp").expect("template app name is valid"),
    };
    let image = match image {
        Some(i) => ImageRef::parse(i).map_err(|e| Error::InvalidConfig(e.to_string()))?,
        None => ImageRef::parse("my-registry/myapp").expect("template image is valid"),
    };

    let yaml = format!(
        r#"app_name: {}
images:
  - {}
tag: latest
ports:
  - 3000
# env:
#   LOG_LEVEL: info
# volumes:
#   - "data:/var/lib/data"
# healthcheck:
#   mode: http
#   path: auto
"#,
        app, image
    );
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

// Custom deserializers

fn deserialize_app_name<'de, D>(deserializer: D) -> std::result::Result<AppName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    AppName::new(&s).map_err(serde::de::Error::custom)
}

fn deserialize_images<'de, D>(deserializer: D) -> std::result::Result<NonEmpty<ImageRef>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ImageEntry {
        Single(String),
        List(Vec<String>),
    }

    let raw = match ImageEntry::deserialize(deserializer)? {
        ImageEntry::Single(s) => vec![s],
        ImageEntry::List(list) => list,
    };

    let images = raw
        .iter()
        .map(|s| ImageRef::parse(s))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)?;

    NonEmpty::from_vec(images)
        .ok_or_else(|| serde::de::Error::custom("at least one image is required"))
}
