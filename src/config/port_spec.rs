// ABOUTME: Port specification for a service: bare port or host:container pair.
// ABOUTME: Accepts integers or "host:container" strings at the YAML boundary.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortSpecError {
    #[error("invalid port specification: {0}")]
    Invalid(String),
}

/// A published port for one service.
///
/// `Bare(p)` maps `p:p`; `Pair` honors the `host:container` split verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Bare(u16),
    Pair { host: u16, container: u16 },
}

impl PortSpec {
    pub fn parse(input: &str) -> Result<Self, PortSpecError> {
        let input = input.trim();
        match input.split_once(':') {
            Some((host, container)) => {
                let host = host
                    .parse::<u16>()
                    .map_err(|_| PortSpecError::Invalid(input.to_string()))?;
                let container = container
                    .parse::<u16>()
                    .map_err(|_| PortSpecError::Invalid(input.to_string()))?;
                Ok(PortSpec::Pair { host, container })
            }
            None => input
                .parse::<u16>()
                .map(PortSpec::Bare)
                .map_err(|_| PortSpecError::Invalid(input.to_string())),
        }
    }

    /// Port bound on the host side.
    pub fn host_port(&self) -> u16 {
        match self {
            PortSpec::Bare(p) => *p,
            PortSpec::Pair { host, .. } => *host,
        }
    }

    /// Port the service listens on inside the container.
    pub fn container_port(&self) -> u16 {
        match self {
            PortSpec::Bare(p) => *p,
            PortSpec::Pair { container, .. } => *container,
        }
    }

    /// Replace the host side, keeping the container side. Used when a
    /// conflicting host port is reassigned.
    pub fn with_host_port(&self, host: u16) -> PortSpec {
        PortSpec::Pair {
            host,
            container: self.container_port(),
        }
    }

    /// The `host:container` line emitted into the compose ports block.
    pub fn mapping(&self) -> String {
        format!("{}:{}", self.host_port(), self.container_port())
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::Bare(p) => write!(f, "{}", p),
            PortSpec::Pair { host, container } => write!(f, "{}:{}", host, container),
        }
    }
}

impl<'de> Deserialize<'de> for PortSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u16),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(p) => Ok(PortSpec::Bare(p)),
            Raw::Text(s) => PortSpec::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}
