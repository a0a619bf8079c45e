// ABOUTME: Serde model of the compose document built in memory.
// ABOUTME: Serialized in one pass; section order comes from field order.

use crate::types::ServiceName;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Compose health check cadence. The probe command varies per service;
/// the cadence does not.
pub const HEALTHCHECK_INTERVAL: &str = "30s";
pub const HEALTHCHECK_TIMEOUT: &str = "10s";
pub const HEALTHCHECK_RETRIES: u32 = 3;
pub const HEALTHCHECK_START_PERIOD: &str = "60s";

/// The complete compose document for one application stack.
///
/// Built as a value and serialized once, so section ordering is a
/// property of the type rather than of emission sequencing.
#[derive(Debug, Serialize)]
pub struct ComposeDocument {
    pub version: String,
    pub services: ServiceMap,
    pub networks: BTreeMap<String, NetworkDecl>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, VolumeDecl>,
}

/// Insertion-ordered service map keyed by service name.
///
/// Services must appear in image order, which a plain map would lose.
#[derive(Debug, Default)]
pub struct ServiceMap(Vec<(ServiceName, ServiceBlock)>);

impl ServiceMap {
    pub fn insert(&mut self, name: ServiceName, block: ServiceBlock) {
        self.0.push((name, block));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &ServiceName) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ServiceName, &ServiceBlock)> {
        self.0.iter().map(|(n, b)| (n, b))
    }
}

impl Serialize for ServiceMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, block) in &self.0 {
            map.serialize_entry(name.as_str(), block)?;
        }
        map.end()
    }
}

/// One service entry. Field order matches the emitted block order.
#[derive(Debug, Serialize)]
pub struct ServiceBlock {
    pub image: String,
    pub container_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<String>>,
    pub restart: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_hosts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<HealthcheckBlock>,
    pub networks: Vec<String>,
}

/// Health check block with the fixed cadence filled in.
#[derive(Debug, Serialize)]
pub struct HealthcheckBlock {
    pub test: Vec<String>,
    pub interval: String,
    pub timeout: String,
    pub retries: u32,
    pub start_period: String,
}

impl HealthcheckBlock {
    pub fn new(test: Vec<String>) -> Self {
        Self {
            test,
            interval: HEALTHCHECK_INTERVAL.to_string(),
            timeout: HEALTHCHECK_TIMEOUT.to_string(),
            retries: HEALTHCHECK_RETRIES,
            start_period: HEALTHCHECK_START_PERIOD.to_string(),
        }
    }
}

/// Top-level network declaration.
#[derive(Debug, Serialize)]
pub struct NetworkDecl {
    pub name: String,
}

/// Top-level named volume declaration.
#[derive(Debug, Serialize)]
pub struct VolumeDecl {
    pub name: String,
    pub external: bool,
}
