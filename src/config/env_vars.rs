// ABOUTME: Typed environment variable input: global map or per-service maps.
// ABOUTME: Malformed input degrades to empty with a warning, never an error.

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Environment variables for a deployment.
///
/// Accepts two YAML shapes in one mapping: scalar values form the global
/// set applied to every service, and nested mappings override the whole
/// set for the service they are keyed by. Resolution is in
/// [`EnvVars::for_service`]: a service-specific map replaces the global
/// set outright, it does not merge with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    global: BTreeMap<String, String>,
    per_service: BTreeMap<String, BTreeMap<String, String>>,
}

impl EnvVars {
    pub fn global(vars: BTreeMap<String, String>) -> Self {
        Self {
            global: vars,
            per_service: BTreeMap::new(),
        }
    }

    pub fn per_service(maps: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self {
            global: BTreeMap::new(),
            per_service: maps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.per_service.is_empty()
    }

    /// Entries to emit for the named service, already formatted `KEY=VALUE`.
    pub fn for_service(&self, service: &str) -> Vec<String> {
        let entries = match self.per_service.get(service) {
            Some(map) => map,
            None => &self.global,
        };
        entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect()
    }

    /// Lenient conversion from an arbitrary YAML value.
    ///
    /// Scalar mapping values land in the global set, mapping values with
    /// scalar leaves become per-service sets. Everything else is dropped
    /// with a warning.
    pub fn from_value(value: serde_yaml::Value) -> Self {
        let mapping = match value {
            serde_yaml::Value::Mapping(m) => m,
            serde_yaml::Value::Null => return Self::default(),
            other => {
                warn!(
                    "ignoring malformed env block (expected mapping, got {})",
                    value_kind(&other)
                );
                return Self::default();
            }
        };

        let mut out = Self::default();
        for (key, value) in mapping {
            let Some(key) = scalar_to_string(&key) else {
                warn!("ignoring env entry with non-scalar key");
                continue;
            };
            match value {
                serde_yaml::Value::Mapping(nested) => {
                    let mut map = BTreeMap::new();
                    for (k, v) in nested {
                        match (scalar_to_string(&k), scalar_to_string(&v)) {
                            (Some(k), Some(v)) => {
                                map.insert(k, v);
                            }
                            _ => warn!(
                                "ignoring non-scalar env entry under service '{}'",
                                key
                            ),
                        }
                    }
                    out.per_service.insert(key, map);
                }
                other => match scalar_to_string(&other) {
                    Some(v) => {
                        out.global.insert(key, v);
                    }
                    None => warn!(
                        "ignoring env entry '{}' with {} value",
                        key,
                        value_kind(&other)
                    ),
                },
            }
        }
        out
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "bool",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

impl<'de> Deserialize<'de> for EnvVars {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_yaml::Value::deserialize(deserializer)?;
        Ok(EnvVars::from_value(value))
    }
}
