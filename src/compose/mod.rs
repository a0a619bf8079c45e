// ABOUTME: Compose document generation from a deployment spec.
// ABOUTME: Builds the document in memory, serializes once, tightens permissions.

mod document;
mod services;

pub use document::{
    ComposeDocument, HEALTHCHECK_INTERVAL, HEALTHCHECK_RETRIES, HEALTHCHECK_START_PERIOD,
    HEALTHCHECK_TIMEOUT, HealthcheckBlock, NetworkDecl, ServiceBlock, ServiceMap, VolumeDecl,
};
pub use services::{DEFAULT_SERVICE_PORT, ServiceDescriptor, derive_services, named_volumes};

use crate::config::DeploymentSpec;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("I/O error writing compose file: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Build the compose document for a spec.
///
/// Pure derivation: the same spec always yields the same document. The
/// spec is never mutated and nothing is cached between calls.
pub fn build_document(spec: &DeploymentSpec) -> ComposeDocument {
    let network_name = spec.app_name.network_name();
    let descriptors = services::derive_services(spec);

    let mut service_map = ServiceMap::default();
    for descriptor in &descriptors {
        let healthcheck =
            services::healthcheck_test(spec, descriptor.port).map(HealthcheckBlock::new);

        let block = ServiceBlock {
            image: descriptor.image.clone(),
            container_name: descriptor.container_name.clone(),
            profiles: spec.use_profiles.then(|| vec!["app".to_string()]),
            restart: "unless-stopped".to_string(),
            ports: descriptor.port.iter().map(|p| p.mapping()).collect(),
            environment: descriptor.env.clone(),
            volumes: spec.volumes.clone(),
            extra_hosts: spec.extra_hosts.clone(),
            healthcheck,
            networks: vec![network_name.clone()],
        };
        service_map.insert(descriptor.name.clone(), block);
    }

    let mut networks = BTreeMap::new();
    networks.insert(
        network_name.clone(),
        NetworkDecl {
            name: network_name,
        },
    );

    let mut volumes = BTreeMap::new();
    for name in services::named_volumes(&spec.volumes) {
        volumes.insert(
            name.clone(),
            VolumeDecl {
                name,
                external: false,
            },
        );
    }

    ComposeDocument {
        version: spec.schema_version.clone(),
        services: service_map,
        networks,
        volumes,
    }
}

/// Generate the compose file at `output_path`, overwriting it wholesale.
///
/// The parent directory is created and restricted to the owner before the
/// write; the file itself is tightened after. The two permission steps are
/// discrete, so a crash in between can leave a transiently over-permissive
/// file; callers that care must clean up on restart.
pub fn generate(spec: &DeploymentSpec, output_path: &Path) -> Result<(), ComposeError> {
    let document = build_document(spec);

    if let Some(dir) = output_path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
        restrict_permissions(dir, 0o700)?;
    }

    let yaml = serde_yaml::to_string(&document)?;
    fs::write(output_path, yaml)?;
    restrict_permissions(output_path, 0o600)?;

    info!(
        app = %spec.app_name,
        services = document.services.len(),
        path = %output_path.display(),
        "wrote compose file"
    );

    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict_permissions(path: &Path, _mode: u32) -> std::io::Result<()> {
    tracing::debug!(
        "skipping permission tightening on non-unix platform: {}",
        path.display()
    );
    Ok(())
}
