// ABOUTME: Service descriptor derivation from a deployment spec.
// ABOUTME: Name derivation, port zipping, env resolution, volume inference.

use crate::config::{DeploymentSpec, HealthcheckMode, PortSpec};
use crate::types::ServiceName;

/// Default container port for multi-image services whose position has no
/// entry in the ports list.
pub const DEFAULT_SERVICE_PORT: u16 = 3000;

/// Derived per-image configuration, ready for emission.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub name: ServiceName,
    /// Fully qualified `image:tag` reference.
    pub image: String,
    pub container_name: String,
    /// `None` only on the single-image path with no ports configured.
    pub port: Option<PortSpec>,
    /// `KEY=VALUE` entries resolved for this service.
    pub env: Vec<String>,
}

/// Derive one descriptor per image.
///
/// The multi-image path zips images with ports (default port when the
/// ports list is shorter) and derives names from the image references; a
/// name that collides with an earlier service falls back to its
/// positional name so service keys stay unique. The single-image path
/// uses the fixed name `app` and only maps a port when one is configured.
pub fn derive_services(spec: &DeploymentSpec) -> Vec<ServiceDescriptor> {
    let multi = spec.images.len() > 1;
    let mut services: Vec<ServiceDescriptor> = Vec::with_capacity(spec.images.len());

    for (index, image) in spec.images.iter().enumerate() {
        let name = if multi {
            let derived = ServiceName::derive(image, index);
            if services.iter().any(|s| s.name == derived) {
                ServiceName::fallback(index)
            } else {
                derived
            }
        } else {
            ServiceName::app()
        };

        let port = if multi {
            Some(
                spec.ports
                    .get(index)
                    .copied()
                    .unwrap_or(PortSpec::Bare(DEFAULT_SERVICE_PORT)),
            )
        } else {
            spec.ports.first().copied()
        };

        let env = spec.env.for_service(name.as_str());
        let container_name = spec.app_name.container_name(&name);

        services.push(ServiceDescriptor {
            name,
            image: image.qualified(&spec.tag),
            container_name,
            port,
            env,
        });
    }

    services
}

/// Extract the distinct named volumes referenced by the mount specs.
///
/// The source token is everything before the first `:`. Relative sources
/// (`./...`, exactly `.`) and absolute sources (`/...`) are host paths,
/// not named volumes. Order of first appearance is preserved.
pub fn named_volumes(mounts: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for mount in mounts {
        let source = mount.split(':').next().unwrap_or(mount);
        if source.is_empty()
            || source == "."
            || source.starts_with("./")
            || source.starts_with('/')
        {
            continue;
        }
        if !names.iter().any(|n| n == source) {
            names.push(source.to_string());
        }
    }
    names
}

/// Build the health probe command for a service, or `None` when the check
/// is not materialized or the service has no port to probe.
pub fn healthcheck_test(spec: &DeploymentSpec, port: Option<PortSpec>) -> Option<Vec<String>> {
    if !spec.healthcheck.materialized() {
        return None;
    }
    let container_port = port?.container_port();

    let command = match spec.healthcheck.mode {
        HealthcheckMode::Http => format!(
            "wget --spider -q http://localhost:{}{} || exit 1",
            container_port,
            spec.healthcheck.resolved_path()
        ),
        HealthcheckMode::Tcp => format!(
            "bash -c 'cat < /dev/null > /dev/tcp/localhost/{}' || exit 1",
            container_port
        ),
        HealthcheckMode::None | HealthcheckMode::External => return None,
    };

    Some(vec!["CMD-SHELL".to_string(), command])
}
