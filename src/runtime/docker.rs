// ABOUTME: Bollard-based Docker runtime implementation.
// ABOUTME: Maps Docker API status codes onto the typed capability errors.

use crate::runtime::error::RuntimeError;
use crate::runtime::traits::{
    ContainerDetails, ContainerError, ContainerOps, ContainerState, ContainerSummary, ExecError,
    ExecOps, ExecOutput, HealthState, ImageError, ImageOps, LogError, LogOps,
};
use async_trait::async_trait;
use bollard::Docker;
use bollard::exec::StartExecOptions;
use bollard::query_parameters::{
    CreateImageOptions, InspectContainerOptions, KillContainerOptions, ListContainersOptions,
    LogsOptions, StopContainerOptions,
};
use futures::StreamExt;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DOCKER_SOCKET: &str = "/var/run/docker.sock";

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, reference: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(reference.to_string())
        }
        _ => ImageError::PullFailed(format!("{}: {}", reference, e)),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_stop_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_kill_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_exec_create_error(e: bollard::errors::Error) -> ExecError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ExecError::ContainerNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ExecError::ContainerNotRunning(message.clone()),
        _ => ExecError::Runtime(e.to_string()),
    }
}

fn map_logs_error(e: bollard::errors::Error) -> LogError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => LogError::ContainerNotFound(message.clone()),
        _ => LogError::Runtime(e.to_string()),
    }
}

// =============================================================================
// DockerRuntime
// =============================================================================

/// Docker runtime implementation backed by bollard.
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    /// Create a new DockerRuntime from a Docker client.
    pub fn new(client: Docker) -> Self {
        Self { client }
    }

    /// Connect to the local Docker daemon.
    ///
    /// With an explicit `socket`, connects to that Unix socket; otherwise
    /// checks the standard socket path and uses bollard's local defaults.
    pub fn connect(socket: Option<&str>) -> Result<Self, RuntimeError> {
        match socket {
            Some(path) => {
                if !Path::new(path).exists() {
                    return Err(RuntimeError::SocketNotFound {
                        path: path.to_string(),
                    });
                }
                let client = Docker::connect_with_unix(path, 120, bollard::API_DEFAULT_VERSION)
                    .map_err(|e| RuntimeError::ConnectionFailed {
                        message: e.to_string(),
                    })?;
                Ok(Self::new(client))
            }
            None => {
                let client = Docker::connect_with_local_defaults().map_err(|e| {
                    RuntimeError::ConnectionFailed {
                        message: e.to_string(),
                    }
                })?;
                Ok(Self::new(client))
            }
        }
    }

    /// Verify the daemon is reachable.
    pub async fn ping(&self) -> Result<(), RuntimeError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeError::ConnectionFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for DockerRuntime {
    async fn pull_image(&self, reference: &str) -> Result<(), ImageError> {
        let opts = CreateImageOptions {
            from_image: Some(reference.to_string()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let mut stream = self.client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            result.map_err(|e| map_image_pull_error(e, reference))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ContainerOps for DockerRuntime {
    async fn list_containers(
        &self,
        name: &str,
        all: bool,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let mut filter_map: HashMap<String, Vec<String>> = HashMap::new();
        filter_map.insert("name".to_string(), vec![name.to_string()]);

        let opts = ListContainersOptions {
            all,
            filters: Some(filter_map),
            ..Default::default()
        };

        let containers = self
            .client
            .list_containers(Some(opts))
            .await
            .map_err(|e| ContainerError::Runtime(e.to_string()))?;

        // Docker's name filter is a substring match; narrow to exact hits
        Ok(containers
            .into_iter()
            .filter_map(|c| {
                let names = c.names.unwrap_or_default();
                let matched = names
                    .iter()
                    .map(|n| n.trim_start_matches('/'))
                    .find(|n| *n == name)?
                    .to_string();

                Some(ContainerSummary {
                    id: c.id.unwrap_or_default(),
                    name: matched,
                    image: c.image.unwrap_or_default(),
                    state: c
                        .state
                        .map(|s| format!("{:?}", s).to_lowercase())
                        .unwrap_or_default(),
                    status: c.status.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn inspect_container(&self, name: &str) -> Result<ContainerDetails, ContainerError> {
        let details = self
            .client
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
            .map_err(map_container_not_found_error)?;

        let state = details
            .state
            .as_ref()
            .and_then(|s| s.status)
            .map(|s| match s {
                bollard::models::ContainerStateStatusEnum::CREATED => ContainerState::Created,
                bollard::models::ContainerStateStatusEnum::RUNNING => ContainerState::Running,
                bollard::models::ContainerStateStatusEnum::PAUSED => ContainerState::Paused,
                bollard::models::ContainerStateStatusEnum::RESTARTING => ContainerState::Restarting,
                bollard::models::ContainerStateStatusEnum::REMOVING => ContainerState::Removing,
                bollard::models::ContainerStateStatusEnum::EXITED => ContainerState::Exited,
                bollard::models::ContainerStateStatusEnum::DEAD => ContainerState::Dead,
                _ => ContainerState::Exited,
            })
            .unwrap_or(ContainerState::Exited);

        let health = details
            .state
            .as_ref()
            .and_then(|s| s.health.as_ref())
            .and_then(|h| h.status)
            .and_then(|s| match s {
                bollard::models::HealthStatusEnum::STARTING => Some(HealthState::Starting),
                bollard::models::HealthStatusEnum::HEALTHY => Some(HealthState::Healthy),
                bollard::models::HealthStatusEnum::UNHEALTHY => Some(HealthState::Unhealthy),
                _ => None,
            });

        Ok(ContainerDetails {
            name: details
                .name
                .unwrap_or_default()
                .trim_start_matches('/')
                .to_string(),
            state,
            health,
        })
    }

    async fn start_container(&self, name: &str) -> Result<(), ContainerError> {
        self.client
            .start_container(
                name,
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(map_container_start_error)
    }

    async fn stop_container(&self, name: &str, timeout: Duration) -> Result<(), ContainerError> {
        let opts = StopContainerOptions {
            t: Some(timeout.as_secs() as i32),
            signal: None,
        };

        self.client
            .stop_container(name, Some(opts))
            .await
            .map_err(map_container_stop_error)
    }

    async fn kill_container(&self, name: &str) -> Result<(), ContainerError> {
        let opts = KillContainerOptions {
            signal: "SIGKILL".to_string(),
        };

        self.client
            .kill_container(name, Some(opts))
            .await
            .map_err(map_container_kill_error)
    }
}

#[async_trait]
impl ExecOps for DockerRuntime {
    async fn exec(
        &self,
        name: &str,
        command: &[String],
        capture: bool,
    ) -> Result<ExecOutput, ExecError> {
        let config = bollard::models::ExecConfig {
            cmd: Some(command.to_vec()),
            attach_stdout: Some(capture),
            attach_stderr: Some(capture),
            ..Default::default()
        };

        let created = self
            .client
            .create_exec(name, config)
            .await
            .map_err(map_exec_create_error)?;

        let opts = StartExecOptions {
            detach: false,
            ..Default::default()
        };

        let result = self
            .client
            .start_exec(&created.id, Some(opts))
            .await
            .map_err(|e| ExecError::Runtime(e.to_string()))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        if let bollard::exec::StartExecResults::Attached { mut output, .. } = result {
            while let Some(item) = output.next().await {
                match item {
                    Ok(bollard::container::LogOutput::StdOut { message }) => {
                        stdout.extend(message);
                    }
                    Ok(bollard::container::LogOutput::StdErr { message }) => {
                        stderr.extend(message);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        return Err(ExecError::Failed(e.to_string()));
                    }
                }
            }
        }

        // Get exit code from inspect
        let details = self
            .client
            .inspect_exec(&created.id)
            .await
            .map_err(|e| ExecError::Runtime(e.to_string()))?;

        Ok(ExecOutput {
            exit_code: details.exit_code.unwrap_or(0),
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        })
    }
}

#[async_trait]
impl LogOps for DockerRuntime {
    async fn container_logs(&self, name: &str, tail: Option<u64>) -> Result<String, LogError> {
        let opts = LogsOptions {
            stdout: true,
            stderr: true,
            follow: false,
            timestamps: false,
            tail: tail
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };

        let mut stream = self.client.logs(name, Some(opts));

        let mut out = String::new();
        while let Some(result) = stream.next().await {
            let chunk = result.map_err(map_logs_error)?;
            match chunk {
                bollard::container::LogOutput::StdOut { message }
                | bollard::container::LogOutput::StdErr { message }
                | bollard::container::LogOutput::Console { message } => {
                    out.push_str(&String::from_utf8_lossy(&message));
                }
                bollard::container::LogOutput::StdIn { .. } => {}
            }
        }

        Ok(out)
    }
}
