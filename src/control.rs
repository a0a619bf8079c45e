// ABOUTME: Container lifecycle control: inspect, start, stop, exec, logs, health.
// ABOUTME: Reconciles requested operations against the runtime-reported state.

use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::runtime::{
    ContainerError, ContainerOps, ExecError, ExecOps, HealthState, LogError, LogOps,
};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const START_BACKOFF: Duration = Duration::from_secs(3);

pub const DEFAULT_LOG_LINES: u64 = 50;
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container not running: {0}")]
    NotRunning(String),

    #[error("command exited with code {code}")]
    CommandFailed { code: i64 },

    #[error("failed to start {name} after {attempts} attempts: {last_error}")]
    StartFailed {
        name: String,
        attempts: u32,
        last_error: String,
    },

    #[error("failed to stop {name}: graceful stop and kill both failed: {last_error}")]
    StopFailed { name: String, last_error: String },

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Observable status of a container, health included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Stopped,
    Running,
    Healthy,
    Unhealthy,
    Starting,
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContainerStatus::Stopped => "stopped",
            ContainerStatus::Running => "running",
            ContainerStatus::Healthy => "healthy",
            ContainerStatus::Unhealthy => "unhealthy",
            ContainerStatus::Starting => "starting",
        };
        write!(f, "{}", s)
    }
}

/// Drives named containers through the runtime capability traits.
pub struct Controller<S: Sleeper = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl Controller {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: TokioSleeper,
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl<S: Sleeper> Controller<S> {
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    /// Whether a container with this exact name exists, running or not.
    pub async fn exists<R: ContainerOps>(
        &self,
        runtime: &R,
        name: &str,
    ) -> Result<bool, ControlError> {
        let containers = runtime
            .list_containers(name, true)
            .await
            .map_err(map_container_error)?;
        Ok(!containers.is_empty())
    }

    /// Whether a container with this exact name is currently running.
    pub async fn is_running<R: ContainerOps>(
        &self,
        runtime: &R,
        name: &str,
    ) -> Result<bool, ControlError> {
        let containers = runtime
            .list_containers(name, false)
            .await
            .map_err(map_container_error)?;
        Ok(!containers.is_empty())
    }

    /// Observable status of the container.
    ///
    /// Health is only meaningful for running containers: anything not
    /// running reports `Stopped`, a running container without a health
    /// check reports `Running`.
    pub async fn health<R: ContainerOps>(
        &self,
        runtime: &R,
        name: &str,
    ) -> Result<ContainerStatus, ControlError> {
        let details = runtime
            .inspect_container(name)
            .await
            .map_err(map_container_error)?;

        if !details.state.is_running() {
            return Ok(ContainerStatus::Stopped);
        }

        Ok(match details.health {
            None => ContainerStatus::Running,
            Some(HealthState::Healthy) => ContainerStatus::Healthy,
            Some(HealthState::Unhealthy) => ContainerStatus::Unhealthy,
            Some(HealthState::Starting) => ContainerStatus::Starting,
        })
    }

    /// Tail of the container's log output.
    pub async fn logs<R: LogOps>(
        &self,
        runtime: &R,
        name: &str,
        lines: u64,
    ) -> Result<String, ControlError> {
        runtime
            .container_logs(name, Some(lines))
            .await
            .map_err(|e| match e {
                LogError::ContainerNotFound(msg) => ControlError::NotFound(msg),
                LogError::Runtime(msg) => ControlError::Runtime(msg),
            })
    }

    /// Run a command inside the container.
    ///
    /// Returns the captured stdout when `capture` is set. A non-zero exit
    /// code is an error carrying that code.
    pub async fn exec<R: ContainerOps + ExecOps>(
        &self,
        runtime: &R,
        name: &str,
        command: &[String],
        capture: bool,
    ) -> Result<Option<String>, ControlError> {
        if !self.is_running(runtime, name).await? {
            return Err(ControlError::NotRunning(name.to_string()));
        }

        let output = runtime
            .exec(name, command, capture)
            .await
            .map_err(|e| match e {
                ExecError::ContainerNotFound(msg) => ControlError::NotFound(msg),
                ExecError::ContainerNotRunning(msg) => ControlError::NotRunning(msg),
                ExecError::Failed(msg) | ExecError::Runtime(msg) => ControlError::Runtime(msg),
            })?;

        if output.exit_code != 0 {
            return Err(ControlError::CommandFailed {
                code: output.exit_code,
            });
        }

        Ok(capture.then_some(output.stdout))
    }

    /// Start the container, retrying transient failures.
    ///
    /// Already running is a no-op; a missing container fails immediately
    /// without retries.
    pub async fn start<R: ContainerOps>(
        &self,
        runtime: &R,
        name: &str,
    ) -> Result<(), ControlError> {
        if self.is_running(runtime, name).await? {
            info!(container = name, "already running");
            return Ok(());
        }

        if !self.exists(runtime, name).await? {
            return Err(ControlError::NotFound(name.to_string()));
        }

        let mut last_error = String::new();
        for attempt in 1..=self.policy.max_attempts {
            match runtime.start_container(name).await {
                Ok(()) => {
                    info!(container = name, attempt, "started container");
                    return Ok(());
                }
                Err(ContainerError::AlreadyRunning(_)) => return Ok(()),
                Err(ContainerError::NotFound(msg)) => {
                    return Err(ControlError::NotFound(msg));
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < self.policy.max_attempts {
                        warn!(
                            container = name,
                            attempt,
                            "start failed ({}), retrying in {:?}",
                            last_error,
                            START_BACKOFF
                        );
                        self.sleeper.sleep(START_BACKOFF).await;
                    }
                }
            }
        }

        Err(ControlError::StartFailed {
            name: name.to_string(),
            attempts: self.policy.max_attempts,
            last_error,
        })
    }

    /// Stop the container gracefully, escalating to a kill on failure.
    ///
    /// Not running is a no-op. Only a failed kill after a failed graceful
    /// stop is fatal.
    pub async fn stop<R: ContainerOps>(
        &self,
        runtime: &R,
        name: &str,
        timeout: Duration,
    ) -> Result<(), ControlError> {
        if !self.is_running(runtime, name).await? {
            info!(container = name, "not running, nothing to stop");
            return Ok(());
        }

        match runtime.stop_container(name, timeout).await {
            Ok(()) => {
                info!(container = name, "stopped container");
                return Ok(());
            }
            Err(ContainerError::NotRunning(_)) => return Ok(()),
            Err(e) => {
                warn!(
                    container = name,
                    "graceful stop failed ({}), escalating to kill", e
                );
            }
        }

        match runtime.kill_container(name).await {
            Ok(()) => {
                info!(container = name, "killed container");
                Ok(())
            }
            Err(ContainerError::NotRunning(_)) => Ok(()),
            Err(e) => Err(ControlError::StopFailed {
                name: name.to_string(),
                last_error: e.to_string(),
            }),
        }
    }
}

fn map_container_error(e: ContainerError) -> ControlError {
    match e {
        ContainerError::NotFound(msg) => ControlError::NotFound(msg),
        ContainerError::NotRunning(msg) => ControlError::NotRunning(msg),
        ContainerError::AlreadyRunning(msg) | ContainerError::Runtime(msg) => {
            ControlError::Runtime(msg)
        }
    }
}
