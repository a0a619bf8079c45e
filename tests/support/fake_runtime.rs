// ABOUTME: In-memory container runtime implementing the capability traits.
// ABOUTME: Scripted failures and recorded calls, no Docker daemon required.

use async_trait::async_trait;
use stakkr::runtime::{
    ContainerDetails, ContainerError, ContainerOps, ContainerState, ContainerSummary, ExecError,
    ExecOps, ExecOutput, HealthState, ImageError, ImageOps, LogError, LogOps,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted outcome for one pull attempt.
#[derive(Debug, Clone)]
pub enum PullOutcome {
    Ok,
    NotFound,
    Fail(String),
}

/// Scripted outcome for one exec invocation.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub exit_code: i64,
    pub stdout: String,
}

#[derive(Debug, Clone)]
struct FakeContainer {
    name: String,
    image: String,
    state: ContainerState,
    health: Option<HealthState>,
}

#[derive(Default)]
struct State {
    containers: Vec<FakeContainer>,
    pull_scripts: HashMap<String, VecDeque<PullOutcome>>,
    pull_calls: Vec<String>,
    start_failures: VecDeque<String>,
    start_calls: usize,
    stop_fails: bool,
    kill_fails: bool,
    exec_scripts: VecDeque<ExecOutcome>,
    logs: HashMap<String, String>,
}

/// Fake runtime for tests. All state behind one mutex; clones of scripted
/// data go out, recorded calls accumulate.
#[derive(Default)]
pub struct FakeRuntime {
    state: Mutex<State>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container in the given state.
    pub fn add_container(&self, name: &str, state: ContainerState, health: Option<HealthState>) {
        self.state.lock().unwrap().containers.push(FakeContainer {
            name: name.to_string(),
            image: "test-image:latest".to_string(),
            state,
            health,
        });
    }

    /// Script the outcomes of successive pull attempts for a reference.
    /// Unscripted references succeed.
    pub fn script_pulls(&self, reference: &str, outcomes: Vec<PullOutcome>) {
        self.state
            .lock()
            .unwrap()
            .pull_scripts
            .insert(reference.to_string(), outcomes.into());
    }

    /// Make the next `n` start attempts fail with the given message.
    pub fn fail_starts(&self, n: usize, message: &str) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..n {
            state.start_failures.push_back(message.to_string());
        }
    }

    /// Make graceful stops fail.
    pub fn fail_stop(&self) {
        self.state.lock().unwrap().stop_fails = true;
    }

    /// Make kills fail too.
    pub fn fail_kill(&self) {
        self.state.lock().unwrap().kill_fails = true;
    }

    /// Script the outcome of the next exec invocation.
    pub fn script_exec(&self, outcome: ExecOutcome) {
        self.state.lock().unwrap().exec_scripts.push_back(outcome);
    }

    /// Set the full log text for a container.
    pub fn set_logs(&self, name: &str, text: &str) {
        self.state
            .lock()
            .unwrap()
            .logs
            .insert(name.to_string(), text.to_string());
    }

    /// References passed to pull_image, in order.
    pub fn pull_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().pull_calls.clone()
    }

    /// Number of start_container invocations.
    pub fn start_calls(&self) -> usize {
        self.state.lock().unwrap().start_calls
    }

    /// Current state of a registered container.
    pub fn container_state(&self, name: &str) -> Option<ContainerState> {
        self.state
            .lock()
            .unwrap()
            .containers
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.state)
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn pull_image(&self, reference: &str) -> Result<(), ImageError> {
        let mut state = self.state.lock().unwrap();
        state.pull_calls.push(reference.to_string());

        let outcome = state
            .pull_scripts
            .get_mut(reference)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(PullOutcome::Ok);

        match outcome {
            PullOutcome::Ok => Ok(()),
            PullOutcome::NotFound => Err(ImageError::NotFound(reference.to_string())),
            PullOutcome::Fail(message) => Err(ImageError::PullFailed(message)),
        }
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn list_containers(
        &self,
        name: &str,
        all: bool,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .containers
            .iter()
            .filter(|c| c.name == name)
            .filter(|c| all || c.state.is_running())
            .map(|c| ContainerSummary {
                id: format!("id-{}", c.name),
                name: c.name.clone(),
                image: c.image.clone(),
                state: format!("{:?}", c.state).to_lowercase(),
                status: String::new(),
            })
            .collect())
    }

    async fn inspect_container(&self, name: &str) -> Result<ContainerDetails, ContainerError> {
        let state = self.state.lock().unwrap();
        state
            .containers
            .iter()
            .find(|c| c.name == name)
            .map(|c| ContainerDetails {
                name: c.name.clone(),
                state: c.state,
                health: c.health,
            })
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))
    }

    async fn start_container(&self, name: &str) -> Result<(), ContainerError> {
        let mut state = self.state.lock().unwrap();
        state.start_calls += 1;

        if let Some(message) = state.start_failures.pop_front() {
            return Err(ContainerError::Runtime(message));
        }

        let container = state
            .containers
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))?;

        if container.state.is_running() {
            return Err(ContainerError::AlreadyRunning(name.to_string()));
        }
        container.state = ContainerState::Running;
        Ok(())
    }

    async fn stop_container(&self, name: &str, _timeout: Duration) -> Result<(), ContainerError> {
        let mut state = self.state.lock().unwrap();
        if state.stop_fails {
            return Err(ContainerError::Runtime("stop timed out".to_string()));
        }

        let container = state
            .containers
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))?;

        if !container.state.is_running() {
            return Err(ContainerError::NotRunning(name.to_string()));
        }
        container.state = ContainerState::Exited;
        Ok(())
    }

    async fn kill_container(&self, name: &str) -> Result<(), ContainerError> {
        let mut state = self.state.lock().unwrap();
        if state.kill_fails {
            return Err(ContainerError::Runtime("kill failed".to_string()));
        }

        let container = state
            .containers
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ContainerError::NotFound(name.to_string()))?;

        if !container.state.is_running() {
            return Err(ContainerError::NotRunning(name.to_string()));
        }
        container.state = ContainerState::Exited;
        Ok(())
    }
}

#[async_trait]
impl ExecOps for FakeRuntime {
    async fn exec(
        &self,
        name: &str,
        _command: &[String],
        capture: bool,
    ) -> Result<ExecOutput, ExecError> {
        let mut state = self.state.lock().unwrap();

        let running = state
            .containers
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.state.is_running())
            .ok_or_else(|| ExecError::ContainerNotFound(name.to_string()))?;
        if !running {
            return Err(ExecError::ContainerNotRunning(name.to_string()));
        }

        let outcome = state.exec_scripts.pop_front().unwrap_or(ExecOutcome {
            exit_code: 0,
            stdout: String::new(),
        });

        Ok(ExecOutput {
            exit_code: outcome.exit_code,
            stdout: if capture { outcome.stdout } else { String::new() },
            stderr: String::new(),
        })
    }
}

#[async_trait]
impl LogOps for FakeRuntime {
    async fn container_logs(&self, name: &str, tail: Option<u64>) -> Result<String, LogError> {
        let state = self.state.lock().unwrap();
        let text = state
            .logs
            .get(name)
            .ok_or_else(|| LogError::ContainerNotFound(name.to_string()))?;

        match tail {
            None => Ok(text.clone()),
            Some(n) => {
                let lines: Vec<&str> = text.lines().collect();
                let start = lines.len().saturating_sub(n as usize);
                Ok(lines[start..].join("\n"))
            }
        }
    }
}
