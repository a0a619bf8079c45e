// ABOUTME: Entry point for the stakkr CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use stakkr::compose;
use stakkr::config::{self, Config, DeploymentSpec};
use stakkr::control::Controller;
use stakkr::diagnostics::Diagnostics;
use stakkr::error::{Error, Result};
use stakkr::output::{Output, OutputMode};
use stakkr::ports;
use stakkr::puller::ImagePuller;
use stakkr::runtime::DockerRuntime;
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Normal
    };
    let out = Output::new(mode);

    if let Err(e) = run(cli, &out).await {
        out.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, out: &Output) -> Result<()> {
    match cli.command {
        Commands::Init { app, image, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, app.as_deref(), image.as_deref(), force)?;
            out.result(&format!("wrote {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Generate {
            output,
            no_auto_assign,
        } => {
            let config = load_config()?;
            let mut diag = Diagnostics::default();
            let spec = resolve_ports(config.spec, !no_auto_assign, &mut diag)?;

            let path = output.unwrap_or(config.compose_file);
            compose::generate(&spec, &path)?;

            for warning in diag.warnings() {
                out.warning(&warning.message);
            }
            out.result(&format!("wrote compose file: {}", path.display()));
            Ok(())
        }
        Commands::Pull => {
            let config = load_config()?;
            let runtime = connect(&cli.socket, &config)?;
            let mut diag = Diagnostics::default();

            out.progress(&format!(
                "pulling {} image(s)...",
                config.spec.images.len()
            ));
            let images: Vec<_> = config.spec.images.iter().cloned().collect();
            ImagePuller::default()
                .pull_all(&runtime, &images, &config.spec.tag, false, &mut diag)
                .await?;

            for warning in diag.warnings() {
                out.warning(&warning.message);
            }
            out.result("pull complete");
            Ok(())
        }
        Commands::Start { service } => {
            let config = load_config()?;
            let runtime = connect(&cli.socket, &config)?;
            let name = container_for(&config.spec, service.as_deref())?;

            out.progress(&format!("starting {}...", name));
            Controller::default().start(&runtime, &name).await?;
            out.result(&format!("{} started", name));
            Ok(())
        }
        Commands::Stop { service, timeout } => {
            let config = load_config()?;
            let runtime = connect(&cli.socket, &config)?;
            let name = container_for(&config.spec, service.as_deref())?;

            out.progress(&format!("stopping {}...", name));
            Controller::default()
                .stop(&runtime, &name, Duration::from_secs(timeout))
                .await?;
            out.result(&format!("{} stopped", name));
            Ok(())
        }
        Commands::Exec { service, command } => {
            let config = load_config()?;
            let runtime = connect(&cli.socket, &config)?;
            let name = container_for(&config.spec, Some(&service))?;

            let output = Controller::default()
                .exec(&runtime, &name, &command, true)
                .await?;
            if let Some(stdout) = output {
                print!("{stdout}");
            }
            Ok(())
        }
        Commands::Logs { service, tail } => {
            let config = load_config()?;
            let runtime = connect(&cli.socket, &config)?;
            let name = container_for(&config.spec, service.as_deref())?;

            let logs = Controller::default().logs(&runtime, &name, tail).await?;
            print!("{logs}");
            Ok(())
        }
        Commands::Status => {
            let config = load_config()?;
            let runtime = connect(&cli.socket, &config)?;
            let controller = Controller::default();

            for descriptor in compose::derive_services(&config.spec) {
                let status = match controller
                    .health(&runtime, &descriptor.container_name)
                    .await
                {
                    Ok(status) => status.to_string(),
                    Err(stakkr::control::ControlError::NotFound(_)) => "absent".to_string(),
                    Err(e) => return Err(e.into()),
                };
                out.result(&format!(
                    "{}\t{}\t{}",
                    descriptor.name, descriptor.container_name, status
                ));
            }
            Ok(())
        }
    }
}

fn load_config() -> Result<Config> {
    let cwd = env::current_dir()?;
    Config::discover(&cwd)
}

fn connect(socket_flag: &Option<String>, config: &Config) -> Result<DockerRuntime> {
    let socket = socket_flag.as_deref().or(config.socket.as_deref());
    Ok(DockerRuntime::connect(socket)?)
}

/// Resolve host-port conflicts before generation, rewriting the spec's
/// ports in place.
fn resolve_ports(
    spec: DeploymentSpec,
    auto_assign: bool,
    diag: &mut Diagnostics,
) -> Result<DeploymentSpec> {
    let mut spec = spec;
    let mut resolved = Vec::with_capacity(spec.ports.len());

    for port in &spec.ports {
        let host_port = port.host_port();
        let assigned = ports::resolve_port_conflict(host_port, auto_assign, "localhost")?;
        if assigned != host_port {
            diag.warn(stakkr::diagnostics::Warning::port_reassigned(
                host_port, assigned,
            ));
            resolved.push(port.with_host_port(assigned));
        } else {
            resolved.push(*port);
        }
    }

    spec.ports = resolved;
    Ok(spec)
}

/// Map an optional service argument to a container name.
fn container_for(spec: &DeploymentSpec, service: Option<&str>) -> Result<String> {
    let descriptors = compose::derive_services(spec);

    match service {
        Some(name) => descriptors
            .iter()
            .find(|d| d.name.as_str() == name)
            .map(|d| d.container_name.clone())
            .ok_or_else(|| Error::InvalidConfig(format!("unknown service: {}", name))),
        None => {
            if descriptors.len() == 1 {
                Ok(descriptors[0].container_name.clone())
            } else {
                Err(Error::InvalidConfig(
                    "multiple services in stack, specify one by name".to_string(),
                ))
            }
        }
    }
}
