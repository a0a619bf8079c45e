// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use stakkr::control::{DEFAULT_LOG_LINES, DEFAULT_STOP_TIMEOUT};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stakkr")]
#[command(about = "Provision Docker application stacks: compose generation, pulls, lifecycle")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable JSON lines instead of progress text
    #[arg(long, global = true)]
    pub json: bool,

    /// Docker socket path (overrides config and the default socket)
    #[arg(long, global = true)]
    pub socket: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new stakkr.yml configuration file
    Init {
        /// Application name
        #[arg(short, long)]
        app: Option<String>,

        /// Image reference
        #[arg(short, long)]
        image: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Resolve ports and write the compose file
    Generate {
        /// Output path (defaults to the configured compose_file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail on occupied host ports instead of reassigning them
        #[arg(long)]
        no_auto_assign: bool,
    },

    /// Pull the configured images
    Pull,

    /// Start a service's container
    Start {
        /// Service name (optional when the stack has a single service)
        service: Option<String>,
    },

    /// Stop a service's container
    Stop {
        /// Service name (optional when the stack has a single service)
        service: Option<String>,

        /// Graceful stop timeout in seconds
        #[arg(short, long, default_value_t = DEFAULT_STOP_TIMEOUT.as_secs())]
        timeout: u64,
    },

    /// Run a command inside a service's container
    Exec {
        /// Service name
        service: String,

        /// Command and arguments
        #[arg(required = true, trailing_var_arg = true)]
        command: Vec<String>,
    },

    /// Show the tail of a service's logs
    Logs {
        /// Service name (optional when the stack has a single service)
        service: Option<String>,

        /// Number of lines from the end
        #[arg(short = 'n', long, default_value_t = DEFAULT_LOG_LINES)]
        tail: u64,
    },

    /// Show container status for every service in the stack
    Status,
}
