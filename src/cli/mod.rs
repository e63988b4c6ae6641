//! CLI module for the fleet console
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `servers` - Inspect and manage compute servers (list, add, remove, test, pull)
//! - `workers` - Worker join command
//! - `stats` / `recent` - Document pipeline overview
//! - `images` - Image metadata, download and analysis
//! - `watch` - Live dashboard with periodic polling
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Point at a backend and list servers
//! fleet --api-url http://10.0.0.2:8000 servers list
//!
//! # Print the worker join command for server 3, pipe-friendly
//! fleet workers command --server 3 --raw
//!
//! # Generate shell completions
//! fleet completions bash > ~/.bash_completion.d/fleet
//! ```

pub mod archive;
pub mod completions;
pub mod config;
pub mod output;
pub mod servers;
pub mod watch;
pub mod workers;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::FleetConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Fleet console - operate a pool of remote inference servers
#[derive(Parser, Debug)]
#[command(
    name = "fleet",
    version,
    about = "Operator console for a pool of remote inference servers"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to configuration file (defaults apply when absent)
    #[arg(short, long, global = true, env = "FLEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the fleet API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage compute servers
    #[command(subcommand)]
    Servers(ServersCommands),
    /// Worker utilities
    #[command(subcommand)]
    Workers(WorkersCommands),
    /// Show document processing stats
    Stats(StatsArgs),
    /// Show recently ingested files
    Recent(RecentArgs),
    /// Inspect archived images
    #[command(subcommand)]
    Images(ImagesCommands),
    /// Live dashboard
    Watch(WatchArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Subcommand, Debug)]
pub enum ServersCommands {
    /// List compute servers
    List(ServersListArgs),
    /// Register a new server
    Add(ServersAddArgs),
    /// Remove a server (refused while workers are attached)
    Remove(ServerIdArgs),
    /// Trigger a health probe on one server
    Test(ServerIdArgs),
    /// Trigger health probes on every server
    TestAll,
    /// Start a model download on a server
    Pull(ServersPullArgs),
}

#[derive(Args, Debug)]
pub struct ServersListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show capabilities, models and status messages
    #[arg(short, long)]
    pub detail: bool,
}

#[derive(Args, Debug)]
pub struct ServersAddArgs {
    /// Display name
    pub name: String,

    /// Server URL (e.g., http://10.0.0.5:11434)
    pub url: String,

    /// Scheduling priority, 0 to 100
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    pub priority: i64,
}

#[derive(Args, Debug)]
pub struct ServerIdArgs {
    /// Server id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ServersPullArgs {
    /// Server id
    pub id: String,

    /// Model name (e.g., llama3.2:3b)
    pub model: String,
}

#[derive(Subcommand, Debug)]
pub enum WorkersCommands {
    /// Show the command that attaches a new worker machine
    Command(WorkersCommandArgs),
}

#[derive(Args, Debug)]
pub struct WorkersCommandArgs {
    /// Scope the command to one server
    #[arg(short, long)]
    pub server: Option<String>,

    /// Worker name to embed in the command
    #[arg(short, long)]
    pub name: Option<String>,

    /// Print only the command, without notes
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RecentArgs {
    /// Number of files to show
    #[arg(short = 'n', long, default_value_t = crate::archive::DEFAULT_RECENT_LIMIT)]
    pub limit: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ImagesCommands {
    /// Show image metadata and description
    Show(ImageIdArgs),
    /// Download the full image
    Fetch(ImagesFetchArgs),
    /// Request an AI description (returns immediately)
    Analyze(ImageIdArgs),
}

#[derive(Args, Debug)]
pub struct ImageIdArgs {
    /// Image id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ImagesFetchArgs {
    /// Image id
    pub id: String,

    /// Output file path
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Override polling interval in seconds
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9464)
    #[arg(long)]
    pub metrics_listen: Option<std::net::SocketAddr>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "fleet.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load configuration with CLI overrides.
///
/// An explicitly named file must exist; without one, defaults apply.
pub fn load_config_with_overrides(
    args: &GlobalArgs,
) -> Result<FleetConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => FleetConfig::load(Some(path))?,
        None => {
            tracing::debug!("No config file given, using defaults");
            FleetConfig::default()
        }
    };

    config = config.with_env_overrides();

    if let Some(ref url) = args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}
