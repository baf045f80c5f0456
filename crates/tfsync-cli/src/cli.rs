use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tfsync")]
#[command(about = "tfsync: keep a Terraform Cloud/Enterprise workspace in sync with a declaration")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file
    #[arg(long, global = true, env = "TFSYNC_SETTINGS", default_value = "tfsync.toml")]
    pub settings: PathBuf,

    /// Service address (overrides tfe.address)
    #[arg(long, global = true, env = "TFE_ADDRESS")]
    pub address: Option<String>,

    /// API token (overrides tfe.token)
    #[arg(long, global = true, env = "TFE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// State file holding the observed workspace
    #[arg(long, global = true, default_value = "workspace.tfstate.json")]
    pub state: PathBuf,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or update the workspace to match a declaration
    Apply(ApplyArgs),
    /// Refresh the state file from the remote workspace
    Refresh(ConfigArg),
    /// Adopt an existing workspace into the state file
    Import(ImportArgs),
    /// Delete the workspace and its state file
    Destroy,
    /// Print the state file
    Show(ShowArgs),
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Workspace declaration (TOML)
    #[arg(long)]
    pub config: PathBuf,
}

#[derive(clap::Args)]
pub struct ConfigArg {
    /// Workspace declaration (TOML), used to decide which attributes to track
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ImportArgs {
    /// Workspace identifier: <ORGANIZATION>/<WORKSPACE>
    pub id: String,
    #[command(flatten)]
    pub config: ConfigArg,
}

#[derive(clap::Args)]
pub struct ShowArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}
