use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::infra::config::DEFAULT_CONFIG_FILE;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
    pub offline: bool,  // global --offline
}

#[derive(Parser)]
#[command(name = "addon-releaser")]
#[command(about = "Assemble .mcaddon and .mcpack release archives from Minecraft Bedrock pack folders")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress confirmation lines and the update notice
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Build archives in memory without writing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Skip the update check
    #[arg(long, global = true)]
    pub offline: bool,
}

impl Cli {
    /// Build a context once, pass everywhere
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
            dry_run: self.dry_run,
            offline: self.offline,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build release archives from a configuration file
    Release(ReleaseArgs),

    /// Write a starter configuration file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ReleaseArgs {
    /// Configuration file (JSON, TOML or YAML)
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Json,
    Toml,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,

    /// File format of the starter config
    #[arg(long, value_enum, default_value_t = ConfigFormat::Json)]
    pub format: ConfigFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; required unless --stdout is set
    #[arg(long, conflicts_with = "stdout")]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
