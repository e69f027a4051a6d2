//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// covcache - skip coverage runs for unchanged packages
///
/// Checksums each unit's source directory, re-runs the verification command
/// only for units whose checksum has no cached fragment, and merges all
/// fragments into one coverage profile.
#[derive(Parser, Debug)]
#[command(name = "covcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COVCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .covcache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Cache directory (overrides cache.dir)
    #[arg(long, global = true, visible_alias = "outdir")]
    pub cache_dir: Option<PathBuf>,

    /// Aggregate report path (overrides cache.report)
    #[arg(long, global = true, visible_alias = "coverprofile")]
    pub report: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify changed units and rebuild the report
    Run(RunArgs),

    /// Rebuild the report from cached fragments only
    Merge,

    /// Print the checksum of a directory
    Checksum(ChecksumArgs),

    /// List cached fragments
    List(ListArgs),

    /// Remove all cached fragments
    Clear(ClearArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Maximum units verified at once (default: available cores)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Skip writing the aggregate report
    #[arg(long)]
    pub no_merge: bool,
}

/// Arguments for the checksum command
#[derive(Parser, Debug)]
pub struct ChecksumArgs {
    /// Directory to fingerprint
    pub dir: PathBuf,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one path per line)
    Plain,
}
