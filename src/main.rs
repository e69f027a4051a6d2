//! covcache - cached coverage runs
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use covcache::cli::{Cli, Commands};
use covcache::config::{Config, ConfigManager};
use covcache::error::{CovcacheError, CovcacheResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(output) = e.output() {
                eprintln!("{}", style(output).dim());
            }
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CovcacheResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| CovcacheError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let mut config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;
    cli.apply_overrides(&mut config);

    init_logging(cli.verbose, &config);
    if let Some(ref path) = local_config_path {
        debug!("Using local config: {}", path.display());
    }
    covcache::ui::init_theme();

    match cli.command {
        Commands::Run(args) => covcache::cli::commands::run(args, &config).await,
        Commands::Merge => covcache::cli::commands::merge(&config).await,
        Commands::Checksum(args) => covcache::cli::commands::checksum(args).await,
        Commands::List(args) => covcache::cli::commands::list(args, &config).await,
        Commands::Clear(args) => covcache::cli::commands::clear(args, &config).await,
        Commands::Config(args) => {
            covcache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// 0 = warn, 1 (or `general.verbose`) = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 if !config.general.verbose => EnvFilter::new("covcache=warn"),
        0 | 1 => EnvFilter::new("covcache=info"),
        _ => EnvFilter::new("covcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
