//! Run command - verify changed units and rebuild the report

use crate::cache::CacheStore;
use crate::cli::args::RunArgs;
use crate::cli::commands::merge::write_report;
use crate::config::Config;
use crate::coordinator::Coordinator;
use crate::error::{CovcacheError, CovcacheResult};
use crate::runner::CommandRunner;
use crate::ui::{self, TaskSpinner, UiContext, UnitProgress};
use crate::units::{CommandUnitSource, UnitSource};
use std::env;
use std::sync::Arc;
use tracing::debug;

/// Execute the run command
pub async fn execute(args: RunArgs, config: &Config) -> CovcacheResult<()> {
    let ctx = UiContext::detect();
    let cwd = env::current_dir().map_err(|e| CovcacheError::io("getting current directory", e))?;

    let source = Arc::new(CommandUnitSource::from_config(&config.units, cwd)?);
    let runner = Arc::new(CommandRunner::from_config(&config.runner, &config.cache.mode)?);
    let store = Arc::new(CacheStore::new(&config.cache.dir));
    let parallel = args
        .parallel
        .unwrap_or_else(|| config.cache.effective_parallel());

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Listing units...");
    let units = match source.list().await {
        Ok(units) => units,
        Err(e) => {
            spinner.stop_error("Listing units failed");
            return Err(e);
        }
    };
    spinner.stop(&format!("Found {} units", units.len()));
    debug!("Units: {:?}", units);

    let coordinator = Coordinator::new(store, source, runner, parallel);
    let progress = UnitProgress::new(&ctx, units.len());
    let result = coordinator
        .run_all(units, |outcome| progress.on_outcome(outcome))
        .await;
    progress.finish();
    let summary = result?;

    ui::step_ok(
        &ctx,
        &format!(
            "{} unchanged, {} verified",
            summary.hits(),
            summary.ran()
        ),
    );

    if args.no_merge {
        return Ok(());
    }
    write_report(&ctx, config).await
}
