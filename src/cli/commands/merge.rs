//! Merge command - rebuild the report from cached fragments

use crate::config::Config;
use crate::error::CovcacheResult;
use crate::report::ReportMerger;
use crate::ui::{self, UiContext};

/// Execute the merge command
pub async fn execute(config: &Config) -> CovcacheResult<()> {
    let ctx = UiContext::detect();
    write_report(&ctx, config).await
}

/// Merge the cache directory into the configured report and print a summary
pub(crate) async fn write_report(ctx: &UiContext, config: &Config) -> CovcacheResult<()> {
    let merger = ReportMerger::new(&config.cache.mode);
    let summary = merger
        .merge(&config.cache.dir, &config.cache.report)
        .await?;

    for skipped in &summary.skipped {
        ui::step_warn_hint(
            ctx,
            &format!("Skipped unreadable fragment {}", skipped.path.display()),
            &skipped.reason,
        );
    }
    if !summary.mode_mismatches.is_empty() {
        ui::step_warn_hint(
            ctx,
            &format!(
                "{} fragments recorded a mode other than {}",
                summary.mode_mismatches.len(),
                config.cache.mode
            ),
            "Run: covcache clear",
        );
    }

    ui::step_ok_detail(
        ctx,
        &format!(
            "Merged {} fragments ({} lines)",
            summary.fragments, summary.lines
        ),
        &config.cache.report.display().to_string(),
    );
    Ok(())
}
