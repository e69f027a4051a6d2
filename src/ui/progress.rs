//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::coordinator::{UnitOutcome, UnitStatus};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    /// Create a new spinner (nothing shown until `start`)
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.interactive {
            println!("{} {}", style("✗").red(), message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Per-unit progress for a run.
///
/// Shows an indicatif bar in interactive mode, one status line per unit in CI.
/// Verification stdout is printed as each unit finishes.
pub struct UnitProgress {
    bar: Option<ProgressBar>,
}

impl UnitProgress {
    pub fn new(ctx: &UiContext, total: usize) -> Self {
        let bar = ctx.use_fancy_output().then(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("  {spinner:.green} Verifying  {bar:24.green/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("━╸─"),
            );
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            bar
        });
        Self { bar }
    }

    /// Record a finished unit
    pub fn on_outcome(&self, outcome: &UnitOutcome) {
        let line = status_line(outcome);
        let stdout = match &outcome.status {
            UnitStatus::Ran { stdout, .. } => stdout.trim_end(),
            UnitStatus::Hit => "",
        };

        match &self.bar {
            Some(bar) => {
                if !outcome.is_hit() {
                    bar.println(&line);
                    if !stdout.is_empty() {
                        bar.println(stdout);
                    }
                }
                bar.set_message(outcome.unit.id.clone());
                bar.inc(1);
            }
            None => {
                println!("{}", line);
                if !stdout.is_empty() {
                    println!("{}", stdout);
                }
            }
        }
    }

    /// Finish and clear the progress bar.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

fn status_line(outcome: &UnitOutcome) -> String {
    match &outcome.status {
        UnitStatus::Hit => format!(
            "  {} {} {}",
            style("[HIT]").dim(),
            outcome.unit.id,
            style(outcome.checksum.short()).dim()
        ),
        UnitStatus::Ran { evicted, .. } => {
            let mut line = format!(
                "  {} {} {}",
                style("[RUN]").green(),
                outcome.unit.id,
                style(outcome.checksum.short()).dim()
            );
            if !evicted.is_empty() {
                line.push_str(&format!(" (evicted {})", evicted.len()));
            }
            line
        }
    }
}
