//! UI module for consistent CLI output
//!
//! Uses `cliclack` for prompts and log lines, `indicatif` for the per-unit
//! progress bar, and falls back to plain `[OK]`/`[HIT]`/`[RUN]` lines in
//! CI/non-interactive environments so piped output stays readable.

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{step_info, step_ok, step_ok_detail, step_warn_hint};
pub use progress::{TaskSpinner, UnitProgress};
pub use prompts::confirm;
pub use theme::{init_theme, CovcacheTheme};
