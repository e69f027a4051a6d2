//! Theme for cliclack prompts

use cliclack::ThemeState;
use console::Style;

/// Green-on-dim theme matching the `[HIT]`/`[RUN]` status colors
#[derive(Debug, Clone, Default)]
pub struct CovcacheTheme;

impl cliclack::Theme for CovcacheTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().green(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().green(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().cyan(),
        }
    }
}

/// Install the theme for all prompts
pub fn init_theme() {
    cliclack::set_theme(CovcacheTheme);
}
