//! Consistent color theme for terminal output.

use console::Style;
use std::io::IsTerminal;
use std::sync::LazyLock;

/// Global theme instance shared by every command.
pub static THEME: LazyLock<Theme> = LazyLock::new(Theme::default);

#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub error: Style,
    pub warning: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::new().green().bright(),
            error: Style::new().red().bright(),
            warning: Style::new().yellow().bright(),
        }
    }
}

impl Theme {
    pub fn success_with_icon(&self, text: &str) -> String {
        Self::with_icon("✓", &self.success, text)
    }

    pub fn error_with_icon(&self, text: &str) -> String {
        Self::with_icon("✗", &self.error, text)
    }

    pub fn warning_with_icon(&self, text: &str) -> String {
        Self::with_icon("⚠", &self.warning, text)
    }

    /// Check if color output should be disabled.
    pub fn should_disable_colors() -> bool {
        std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal()
    }

    fn with_icon(icon: &str, style: &Style, text: &str) -> String {
        if Self::should_disable_colors() {
            format!("{icon} {text}")
        } else {
            format!("{} {}", style.apply_to(icon), style.apply_to(text))
        }
    }
}
