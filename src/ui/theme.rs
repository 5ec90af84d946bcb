//! Visual theme and styling.

use console::Style;

use crate::pipeline::StepState;

/// Styles used across trailfund output.
#[derive(Debug, Clone)]
pub struct TrailfundTheme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    /// Active step and links.
    pub info: Style,
    pub dim: Style,
    pub highlight: Style,
    pub header: Style,
    /// Box-drawing borders.
    pub border: Style,
    pub key: Style,
}

impl Default for TrailfundTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailfundTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            border: Style::new().dim(),
            key: Style::new().bold(),
        }
    }

    /// Theme without colors (for non-TTY or `--no-color`).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            border: Style::new(),
            key: Style::new(),
        }
    }

    /// Colored or plain theme depending on the environment.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("🐘"),
            self.highlight.apply_to(title)
        )
    }

    /// Icon and style for a step state.
    pub fn format_state(&self, state: StepState) -> String {
        match state {
            StepState::Completed => self.success.apply_to("✓").to_string(),
            StepState::Active => self.info.apply_to("▶").to_string(),
            StepState::Pending => self.dim.apply_to("○").to_string(),
            StepState::Disabled => self.dim.apply_to("–").to_string(),
        }
    }

    /// A step line: `✓ 1. Approve USDC  completed`.
    pub fn format_step(&self, number: u32, title: &str, state: StepState) -> String {
        let title = match state {
            StepState::Active => self.highlight.apply_to(title).to_string(),
            StepState::Completed => title.to_string(),
            StepState::Pending | StepState::Disabled => self.dim.apply_to(title).to_string(),
        };
        format!(
            "{} {}. {}  {}",
            self.format_state(state),
            number,
            title,
            self.dim.apply_to(state.as_str())
        )
    }
}

/// Whether colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_formats_icons() {
        let theme = TrailfundTheme::plain();
        assert_eq!(theme.format_success("done"), "✓ done");
        assert_eq!(theme.format_warning("careful"), "⚠ careful");
        assert_eq!(theme.format_error("failed"), "✗ failed");
    }

    #[test]
    fn plain_step_line() {
        let theme = TrailfundTheme::plain();
        assert_eq!(
            theme.format_step(2, "Donate to Crowdfund", StepState::Active),
            "▶ 2. Donate to Crowdfund  active"
        );
        assert_eq!(
            theme.format_step(3, "Claim Refund", StepState::Pending),
            "○ 3. Claim Refund  pending"
        );
    }
}
