//! Terminal user interface.
//!
//! This module provides:
//! - [`UserInterface`] trait so commands can be tested against [`MockUI`]
//! - [`TerminalUI`] for interactive terminals
//! - [`NonInteractiveUI`] for pipes and CI
//! - Prompts, spinners, tables, and progress bars
//!
//! # Example
//!
//! ```
//! use trailfund::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("Save the Elephants");
//! ui.success("Donation recorded");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod progress;
pub mod prompts;
pub mod spinner;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use progress::{format_relative_time, render_bar};
pub use prompts::prompt_user;
pub use spinner::ProgressSpinner;
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, TrailfundTheme};

use crate::error::Result;
use crate::pipeline::StepState;

/// Everything a command may do with the terminal.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    /// Plain line of output.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Errors are shown in every output mode.
    fn error(&mut self, msg: &str);

    /// Ask the user something.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Start a spinner for a network round trip.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    fn show_header(&mut self, title: &str);

    /// One pipeline step with its state, e.g. `✓ 1. Approve USDC`.
    fn show_step(&mut self, number: u32, title: &str, state: StepState, detail: &str);

    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    fn set_message(&mut self, msg: &str);

    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);

    /// Remove the spinner without a final line.
    fn finish_clear(&mut self);
}

/// A question for the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Key for non-interactive overrides (`TRAILFUND_PROMPT_<KEY>`).
    pub key: String,
    pub question: String,
    pub prompt_type: PromptType,
    pub default: Option<String>,
}

impl Prompt {
    /// A yes/no question without a default.
    pub fn confirm(key: &str, question: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            question: question.into(),
            prompt_type: PromptType::Confirm,
            default: None,
        }
    }

    /// A free-text question.
    pub fn input(key: &str, question: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            question: question.into(),
            prompt_type: PromptType::Input,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptType {
    Confirm,
    Input,
}

/// Answer to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Bool(bool),
    String(String),
}

impl PromptResult {
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Interpret as yes/no; strings like `y`, `yes`, and `true` count as yes.
    pub fn is_yes(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => matches!(s.trim().to_lowercase().as_str(), "y" | "yes" | "true"),
        }
    }
}
