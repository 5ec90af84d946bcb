//! UI for pipes and CI.

use std::collections::HashMap;

use crate::error::{Result, TrailfundError};
use crate::pipeline::StepState;

use super::{
    OutputMode, ProgressSpinner, Prompt, PromptResult, PromptType, SpinnerHandle, TrailfundTheme,
    UserInterface,
};

const PROMPT_ENV_PREFIX: &str = "TRAILFUND_PROMPT_";

/// Plain-text UI. Prompts are answered from `TRAILFUND_PROMPT_<KEY>`
/// variables or the prompt default, and fail otherwise.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: TrailfundTheme,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();
        Self::with_overrides(mode, env_overrides)
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            theme: TrailfundTheme::plain(),
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        let answer = self
            .env_overrides
            .get(&env_key)
            .or(prompt.default.as_ref())
            .cloned();

        match (answer, &prompt.prompt_type) {
            (Some(value), PromptType::Confirm) => {
                Ok(PromptResult::Bool(PromptResult::String(value).is_yes()))
            }
            (Some(value), PromptType::Input) => Ok(PromptResult::String(value)),
            (None, _) => Err(TrailfundError::ConfigValidationError {
                message: format!(
                    "Cannot prompt for '{}' in non-interactive mode (set {} or pass --yes)",
                    prompt.key, env_key
                ),
            }),
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        tracing::debug!("{}", message);
        Box::new(ProgressSpinner::hidden())
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_step(&mut self, number: u32, title: &str, state: StepState, detail: &str) {
        if !self.mode.shows_status() {
            return;
        }
        println!("  {}", self.theme.format_step(number, title, state));
        if !detail.is_empty() {
            println!("      {}", detail);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
