//! Mock UI implementation for testing.
//!
//! `MockUI` captures every interaction for later assertion and answers
//! prompts from pre-configured responses.
//!
//! # Example
//!
//! ```
//! use trailfund::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("confirm_donate", "yes");
//!
//! ui.message("Loading campaign");
//! ui.success("Donated");
//!
//! assert!(ui.has_message("Loading"));
//! assert!(ui.successes().contains(&"Donated".to_string()));
//! ```

use std::collections::HashMap;

use crate::error::{Result, TrailfundError};
use crate::pipeline::StepState;

use super::{OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, UserInterface};

/// Captures UI interactions.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    steps: Vec<(u32, String, StepState)>,
    spinners: Vec<String>,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Answer prompts with this key using `response`.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Steps shown, as `(number, title, state)`.
    pub fn steps(&self) -> &[(u32, String, StepState)] {
        &self.steps
    }

    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Whether any message contains `msg`.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    /// All captured text in order of category, for broad assertions.
    pub fn all_output(&self) -> String {
        self.headers
            .iter()
            .chain(&self.messages)
            .chain(&self.successes)
            .chain(&self.warnings)
            .chain(&self.errors)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        let answer = self
            .prompt_responses
            .get(&prompt.key)
            .or(prompt.default.as_ref())
            .cloned()
            .ok_or_else(|| TrailfundError::ConfigValidationError {
                message: format!("MockUI has no response for prompt '{}'", prompt.key),
            })?;

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(PromptResult::String(answer).is_yes()),
            PromptType::Input => PromptResult::String(answer),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner)
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_step(&mut self, number: u32, title: &str, state: StepState, detail: &str) {
        self.steps.push((number, title.to_string(), state));
        if !detail.is_empty() {
            self.messages.push(detail.to_string());
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that does nothing.
pub struct MockSpinner;

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}
    fn finish_success(&mut self, _msg: &str) {}
    fn finish_error(&mut self, _msg: &str) {}
    fn finish_clear(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_output() {
        let mut ui = MockUI::new();
        ui.show_header("Campaign");
        ui.warning("history unavailable");
        ui.error("boom");

        assert_eq!(ui.headers(), &["Campaign".to_string()]);
        assert!(ui.has_warning("unavailable"));
        assert!(ui.has_error("boom"));
        assert!(ui.all_output().contains("Campaign"));
    }

    #[test]
    fn confirm_prompt_uses_response() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("confirm_approve", "no");

        let answer = ui
            .prompt(&Prompt::confirm("confirm_approve", "Approve?"))
            .unwrap();
        assert_eq!(answer, PromptResult::Bool(false));
        assert_eq!(ui.prompts_shown(), &["confirm_approve".to_string()]);
    }

    #[test]
    fn unknown_prompt_fails() {
        let mut ui = MockUI::new();
        assert!(ui.prompt(&Prompt::confirm("x", "?")).is_err());
    }

    #[test]
    fn steps_are_recorded() {
        let mut ui = MockUI::new();
        ui.show_step(1, "Approve USDC", StepState::Active, "");
        assert_eq!(ui.steps()[0].2, StepState::Active);
        assert!(ui.messages().is_empty());
    }
}
