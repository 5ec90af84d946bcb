//! Terminal UI with colors, spinners and dialoguer prompts.

use std::io::Write;

use console::Term;

use crate::error::Result;
use crate::pipeline::StepState;

use super::{
    prompt_user, NonInteractiveUI, OutputMode, ProgressSpinner, Prompt, PromptResult,
    SpinnerHandle, TrailfundTheme, UserInterface,
};

/// UI for a human at a TTY.
///
/// Status lines go to stdout; warnings and errors go to stderr so that
/// `--json` output stays clean when piped.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: TrailfundTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme: TrailfundTheme::detect(),
            mode,
        }
    }

    fn status_line(&mut self, line: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", line).ok();
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.status_line(msg);
    }

    fn success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.status_line(&line);
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        // Shown even in silent mode.
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        prompt_user(prompt, &self.out)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        let spinner = match self.mode.shows_spinners() {
            true => ProgressSpinner::new(message),
            false => ProgressSpinner::hidden(),
        };
        Box::new(spinner)
    }

    fn show_header(&mut self, title: &str) {
        let header = format!("\n{}\n", self.theme.format_header(title));
        self.status_line(&header);
    }

    fn show_step(&mut self, number: u32, title: &str, state: StepState, detail: &str) {
        let line = format!("  {}", self.theme.format_step(number, title, state));
        self.status_line(&line);
        if !detail.is_empty() {
            let detail = format!("      {}", self.theme.dim.apply_to(detail));
            self.status_line(&detail);
        }
    }

    fn is_interactive(&self) -> bool {
        self.out.is_term()
    }
}

/// Pick the terminal UI when stdout is a TTY and prompting is allowed.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if !interactive || !Term::stdout().is_term() {
        return Box::new(NonInteractiveUI::new(mode));
    }
    Box::new(TerminalUI::new(mode))
}
