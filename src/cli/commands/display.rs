//! Shared display helpers.
//!
//! Used by `status`, `history`, and the step commands so the pipeline and
//! transaction links render the same way everywhere.

use serde::Serialize;

use crate::error::{Result, TrailfundError};
use crate::pipeline::{Step, StepSequencer, StepState, StepStatus};
use crate::ui::UserInterface;
use crate::units::{explorer_link, format_date, shorten_address, ExplorerKind};

/// History label for a step number, e.g. "USDC Approval".
pub fn history_label(step_number: u32, symbol: &str) -> String {
    match Step::from_number(step_number) {
        Some(Step::Approve) => format!("{} Approval", symbol),
        Some(Step::Donate) => "Donation".to_string(),
        Some(Step::Refund) => "Refund Claim".to_string(),
        None => format!("Step {}", step_number),
    }
}

/// Block time of a mined transaction, or "Pending".
pub fn block_time(timestamp: Option<i64>) -> String {
    match timestamp {
        Some(ts) => format_date(ts),
        None => "Pending".to_string(),
    }
}

/// Second line under a step in the pipeline view.
pub fn step_detail(
    step: Step,
    status: &StepStatus,
    symbol: &str,
    explorer_url: &str,
    verbose: bool,
) -> String {
    match (status.state, &status.tx_hash) {
        (StepState::Completed, Some(hash)) if verbose => {
            explorer_link(explorer_url, ExplorerKind::Tx, hash)
        }
        (StepState::Completed, Some(hash)) => format!("tx {}", shorten_address(hash)),
        (StepState::Disabled, _) => "Connect a wallet to continue".to_string(),
        _ => step.description(symbol),
    }
}

/// Print all three steps.
pub fn show_pipeline(
    ui: &mut dyn UserInterface,
    sequencer: &StepSequencer<'_>,
    symbol: &str,
    explorer_url: &str,
) {
    let verbose = ui.output_mode().is_verbose();
    for (step, status) in sequencer.statuses() {
        let detail = step_detail(step, &status, symbol, explorer_url, verbose);
        ui.show_step(step.number(), &step.title(symbol), status.state, &detail);
    }
}

/// The command that runs a step, e.g. `trailfund donate <AMOUNT>`.
pub fn step_command(step: Step) -> String {
    if step.requires_amount() {
        format!("trailfund {} <AMOUNT>", step.name())
    } else {
        format!("trailfund {}", step.name())
    }
}

/// Point the user at whatever comes next.
pub fn show_next(ui: &mut dyn UserInterface, sequencer: &StepSequencer<'_>) {
    match sequencer.next_executable() {
        Some(step) => ui.message(&format!("Next: {}", step_command(step))),
        None if sequencer.max_completed_step() > 0 => ui.message("All steps completed."),
        None => {}
    }
}

/// Print `value` as pretty JSON.
pub fn print_json<T: Serialize>(ui: &mut dyn UserInterface, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| TrailfundError::Other(e.into()))?;
    ui.message(&json);
    Ok(())
}
