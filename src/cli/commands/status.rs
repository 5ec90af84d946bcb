//! Status command implementation.
//!
//! The `trailfund status` command shows where the wallet stands in the
//! Approve → Donate → Refund pipeline.

use serde::Serialize;

use crate::cli::args::StatusArgs;
use crate::error::Result;
use crate::history::HistoryState;
use crate::pipeline::{Step, StepSequencer, StepStatus};
use crate::ui::UserInterface;
use crate::units::shorten_address;
use crate::wallet::ConnectionState;

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};
use super::display;

/// One step in the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub number: u32,
    pub name: &'static str,
    pub title: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

/// Machine-readable status.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub wallet: Option<String>,
    pub connection: &'static str,
    pub history: &'static str,
    pub current_step: u32,
    pub next_step: Option<Step>,
    pub steps: Vec<StepReport>,
}

impl StatusReport {
    pub fn build(
        connection: &ConnectionState,
        history: &HistoryState,
        sequencer: &StepSequencer<'_>,
        symbol: &str,
    ) -> Self {
        Self {
            wallet: connection.address().map(|a| a.to_string()),
            connection: connection.label(),
            history: history.label(),
            current_step: sequencer.current_step(),
            next_step: sequencer.next_executable(),
            steps: sequencer
                .statuses()
                .into_iter()
                .map(|(step, status)| StepReport {
                    number: step.number(),
                    name: step.name(),
                    title: step.title(symbol),
                    status,
                })
                .collect(),
        }
    }
}

/// The status command implementation.
pub struct StatusCommand<'a> {
    context: &'a CommandContext,
    args: StatusArgs,
}

impl<'a> StatusCommand<'a> {
    /// Create a new status command.
    pub fn new(context: &'a CommandContext, args: StatusArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &StatusArgs {
        &self.args
    }
}

impl Command for StatusCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.context.config();
        let symbol = &config.token.symbol;

        let signer = self.context.signer()?;
        let connection = self.context.connect(signer.as_ref())?;
        let trail = self.context.trail()?;
        let tracker = self.context.history(ui, &trail, &connection);
        let sequencer = tracker.sequencer(&connection);

        if self.args.json {
            let report = StatusReport::build(&connection, tracker.state(), &sequencer, symbol);
            display::print_json(ui, &report)?;
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!(
            "Save the Elephants - Crowdfund #{}",
            config.campaign.crowdfund_id
        ));

        match connection.address() {
            Some(address) => ui.message(&format!(
                "Wallet: {} ({})",
                shorten_address(address.as_str()),
                connection.label()
            )),
            None => ui.warning("No wallet connected. Pass --wallet or set TRAILFUND_WALLET."),
        }
        ui.message("");

        display::show_pipeline(ui, &sequencer, symbol, &config.campaign.explorer_url);

        ui.message("");
        display::show_next(ui, &sequencer);

        Ok(CommandResult::success())
    }
}
