//! History command implementation.
//!
//! The `trailfund history` command lists the wallet's executions with one
//! row per on-chain step.

use crate::cli::args::HistoryArgs;
use crate::error::Result;
use crate::history::HistoryState;
use crate::pipeline::Execution;
use crate::ui::{Table, UserInterface};
use crate::units::{explorer_link, format_date, shorten_address, ExplorerKind};

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};
use super::display;

/// The history command implementation.
pub struct HistoryCommand<'a> {
    context: &'a CommandContext,
    args: HistoryArgs,
}

impl<'a> HistoryCommand<'a> {
    /// Create a new history command.
    pub fn new(context: &'a CommandContext, args: HistoryArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &HistoryArgs {
        &self.args
    }

    /// Most recent first, limited by `--limit`.
    fn select<'e>(&self, executions: &'e [Execution]) -> Vec<&'e Execution> {
        let mut selected: Vec<&Execution> = executions.iter().collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = self.args.limit {
            selected.truncate(limit);
        }
        selected
    }

    fn execution_table(&self, execution: &Execution, verbose: bool) -> Table {
        let config = self.context.config();
        let mut headers = vec!["Step", "Block time", "Transaction"];
        if verbose {
            headers.push("Explorer");
        }

        let mut steps: Vec<_> = execution.steps.iter().collect();
        steps.sort_by_key(|s| s.step_number);

        let mut table = Table::new(headers);
        for step in steps {
            let mut row = vec![
                display::history_label(step.step_number, &config.token.symbol),
                display::block_time(step.block_timestamp),
                shorten_address(&step.tx_hash),
            ];
            if verbose {
                row.push(explorer_link(
                    &config.campaign.explorer_url,
                    ExplorerKind::Tx,
                    &step.tx_hash,
                ));
            }
            table.add_row(row);
        }
        table
    }
}

impl Command for HistoryCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let signer = self.context.signer()?;
        let connection = self.context.connect(signer.as_ref())?;
        let Some(wallet) = connection.address() else {
            ui.error("No wallet connected. Pass --wallet or set TRAILFUND_WALLET.");
            return Ok(CommandResult::failure(2));
        };

        let trail = self.context.trail()?;
        let tracker = self.context.history(ui, &trail, &connection);

        if let HistoryState::Unavailable(reason) = tracker.state() {
            ui.error(&format!("Could not load history: {}", reason));
            return Ok(CommandResult::failure(1));
        }

        let executions = self.select(tracker.executions());

        if self.args.json {
            display::print_json(ui, &executions)?;
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!(
            "Execution history for {}",
            shorten_address(wallet.as_str())
        ));

        if executions.is_empty() {
            ui.message("No executions yet. Start with: trailfund approve <AMOUNT>");
            return Ok(CommandResult::success());
        }

        let verbose = ui.output_mode().is_verbose();
        for execution in executions {
            ui.message(&format!(
                "Execution {} - started {}",
                execution.id,
                format_date(execution.created_at.timestamp())
            ));
            if execution.steps.is_empty() {
                ui.message("  (no transactions)");
            } else {
                ui.message(&self.execution_table(execution, verbose).render());
            }
            ui.message("");
        }

        Ok(CommandResult::success())
    }
}
