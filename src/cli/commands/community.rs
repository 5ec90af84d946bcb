//! Community command implementation.
//!
//! The `trailfund community` command shows campaign-wide activity: totals,
//! per-step counts, and the most recent transactions from all donors.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cli::args::CommunityArgs;
use crate::community::{fetch_activity, CommunityActivity};
use crate::error::Result;
use crate::trail::TrailClient;
use crate::ui::{format_relative_time, Table, UserInterface};
use crate::units::{explorer_link, ExplorerKind};

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};
use super::display;

/// The community command implementation.
pub struct CommunityCommand<'a> {
    context: &'a CommandContext,
    args: CommunityArgs,
}

impl<'a> CommunityCommand<'a> {
    /// Create a new community command.
    pub fn new(context: &'a CommandContext, args: CommunityArgs) -> Self {
        Self { context, args }
    }

    fn feed_limit(&self) -> usize {
        self.args
            .limit
            .unwrap_or(self.context.config().community.feed_limit)
    }

    fn load(&self, ui: &mut dyn UserInterface, trail: &TrailClient) -> Result<CommunityActivity> {
        let mut spinner = ui.start_spinner("Loading community activity");
        let activity = fetch_activity(
            trail,
            &self.context.config().token.symbol,
            self.feed_limit(),
        );
        spinner.finish_clear();
        activity
    }

    fn show(&self, ui: &mut dyn UserInterface, activity: &CommunityActivity, now: DateTime<Utc>) {
        let explorer_url = &self.context.config().campaign.explorer_url;

        ui.show_header("Community Activity");
        ui.message(&format!(
            "{} transactions from {} wallets",
            activity.transactions, activity.wallets
        ));

        if !activity.steps.is_empty() {
            let mut table = Table::new(vec!["Step", "Wallets", "Transactions"]);
            for step in &activity.steps {
                table.add_row(vec![
                    step.name.clone(),
                    step.wallets.to_string(),
                    step.transactions.to_string(),
                ]);
            }
            ui.message(&table.render());
        }

        ui.message("");
        if activity.feed.is_empty() {
            ui.message("No activity yet.");
            return;
        }

        ui.message("Recent activity:");
        let verbose = ui.output_mode().is_verbose();
        for entry in &activity.feed {
            let when = DateTime::<Utc>::from_timestamp(entry.block_timestamp, 0)
                .map(|ts| format_relative_time(ts, now))
                .unwrap_or_else(|| "unknown time".to_string());
            ui.message(&format!("  {} - {} - {}", entry.label, entry.actor, when));
            if verbose {
                ui.message(&format!(
                    "    {}",
                    explorer_link(explorer_url, ExplorerKind::Tx, &entry.tx_hash)
                ));
            }
        }
    }
}

impl Command for CommunityCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let trail = self.context.trail()?;

        if self.args.json {
            let activity = self.load(ui, &trail)?;
            display::print_json(ui, &activity)?;
            return Ok(CommandResult::success());
        }

        if !self.args.watch {
            let activity = self.load(ui, &trail)?;
            self.show(ui, &activity, Utc::now());
            return Ok(CommandResult::success());
        }

        let interval = Duration::from_secs(self.context.config().community.refresh_secs);
        loop {
            match self.load(ui, &trail) {
                Ok(activity) => self.show(ui, &activity, Utc::now()),
                Err(e) => ui.warning(&format!("Refresh failed: {}", e)),
            }
            ui.message(&format!(
                "\nRefreshing every {}s. Press Ctrl+C to stop.",
                interval.as_secs()
            ));
            std::thread::sleep(interval);
        }
    }
}
