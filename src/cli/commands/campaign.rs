//! Campaign command implementation.
//!
//! The `trailfund campaign` command shows crowdfund progress and, with a
//! wallet, the user's balance, donation, and refund eligibility.

use serde::Serialize;

use crate::campaign::{
    CampaignReader, CampaignSnapshot, CampaignStatus, RefundEligibility, UserPosition,
};
use crate::cli::args::CampaignArgs;
use crate::error::Result;
use crate::pipeline::{Step, StepState};
use crate::ui::{render_bar, UserInterface};
use crate::units::{explorer_link, format_date, shorten_address, ExplorerKind, TokenAmount};

use super::context::{now, CommandContext};
use super::dispatcher::{Command, CommandResult};
use super::display;

/// Machine-readable campaign view.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignReport {
    pub crowdfund_id: String,
    #[serde(flatten)]
    pub campaign: CampaignSnapshot,
    pub status: CampaignStatus,
    pub progress_percentage: f64,
    pub ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<UserPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund: Option<RefundEligibility>,
}

/// The campaign command implementation.
pub struct CampaignCommand<'a> {
    context: &'a CommandContext,
    args: CampaignArgs,
}

impl<'a> CampaignCommand<'a> {
    /// Create a new campaign command.
    pub fn new(context: &'a CommandContext, args: CampaignArgs) -> Self {
        Self { context, args }
    }

    fn amount(&self, amount: TokenAmount) -> String {
        let token = &self.context.config().token;
        format!(
            "{} {}",
            amount.format(token.decimals, token.display_decimals),
            token.symbol
        )
    }

    fn show(&self, ui: &mut dyn UserInterface, report: &CampaignReport) {
        let config = self.context.config();
        let token = &config.token;
        let campaign = &report.campaign;

        ui.show_header(&format!("Crowdfund #{}", report.crowdfund_id));
        ui.message(&format!(
            "Raised: {} / {} {}",
            campaign.total_raised.format_whole(token.decimals),
            campaign.goal.format_whole(token.decimals),
            token.symbol
        ));
        ui.message(&format!(
            "{} {:.1}%",
            render_bar(report.progress_percentage, 30),
            report.progress_percentage
        ));
        ui.message(&format!("Donors: {}", campaign.donors));

        let end = format_date(campaign.end_timestamp);
        if report.ended {
            ui.message(&format!("Ended: {}", end));
        } else {
            ui.message(&format!("Ends: {}", end));
        }
        ui.message(&format!("Status: {}", report.status));
        if campaign.cancelled {
            ui.warning("This crowdfund was cancelled by its creator.");
        }

        if !campaign.creator.is_empty() {
            let creator = if ui.output_mode().is_verbose() {
                explorer_link(
                    &config.campaign.explorer_url,
                    ExplorerKind::Wallet,
                    &campaign.creator,
                )
            } else {
                shorten_address(&campaign.creator)
            };
            ui.message(&format!("Creator: {}", creator));
        }

        if let Some(position) = &report.position {
            ui.message("");
            ui.message(&format!("Your balance: {}", self.amount(position.balance)));
            ui.message(&format!("Your donation: {}", self.amount(position.donation)));
        }

        if let Some(refund) = report.refund {
            if refund.is_eligible() {
                ui.success(refund.message());
                ui.message(&format!("Claim it with: {}", display::step_command(Step::Refund)));
            } else if report.ended {
                ui.message(refund.message());
            }
        }
    }
}

impl Command for CampaignCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.context.config();
        let trail = self.context.trail()?;
        let rpc = self.context.rpc()?;
        let reader = CampaignReader::new(&trail, config).with_rpc(rpc.as_ref());

        let mut spinner = ui.start_spinner("Loading campaign");
        let campaign = reader.campaign();
        spinner.finish_clear();
        let campaign = campaign?;

        let signer = self.context.signer()?;
        let connection = self.context.connect(signer.as_ref())?;
        let (position, refund) = match connection.address() {
            Some(wallet) => {
                let position = reader.position(wallet)?;
                let tracker = self.context.history(ui, &trail, &connection);
                let refund_completed = tracker.sequencer(&connection).status_of(Step::Refund).state
                    == StepState::Completed;
                let refund =
                    RefundEligibility::evaluate(&campaign, &position, refund_completed, now());
                (Some(position), Some(refund))
            }
            None => (None, None),
        };

        let now = now();
        let report = CampaignReport {
            crowdfund_id: config.campaign.crowdfund_id.clone(),
            status: campaign.status(now),
            progress_percentage: campaign.progress_percentage(),
            ended: campaign.is_ended(now),
            campaign,
            position,
            refund,
        };

        if self.args.json {
            display::print_json(ui, &report)?;
        } else {
            self.show(ui, &report);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrailfundConfig;
    use crate::ui::MockUI;
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    const WALLET: &str = "0x1111111111111111111111111111111111111111";

    fn read(server: &MockServer, node_id: &str, outputs: Value) {
        server.mock(|when, then| {
            when.method(POST).path_includes(format!("/nodes/{}/read", node_id));
            then.status(200).json_body(json!({ "outputs": outputs }));
        });
    }

    fn setup(server: &MockServer, end: i64) -> TrailfundConfig {
        let mut config = TrailfundConfig::default();
        config.trail.base_url = server.base_url();
        read(
            server,
            &config.reads.crowdfund_details,
            json!({
                "goal": {"value": "1000000000"},
                "totalRaised": {"value": "250000000"},
                "endTimestamp": {"value": end},
                "creator": {"value": "0x3333333333333333333333333333333333333333"},
                "fundsClaimed": {"value": false},
                "cancelled": {"value": false}
            }),
        );
        read(server, &config.reads.donors_count, json!([{"value": "7"}]));
        config
    }

    #[test]
    fn shows_progress_without_wallet() {
        let server = MockServer::start();
        let ctx = CommandContext::from_config(setup(&server, now() + 3_600));
        let mut ui = MockUI::new();

        CampaignCommand::new(&ctx, CampaignArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert_eq!(ui.headers(), &["Crowdfund #3356".to_string()]);
        assert!(ui.has_message("Raised: 250 / 1000 USDC"));
        assert!(ui.has_message("25.0%"));
        assert!(ui.has_message("Donors: 7"));
        assert!(ui.has_message("Status: Active"));
        assert!(!ui.has_message("Your balance"));
    }

    #[test]
    fn failed_campaign_offers_refund() {
        let server = MockServer::start();
        let mut config = setup(&server, 1);
        config.wallet.address = Some(WALLET.to_string());
        read(&server, &config.reads.token_balance, json!([{"value": "1000000"}]));
        read(&server, &config.reads.user_donation, json!([{"value": "2500000"}]));
        server.mock(|when, then| {
            when.method(POST).path_includes("/executions/query");
            then.status(200).json_body(json!({"walletExecutions": []}));
        });
        let ctx = CommandContext::from_config(config);
        let mut ui = MockUI::new();

        CampaignCommand::new(&ctx, CampaignArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("Status: Failed"));
        assert!(ui.has_message("Your donation: 2.5000 USDC"));
        assert!(ui.successes().iter().any(|s| s.contains("claim a refund")));
        assert!(ui.has_message("Claim it with: trailfund refund"));
    }

    #[test]
    fn json_report() {
        let server = MockServer::start();
        let ctx = CommandContext::from_config(setup(&server, 1));
        let mut ui = MockUI::new();

        CampaignCommand::new(&ctx, CampaignArgs { json: true })
            .execute(&mut ui)
            .unwrap();

        let value: Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(value["crowdfund_id"], "3356");
        assert_eq!(value["status"], "Failed");
        assert_eq!(value["goal"], "1000000000");
        assert_eq!(value["progress_percentage"], 25.0);
        assert!(value.get("position").is_none());
    }
}
