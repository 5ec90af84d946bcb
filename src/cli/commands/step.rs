//! The `approve`, `donate`, and `refund` commands.
//!
//! All three share one flow: connect through the signer, ask the sequencer
//! whether the step may run, run the step-specific checks (amount limits,
//! campaign state, refund eligibility), confirm, then execute.

use crate::campaign::{CampaignReader, RefundEligibility};
use crate::cli::args::{ApproveArgs, DonateArgs, RefundArgs};
use crate::error::{Result, TrailfundError};
use crate::executor::StepExecutor;
use crate::pipeline::{Step, StepState, StepStatus};
use crate::ui::{Prompt, UserInterface};
use crate::units::{validate_amount, AmountLimit, TokenAmount};
use crate::wallet::WalletAddress;

use super::context::{now, CommandContext};
use super::dispatcher::{Command, CommandResult};
use super::display;

/// What the step-specific checks decided.
enum Preflight {
    Ready {
        amount: Option<TokenAmount>,
        question: String,
    },
    Refused(String),
}

/// One pipeline step as a command.
pub struct StepCommand<'a> {
    context: &'a CommandContext,
    step: Step,
    amount: Option<String>,
    approved: Option<String>,
    yes: bool,
}

impl<'a> StepCommand<'a> {
    pub fn approve(context: &'a CommandContext, args: &ApproveArgs) -> Self {
        Self {
            context,
            step: Step::Approve,
            amount: Some(args.amount.clone()),
            approved: None,
            yes: args.yes,
        }
    }

    pub fn donate(context: &'a CommandContext, args: &DonateArgs) -> Self {
        Self {
            context,
            step: Step::Donate,
            amount: Some(args.amount.clone()),
            approved: args.approved.clone(),
            yes: args.yes,
        }
    }

    pub fn refund(context: &'a CommandContext, args: &RefundArgs) -> Self {
        Self {
            context,
            step: Step::Refund,
            amount: None,
            approved: None,
            yes: args.yes,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    fn format(&self, amount: TokenAmount) -> String {
        let token = &self.context.config().token;
        format!(
            "{} {}",
            amount.format(token.decimals, token.display_decimals),
            token.symbol
        )
    }

    fn entered_amount(&self, limit: AmountLimit) -> Result<TokenAmount> {
        let decimals = self.context.config().token.decimals;
        validate_amount(self.amount.as_deref().unwrap_or(""), decimals, limit)
    }

    fn preflight(
        &self,
        reader: &CampaignReader<'_>,
        wallet: &WalletAddress,
        status: &StepStatus,
    ) -> Result<Preflight> {
        let config = self.context.config();

        match self.step {
            Step::Approve => {
                let balance = reader.token_balance(wallet)?;
                let amount = self.entered_amount(AmountLimit::Balance(balance))?;
                Ok(Preflight::Ready {
                    amount: Some(amount),
                    question: format!(
                        "Approve {} for the crowdfund contract?",
                        self.format(amount)
                    ),
                })
            }
            Step::Donate => {
                let campaign = reader.campaign()?;
                if campaign.is_ended(now()) {
                    return Ok(Preflight::Refused(
                        "This crowdfund has ended. Donations are closed.".to_string(),
                    ));
                }

                let limit = match &self.approved {
                    Some(approved) => {
                        AmountLimit::Approved(TokenAmount::parse(approved, config.token.decimals)?)
                    }
                    None => AmountLimit::Balance(reader.token_balance(wallet)?),
                };
                let amount = self.entered_amount(limit)?;
                Ok(Preflight::Ready {
                    amount: Some(amount),
                    question: format!(
                        "Donate {} to crowdfund #{}?",
                        self.format(amount),
                        config.campaign.crowdfund_id
                    ),
                })
            }
            Step::Refund => {
                let campaign = reader.campaign()?;
                let position = reader.position(wallet)?;
                let eligibility = RefundEligibility::evaluate(
                    &campaign,
                    &position,
                    status.state == StepState::Completed,
                    now(),
                );
                if !eligibility.is_eligible() {
                    return Ok(Preflight::Refused(eligibility.message().to_string()));
                }
                Ok(Preflight::Ready {
                    amount: None,
                    question: format!("Claim a refund of {}?", self.format(position.donation)),
                })
            }
        }
    }
}

impl Command for StepCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.context.config();
        let title = self.step.title(&config.token.symbol);

        let Some(signer) = self.context.signer()? else {
            ui.error(&TrailfundError::NoSigner.to_string());
            return Ok(CommandResult::failure(2));
        };
        let connection = self.context.connect(Some(&signer))?;
        let Some(wallet) = connection.address().cloned() else {
            ui.error(&format!("Could not connect to a wallet at {}", signer.url()));
            return Ok(CommandResult::failure(2));
        };

        let trail = self.context.trail()?;
        let rpc = self.context.rpc()?;
        let mut tracker = self.context.history(ui, &trail, &connection);

        let status = tracker.sequencer(&connection).status_of(self.step);
        if !status.can_execute {
            ui.error(&format!("{} is {}; finish the earlier steps first.", title, status.state));
            display::show_next(ui, &tracker.sequencer(&connection));
            return Ok(CommandResult::failure(3));
        }
        if status.state == StepState::Completed {
            ui.warning(&format!("{} was already completed; running it again.", title));
        }

        let reader = CampaignReader::new(&trail, config).with_rpc(rpc.as_ref());
        let (amount, question) = match self.preflight(&reader, &wallet, &status)? {
            Preflight::Ready { amount, question } => (amount, question),
            Preflight::Refused(reason) => {
                ui.error(&reason);
                return Ok(CommandResult::failure(3));
            }
        };

        if !self.yes {
            let prompt = Prompt::confirm(&format!("confirm_{}", self.step.name()), question);
            if !ui.prompt(&prompt)?.is_yes() {
                ui.message("Cancelled.");
                return Ok(CommandResult::success());
            }
        }

        let executor = StepExecutor::new(&trail, &signer, config);
        let mut spinner = ui.start_spinner(&format!("Sending {} transaction", self.step.name()));
        let outcome = match executor.execute(&connection, self.step, &status, amount) {
            Ok(outcome) => {
                spinner.finish_success("Transaction sent");
                outcome
            }
            Err(e) => {
                spinner.finish_clear();
                return Err(e);
            }
        };

        ui.success(&format!("{}: {}", title, outcome.tx_hash));
        ui.message(&format!("View on explorer: {}", outcome.explorer_url));
        if let Some(err) = &outcome.record_error {
            ui.warning(&format!(
                "Transaction sent but not recorded with the trail: {}",
                err
            ));
        }

        self.context.refresh_history(ui, &trail, &mut tracker);
        display::show_next(ui, &tracker.sequencer(&connection));

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
    const BASE_CHAIN: &str = "0x2105";

    struct Servers {
        trail: MockServer,
        signer: MockServer,
    }

    impl Servers {
        fn start() -> Self {
            Self {
                trail: MockServer::start(),
                signer: MockServer::start(),
            }
        }

        fn context(&self) -> CommandContext {
            let mut config = TrailfundConfig::default();
            config.trail.base_url = self.trail.base_url();
            config.wallet.signer_url = Some(self.signer.base_url());
            CommandContext::from_config(config)
        }

        fn history(&self, steps: &[u32]) {
            let steps: Vec<Value> = steps
                .iter()
                .map(|n| json!({"stepNumber": n, "txHash": format!("0x{:040}", n)}))
                .collect();
            self.trail.mock(|when, then| {
                when.method(POST).path_includes("/executions/query");
                then.status(200).json_body(json!({
                    "walletExecutions": [{
                        "walletAddress": WALLET,
                        "executions": [{
                            "id": "exec-1",
                            "updatedAt": "2025-01-01T00:00:00Z",
                            "steps": steps
                        }]
                    }]
                }));
            });
        }

        fn read(&self, node_id: &str, outputs: Value) {
            self.trail.mock(|when, then| {
                when.method(POST).path_includes(format!("/nodes/{}/read", node_id));
                then.status(200).json_body(json!({ "outputs": outputs }));
            });
        }

        fn signer_rpc(&self, method: &str, result: Value) -> httpmock::Mock<'_> {
            self.signer.mock(|when, then| {
                when.method(POST).body_includes(format!("\"{}\"", method));
                then.status(200)
                    .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": result}));
            })
        }

        fn wallet_signer(&self) -> httpmock::Mock<'_> {
            self.signer_rpc("eth_accounts", json!([WALLET]));
            self.signer_rpc("eth_chainId", json!(BASE_CHAIN));
            self.signer_rpc("eth_sendTransaction", json!("0xfeed"))
        }

        fn evaluation(&self, step: u32) {
            self.trail.mock(|when, then| {
                when.method(POST)
                    .path_includes(format!("/steps/{}/evaluations", step));
                then.status(200).json_body(json!({
                    "finalInputValues": {},
                    "contractAddress": "0x2222222222222222222222222222222222222222",
                    "callData": "0xabcdef"
                }));
            });
        }

        fn save(&self) -> httpmock::Mock<'_> {
            let trail = TrailfundConfig::default().trail;
            let path = format!(
                "/trails/{}/versions/{}/executions",
                trail.trail_id, trail.version_id
            );
            self.trail.mock(|when, then| {
                when.method(POST).path(path);
                then.status(200).json_body(json!({}));
            })
        }
    }

    fn campaign_details(config: &TrailfundConfig, servers: &Servers, end: i64, raised: &str) {
        servers.read(
            &config.reads.crowdfund_details,
            json!({
                "goal": {"value": "1000000000"},
                "totalRaised": {"value": raised},
                "endTimestamp": {"value": end.to_string()},
                "creator": {"value": "0x3333333333333333333333333333333333333333"},
                "fundsClaimed": {"value": false},
                "cancelled": {"value": false}
            }),
        );
        servers.read(&config.reads.donors_count, json!([{"value": "4"}]));
    }

    #[test]
    fn approve_sends_and_records() {
        let servers = Servers::start();
        let ctx = servers.context();
        servers.history(&[]);
        servers.read(&ctx.config().reads.token_balance, json!([{"value": "100000000"}]));
        servers.evaluation(1);
        let save = servers.save();
        let send = servers.wallet_signer();

        let args = ApproveArgs {
            amount: "25".to_string(),
            yes: true,
        };
        let mut ui = MockUI::new();
        let result = StepCommand::approve(&ctx, &args).execute(&mut ui).unwrap();

        assert!(result.success);
        send.assert();
        save.assert();
        assert!(ui.successes().iter().any(|s| s.contains("0xfeed")));
        assert!(ui.has_message("https://herd.eco/base/tx/0xfeed"));
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn approve_over_balance_is_rejected() {
        let servers = Servers::start();
        let ctx = servers.context();
        servers.history(&[]);
        servers.read(&ctx.config().reads.token_balance, json!([{"value": "1000000"}]));
        let send = servers.wallet_signer();

        let args = ApproveArgs {
            amount: "2".to_string(),
            yes: true,
        };
        let err = StepCommand::approve(&ctx, &args)
            .execute(&mut MockUI::new())
            .unwrap_err();

        assert!(err.to_string().contains("exceeds your available balance"));
        send.assert_calls(0);
    }

    #[test]
    fn donate_before_approval_is_not_executable() {
        let servers = Servers::start();
        let ctx = servers.context();
        servers.history(&[]);
        servers.wallet_signer();

        let args = DonateArgs {
            amount: "1".to_string(),
            ..Default::default()
        };
        let mut ui = MockUI::new();
        let result = StepCommand::donate(&ctx, &args).execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 3);
        assert!(ui.has_error("pending"));
        assert!(ui.has_message("Next: trailfund approve <AMOUNT>"));
    }

    #[test]
    fn donate_respects_approved_amount() {
        let servers = Servers::start();
        let ctx = servers.context();
        servers.history(&[1]);
        campaign_details(ctx.config(), &servers, now() + 86_400, "0");
        servers.wallet_signer();

        let args = DonateArgs {
            amount: "11".to_string(),
            approved: Some("10".to_string()),
            yes: true,
        };
        let err = StepCommand::donate(&ctx, &args)
            .execute(&mut MockUI::new())
            .unwrap_err();

        assert!(err.to_string().contains("exceeds your approved balance"));
    }

    #[test]
    fn donate_after_end_is_refused() {
        let servers = Servers::start();
        let ctx = servers.context();
        servers.history(&[1]);
        campaign_details(ctx.config(), &servers, 1, "0");
        let send = servers.wallet_signer();

        let args = DonateArgs {
            amount: "1".to_string(),
            yes: true,
            ..Default::default()
        };
        let mut ui = MockUI::new();
        let result = StepCommand::donate(&ctx, &args).execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 3);
        assert!(ui.has_error("Donations are closed"));
        send.assert_calls(0);
    }

    #[test]
    fn declined_confirmation_sends_nothing() {
        let servers = Servers::start();
        let ctx = servers.context();
        servers.history(&[1]);
        campaign_details(ctx.config(), &servers, now() + 86_400, "0");
        servers.read(&ctx.config().reads.token_balance, json!([{"value": "100000000"}]));
        let send = servers.wallet_signer();

        let args = DonateArgs {
            amount: "5".to_string(),
            ..Default::default()
        };
        let mut ui = MockUI::new();
        ui.set_prompt_response("confirm_donate", "no");
        let result = StepCommand::donate(&ctx, &args).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("Cancelled."));
        send.assert_calls(0);
    }

    #[test]
    fn refund_before_end_is_refused() {
        let servers = Servers::start();
        let ctx = servers.context();
        servers.history(&[1, 2]);
        campaign_details(ctx.config(), &servers, now() + 86_400, "0");
        servers.read(&ctx.config().reads.token_balance, json!([{"value": "0"}]));
        servers.read(&ctx.config().reads.user_donation, json!([{"value": "5000000"}]));
        servers.wallet_signer();

        let mut ui = MockUI::new();
        let result = StepCommand::refund(&ctx, &RefundArgs { yes: true })
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 3);
        assert!(ui.has_error("only available after the crowdfund ends"));
    }

    #[test]
    fn refund_for_failed_campaign() {
        let servers = Servers::start();
        let ctx = servers.context();
        servers.history(&[1, 2]);
        campaign_details(ctx.config(), &servers, 1, "5000000");
        servers.read(&ctx.config().reads.token_balance, json!([{"value": "0"}]));
        servers.read(&ctx.config().reads.user_donation, json!([{"value": "5000000"}]));
        servers.evaluation(3);
        servers.save();
        let send = servers.wallet_signer();

        let mut ui = MockUI::new();
        ui.set_prompt_response("confirm_refund", "yes");
        let result = StepCommand::refund(&ctx, &RefundArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        send.assert();
        assert_eq!(ui.prompts_shown(), &["confirm_refund".to_string()]);
    }

    #[test]
    fn missing_signer_exits_2() {
        let mut config = TrailfundConfig::default();
        config.wallet.address = Some(WALLET.to_string());
        let ctx = CommandContext::from_config(config);
        let mut ui = MockUI::new();

        let result = StepCommand::refund(&ctx, &RefundArgs { yes: true })
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("No signer configured"));
    }
}
