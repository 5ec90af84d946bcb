//! Running a pipeline step as an on-chain transaction.
//!
//! The flow is: check the wallet and the step's status, make sure the
//! signer is on the campaign's chain, have the trail build the
//! transaction, hand it to the signer, then record the hash with the
//! trail. Recording is best effort; once a hash exists it is always
//! returned to the caller.

use serde::Serialize;

use crate::chain::{TransactionRequest, TransactionSubmitter};
use crate::config::TrailfundConfig;
use crate::error::{Result, TrailfundError};
use crate::pipeline::{Step, StepStatus};
use crate::trail::inputs::step_inputs;
use crate::trail::{EvaluationRequest, ExecutionRequest, ExecutionSelector, TrailClient};
use crate::units::{explorer_link, ExplorerKind, TokenAmount};
use crate::wallet::{ConnectionState, WalletAddress};

/// Result of a submitted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub tx_hash: String,
    pub explorer_url: String,
    /// Whether the trail accepted the execution record.
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_error: Option<String>,
}

/// Executes pipeline steps for one configuration.
pub struct StepExecutor<'a> {
    trail: &'a TrailClient,
    signer: &'a dyn TransactionSubmitter,
    config: &'a TrailfundConfig,
}

impl<'a> StepExecutor<'a> {
    pub fn new(
        trail: &'a TrailClient,
        signer: &'a dyn TransactionSubmitter,
        config: &'a TrailfundConfig,
    ) -> Self {
        Self {
            trail,
            signer,
            config,
        }
    }

    /// Build, submit, and record the transaction for `step`.
    ///
    /// `status` must come from a sequencer over the wallet's current history.
    pub fn execute(
        &self,
        connection: &ConnectionState,
        step: Step,
        status: &StepStatus,
        amount: Option<TokenAmount>,
    ) -> Result<StepOutcome> {
        let wallet = connection
            .address()
            .ok_or(TrailfundError::WalletNotConnected)?;

        if !status.can_execute {
            return Err(TrailfundError::StepNotExecutable {
                step: step.number(),
                status: status.state.to_string(),
            });
        }

        if step.requires_amount() && amount.is_none() {
            return Err(TrailfundError::InvalidAmount {
                input: String::new(),
                reason: format!("Amount required for {}", step.name()),
            });
        }

        self.ensure_chain()?;

        let tx = self.build_transaction(wallet, step, amount)?;
        tracing::info!("Submitting {} transaction to {}", step, tx.to);
        let tx_hash = self.signer.submit(&tx)?;

        let record_error = self.record(wallet, step, &tx_hash).err().map(|e| {
            tracing::warn!("Transaction {} sent but not recorded: {}", tx_hash, e);
            e.to_string()
        });

        Ok(StepOutcome {
            step,
            explorer_url: explorer_link(
                &self.config.campaign.explorer_url,
                ExplorerKind::Tx,
                &tx_hash,
            ),
            tx_hash,
            recorded: record_error.is_none(),
            record_error,
        })
    }

    fn ensure_chain(&self) -> Result<()> {
        let expected = self.config.campaign.chain_id;
        let actual = self.signer.chain_id()?;
        if actual != expected {
            return Err(TrailfundError::WrongNetwork { expected, actual });
        }
        Ok(())
    }

    fn build_transaction(
        &self,
        wallet: &WalletAddress,
        step: Step,
        amount: Option<TokenAmount>,
    ) -> Result<TransactionRequest> {
        let request = EvaluationRequest {
            wallet_address: wallet.to_string(),
            user_inputs: step_inputs(&self.config.steps, step, amount),
            execution: ExecutionSelector::Latest,
        };
        let evaluation = self.trail.evaluate(step, &request)?;

        let value = match evaluation.payable_amount.as_deref() {
            Some(raw) => TokenAmount::from_raw_str(raw)?.raw(),
            None => 0,
        };

        Ok(TransactionRequest {
            from: wallet.clone(),
            to: evaluation.contract_address,
            data: evaluation.call_data,
            value,
        })
    }

    fn record(&self, wallet: &WalletAddress, step: Step, tx_hash: &str) -> Result<()> {
        self.trail.save_execution(&ExecutionRequest {
            node_id: self.config.steps.for_step(step).node_id.clone(),
            transaction_hash: tx_hash.to_string(),
            wallet_address: wallet.to_string(),
            execution: ExecutionSelector::Latest,
        })?;
        tracing::debug!("Recorded {} for step {}", tx_hash, step.number());
        Ok(())
    }
}
