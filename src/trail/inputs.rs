//! Builders for trail user inputs.

use crate::config::{ReadNodes, StepNodes, TokenSettings};
use crate::pipeline::Step;
use crate::units::TokenAmount;

use super::types::UserInputs;

/// Inputs for a pipeline step.
///
/// Amounts are sent in raw base units; steps without an amount input
/// (refund) get an empty input map.
pub fn step_inputs(nodes: &StepNodes, step: Step, amount: Option<TokenAmount>) -> UserInputs {
    let node = nodes.for_step(step);
    let mut inputs = UserInputs::new();

    if let (Some(path), Some(amount)) = (&node.amount_input, amount) {
        inputs.set(&node.node_id, path, amount.raw().to_string());
    }

    inputs
}

/// Inputs for a read node from `(input path, value)` pairs.
pub fn read_inputs(node_id: &str, pairs: &[(&str, &str)]) -> UserInputs {
    let mut inputs = UserInputs::new();
    for (path, value) in pairs {
        inputs.set(node_id, path, *value);
    }
    inputs
}

/// Token balance read: `inputs.token` is the token contract.
pub fn token_balance_inputs(reads: &ReadNodes, token: &TokenSettings) -> UserInputs {
    read_inputs(&reads.token_balance, &[("inputs.token", &token.address)])
}

/// The wallet's donation to a crowdfund.
pub fn user_donation_inputs(reads: &ReadNodes, crowdfund_id: &str) -> UserInputs {
    read_inputs(&reads.user_donation, &[("inputs.arg_0", crowdfund_id)])
}

/// Crowdfund details.
pub fn crowdfund_details_inputs(reads: &ReadNodes, crowdfund_id: &str) -> UserInputs {
    read_inputs(&reads.crowdfund_details, &[("inputs.arg_0", crowdfund_id)])
}

/// Donor count.
pub fn donors_count_inputs(reads: &ReadNodes, crowdfund_id: &str) -> UserInputs {
    read_inputs(&reads.donors_count, &[("inputs.crowdfundId", crowdfund_id)])
}
