//! Crowdfund campaign state and the wallet's position in it.
//!
//! Everything here is read through trail read nodes (or, for the token
//! balance, optionally straight from a chain node) and then judged
//! locally: progress, outcome, and whether a refund can be claimed.

use std::fmt;

use serde::Serialize;

use crate::chain::JsonRpcClient;
use crate::config::TrailfundConfig;
use crate::error::{Result, TrailfundError};
use crate::trail::inputs;
use crate::trail::{ExecutionSelector, ReadRequest, ReadResponse, TrailClient, UserInputs};
use crate::units::TokenAmount;
use crate::wallet::WalletAddress;

/// Crowdfund details at the time of reading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CampaignSnapshot {
    pub goal: TokenAmount,
    pub total_raised: TokenAmount,
    /// Deadline in unix seconds.
    pub end_timestamp: i64,
    pub creator: String,
    pub funds_claimed: bool,
    pub cancelled: bool,
    pub donors: u64,
}

/// Outcome shown next to the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CampaignStatus {
    Active,
    Success,
    Failed,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "Active",
            Self::Success => "Success",
            Self::Failed => "Failed",
        })
    }
}

impl CampaignSnapshot {
    /// Build from the crowdfund details read node. Missing outputs are zero or false.
    pub fn from_details(details: &ReadResponse) -> Result<Self> {
        let amount = |name: &str| match details.named_string(name) {
            Some(raw) => TokenAmount::from_raw_str(&raw),
            None => Ok(TokenAmount::ZERO),
        };

        let end_timestamp = match details.named_string("endTimestamp") {
            Some(raw) if !raw.trim().is_empty() => {
                raw.trim()
                    .parse()
                    .map_err(|_| TrailfundError::MalformedPayload {
                        message: format!("endTimestamp '{}' is not a number", raw),
                    })?
            }
            _ => 0,
        };

        Ok(Self {
            goal: amount("goal")?,
            total_raised: amount("totalRaised")?,
            end_timestamp,
            creator: details.named_string("creator").unwrap_or_default(),
            funds_claimed: details.named_bool("fundsClaimed"),
            cancelled: details.named_bool("cancelled"),
            donors: 0,
        })
    }

    /// Deadline strictly before `now`.
    pub fn is_ended(&self, now: i64) -> bool {
        self.end_timestamp < now
    }

    pub fn is_goal_reached(&self) -> bool {
        self.total_raised >= self.goal
    }

    /// Raised as a percentage of goal, capped at 100; 0 when there is no goal.
    pub fn progress_percentage(&self) -> f64 {
        if self.goal.is_zero() {
            return 0.0;
        }
        let pct = self.total_raised.raw() as f64 / self.goal.raw() as f64 * 100.0;
        pct.min(100.0)
    }

    pub fn status(&self, now: i64) -> CampaignStatus {
        match (self.is_ended(now), self.is_goal_reached()) {
            (false, _) => CampaignStatus::Active,
            (true, true) => CampaignStatus::Success,
            (true, false) => CampaignStatus::Failed,
        }
    }
}

/// The connected wallet's funds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserPosition {
    pub balance: TokenAmount,
    pub donation: TokenAmount,
}

impl UserPosition {
    pub fn has_donated(&self) -> bool {
        !self.donation.is_zero()
    }
}

/// Whether a refund can be claimed, and if not, why.
///
/// Reasons are checked in declaration order; the first that applies wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundEligibility {
    NotEnded,
    GoalReached,
    NoDonation,
    AlreadyClaimed,
    Eligible,
}

impl RefundEligibility {
    /// Decide eligibility. `refund_completed` is the sequencer's view of step 3.
    pub fn evaluate(
        campaign: &CampaignSnapshot,
        position: &UserPosition,
        refund_completed: bool,
        now: i64,
    ) -> Self {
        if !campaign.is_ended(now) {
            Self::NotEnded
        } else if campaign.is_goal_reached() {
            Self::GoalReached
        } else if !position.has_donated() {
            Self::NoDonation
        } else if campaign.funds_claimed || refund_completed {
            Self::AlreadyClaimed
        } else {
            Self::Eligible
        }
    }

    pub fn is_eligible(&self) -> bool {
        *self == Self::Eligible
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NotEnded => "Refunds are only available after the crowdfund ends.",
            Self::GoalReached => "The crowdfund was successful. Refunds are not available.",
            Self::NoDonation => "You haven't made any donations to this crowdfund.",
            Self::AlreadyClaimed => "You have already claimed your refund.",
            Self::Eligible => "You can claim a refund for your donation.",
        }
    }
}

/// Reads campaign and wallet data.
pub struct CampaignReader<'a> {
    trail: &'a TrailClient,
    config: &'a TrailfundConfig,
    rpc: Option<&'a JsonRpcClient>,
}

impl<'a> CampaignReader<'a> {
    pub fn new(trail: &'a TrailClient, config: &'a TrailfundConfig) -> Self {
        Self {
            trail,
            config,
            rpc: None,
        }
    }

    /// Read token balances from a chain node instead of the trail API.
    pub fn with_rpc(mut self, rpc: Option<&'a JsonRpcClient>) -> Self {
        self.rpc = rpc;
        self
    }

    fn read(
        &self,
        node_id: &str,
        wallet: &WalletAddress,
        inputs: UserInputs,
    ) -> Result<ReadResponse> {
        self.trail.read_node(
            node_id,
            &ReadRequest {
                wallet_address: wallet.to_string(),
                user_inputs: inputs,
                execution: ExecutionSelector::Latest,
            },
        )
    }

    fn first_amount(response: &ReadResponse) -> Result<TokenAmount> {
        match response.first_value() {
            Some(raw) => TokenAmount::from_raw_str(&raw),
            None => Ok(TokenAmount::ZERO),
        }
    }

    /// Crowdfund details plus donor count.
    pub fn campaign(&self) -> Result<CampaignSnapshot> {
        let reads = &self.config.reads;
        let crowdfund_id = &self.config.campaign.crowdfund_id;

        let details = self.read(
            &reads.crowdfund_details,
            &WalletAddress::zero(),
            inputs::crowdfund_details_inputs(reads, crowdfund_id),
        )?;
        let mut snapshot = CampaignSnapshot::from_details(&details)?;
        snapshot.donors = self.donors_count()?;

        tracing::debug!(
            "Campaign {}: raised {} of {}",
            crowdfund_id,
            snapshot.total_raised,
            snapshot.goal
        );
        Ok(snapshot)
    }

    pub fn donors_count(&self) -> Result<u64> {
        let reads = &self.config.reads;
        let response = self.read(
            &reads.donors_count,
            &WalletAddress::zero(),
            inputs::donors_count_inputs(reads, &self.config.campaign.crowdfund_id),
        )?;
        Ok(Self::first_amount(&response)?.raw() as u64)
    }

    pub fn token_balance(&self, wallet: &WalletAddress) -> Result<TokenAmount> {
        if let Some(rpc) = self.rpc {
            tracing::debug!("Reading token balance from {}", rpc.url());
            return rpc.erc20_balance(&self.config.token.address, wallet);
        }

        let reads = &self.config.reads;
        let response = self.read(
            &reads.token_balance,
            wallet,
            inputs::token_balance_inputs(reads, &self.config.token),
        )?;
        Self::first_amount(&response)
    }

    pub fn user_donation(&self, wallet: &WalletAddress) -> Result<TokenAmount> {
        let reads = &self.config.reads;
        let response = self.read(
            &reads.user_donation,
            wallet,
            inputs::user_donation_inputs(reads, &self.config.campaign.crowdfund_id),
        )?;
        Self::first_amount(&response)
    }

    pub fn position(&self, wallet: &WalletAddress) -> Result<UserPosition> {
        Ok(UserPosition {
            balance: self.token_balance(wallet)?,
            donation: self.user_donation(wallet)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_750_000_000;

    fn snapshot(goal: u128, raised: u128, end: i64) -> CampaignSnapshot {
        CampaignSnapshot {
            goal: TokenAmount::from_raw(goal),
            total_raised: TokenAmount::from_raw(raised),
            end_timestamp: end,
            ..Default::default()
        }
    }

    fn donated(amount: u128) -> UserPosition {
        UserPosition {
            balance: TokenAmount::ZERO,
            donation: TokenAmount::from_raw(amount),
        }
    }

    #[test]
    fn details_parse_named_outputs() {
        let response: ReadResponse = serde_json::from_value(json!({
            "outputs": {
                "goal": {"value": "1000000000"},
                "totalRaised": {"value": "250000000"},
                "endTimestamp": {"value": "1760000000"},
                "creator": {"value": "0xcreator"},
                "fundsClaimed": {"value": false},
                "cancelled": {"value": false}
            }
        }))
        .unwrap();

        let snap = CampaignSnapshot::from_details(&response).unwrap();
        assert_eq!(snap.goal.raw(), 1_000_000_000);
        assert_eq!(snap.end_timestamp, 1_760_000_000);
        assert_eq!(snap.creator, "0xcreator");
        assert_eq!(snap.progress_percentage(), 25.0);
    }

    #[test]
    fn missing_outputs_default_to_zero() {
        let snap = CampaignSnapshot::from_details(&ReadResponse::default()).unwrap();
        assert!(snap.goal.is_zero());
        assert_eq!(snap.end_timestamp, 0);
        assert!(!snap.funds_claimed);
        assert_eq!(snap.progress_percentage(), 0.0);
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(snapshot(100, 250, NOW).progress_percentage(), 100.0);
    }

    #[test]
    fn status_follows_deadline_and_goal() {
        assert_eq!(snapshot(100, 0, NOW + 10).status(NOW), CampaignStatus::Active);
        assert_eq!(snapshot(100, 100, NOW - 10).status(NOW), CampaignStatus::Success);
        assert_eq!(snapshot(100, 99, NOW - 10).status(NOW), CampaignStatus::Failed);
    }

    #[test]
    fn refund_reasons_follow_precedence() {
        let running = snapshot(100, 0, NOW + 10);
        assert_eq!(
            RefundEligibility::evaluate(&running, &UserPosition::default(), true, NOW),
            RefundEligibility::NotEnded
        );

        let succeeded = snapshot(100, 100, NOW - 10);
        assert_eq!(
            RefundEligibility::evaluate(&succeeded, &UserPosition::default(), false, NOW),
            RefundEligibility::GoalReached
        );

        let failed = snapshot(100, 10, NOW - 10);
        assert_eq!(
            RefundEligibility::evaluate(&failed, &UserPosition::default(), true, NOW),
            RefundEligibility::NoDonation
        );
        assert_eq!(
            RefundEligibility::evaluate(&failed, &donated(5), true, NOW),
            RefundEligibility::AlreadyClaimed
        );

        let claimed = CampaignSnapshot {
            funds_claimed: true,
            ..failed.clone()
        };
        assert_eq!(
            RefundEligibility::evaluate(&claimed, &donated(5), false, NOW),
            RefundEligibility::AlreadyClaimed
        );

        let eligible = RefundEligibility::evaluate(&failed, &donated(5), false, NOW);
        assert!(eligible.is_eligible());
        assert_eq!(eligible.message(), "You can claim a refund for your donation.");
    }
}
