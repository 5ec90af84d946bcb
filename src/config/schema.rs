//! Configuration schema definitions for trailfund.
//!
//! Every section has production defaults, so an empty (or missing) config
//! file yields a working client for the elephant conservation campaign.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pipeline::Step;
use crate::wallet::RetryPolicy;

/// Root configuration structure for `.trailfund/config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TrailfundConfig {
    /// Trail execution API settings.
    pub trail: TrailSettings,

    /// The crowdfunding campaign.
    pub campaign: CampaignSettings,

    /// Token donated to the campaign.
    pub token: TokenSettings,

    /// Trail nodes that build each pipeline step's transaction.
    pub steps: StepNodes,

    /// Trail read nodes.
    pub reads: ReadNodes,

    /// Wallet and signer.
    pub wallet: WalletSettings,

    /// Direct chain access.
    pub chain: ChainSettings,

    /// Community activity feed.
    pub community: CommunitySettings,
}

/// Trail execution API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TrailSettings {
    /// API base URL, e.g. `https://trails-api.herd.eco/v1`.
    pub base_url: String,
    pub trail_id: String,
    pub version_id: String,
    /// Sent as the `Herd-Trail-App-Id` header.
    pub app_id: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            base_url: "https://trails-api.herd.eco/v1".to_string(),
            trail_id: "0198d5f9-8412-737e-afc2-4c6816208d9f".to_string(),
            version_id: "0198d5f9-841b-7d10-9d67-1b426d3b7a2d".to_string(),
            app_id: "0198e014-2be1-7a23-93c5-32915deb0a44".to_string(),
            timeout_secs: 30,
        }
    }
}

/// The crowdfunding campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CampaignSettings {
    /// On-chain crowdfund id.
    pub crowdfund_id: String,
    /// Block explorer base URL.
    pub explorer_url: String,
    /// Chain the campaign lives on (Base mainnet = 8453).
    pub chain_id: u64,
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            crowdfund_id: "3356".to_string(),
            explorer_url: "https://herd.eco/base".to_string(),
            chain_id: 8453,
        }
    }
}

/// Token donated to the campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TokenSettings {
    pub address: String,
    pub symbol: String,
    pub decimals: u32,
    /// Fractional digits shown when formatting amounts.
    pub display_decimals: usize,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            address: "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913".to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
            display_decimals: 4,
        }
    }
}

/// A trail node that produces a step's transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepNode {
    /// Primary node id, also used when recording executions.
    pub node_id: String,
    /// Input path the amount is written to, if the step takes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_input: Option<String>,
}

/// Trail nodes for each pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StepNodes {
    pub approve: StepNode,
    pub donate: StepNode,
    pub refund: StepNode,
}

impl Default for StepNodes {
    fn default() -> Self {
        Self {
            approve: StepNode {
                node_id: "0198d5f9-841e-7841-8173-3a47159517a7".to_string(),
                amount_input: Some("inputs.value".to_string()),
            },
            donate: StepNode {
                node_id: "0198d5f9-841e-7841-8173-3a45cb035b81".to_string(),
                amount_input: Some("inputs.amount".to_string()),
            },
            refund: StepNode {
                node_id: "0198d5f9-841f-7678-92f4-75b39738fcf7".to_string(),
                amount_input: None,
            },
        }
    }
}

impl StepNodes {
    /// Node configuration for a step.
    pub fn for_step(&self, step: Step) -> &StepNode {
        match step {
            Step::Approve => &self.approve,
            Step::Donate => &self.donate,
            Step::Refund => &self.refund,
        }
    }
}

/// Trail read nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReadNodes {
    /// Token balance of the wallet (`inputs.token`).
    pub token_balance: String,
    /// Wallet's donation to the crowdfund (`inputs.arg_0`).
    pub user_donation: String,
    /// Crowdfund goal, total raised, deadline, flags (`inputs.arg_0`).
    pub crowdfund_details: String,
    /// Number of donors (`inputs.crowdfundId`).
    pub donors_count: String,
}

impl Default for ReadNodes {
    fn default() -> Self {
        Self {
            token_balance: "0198d5f9-841e-7841-8173-3a46904055f5".to_string(),
            user_donation: "0198d5f9-841d-7242-9672-93e0b12d5186".to_string(),
            crowdfund_details: "0198d5f9-841f-7678-92f4-75b1f7f00d19".to_string(),
            donors_count: "0198d5f9-841f-7678-92f4-75b2ccf054a4".to_string(),
        }
    }
}

/// Wallet and signer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WalletSettings {
    /// Watch-only wallet address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// JSON-RPC endpoint of a wallet that signs transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_url: Option<String>,

    /// Auto-connect retries against the signer.
    pub connect: RetryPolicy,
}

/// Direct chain access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ChainSettings {
    /// Node RPC URL; when set, token balances are read from chain instead of the trail API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

/// Community activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CommunitySettings {
    /// Seconds between refreshes in `community --watch`.
    pub refresh_secs: u64,
    /// Number of feed entries shown.
    pub feed_limit: usize,
}

impl Default for CommunitySettings {
    fn default() -> Self {
        Self {
            refresh_secs: 30,
            feed_limit: 10,
        }
    }
}
