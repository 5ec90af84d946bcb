//! Campaign-wide activity: recent transactions and per-step counts.

use serde::Serialize;

use crate::error::Result;
use crate::pipeline::Step;
use crate::trail::{CommunityTotals, CommunityTransaction, ExecutionQueryRequest, TrailClient};
use crate::units::shorten_address;

/// Feed label for a step, e.g. "Donated".
pub fn feed_label(step_number: u32, symbol: &str) -> String {
    match Step::from_number(step_number) {
        Some(Step::Approve) => format!("Approved {}", symbol),
        Some(Step::Donate) => "Donated".to_string(),
        Some(Step::Refund) => "Claimed Refund".to_string(),
        None => format!("Step {}", step_number),
    }
}

/// Statistics label for a step, e.g. "Refund Claims".
pub fn stats_label(step_number: u32, symbol: &str) -> String {
    match Step::from_number(step_number) {
        Some(Step::Approve) => format!("{} Approvals", symbol),
        Some(Step::Donate) => "Donations".to_string(),
        Some(Step::Refund) => "Refund Claims".to_string(),
        None => format!("Step {}", step_number),
    }
}

/// One line of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub step_number: u32,
    pub label: String,
    /// `@username` when a social profile is known, else the shortened address.
    pub actor: String,
    pub wallet_address: String,
    pub tx_hash: String,
    pub block_timestamp: i64,
    pub block_number: u64,
}

impl FeedEntry {
    fn new(step_number: u32, tx: &CommunityTransaction, symbol: &str) -> Self {
        let actor = match &tx.farcaster_data {
            Some(profile) if !profile.username.is_empty() => format!("@{}", profile.username),
            _ => shorten_address(&tx.wallet_address),
        };

        Self {
            step_number,
            label: feed_label(step_number, symbol),
            actor,
            wallet_address: tx.wallet_address.clone(),
            tx_hash: tx.tx_hash.clone(),
            block_timestamp: tx.block_timestamp,
            block_number: tx.block_number,
        }
    }
}

/// Participation in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub step_number: u32,
    pub name: String,
    pub wallets: u64,
    pub transactions: u64,
}

/// Everything the community view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommunityActivity {
    pub transactions: u64,
    pub wallets: u64,
    pub feed: Vec<FeedEntry>,
    pub steps: Vec<StepSummary>,
}

impl CommunityActivity {
    /// Build the feed (newest first, at most `feed_limit`) and step summaries.
    pub fn from_totals(totals: &CommunityTotals, symbol: &str, feed_limit: usize) -> Self {
        let mut steps: Vec<(u32, &crate::trail::StepStats)> = totals
            .step_stats
            .iter()
            .filter_map(|(key, stats)| match key.parse::<u32>() {
                Ok(n) => Some((n, stats)),
                Err(_) => {
                    tracing::warn!("Ignoring step stats with non-numeric key '{}'", key);
                    None
                }
            })
            .collect();
        steps.sort_by_key(|(n, _)| *n);

        let mut feed: Vec<FeedEntry> = steps
            .iter()
            .flat_map(|(n, stats)| {
                stats
                    .transaction_hashes
                    .iter()
                    .map(move |tx| FeedEntry::new(*n, tx, symbol))
            })
            .collect();
        feed.sort_by(|a, b| b.block_timestamp.cmp(&a.block_timestamp));
        feed.truncate(feed_limit);

        let summaries = steps
            .iter()
            .map(|(n, stats)| StepSummary {
                step_number: *n,
                name: stats_label(*n, symbol),
                wallets: stats.wallets,
                transactions: stats.transactions,
            })
            .collect();

        Self {
            transactions: totals.transactions,
            wallets: totals.wallets,
            feed,
            steps: summaries,
        }
    }
}

/// Query community totals and build the activity view.
pub fn fetch_activity(
    client: &TrailClient,
    symbol: &str,
    feed_limit: usize,
) -> Result<CommunityActivity> {
    let response = client.query_executions(&ExecutionQueryRequest::community())?;
    let totals = response.totals.unwrap_or_else(|| {
        tracing::debug!("Community query returned no totals");
        CommunityTotals::default()
    });
    Ok(CommunityActivity::from_totals(&totals, symbol, feed_limit))
}
