//! Execution history records.
//!
//! These are the validated forms of what the trail API returns. Raw
//! payloads are normalized into these types in `trail::types`; nothing
//! downstream has to deal with missing fields or unknown step numbers.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One completed on-chain action within an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStep {
    /// Pipeline step number (1-based).
    pub step_number: u32,
    /// Transaction hash of the on-chain action.
    pub tx_hash: String,
    /// Trail node that produced the transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Block time in unix seconds, once mined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ExecutionStep {
    /// Create a step record with only the required fields set.
    pub fn new(step_number: u32, tx_hash: impl Into<String>) -> Self {
        Self {
            step_number,
            tx_hash: tx_hash.into(),
            node_id: None,
            block_timestamp: None,
            block_number: None,
            created_at: None,
        }
    }

    /// Set the block timestamp.
    pub fn with_block_timestamp(mut self, timestamp: i64) -> Self {
        self.block_timestamp = Some(timestamp);
        self
    }
}

/// One pass of a wallet through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Execution {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub steps: Vec<ExecutionStep>,
}

impl Execution {
    /// Create an empty execution created and updated at `updated_at`.
    pub fn new(id: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at: updated_at,
            updated_at,
            steps: Vec::new(),
        }
    }

    /// Append a step record.
    pub fn with_step(mut self, step: ExecutionStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Find the record for a step number.
    pub fn step(&self, step_number: u32) -> Option<&ExecutionStep> {
        self.steps.iter().find(|s| s.step_number == step_number)
    }

    /// Highest step number present, or 0 for an empty execution.
    pub fn max_step_number(&self) -> u32 {
        self.steps.iter().map(|s| s.step_number).max().unwrap_or(0)
    }
}
