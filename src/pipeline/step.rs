//! Pipeline step definitions.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, TrailfundError};

/// Number of steps in the pipeline.
pub const PIPELINE_LENGTH: u32 = 3;

/// One stage of the crowdfunding pipeline, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Allow the crowdfund contract to spend the donor's tokens.
    Approve,
    /// Donate to the campaign.
    Donate,
    /// Claim a refund from a failed campaign.
    Refund,
}

impl Step {
    /// All steps in pipeline order.
    pub const ALL: [Step; 3] = [Step::Approve, Step::Donate, Step::Refund];

    /// 1-based step number used by the trail API.
    pub fn number(&self) -> u32 {
        match self {
            Self::Approve => 1,
            Self::Donate => 2,
            Self::Refund => 3,
        }
    }

    /// Look up a step by its 1-based number.
    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(Self::Approve),
            2 => Some(Self::Donate),
            3 => Some(Self::Refund),
            _ => None,
        }
    }

    /// Like [`Step::from_number`] but returns an error for unknown numbers.
    pub fn try_from_number(number: u32) -> Result<Self> {
        Self::from_number(number).ok_or(TrailfundError::InvalidStep { number })
    }

    /// Short lowercase name (`approve`, `donate`, `refund`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Donate => "donate",
            Self::Refund => "refund",
        }
    }

    /// Card title, e.g. "Approve USDC".
    pub fn title(&self, symbol: &str) -> String {
        match self {
            Self::Approve => format!("Approve {}", symbol),
            Self::Donate => "Donate to Crowdfund".to_string(),
            Self::Refund => "Claim Refund".to_string(),
        }
    }

    /// One-line explanation of what the step does.
    pub fn description(&self, symbol: &str) -> String {
        match self {
            Self::Approve => format!("Allow the crowdfund contract to spend your {}", symbol),
            Self::Donate => "Make your donation to help save elephants".to_string(),
            Self::Refund => "Get your money back if the goal was not reached".to_string(),
        }
    }

    /// Whether the step needs a user-entered amount.
    pub fn requires_amount(&self) -> bool {
        matches!(self, Self::Approve | Self::Donate)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
