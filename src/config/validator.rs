//! Configuration validation rules.
//!
//! All problems are collected so a user can fix them in one pass.

use crate::config::schema::TrailfundConfig;
use crate::error::{Result, TrailfundError};
use crate::wallet::WalletAddress;

/// Largest token precision that still fits amounts comfortably in `u128`.
pub const MAX_DECIMALS: u32 = 30;

/// Validation error with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted config path, e.g. `token.decimals`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return every error found.
pub fn validate_config(config: &TrailfundConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("trail.base_url", &config.trail.base_url),
        ("trail.trail_id", &config.trail.trail_id),
        ("trail.version_id", &config.trail.version_id),
        ("trail.app_id", &config.trail.app_id),
        ("campaign.crowdfund_id", &config.campaign.crowdfund_id),
        ("steps.approve.node_id", &config.steps.approve.node_id),
        ("steps.donate.node_id", &config.steps.donate.node_id),
        ("steps.refund.node_id", &config.steps.refund.node_id),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if WalletAddress::parse(&config.token.address).is_err() {
        errors.push(ValidationError::new(
            "token.address",
            format!("'{}' is not a valid address", config.token.address),
        ));
    }

    if let Some(address) = &config.wallet.address {
        if WalletAddress::parse(address).is_err() {
            errors.push(ValidationError::new(
                "wallet.address",
                format!("'{}' is not a valid address", address),
            ));
        }
    }

    if config.token.decimals > MAX_DECIMALS {
        errors.push(ValidationError::new(
            "token.decimals",
            format!("must be at most {}", MAX_DECIMALS),
        ));
    }

    if config.token.display_decimals > config.token.decimals as usize {
        errors.push(ValidationError::new(
            "token.display_decimals",
            format!("must not exceed token.decimals ({})", config.token.decimals),
        ));
    }

    if config.wallet.connect.max_attempts == 0 {
        errors.push(ValidationError::new(
            "wallet.connect.max_attempts",
            "must be at least 1",
        ));
    }

    if config.trail.timeout_secs == 0 {
        errors.push(ValidationError::new("trail.timeout_secs", "must be at least 1"));
    }

    if config.community.feed_limit == 0 {
        errors.push(ValidationError::new("community.feed_limit", "must be at least 1"));
    }

    errors
}

/// Validate and convert the collected errors into a single error.
pub fn validate(config: &TrailfundConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    Err(TrailfundError::ConfigValidationError { message })
}
