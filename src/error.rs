//! Error types for trailfund operations.
//!
//! This module defines [`TrailfundError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `TrailfundError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `TrailfundError::Other`) for unexpected errors
//! - The step sequencer never returns errors; only its collaborators do

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for trailfund operations.
#[derive(Debug, Error)]
pub enum TrailfundError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A string that should be a wallet or contract address is not one.
    #[error("Invalid address: {value}")]
    InvalidAddress { value: String },

    /// A user-entered token amount was rejected.
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// Step number outside the pipeline.
    #[error("Invalid step number: {number}")]
    InvalidStep { number: u32 },

    /// An operation needed a connected wallet.
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// A transaction was requested but no signer endpoint is configured.
    #[error("No signer configured; set wallet.signer_url or TRAILFUND_SIGNER_URL")]
    NoSigner,

    /// The signer is on a different chain than the campaign.
    #[error("Wrong network: expected chain {expected}, signer is on chain {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    /// The sequencer does not allow this step to run yet.
    #[error("Step {step} cannot be executed (status: {status})")]
    StepNotExecutable { step: u32, status: String },

    /// The trail API answered with a non-success status.
    #[error("Trail API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// A JSON-RPC endpoint returned an error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// A response body did not have the expected shape.
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrailfundError {
    /// Process exit code for this error.
    ///
    /// 2 for missing configuration or wallet, 3 for a step the pipeline
    /// does not allow yet, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigNotFound { .. } | Self::WalletNotConnected | Self::NoSigner => 2,
            Self::StepNotExecutable { .. } => 3,
            _ => 1,
        }
    }
}

/// Result type alias for trailfund operations.
pub type Result<T> = std::result::Result<T, TrailfundError>;
