//! Wallet identity and connection state.
//!
//! trailfund never holds keys. A wallet is either a watch-only address
//! (from `--wallet` or config) or an account exposed by a signer JSON-RPC
//! endpoint, which is also where transactions are sent for signing.

pub mod connector;
pub mod retry;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{Result, TrailfundError};

pub use connector::{connect_with_retry, RpcWalletConnector, StaticConnector, WalletConnector};
pub use retry::RetryPolicy;

static ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("ADDRESS_REGEX must compile"));

/// A 20-byte account address, stored lowercase with its `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate and normalize an address string.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if !ADDRESS_REGEX.is_match(trimmed) {
            return Err(TrailfundError::InvalidAddress {
                value: value.to_string(),
            });
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// The all-zero address, used for reads that do not depend on a wallet.
    pub fn zero() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    /// Lowercase `0x`-prefixed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against an unvalidated string.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl FromStr for WalletAddress {
    type Err = TrailfundError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Whether a wallet is available.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected {
        address: WalletAddress,
        /// Chain the signer reports; `None` for watch-only wallets.
        chain_id: Option<u64>,
    },
}

impl ConnectionState {
    /// A watch-only connection for `address`.
    pub fn watch_only(address: WalletAddress) -> Self {
        Self::Connected {
            address,
            chain_id: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// The connected address, if any.
    pub fn address(&self) -> Option<&WalletAddress> {
        match self {
            Self::Connected { address, .. } => Some(address),
            _ => None,
        }
    }

    /// Short label for display (`connected`, `connecting`, `disconnected`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected { .. } => "connected",
        }
    }
}
