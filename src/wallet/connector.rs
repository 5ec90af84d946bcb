//! Wallet connectors.

use std::time::Duration;

use crate::chain::{JsonRpcClient, TransactionSubmitter};
use crate::error::{Result, TrailfundError};

use super::{ConnectionState, RetryPolicy, WalletAddress};

/// Produces a connection to a wallet.
pub trait WalletConnector {
    /// Try once to connect.
    fn connect(&self) -> Result<ConnectionState>;
}

/// A watch-only wallet given by address (or no wallet at all).
#[derive(Debug, Clone, Default)]
pub struct StaticConnector {
    address: Option<WalletAddress>,
}

impl StaticConnector {
    pub fn new(address: Option<WalletAddress>) -> Self {
        Self { address }
    }
}

impl WalletConnector for StaticConnector {
    fn connect(&self) -> Result<ConnectionState> {
        Ok(match &self.address {
            Some(address) => ConnectionState::watch_only(address.clone()),
            None => ConnectionState::Disconnected,
        })
    }
}

/// Connects through a signer's JSON-RPC endpoint (`eth_accounts`).
///
/// When `preferred` is set, that account must be among the signer's
/// accounts; otherwise the first account is used.
pub struct RpcWalletConnector<'a> {
    rpc: &'a JsonRpcClient,
    preferred: Option<WalletAddress>,
}

impl<'a> RpcWalletConnector<'a> {
    pub fn new(rpc: &'a JsonRpcClient, preferred: Option<WalletAddress>) -> Self {
        Self { rpc, preferred }
    }
}

impl WalletConnector for RpcWalletConnector<'_> {
    fn connect(&self) -> Result<ConnectionState> {
        let accounts = self.rpc.accounts()?;

        let address = match &self.preferred {
            Some(preferred) => {
                if !accounts.iter().any(|a| preferred.matches(a)) {
                    return Err(TrailfundError::ConfigValidationError {
                        message: format!(
                            "signer at {} does not control {}",
                            self.rpc.url(),
                            preferred
                        ),
                    });
                }
                preferred.clone()
            }
            None => {
                let first = accounts.first().ok_or(TrailfundError::WalletNotConnected)?;
                WalletAddress::parse(first)?
            }
        };

        let chain_id = self.rpc.chain_id()?;
        Ok(ConnectionState::Connected {
            address,
            chain_id: Some(chain_id),
        })
    }
}

/// Connect with bounded retries.
///
/// Never fails: after the last attempt the wallet is reported as
/// [`ConnectionState::Disconnected`]. `sleep` is called with each backoff
/// delay so tests can skip real waiting.
pub fn connect_with_retry(
    connector: &dyn WalletConnector,
    policy: &RetryPolicy,
    mut sleep: impl FnMut(Duration),
) -> ConnectionState {
    let mut attempt = 0;

    while policy.allows_another(attempt) {
        attempt += 1;
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            sleep(delay);
        }

        tracing::debug!("Wallet connect attempt {}/{}", attempt, policy.max_attempts);
        match connector.connect() {
            Ok(state) => return state,
            Err(e) => tracing::warn!("Wallet connect attempt {} failed: {}", attempt, e),
        }
    }

    ConnectionState::Disconnected
}
