//! Execution history tracking.
//!
//! [`HistoryTracker`] holds the history of the current wallet and makes
//! sure only the most recent fetch is applied. Each fetch takes a
//! [`FetchTicket`]; a wallet change or a newer fetch bumps the generation,
//! and completing a stale ticket is a no-op.
//!
//! ```
//! use trailfund::history::{HistoryState, HistoryTracker};
//! use trailfund::wallet::WalletAddress;
//!
//! let mut tracker = HistoryTracker::new();
//! tracker.set_wallet(Some(WalletAddress::zero()));
//!
//! let first = tracker.begin_fetch().unwrap();
//! let second = tracker.begin_fetch().unwrap();
//!
//! assert!(tracker.complete(second, Ok(vec![])));
//! assert!(!tracker.complete(first, Ok(vec![])));
//! assert!(matches!(tracker.state(), HistoryState::Loaded(_)));
//! ```

use crate::error::Result;
use crate::pipeline::{Execution, StepSequencer};
use crate::trail::TrailClient;
use crate::wallet::{ConnectionState, WalletAddress};

/// Anything that can list a wallet's executions.
pub trait ExecutionSource {
    fn fetch_executions(&self, wallet: &WalletAddress) -> Result<Vec<Execution>>;
}

impl ExecutionSource for TrailClient {
    fn fetch_executions(&self, wallet: &WalletAddress) -> Result<Vec<Execution>> {
        self.wallet_executions(wallet)
    }
}

/// Where the current wallet's history stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HistoryState {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    Loaded(Vec<Execution>),
    /// The last fetch failed; the next refresh retries.
    Unavailable(String),
}

impl HistoryState {
    /// Short label (`idle`, `loading`, `loaded`, `unavailable`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Proof of a started fetch; only the newest ticket may complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    wallet: WalletAddress,
}

impl FetchTicket {
    /// Wallet this fetch is for.
    pub fn wallet(&self) -> &WalletAddress {
        &self.wallet
    }
}

/// History of the current wallet with last-fetch-wins semantics.
#[derive(Debug, Default)]
pub struct HistoryTracker {
    wallet: Option<WalletAddress>,
    generation: u64,
    state: HistoryState,
}

impl HistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch wallets. Any in-flight fetch is invalidated and history is cleared.
    pub fn set_wallet(&mut self, wallet: Option<WalletAddress>) {
        if self.wallet == wallet {
            return;
        }
        tracing::debug!(
            "History wallet changed to {}",
            wallet.as_ref().map(|w| w.as_str()).unwrap_or("none")
        );
        self.wallet = wallet;
        self.generation += 1;
        self.state = HistoryState::Idle;
    }

    /// Follow a connection state: disconnecting clears the wallet.
    pub fn follow(&mut self, connection: &ConnectionState) {
        self.set_wallet(connection.address().cloned());
    }

    pub fn wallet(&self) -> Option<&WalletAddress> {
        self.wallet.as_ref()
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    /// Start a fetch for the current wallet. `None` without a wallet.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let wallet = self.wallet.clone()?;
        self.generation += 1;
        self.state = HistoryState::Loading;
        Some(FetchTicket {
            generation: self.generation,
            wallet,
        })
    }

    /// Apply a fetch result if its ticket is still current.
    ///
    /// Returns whether the result was applied.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<Execution>>) -> bool {
        let current = ticket.generation == self.generation
            && self.wallet.as_ref() == Some(&ticket.wallet);
        if !current {
            tracing::debug!(
                "Ignoring stale history fetch (generation {}, now {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(executions) => HistoryState::Loaded(executions),
            Err(e) => {
                tracing::warn!("Failed to load execution history: {}", e);
                HistoryState::Unavailable(e.to_string())
            }
        };
        true
    }

    /// Fetch and apply in one go.
    pub fn refresh(&mut self, source: &dyn ExecutionSource) -> &HistoryState {
        if let Some(ticket) = self.begin_fetch() {
            let result = source.fetch_executions(ticket.wallet());
            self.complete(ticket, result);
        }
        &self.state
    }

    /// Loaded executions; empty while idle, loading, or unavailable.
    pub fn executions(&self) -> &[Execution] {
        match &self.state {
            HistoryState::Loaded(executions) => executions,
            _ => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.state, HistoryState::Unavailable(_))
    }

    /// Sequencer over the current history.
    pub fn sequencer<'a>(&'a self, connection: &ConnectionState) -> StepSequencer<'a> {
        StepSequencer::new(connection, self.executions())
    }
}
