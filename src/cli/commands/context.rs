//! Shared state for commands: resolved config and the clients built from it.

use std::path::Path;
use std::time::Duration;

use crate::chain::JsonRpcClient;
use crate::config::{load_config, validate, TrailfundConfig};
use crate::error::Result;
use crate::history::HistoryTracker;
use crate::trail::TrailClient;
use crate::ui::UserInterface;
use crate::wallet::{
    connect_with_retry, ConnectionState, RpcWalletConnector, StaticConnector, WalletAddress,
    WalletConnector,
};

/// Resolved configuration plus the global `--wallet` override.
#[derive(Debug, Clone)]
pub struct CommandContext {
    config: TrailfundConfig,
}

impl CommandContext {
    /// Load, override, and validate configuration for a project.
    pub fn load(
        project_root: &Path,
        explicit: Option<&Path>,
        wallet: Option<&str>,
    ) -> Result<Self> {
        let mut config = load_config(project_root, explicit)?;
        if let Some(wallet) = wallet {
            config.wallet.address = Some(wallet.to_string());
        }
        validate(&config)?;
        Ok(Self::from_config(config))
    }

    /// Wrap an already resolved config.
    pub fn from_config(config: TrailfundConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrailfundConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.trail.timeout_secs)
    }

    pub fn trail(&self) -> Result<TrailClient> {
        TrailClient::new(&self.config.trail)
    }

    /// Node for direct chain reads, when `chain.rpc_url` is set.
    pub fn rpc(&self) -> Result<Option<JsonRpcClient>> {
        self.config
            .chain
            .rpc_url
            .as_deref()
            .map(|url| JsonRpcClient::new(url, self.timeout()))
            .transpose()
    }

    /// Wallet signer endpoint, when `wallet.signer_url` is set.
    pub fn signer(&self) -> Result<Option<JsonRpcClient>> {
        self.config
            .wallet
            .signer_url
            .as_deref()
            .map(|url| JsonRpcClient::new(url, self.timeout()))
            .transpose()
    }

    /// Configured wallet address, if any.
    pub fn wallet_address(&self) -> Result<Option<WalletAddress>> {
        self.config
            .wallet
            .address
            .as_deref()
            .map(WalletAddress::parse)
            .transpose()
    }

    /// Connect through the signer (with retries) or fall back to a
    /// watch-only wallet from configuration.
    pub fn connect(&self, signer: Option<&JsonRpcClient>) -> Result<ConnectionState> {
        let preferred = self.wallet_address()?;
        match signer {
            Some(rpc) => {
                let connector = RpcWalletConnector::new(rpc, preferred);
                Ok(connect_with_retry(
                    &connector,
                    &self.config.wallet.connect,
                    std::thread::sleep,
                ))
            }
            None => StaticConnector::new(preferred).connect(),
        }
    }

    /// Fetch the wallet's history, warning when it is unavailable.
    pub fn history(
        &self,
        ui: &mut dyn UserInterface,
        trail: &TrailClient,
        connection: &ConnectionState,
    ) -> HistoryTracker {
        let mut tracker = HistoryTracker::new();
        tracker.follow(connection);
        self.refresh_history(ui, trail, &mut tracker);
        tracker
    }

    /// Refetch history for the tracker's wallet.
    pub fn refresh_history(
        &self,
        ui: &mut dyn UserInterface,
        trail: &TrailClient,
        tracker: &mut HistoryTracker,
    ) {
        if tracker.wallet().is_none() {
            return;
        }

        let mut spinner = ui.start_spinner("Loading execution history");
        tracker.refresh(trail);
        spinner.finish_clear();

        if tracker.is_unavailable() {
            ui.warning("History unavailable; showing steps as if nothing was executed yet");
        }
    }
}

/// Current time in unix seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    const WALLET: &str = "0xAbCdEf0000000000000000000000000000000001";

    #[test]
    fn wallet_flag_overrides_config() {
        let temp = TempDir::new().unwrap();
        let context = CommandContext::load(temp.path(), None, Some(WALLET)).unwrap();

        let address = context.wallet_address().unwrap().unwrap();
        assert_eq!(address.as_str(), WALLET.to_lowercase());
    }

    #[test]
    fn invalid_wallet_flag_is_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(CommandContext::load(temp.path(), None, Some("0x123")).is_err());
    }

    #[test]
    fn missing_explicit_config_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = CommandContext::load(temp.path(), Some(&temp.path().join("nope.yml")), None)
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn project_config_is_used() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".trailfund")).unwrap();
        fs::write(
            temp.path().join(".trailfund/config.yml"),
            "campaign:\n  crowdfund_id: \"42\"\n",
        )
        .unwrap();

        let context = CommandContext::load(temp.path(), None, None).unwrap();
        assert_eq!(context.config().campaign.crowdfund_id, "42");
    }

    #[test]
    fn static_connection_without_signer() {
        let mut config = TrailfundConfig::default();
        config.wallet.address = Some(WALLET.to_string());
        let context = CommandContext::from_config(config);

        let connection = context.connect(None).unwrap();
        assert!(connection.is_connected());
        assert!(context.signer().unwrap().is_none());
    }

    #[test]
    fn no_wallet_means_disconnected() {
        let context = CommandContext::from_config(TrailfundConfig::default());
        assert_eq!(context.connect(None).unwrap(), ConnectionState::Disconnected);
    }

    #[test]
    fn history_is_skipped_without_wallet() {
        let context = CommandContext::from_config(TrailfundConfig::default());
        let trail = context.trail().unwrap();
        let mut ui = MockUI::new();

        let tracker = context.history(&mut ui, &trail, &ConnectionState::Disconnected);
        assert!(tracker.executions().is_empty());
        assert!(ui.spinners().is_empty());
    }
}
