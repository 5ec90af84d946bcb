//! Configuration loading, merging, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and environment overrides in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use trailfund::config::{load_from_paths, validate, ConfigPaths};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".trailfund");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "campaign:\n  crowdfund_id: \"42\"\n").unwrap();
//!
//! let paths = ConfigPaths { user_global: None, ..ConfigPaths::discover(temp.path()) };
//! let config = load_from_paths(&paths).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.campaign.crowdfund_id, "42");
//! assert_eq!(config.token.symbol, "USDC");
//! ```
//!
//! # Configuration Layers
//!
//! 1. Built-in defaults
//! 2. User global config (`~/.trailfund/config.yml`)
//! 3. Project config (`.trailfund/config.yml`)
//! 4. Local overrides (`.trailfund/config.local.yml`)
//! 5. `--config <path>`
//! 6. `TRAILFUND_*` environment variables

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{
    apply_env_overrides, load_config, load_config_value, load_from_paths, parse_config,
    ConfigPaths, ENV_API_URL, ENV_RPC_URL, ENV_SIGNER_URL, ENV_WALLET,
};
pub use merger::{deep_merge, merge_configs};
pub use schema::{
    CampaignSettings, ChainSettings, CommunitySettings, ReadNodes, StepNode, StepNodes,
    TokenSettings, TrailSettings, TrailfundConfig, WalletSettings,
};
pub use validator::{validate, validate_config, ValidationError, MAX_DECIMALS};
