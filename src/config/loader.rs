//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::config::merger::merge_configs;
use crate::config::schema::TrailfundConfig;
use crate::error::{Result, TrailfundError};

/// Environment variable holding a watch-only wallet address.
pub const ENV_WALLET: &str = "TRAILFUND_WALLET";
/// Environment variable overriding `trail.base_url`.
pub const ENV_API_URL: &str = "TRAILFUND_API_URL";
/// Environment variable overriding `chain.rpc_url`.
pub const ENV_RPC_URL: &str = "TRAILFUND_RPC_URL";
/// Environment variable overriding `wallet.signer_url`.
pub const ENV_SIGNER_URL: &str = "TRAILFUND_SIGNER_URL";

/// Config files in merge order (later overrides earlier).
///
/// 1. User global config (`~/.trailfund/config.yml`)
/// 2. Project config (`.trailfund/config.yml`)
/// 3. Local overrides (`.trailfund/config.local.yml`)
/// 4. Explicit `--config` file
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub user_global: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub project_local: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for a project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            user_global: dirs::home_dir()
                .map(|home| home.join(".trailfund").join("config.yml"))
                .filter(|p| p.exists()),
            project: existing(project_root.join(".trailfund").join("config.yml")),
            project_local: existing(project_root.join(".trailfund").join("config.local.yml")),
            explicit: None,
        }
    }

    /// Add an explicit config file on top of the discovered ones.
    ///
    /// The file must exist; a missing explicit config is an error when loading.
    pub fn with_explicit(mut self, path: Option<&Path>) -> Self {
        self.explicit = path.map(Path::to_path_buf);
        self
    }

    /// All paths to load, in merge order.
    pub fn all(&self) -> Vec<&PathBuf> {
        [
            &self.user_global,
            &self.project,
            &self.project_local,
            &self.explicit,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Load a config file as a raw YAML value for merging.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TrailfundError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            TrailfundError::Io(e)
        }
    })?;

    serde_yaml::from_str(&content).map_err(|e| TrailfundError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse YAML content into a config, for a single file.
pub fn parse_config(content: &str, source_path: &Path) -> Result<TrailfundConfig> {
    serde_yaml::from_str(content).map_err(|e| TrailfundError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Merge the built-in defaults with every file in `paths`.
pub fn load_from_paths(paths: &ConfigPaths) -> Result<TrailfundConfig> {
    let defaults = serde_yaml::to_value(TrailfundConfig::default()).map_err(|e| {
        TrailfundError::Other(anyhow::anyhow!("failed to serialize defaults: {}", e))
    })?;

    let mut layers = vec![defaults];
    for path in paths.all() {
        tracing::debug!("Loading config layer {}", path.display());
        layers.push(load_config_value(path)?);
    }

    let merged = merge_configs(&layers);
    let source = paths
        .all()
        .last()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("<defaults>"));

    serde_yaml::from_value(merged).map_err(|e| TrailfundError::ConfigParseError {
        path: source,
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Apply `TRAILFUND_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut TrailfundConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(wallet) = get(ENV_WALLET) {
        config.wallet.address = Some(wallet);
    }
    if let Some(url) = get(ENV_API_URL) {
        config.trail.base_url = url;
    }
    if let Some(url) = get(ENV_RPC_URL) {
        config.chain.rpc_url = Some(url);
    }
    if let Some(url) = get(ENV_SIGNER_URL) {
        config.wallet.signer_url = Some(url);
    }
}

/// Load the fully resolved configuration for a project.
///
/// Files are optional; the defaults alone describe the production campaign.
/// `explicit` must exist when given.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<TrailfundConfig> {
    let paths = ConfigPaths::discover(project_root).with_explicit(explicit);
    let mut config = load_from_paths(&paths)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}
