//! CLI configuration — parsed from TOML file + environment variable overrides.
//!
//! Priority: environment variables > config file > defaults.

use anyhow::{Context, Result};
use bequest_core::types::Network;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chain / contract settings
    pub chain: ChainSection,

    /// Permanent-storage gateway settings
    #[serde(default)]
    pub storage: StorageSection,

    /// Key-distribution service settings
    pub keyservice: KeyServiceSection,

    /// Output settings
    #[serde(default)]
    pub output: OutputSection,
}

/// Chain settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSection {
    /// Network: "mainnet" or "sepolia"
    pub network: Network,

    /// Inheritance contract address (0x-prefixed hex)
    pub contract: String,

    /// Ordered RPC endpoint list; empty means the built-in defaults
    #[serde(default)]
    pub endpoints: Vec<String>,
}

/// Storage gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// Gateway base URL
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
        }
    }
}

/// Key-distribution service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyServiceSection {
    /// Service base URL
    pub base_url: String,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Directory decrypted assets are written into
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

fn default_gateway_url() -> String {
    bequest_storage::DEFAULT_GATEWAY.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./claims")
}

impl Config {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Apply environment variable overrides.
    ///
    /// - `BEQUEST_RPC_ENDPOINTS` — comma-separated endpoint list
    /// - `BEQUEST_CONTRACT` — contract address
    /// - `BEQUEST_GATEWAY_URL` — storage gateway base URL
    /// - `BEQUEST_KEYSERVICE_URL` — key service base URL
    /// - `BEQUEST_OUTPUT_DIR` — output directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoints) = std::env::var("BEQUEST_RPC_ENDPOINTS") {
            self.chain.endpoints = endpoints
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(contract) = std::env::var("BEQUEST_CONTRACT") {
            self.chain.contract = contract;
        }
        if let Ok(url) = std::env::var("BEQUEST_GATEWAY_URL") {
            self.storage.gateway_url = url;
        }
        if let Ok(url) = std::env::var("BEQUEST_KEYSERVICE_URL") {
            self.keyservice.base_url = url;
        }
        if let Ok(dir) = std::env::var("BEQUEST_OUTPUT_DIR") {
            self.output.directory = PathBuf::from(dir);
        }
    }

    /// Validate the configuration without touching the network.
    pub fn validate(&self) -> Result<()> {
        self.chain
            .contract
            .parse::<bequest_core::types::Address>()
            .context("chain.contract is not a valid address")?;
        if self.keyservice.base_url.is_empty() {
            anyhow::bail!("keyservice.base_url must be set");
        }
        Ok(())
    }

    /// The RPC endpoint list to use: configured, or the network defaults.
    pub fn endpoints(&self) -> Vec<String> {
        if self.chain.endpoints.is_empty() {
            bequest_chain::default_endpoints(self.chain.network)
        } else {
            self.chain.endpoints.clone()
        }
    }
}
