//! Client configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//! Environment variables override the file:
//!
//! - `PEERBOOK_WALLET_URL` - wallet endpoint (enables the session)
//! - `PEERBOOK_CONTRACT` - contract address
//! - `PEERBOOK_CHAIN_ID` - expected chain id

use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Bootstrap peer registry on Sepolia.
pub const DEFAULT_CONTRACT: Address = address!("fef23139179004d7d636a1e66316e42085640262");

/// Sepolia.
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub wallet: WalletConfig,
    pub contract: ContractConfig,
    pub confirmation: ConfirmationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the wallet. Absent means no wallet capability.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub address: Address,
    /// Checked against `eth_chainId` on connect when set.
    pub chain_id: Option<u64>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT,
            chain_id: Some(DEFAULT_CHAIN_ID),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            poll_interval_ms: 2000,
        }
    }
}

impl ConfirmationConfig {
    pub fn policy(&self) -> ConfirmPolicy {
        ConfirmPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// How long and how often to look for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl ClientConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PEERBOOK_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("PEERBOOK_WALLET_URL") {
            self.wallet.url = Some(url).filter(|u| !u.is_empty());
        }
        if let Some(contract) = lookup("PEERBOOK_CONTRACT") {
            self.contract.address = contract
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PEERBOOK_CONTRACT: {contract}")))?;
        }
        if let Some(chain_id) = lookup("PEERBOOK_CHAIN_ID") {
            self.contract.chain_id = Some(
                chain_id
                    .parse()
                    .map_err(|_| ConfigError::Invalid(format!("PEERBOOK_CHAIN_ID: {chain_id}")))?,
            );
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "confirmation.timeout_secs must be positive".into(),
            ));
        }
        if self.confirmation.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "confirmation.poll_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
