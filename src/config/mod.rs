use crate::engine::CycleSettings;
use crate::fixed_point::{self, FixedPointError};
use alloy::primitives::{address, Address};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid address in {var}: {value}")]
    InvalidAddress { var: String, value: String },
    #[error("invalid ETH target {0:?} (must be a positive number)")]
    InvalidTarget(String),
    #[error("invalid polling interval {0:?} (must be a positive integer of milliseconds)")]
    InvalidInterval(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint - env RPC_URL overrides
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Auction strategy contract
    #[serde(default = "default_strategy_address")]
    pub strategy_address: Address,
    /// Reserve-backed token contract
    #[serde(default = "default_token_address")]
    pub token_address: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Delay between refresh cycles in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// ETH thresholds to project, shown in this order.
    #[serde(default = "default_targets")]
    pub targets_eth: Vec<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewConfig {
    /// Token amount to value in ETH each cycle. Kept as the raw string so a
    /// malformed value is reported on its dashboard line, not at startup.
    #[serde(default)]
    pub token_amount: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,
    /// Print each snapshot as one JSON line instead of the text dashboard.
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_rpc_url() -> String {
    "https://eth.llamarpc.com".to_string()
}
fn default_strategy_address() -> Address {
    address!("0x489f2913588cc34de20fe55ee1130529656a6625")
}
fn default_token_address() -> Address {
    address!("0x38778e6d4d0dbe9becef3ae8b938570209efa48b")
}
fn default_interval_ms() -> u64 {
    5000
}
fn default_targets() -> Vec<Decimal> {
    vec![Decimal::from(50), Decimal::from(40), Decimal::from(30)]
}
fn default_token_symbol() -> String {
    "PAST".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            strategy_address: default_strategy_address(),
            token_address: default_token_address(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            targets_eth: default_targets(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            token_symbol: default_token_symbol(),
            json: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)?.with_env(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with environment variables (no file needed).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the process environment in production).
    /// RPC URLs often embed API keys, so they are never required in the file.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RPC_URL").filter(|v| !v.trim().is_empty()) {
            self.chain.rpc_url = url.trim().to_string();
        }
        if let Some(raw) = lookup("STRATEGY_ADDRESS") {
            self.chain.strategy_address = parse_address("STRATEGY_ADDRESS", &raw)?;
        }
        if let Some(raw) = lookup("TOKEN_ADDRESS") {
            self.chain.token_address = parse_address("TOKEN_ADDRESS", &raw)?;
        }
        if let Some(raw) = lookup("INTERVAL_MS") {
            self.poll.interval_ms = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidInterval(raw.clone()))?;
        }
        if let Some(raw) = lookup("TARGETS_ETH") {
            self.poll.targets_eth = parse_targets(&raw)?;
        }
        if let Some(raw) = lookup("TOKEN_AMOUNT") {
            let trimmed = raw.trim();
            self.preview.token_amount = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval("0".to_string()));
        }
        if let Some(bad) = self.poll.targets_eth.iter().find(|t| **t <= Decimal::ZERO) {
            return Err(ConfigError::InvalidTarget(bad.to_string()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    /// Why the configured preview amount cannot be valued, if it cannot.
    /// The dashboard reports this every cycle; callers log it once.
    pub fn preview_amount_error(&self) -> Option<FixedPointError> {
        let amount = self.preview.token_amount.as_deref()?;
        fixed_point::parse_amount(amount).err()
    }

    pub fn cycle_settings(&self) -> CycleSettings {
        CycleSettings {
            targets_eth: self.poll.targets_eth.clone(),
            preview_amount: self.preview.token_amount.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chain: ChainConfig::default(),
            poll: PollConfig::default(),
            preview: PreviewConfig::default(),
            display: DisplayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn parse_address(var: &str, raw: &str) -> Result<Address, ConfigError> {
    Address::from_str(raw.trim()).map_err(|_| ConfigError::InvalidAddress {
        var: var.to_string(),
        value: raw.to_string(),
    })
}

/// Parse a comma separated list of positive ETH thresholds, e.g. "50, 40, 30".
pub fn parse_targets(raw: &str) -> Result<Vec<Decimal>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match Decimal::from_str(s) {
            Ok(v) if v > Decimal::ZERO => Ok(v),
            _ => Err(ConfigError::InvalidTarget(s.to_string())),
        })
        .collect()
}
