//! Configuration for the curve trader
//!
//! Loaded from a TOML file with per-field defaults, after `.env` has been
//! applied to the process environment. CLI flags override individual values.

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::str::FromStr;
use std::time::Duration;

use crate::tx_builder::constants::{
    DEFAULT_PRIORITY_FEE_MICRO_LAMPORTS, DEFAULT_TOKEN_DECIMALS,
};
use crate::tx_builder::TxBuilderConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rpc: RpcConfig,

    #[serde(default)]
    pub trading: TradingConfig,

    #[serde(default)]
    pub quote: QuoteConfig,

    #[serde(default)]
    pub wallet: WalletConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// `processed`, `confirmed` or `finalized`
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    #[serde(default = "default_decimals")]
    pub decimals: u8,

    #[serde(default = "default_priority_fee")]
    pub priority_fee_micro_lamports: u64,

    #[serde(default = "default_slippage_percent")]
    pub sell_slippage_percent: u8,

    #[serde(default = "default_bump_spend")]
    pub bump_spend_lamports: u64,

    #[serde(default = "default_slippage_percent")]
    pub bump_sell_slippage_percent: u8,

    /// Simulate before every broadcast and abort on rejection
    #[serde(default = "default_true")]
    pub simulate_before_send: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    #[serde(default = "default_quote_url")]
    pub base_url: String,

    #[serde(default = "default_quote_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to a Solana CLI keypair file
    #[serde(default)]
    pub keypair_path: Option<String>,

    /// Environment variable holding a base58 secret key, used when no path is set
    #[serde(default = "default_secret_env")]
    pub secret_key_env: String,
}

// Default value functions
fn default_rpc_url() -> String { "https://api.mainnet-beta.solana.com".to_string() }
fn default_commitment() -> String { "confirmed".to_string() }
fn default_rpc_timeout() -> u64 { 30 }
fn default_decimals() -> u8 { DEFAULT_TOKEN_DECIMALS }
fn default_priority_fee() -> u64 { DEFAULT_PRIORITY_FEE_MICRO_LAMPORTS }
fn default_slippage_percent() -> u8 { 99 }
fn default_bump_spend() -> u64 { 100_000 }
fn default_true() -> bool { true }
fn default_quote_url() -> String { crate::quote_source::DEFAULT_QUOTE_BASE_URL.to_string() }
fn default_quote_timeout() -> u64 { 10 }
fn default_secret_env() -> String { "CURVE_TRADER_SECRET_KEY".to_string() }

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            commitment: default_commitment(),
            timeout_secs: default_rpc_timeout(),
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            decimals: default_decimals(),
            priority_fee_micro_lamports: default_priority_fee(),
            sell_slippage_percent: default_slippage_percent(),
            bump_spend_lamports: default_bump_spend(),
            bump_sell_slippage_percent: default_slippage_percent(),
            simulate_before_send: default_true(),
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_quote_url(),
            timeout_secs: default_quote_timeout(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: None,
            secret_key_env: default_secret_env(),
        }
    }
}

impl RpcConfig {
    pub fn commitment_config(&self) -> anyhow::Result<CommitmentConfig> {
        let commitment = CommitmentLevel::from_str(&self.commitment)
            .map_err(|_| anyhow::anyhow!("Unknown commitment level '{}'", self.commitment))?;
        Ok(CommitmentConfig { commitment })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl QuoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TradingConfig {
    pub fn builder_config(&self) -> TxBuilderConfig {
        TxBuilderConfig {
            decimals: self.decimals,
            priority_fee_micro_lamports: self.priority_fee_micro_lamports,
            sell_slippage_percent: self.sell_slippage_percent,
            bump_spend_lamports: self.bump_spend_lamports,
            bump_sell_slippage_percent: self.bump_sell_slippage_percent,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration after applying `.env` to the environment
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }

    /// Reject values the builder cannot work with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rpc.url.trim().is_empty() {
            anyhow::bail!("rpc.url must not be empty");
        }
        self.rpc.commitment_config()?;
        if self.rpc.timeout_secs == 0 {
            anyhow::bail!("rpc.timeout_secs must be positive");
        }
        if self.trading.decimals > 19 {
            anyhow::bail!("trading.decimals must be at most 19, got {}", self.trading.decimals);
        }
        if self.trading.sell_slippage_percent > 100 {
            anyhow::bail!(
                "trading.sell_slippage_percent must be 0..=100, got {}",
                self.trading.sell_slippage_percent
            );
        }
        if self.trading.bump_sell_slippage_percent > 100 {
            anyhow::bail!(
                "trading.bump_sell_slippage_percent must be 0..=100, got {}",
                self.trading.bump_sell_slippage_percent
            );
        }
        if self.trading.bump_spend_lamports > i64::MAX as u64 {
            anyhow::bail!("trading.bump_spend_lamports exceeds i64::MAX");
        }
        if !self.quote.base_url.starts_with("http://") && !self.quote.base_url.starts_with("https://") {
            anyhow::bail!("quote.base_url must be an http(s) URL");
        }
        Ok(())
    }
}
