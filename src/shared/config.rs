//! Configuration loading (Config.toml)

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::domain::token::Token;
use crate::shared::errors::AppError;
use crate::shared::types::SlippageBps;

pub const DEFAULT_CONFIG_PATH: &str = "Config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    pub host: String,
    pub port: u16,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcCfg {
    pub url: String,
    pub commitment: String,
}

impl Default for RpcCfg {
    fn default() -> Self {
        Self {
            url: "https://api.devnet.solana.com".to_string(),
            commitment: "confirmed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregatorMode {
    Simulated,
    Jupiter,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregatorCfg {
    pub mode: AggregatorMode,
    pub quote_url: String,
    pub swap_url: String,
    pub timeout_ms: u64,
    /// Fee charged by the simulated route, in basis points of the input
    pub fee_bps: u32,
    /// Price impact reported by the simulated route, in percent
    pub price_impact_pct: String,
}

impl Default for AggregatorCfg {
    fn default() -> Self {
        Self {
            mode: AggregatorMode::Simulated,
            quote_url: "https://quote-api.jup.ag/v6/quote".to_string(),
            swap_url: "https://quote-api.jup.ag/v6/swap".to_string(),
            timeout_ms: 10_000,
            fee_bps: 25,
            price_impact_pct: "0.04".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuoteCfg {
    pub freshness_secs: u64,
    pub refresh_interval_secs: u64,
    pub default_slippage_bps: u16,
}

impl Default for QuoteCfg {
    fn default() -> Self {
        Self {
            freshness_secs: 10,
            refresh_interval_secs: 10,
            default_slippage_bps: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletMode {
    Mock,
    Keypair,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalletCfg {
    pub mode: WalletMode,
    pub keypair_path: Option<String>,
    /// Balance reported for every token when balances are not read from chain
    pub mock_balance: f64,
    pub connect_delay_ms: u64,
}

impl Default for WalletCfg {
    fn default() -> Self {
        Self {
            mode: WalletMode::Mock,
            keypair_path: None,
            mock_balance: 10.0,
            connect_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LiquidityCfg {
    pub simulated_latency_ms: u64,
}

impl Default for LiquidityCfg {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokensCfg {
    pub token_list_url: Option<String>,
    pub extra: Vec<Token>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerCfg,
    pub rpc: RpcCfg,
    pub aggregator: AggregatorCfg,
    pub quote: QuoteCfg,
    pub wallet: WalletCfg,
    pub liquidity: LiquidityCfg,
    pub tokens: TokensCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        SlippageBps::new(self.quote.default_slippage_bps)
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        if self.quote.freshness_secs == 0 {
            return Err(AppError::ConfigError("quote.freshness_secs must be positive".to_string()));
        }
        if self.quote.refresh_interval_secs == 0 {
            return Err(AppError::ConfigError(
                "quote.refresh_interval_secs must be positive".to_string(),
            ));
        }
        // a slower refresh would let the displayed quote expire between ticks
        if self.quote.refresh_interval_secs > self.quote.freshness_secs {
            return Err(AppError::ConfigError(format!(
                "quote.refresh_interval_secs ({}) must not exceed quote.freshness_secs ({})",
                self.quote.refresh_interval_secs, self.quote.freshness_secs
            )));
        }
        if self.wallet.mode == WalletMode::Keypair && self.wallet.keypair_path.is_none() {
            return Err(AppError::ConfigError(
                "wallet.keypair_path is required in keypair mode".to_string(),
            ));
        }
        if self.wallet.mock_balance < 0.0 || !self.wallet.mock_balance.is_finite() {
            return Err(AppError::ConfigError("wallet.mock_balance must be >= 0".to_string()));
        }
        Ok(())
    }

    pub fn default_slippage(&self) -> SlippageBps {
        SlippageBps::new(self.quote.default_slippage_bps).unwrap_or_default()
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the given file, or Config.toml when present, or defaults
    pub fn load(path: Option<&str>) -> Result<Config, AppError> {
        match path {
            Some(path) => Config::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Config::default()),
        }
    }
}
