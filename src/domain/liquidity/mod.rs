//! Liquidity provision - simulated LP position quotes

use std::time::Duration;

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tokio::time::sleep;
use tracing::info;

use crate::shared::config::LiquidityCfg;
use crate::shared::errors::SwapError;
use crate::shared::utils::{format_fixed, parse_positive_amount, simulated_tx_id, validate_address};

#[derive(Debug, Clone, PartialEq)]
pub struct AddLiquidityRequest {
    pub token_a: Pubkey,
    pub token_b: Pubkey,
    pub amount_a: f64,
    pub amount_b: f64,
    pub wallet: Pubkey,
}

impl AddLiquidityRequest {
    pub fn new(token_a: &str, token_b: &str, amount_a: &str, amount_b: &str, wallet: &str) -> Result<Self, SwapError> {
        let amount_a = parse_positive_amount(amount_a)?;
        let amount_b = parse_positive_amount(amount_b)?;
        if !(amount_a * amount_b).is_finite() {
            return Err(SwapError::invalid("Amounts are too large"));
        }
        let token_a = validate_address(token_a)?;
        let token_b = validate_address(token_b)?;
        if token_a == token_b {
            return Err(SwapError::invalid("Pool tokens must differ"));
        }
        let wallet = validate_address(wallet)
            .map_err(|_| SwapError::invalid("Invalid wallet address"))?;
        Ok(Self {
            token_a,
            token_b,
            amount_a,
            amount_b,
            wallet,
        })
    }

    /// LP tokens minted: a*b/100, 6 places. Simulation formula, not AMM math.
    pub fn lp_tokens(&self) -> String {
        format_fixed(self.amount_a * self.amount_b / 100.0, 6)
    }

    /// Pool share in percent: a*b/1000, 2 places
    pub fn pool_share(&self) -> String {
        format_fixed(self.amount_a * self.amount_b / 1000.0, 2)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityResult {
    pub success: bool,
    pub tx_id: String,
    pub lp_tokens: String,
    pub pool_share: String,
}

/// Answers add-liquidity requests after a fixed latency, without touching the chain
pub struct LiquiditySimulator {
    latency: Duration,
}

impl LiquiditySimulator {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn from_config(cfg: &LiquidityCfg) -> Self {
        Self::new(Duration::from_millis(cfg.simulated_latency_ms))
    }

    pub async fn add_liquidity(&self, request: &AddLiquidityRequest) -> LiquidityResult {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        let result = LiquidityResult {
            success: true,
            tx_id: simulated_tx_id(),
            lp_tokens: request.lp_tokens(),
            pool_share: request.pool_share(),
        };
        info!(
            "💧 Simulated liquidity {} + {} for {}: {} LP ({}%)",
            request.amount_a, request.amount_b, request.wallet, result.lp_tokens, result.pool_share
        );
        result
    }
}
