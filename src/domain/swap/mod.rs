//! Swap domain - validated swap requests, results and the external pipeline seams

mod executor;

pub use executor::SwapExecutor;

use async_trait::async_trait;
use serde::Serialize;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction};

use crate::domain::token::Token;
use crate::shared::errors::SwapError;
use crate::shared::types::{SlippageBps, SwapMode};
use crate::shared::utils::{parse_positive_amount, validate_address};

/// Swap request. Constructed only when every field validates.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRequest {
    pub input_token: Token,
    pub output_token: Token,
    pub amount: String,
    pub amount_value: f64,
    pub slippage: SlippageBps,
    pub mode: SwapMode,
    pub wallet: Pubkey,
}

impl SwapRequest {
    pub fn new(
        input_token: Token,
        output_token: Token,
        amount: &str,
        slippage_bps: u16,
        wallet_address: &str,
    ) -> Result<Self, SwapError> {
        validate_address(&input_token.address)?;
        validate_address(&output_token.address)?;
        if input_token.same_asset(&output_token) {
            return Err(SwapError::invalid("Input and output tokens must differ"));
        }
        let amount_value = parse_positive_amount(amount)?;
        let slippage = SlippageBps::new(slippage_bps)?;
        let wallet = validate_address(wallet_address)?;
        Ok(Self {
            input_token,
            output_token,
            amount: amount.trim().to_string(),
            amount_value,
            slippage,
            mode: SwapMode::ExactIn,
            wallet,
        })
    }

    pub fn with_mode(mut self, mode: SwapMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn pair_label(&self) -> String {
        format!("{} -> {}", self.input_token.symbol, self.output_token.symbol)
    }
}

/// Outcome of a submitted swap. Terminal, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub success: bool,
    pub tx_id: String,
    pub amount_in: String,
    pub amount_out: String,
    pub fee: String,
}

/// Route priced by the aggregator for one concrete swap
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuote {
    pub in_amount: String,
    pub out_amount: String,
    pub fee: String,
    pub price_impact: String,
    pub route: Vec<String>,
    /// Aggregator payload needed to build the transaction
    pub payload: serde_json::Value,
}

/// External aggregator: prices a route and builds the unsigned transaction
#[async_trait]
pub trait SwapAggregator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn route(&self, request: &SwapRequest) -> Result<RouteQuote, SwapError>;

    async fn build_transaction(&self, route: &RouteQuote, owner: &Pubkey) -> Result<VersionedTransaction, SwapError>;
}

/// Transaction submission to the chain (or a stand-in)
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, transaction: &VersionedTransaction) -> Result<Signature, SwapError>;
}

/// True when the fee-payer signature slot is filled
pub fn is_signed(transaction: &VersionedTransaction) -> bool {
    transaction
        .signatures
        .first()
        .map(|sig| *sig != Signature::default())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{TokenRegistry, SOL_MINT, USDC_MINT};

    const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn tokens() -> (Token, Token) {
        let registry = TokenRegistry::with_defaults();
        (
            registry.resolve(USDC_MINT).unwrap().clone(),
            registry.resolve(SOL_MINT).unwrap().clone(),
        )
    }

    #[test]
    fn test_valid_request() {
        let (usdc, sol) = tokens();
        let request = SwapRequest::new(usdc, sol, "5", 50, WALLET).unwrap();
        assert_eq!(request.amount_value, 5.0);
        assert_eq!(request.slippage.bps(), 50);
        assert_eq!(request.wallet.to_string(), WALLET);
        assert_eq!(request.pair_label(), "USDC -> SOL");
    }

    #[test]
    fn test_rejections() {
        let (usdc, sol) = tokens();
        assert!(SwapRequest::new(usdc.clone(), usdc.clone(), "5", 50, WALLET).is_err());
        assert!(SwapRequest::new(usdc.clone(), sol.clone(), "0", 50, WALLET).is_err());
        assert!(SwapRequest::new(usdc.clone(), sol.clone(), "5", 0, WALLET).is_err());
        assert!(SwapRequest::new(usdc.clone(), sol.clone(), "5", 10_001, WALLET).is_err());
        assert!(SwapRequest::new(usdc.clone(), sol.clone(), "5", 50, "not-a-wallet").is_err());

        let mut bogus = sol;
        bogus.address = "JUP".to_string();
        assert!(SwapRequest::new(usdc, bogus, "5", 50, WALLET).is_err());
    }

    #[test]
    fn test_swap_result_wire_names() {
        let result = SwapResult {
            success: true,
            tx_id: "sig".to_string(),
            amount_in: "5".to_string(),
            amount_out: "0.0349".to_string(),
            fee: "0.0125".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["txId"], "sig");
        assert_eq!(json["amountIn"], "5");
        assert_eq!(json["amountOut"], "0.0349");
    }
}
