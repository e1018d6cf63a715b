//! Simulated aggregator - prices routes from registry display prices

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use solana_sdk::{
    hash::Hash,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use tracing::{debug, info};

use crate::domain::quote::{estimate_output, Quote, QuoteProvider, QuoteRequest, QUOTE_OUTPUT_DECIMALS};
use crate::domain::swap::{is_signed, RouteQuote, SwapAggregator, SwapRequest, TransactionSubmitter};
use crate::shared::config::AggregatorCfg;
use crate::shared::errors::SwapError;
use crate::shared::types::SwapMode;
use crate::shared::utils::format_fixed;

/// Decimal places of amounts returned by the simulated swap route
const ROUTE_DECIMALS: usize = 4;

pub struct SimulatedAggregator {
    fee_bps: u32,
    price_impact: String,
}

impl SimulatedAggregator {
    pub fn new(fee_bps: u32, price_impact: impl Into<String>) -> Self {
        Self {
            fee_bps,
            price_impact: price_impact.into(),
        }
    }

    pub fn from_config(cfg: &AggregatorCfg) -> Self {
        Self::new(cfg.fee_bps, cfg.price_impact_pct.clone())
    }

    fn fee_for(&self, amount: f64) -> f64 {
        amount * self.fee_bps as f64 / 10_000.0
    }

    fn price_route(
        &self,
        mode: SwapMode,
        amount: f64,
        input_price: f64,
        output_price: f64,
    ) -> Result<f64, SwapError> {
        estimate_output(mode, amount, input_price, output_price).ok_or(SwapError::QuoteUnavailable)
    }
}

impl Default for SimulatedAggregator {
    fn default() -> Self {
        Self::from_config(&AggregatorCfg::default())
    }
}

#[async_trait]
impl QuoteProvider for SimulatedAggregator {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError> {
        let out = self.price_route(
            request.mode,
            request.amount_value,
            request.input_token.price,
            request.output_token.price,
        )?;

        Ok(Quote {
            input_token: request.input_token.clone(),
            output_token: request.output_token.clone(),
            in_amount: request.amount.clone(),
            out_amount: format_fixed(out, QUOTE_OUTPUT_DECIMALS),
            fee: format_fixed(self.fee_for(request.amount_value), 6),
            price_impact: self.price_impact.clone(),
            route: vec![request.input_token.symbol.clone(), request.output_token.symbol.clone()],
            issued_at: Utc::now(),
            mode: request.mode,
            slippage_bps: request.slippage.bps(),
        })
    }
}

#[async_trait]
impl SwapAggregator for SimulatedAggregator {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn route(&self, request: &SwapRequest) -> Result<RouteQuote, SwapError> {
        let out = self.price_route(
            request.mode,
            request.amount_value,
            request.input_token.price,
            request.output_token.price,
        )?;
        let fee = self.fee_for(request.amount_value);
        debug!("Simulated route {}: out {} fee {}", request.pair_label(), out, fee);

        Ok(RouteQuote {
            in_amount: request.amount.clone(),
            out_amount: format_fixed(out, ROUTE_DECIMALS),
            fee: format_fixed(fee, ROUTE_DECIMALS),
            price_impact: self.price_impact.clone(),
            route: vec![request.input_token.symbol.clone(), request.output_token.symbol.clone()],
            payload: json!({
                "inputMint": request.input_token.address,
                "outputMint": request.output_token.address,
                "slippageBps": request.slippage.bps(),
            }),
        })
    }

    async fn build_transaction(&self, _route: &RouteQuote, owner: &Pubkey) -> Result<VersionedTransaction, SwapError> {
        // fee payer only, no instructions
        let message = Message::new_with_blockhash(&[], Some(owner), &Hash::new_unique());
        Ok(VersionedTransaction {
            signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
            message: VersionedMessage::Legacy(message),
        })
    }
}

/// Accepts signed transactions without sending them anywhere
#[derive(Debug, Default)]
pub struct SimulatedSubmitter;

#[async_trait]
impl TransactionSubmitter for SimulatedSubmitter {
    async fn submit(&self, transaction: &VersionedTransaction) -> Result<Signature, SwapError> {
        if !is_signed(transaction) {
            return Err(SwapError::TransactionRejected("transaction is not signed".to_string()));
        }
        let signature = transaction.signatures[0];
        info!("📝 Simulated submission accepted: {}", signature);
        Ok(signature)
    }
}
