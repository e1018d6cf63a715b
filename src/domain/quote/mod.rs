//! Quote domain - priced swap estimates and the providers that produce them

mod client;

pub use client::{QuoteClient, QuoteDiagnostics, QuoteFailure};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::domain::token::Token;
use crate::shared::errors::SwapError;
use crate::shared::types::{SlippageBps, SwapMode};
use crate::shared::utils::format_fixed;

/// Decimal places used for quoted output amounts
pub const QUOTE_OUTPUT_DECIMALS: usize = 9;

/// How long a quote stays usable after it was issued
pub const DEFAULT_QUOTE_FRESHNESS: Duration = Duration::from_secs(10);

/// Validated quote request. Only [`QuoteClient`] builds these.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub input_token: Token,
    pub output_token: Token,
    /// Amount as the user typed it
    pub amount: String,
    /// Parsed amount, finite and > 0
    pub amount_value: f64,
    pub slippage: SlippageBps,
    pub mode: SwapMode,
}

impl QuoteRequest {
    pub fn pair_label(&self) -> String {
        format!("{} -> {}", self.input_token.symbol, self.output_token.symbol)
    }
}

/// Priced swap estimate, valid for a bounded freshness window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub input_token: Token,
    pub output_token: Token,
    pub in_amount: String,
    pub out_amount: String,
    pub fee: String,
    pub price_impact: String,
    pub route: Vec<String>,
    pub issued_at: DateTime<Utc>,
    pub mode: SwapMode,
    pub slippage_bps: u16,
}

impl Quote {
    /// True while `now` is inside the freshness window
    pub fn is_fresh_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match (now - self.issued_at).to_std() {
            Ok(age) => age < window,
            // issued "in the future" (clock skew), still fresh
            Err(_) => true,
        }
    }

    pub fn out_amount_value(&self) -> f64 {
        self.out_amount.parse().unwrap_or(0.0)
    }

    /// Smallest acceptable output once slippage tolerance is applied
    pub fn min_out_amount(&self) -> String {
        let tolerance = 1.0 - self.slippage_bps as f64 / 10_000.0;
        format_fixed(self.out_amount_value() * tolerance, QUOTE_OUTPUT_DECIMALS)
    }

    /// `USDC → SOL`
    pub fn route_label(&self) -> String {
        self.route.join(" → ")
    }
}

/// Output amount for `amount` under `mode`.
///
/// EXACT_IN converts through the display prices of both tokens. EXACT_OUT
/// returns the requested amount unchanged: the rate is not inverted.
pub fn estimate_output(mode: SwapMode, amount: f64, input_price: f64, output_price: f64) -> Option<f64> {
    match mode {
        SwapMode::ExactIn => {
            if input_price <= 0.0 || output_price <= 0.0 {
                return None;
            }
            Some(amount * input_price / output_price)
        }
        SwapMode::ExactOut => Some(amount),
    }
}

/// Source of quotes. Production (aggregator) and simulated providers are interchangeable.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Quote a validated request; `Err(SwapError::QuoteUnavailable)` when no route exists
    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{TokenRegistry, SOL_MINT, USDC_MINT};

    fn sample_quote(issued_at: DateTime<Utc>) -> Quote {
        let registry = TokenRegistry::with_defaults();
        Quote {
            input_token: registry.resolve(USDC_MINT).unwrap().clone(),
            output_token: registry.resolve(SOL_MINT).unwrap().clone(),
            in_amount: "5".to_string(),
            out_amount: "0.034916201".to_string(),
            fee: "0.006".to_string(),
            price_impact: "0.04".to_string(),
            route: vec!["USDC".to_string(), "SOL".to_string()],
            issued_at,
            mode: SwapMode::ExactIn,
            slippage_bps: 100,
        }
    }

    #[test]
    fn test_estimate_output_exact_in() {
        let out = estimate_output(SwapMode::ExactIn, 5.0, 1.0, 143.2).unwrap();
        assert_eq!(format_fixed(out, QUOTE_OUTPUT_DECIMALS), "0.034916201");
        assert!(estimate_output(SwapMode::ExactIn, 5.0, 1.0, 0.0).is_none());
    }

    #[test]
    fn test_estimate_output_exact_out_keeps_amount() {
        assert_eq!(estimate_output(SwapMode::ExactOut, 5.0, 1.0, 143.2), Some(5.0));
    }

    #[test]
    fn test_quote_freshness_window() {
        let issued = Utc::now();
        let quote = sample_quote(issued);
        assert!(quote.is_fresh_at(issued + chrono::Duration::seconds(9), DEFAULT_QUOTE_FRESHNESS));
        assert!(!quote.is_fresh_at(issued + chrono::Duration::seconds(10), DEFAULT_QUOTE_FRESHNESS));
        assert!(quote.is_fresh_at(issued - chrono::Duration::seconds(1), DEFAULT_QUOTE_FRESHNESS));
    }

    #[test]
    fn test_min_out_and_route_label() {
        let quote = sample_quote(Utc::now());
        assert_eq!(quote.min_out_amount(), "0.034567039");
        assert_eq!(quote.route_label(), "USDC → SOL");
    }
}
