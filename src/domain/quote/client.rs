//! Quote client - validates requests and shields callers from provider failures

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::{Quote, QuoteProvider, QuoteRequest};
use crate::domain::token::{Token, TokenRegistry};
use crate::shared::errors::SwapError;
use crate::shared::types::{SlippageBps, SwapMode};
use crate::shared::utils::parse_positive_amount;

/// Last provider failure, kept for inspection
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteFailure {
    pub pair: String,
    pub error: SwapError,
    pub at: DateTime<Utc>,
}

/// Counters for provider calls made through the client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteDiagnostics {
    pub requests: u64,
    pub failures: u64,
    pub last_failure: Option<QuoteFailure>,
}

/// Quote client
pub struct QuoteClient {
    registry: Arc<TokenRegistry>,
    provider: Arc<dyn QuoteProvider>,
    diagnostics: Mutex<QuoteDiagnostics>,
}

impl QuoteClient {
    pub fn new(registry: Arc<TokenRegistry>, provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            registry,
            provider,
            diagnostics: Mutex::new(QuoteDiagnostics::default()),
        }
    }

    pub fn registry(&self) -> &Arc<TokenRegistry> {
        &self.registry
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Check the request preconditions without touching the provider
    pub fn validate(
        &self,
        input_token: &Token,
        output_token: &Token,
        amount: &str,
        slippage: SlippageBps,
        mode: SwapMode,
    ) -> Result<QuoteRequest, SwapError> {
        if input_token.same_asset(output_token) {
            return Err(SwapError::invalid("Input and output tokens must differ"));
        }
        let amount_value = parse_positive_amount(amount)?;
        if !self.registry.contains(input_token) {
            return Err(SwapError::invalid(format!("Unknown input token: {}", input_token.address)));
        }
        if !self.registry.contains(output_token) {
            return Err(SwapError::invalid(format!("Unknown output token: {}", output_token.address)));
        }
        Ok(QuoteRequest {
            input_token: input_token.clone(),
            output_token: output_token.clone(),
            amount: amount.trim().to_string(),
            amount_value,
            slippage,
            mode,
        })
    }

    /// Quote with a typed error
    pub async fn try_get_quote(
        &self,
        input_token: &Token,
        output_token: &Token,
        amount: &str,
        slippage: SlippageBps,
        mode: SwapMode,
    ) -> Result<Quote, SwapError> {
        let request = self.validate(input_token, output_token, amount, slippage, mode)?;
        self.diagnostics.lock().requests += 1;

        debug!(
            "Quote request via {}: {} {} ({}, slippage {})",
            self.provider.name(),
            request.amount,
            request.pair_label(),
            request.mode,
            request.slippage
        );

        match self.provider.quote(&request).await {
            Ok(quote) => {
                info!(
                    "✅ Quote {} {} -> {} {}",
                    quote.in_amount, request.input_token.symbol, quote.out_amount, request.output_token.symbol
                );
                Ok(quote)
            }
            Err(error) => {
                warn!("⚠️ Quote for {} failed: {}", request.pair_label(), error);
                let mut diagnostics = self.diagnostics.lock();
                diagnostics.failures += 1;
                diagnostics.last_failure = Some(QuoteFailure {
                    pair: request.pair_label(),
                    error: error.clone(),
                    at: Utc::now(),
                });
                Err(error)
            }
        }
    }

    /// Quote or `None`. Invalid input and provider failures both yield `None`;
    /// provider failures are recorded in [`QuoteClient::diagnostics`].
    pub async fn get_quote(
        &self,
        input_token: &Token,
        output_token: &Token,
        amount: &str,
        slippage: SlippageBps,
        mode: SwapMode,
    ) -> Option<Quote> {
        match self
            .try_get_quote(input_token, output_token, amount, slippage, mode)
            .await
        {
            Ok(quote) => Some(quote),
            Err(SwapError::InvalidInput(reason)) => {
                debug!("Quote skipped: {}", reason);
                None
            }
            Err(_) => None,
        }
    }

    pub fn diagnostics(&self) -> QuoteDiagnostics {
        self.diagnostics.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::{estimate_output, QUOTE_OUTPUT_DECIMALS};
    use crate::domain::token::{SOL_MINT, USDC_MINT};
    use crate::shared::utils::format_fixed;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Prices through the registry, counting every call
    struct CountingProvider {
        calls: AtomicUsize,
        fail_with: Option<SwapError>,
    }

    impl CountingProvider {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: None }
        }

        fn failing(error: SwapError) -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: Some(error) }
        }
    }

    #[async_trait]
    impl QuoteProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }
            let out = estimate_output(
                request.mode,
                request.amount_value,
                request.input_token.price,
                request.output_token.price,
            )
            .ok_or(SwapError::QuoteUnavailable)?;
            Ok(Quote {
                input_token: request.input_token.clone(),
                output_token: request.output_token.clone(),
                in_amount: request.amount.clone(),
                out_amount: format_fixed(out, QUOTE_OUTPUT_DECIMALS),
                fee: "0.006".to_string(),
                price_impact: "0.04".to_string(),
                route: vec![request.input_token.symbol.clone(), request.output_token.symbol.clone()],
                issued_at: Utc::now(),
                mode: request.mode,
                slippage_bps: request.slippage.bps(),
            })
        }
    }

    fn setup(provider: Arc<CountingProvider>) -> (QuoteClient, Token, Token) {
        let registry = Arc::new(TokenRegistry::with_defaults());
        let usdc = registry.resolve(USDC_MINT).unwrap().clone();
        let sol = registry.resolve(SOL_MINT).unwrap().clone();
        (QuoteClient::new(registry, provider), usdc, sol)
    }

    #[tokio::test]
    async fn test_same_token_returns_none_without_provider_call() {
        let provider = Arc::new(CountingProvider::ok());
        let (client, usdc, sol) = setup(provider.clone());

        for token in [&usdc, &sol] {
            let quote = client
                .get_quote(token, token, "5", SlippageBps::default(), SwapMode::ExactIn)
                .await;
            assert!(quote.is_none());
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_amounts_fail_fast() {
        let provider = Arc::new(CountingProvider::ok());
        let (client, usdc, sol) = setup(provider.clone());

        for amount in ["", "0", "-3", "abc", "NaN", "inf"] {
            let quote = client
                .get_quote(&usdc, &sol, amount, SlippageBps::default(), SwapMode::ExactIn)
                .await;
            assert!(quote.is_none(), "amount {:?} should not quote", amount);
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.diagnostics().requests, 0);
    }

    #[tokio::test]
    async fn test_unknown_token_fails_fast() {
        let provider = Arc::new(CountingProvider::ok());
        let (client, usdc, _) = setup(provider.clone());
        let stranger = Token::new("Strngr1111111111111111111111111111111111111", "STR", "Stranger", 6, 1.0);

        let result = client
            .try_get_quote(&usdc, &stranger, "5", SlippageBps::default(), SwapMode::ExactIn)
            .await;
        assert!(matches!(result, Err(SwapError::InvalidInput(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exact_in_scenario() {
        let provider = Arc::new(CountingProvider::ok());
        let (client, usdc, sol) = setup(provider.clone());

        let quote = client
            .get_quote(&usdc, &sol, "5", SlippageBps::default(), SwapMode::ExactIn)
            .await
            .unwrap();
        assert_eq!(quote.out_amount, "0.034916201");
        assert_eq!(quote.in_amount, "5");
        assert_eq!(quote.route, vec!["USDC", "SOL"]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_becomes_none_with_diagnostic() {
        let provider = Arc::new(CountingProvider::failing(SwapError::external("connection reset")));
        let (client, usdc, sol) = setup(provider.clone());

        let quote = client
            .get_quote(&usdc, &sol, "5", SlippageBps::default(), SwapMode::ExactIn)
            .await;
        assert!(quote.is_none());

        let diagnostics = client.diagnostics();
        assert_eq!(diagnostics.requests, 1);
        assert_eq!(diagnostics.failures, 1);
        let failure = diagnostics.last_failure.unwrap();
        assert_eq!(failure.pair, "USDC -> SOL");
        assert_eq!(failure.error, SwapError::external("connection reset"));
    }
}
