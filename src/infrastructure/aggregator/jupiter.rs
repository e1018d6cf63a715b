//! Jupiter aggregator client (v6 quote + swap-build API)

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, transaction::VersionedTransaction};
use tracing::{debug, info, warn};

use crate::domain::quote::{Quote, QuoteProvider, QuoteRequest, QUOTE_OUTPUT_DECIMALS};
use crate::domain::swap::{RouteQuote, SwapAggregator, SwapRequest};
use crate::domain::token::Token;
use crate::shared::config::AggregatorCfg;
use crate::shared::errors::{AppError, SwapError};
use crate::shared::types::SwapMode;
use crate::shared::utils::{atomic_to_ui, format_fixed, format_token_amount, ui_to_atomic};

/// Jupiter quote query parameters
#[derive(Debug, Serialize)]
struct JupiterQuoteQuery {
    #[serde(rename = "inputMint")]
    input_mint: String,
    #[serde(rename = "outputMint")]
    output_mint: String,
    amount: String,
    #[serde(rename = "slippageBps")]
    slippage_bps: u16,
    #[serde(rename = "swapMode")]
    swap_mode: String,
}

#[derive(Debug, Deserialize)]
struct JupiterQuoteResponse {
    #[serde(rename = "inAmount")]
    in_amount: String,
    #[serde(rename = "outAmount")]
    out_amount: String,
    #[serde(rename = "priceImpactPct", default)]
    price_impact_pct: String,
    #[serde(rename = "routePlan", default)]
    route_plan: Vec<RoutePlanStep>,
}

#[derive(Debug, Deserialize)]
struct RoutePlanStep {
    #[serde(rename = "swapInfo")]
    swap_info: SwapInfo,
}

#[derive(Debug, Deserialize)]
struct SwapInfo {
    label: Option<String>,
    #[serde(rename = "feeAmount")]
    fee_amount: Option<String>,
    #[serde(rename = "feeMint")]
    fee_mint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JupiterErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(rename = "errorCode", default)]
    error_code: String,
}

#[derive(Debug, Serialize)]
struct JupiterSwapRequest<'a> {
    #[serde(rename = "userPublicKey")]
    user_public_key: String,
    #[serde(rename = "quoteResponse")]
    quote_response: &'a serde_json::Value,
    #[serde(rename = "wrapAndUnwrapSol")]
    wrap_and_unwrap_sol: bool,
    #[serde(rename = "dynamicComputeUnitLimit")]
    dynamic_compute_unit_limit: bool,
}

#[derive(Debug, Deserialize)]
struct JupiterSwapResponse {
    #[serde(rename = "swapTransaction")]
    swap_transaction: String,
}

/// Priced route in UI units, plus the raw response the swap endpoint needs back
struct PricedRoute {
    in_amount: f64,
    out_amount: f64,
    fee: f64,
    price_impact: String,
    route: Vec<String>,
    raw: serde_json::Value,
}

/// Jupiter API client
pub struct JupiterClient {
    http_client: Client,
    quote_url: String,
    swap_url: String,
}

impl JupiterClient {
    pub fn new(cfg: &AggregatorCfg) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            quote_url: cfg.quote_url.clone(),
            swap_url: cfg.swap_url.clone(),
        })
    }

    /// Call the quote endpoint. Amounts go out in atomic units of the fixed side.
    async fn fetch_route(
        &self,
        input: &Token,
        output: &Token,
        amount: f64,
        slippage_bps: u16,
        mode: SwapMode,
    ) -> Result<PricedRoute, SwapError> {
        let fixed_decimals = match mode {
            SwapMode::ExactIn => input.decimals,
            SwapMode::ExactOut => output.decimals,
        };
        let query = JupiterQuoteQuery {
            input_mint: input.address.clone(),
            output_mint: output.address.clone(),
            amount: ui_to_atomic(amount, fixed_decimals).to_string(),
            slippage_bps,
            swap_mode: jupiter_swap_mode(mode).to_string(),
        };

        info!("🔍 Fetching Jupiter quote: {} {} -> {} ({})", amount, input.symbol, output.symbol, mode);

        let response = self
            .http_client
            .get(&self.quote_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| SwapError::external(format!("Jupiter quote request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SwapError::external(format!("Failed to read Jupiter response: {}", e)))?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &body));
        }

        parse_quote_body(&body, input, output)
    }
}

fn jupiter_swap_mode(mode: SwapMode) -> &'static str {
    match mode {
        SwapMode::ExactIn => "ExactIn",
        SwapMode::ExactOut => "ExactOut",
    }
}

/// Map a failed Jupiter response onto the swap error taxonomy
fn classify_error(status: u16, body: &str) -> SwapError {
    let parsed: Option<JupiterErrorResponse> = serde_json::from_str(body).ok();
    match parsed {
        Some(err) if err.error_code == "COULD_NOT_FIND_ANY_ROUTE" || err.error_code == "TOKEN_NOT_TRADABLE" => {
            SwapError::QuoteUnavailable
        }
        Some(err) if !err.error.is_empty() => {
            SwapError::external(format!("Jupiter error ({}): {}", status, err.error))
        }
        _ => SwapError::external(format!("Jupiter request failed ({}): {}", status, body)),
    }
}

fn parse_quote_body(body: &str, input: &Token, output: &Token) -> Result<PricedRoute, SwapError> {
    let raw: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| SwapError::external(format!("Jupiter quote parse failed: {}", e)))?;
    let parsed: JupiterQuoteResponse = serde_json::from_value(raw.clone())
        .map_err(|e| SwapError::external(format!("Jupiter quote parse failed: {}", e)))?;

    let in_atomic: u64 = parsed
        .in_amount
        .parse()
        .map_err(|e| SwapError::external(format!("Invalid input amount: {}", e)))?;
    let out_atomic: u64 = parsed
        .out_amount
        .parse()
        .map_err(|e| SwapError::external(format!("Invalid output amount: {}", e)))?;
    if out_atomic == 0 {
        return Err(SwapError::QuoteUnavailable);
    }

    // only fees charged in the input mint are comparable to the input amount
    let fee_atomic: u64 = parsed
        .route_plan
        .iter()
        .filter(|step| step.swap_info.fee_mint.as_deref() == Some(input.address.as_str()))
        .filter_map(|step| step.swap_info.fee_amount.as_deref())
        .filter_map(|amount| amount.parse::<u64>().ok())
        .sum();

    let mut route = vec![input.symbol.clone()];
    route.extend(
        parsed
            .route_plan
            .iter()
            .map(|step| step.swap_info.label.clone().unwrap_or_else(|| "Unknown".to_string())),
    );
    route.push(output.symbol.clone());

    let price_impact = if parsed.price_impact_pct.is_empty() {
        warn!("⚠️ Jupiter quote without priceImpactPct, defaulting to 0");
        "0".to_string()
    } else {
        parsed.price_impact_pct
    };

    Ok(PricedRoute {
        in_amount: atomic_to_ui(in_atomic, input.decimals),
        out_amount: atomic_to_ui(out_atomic, output.decimals),
        fee: atomic_to_ui(fee_atomic, input.decimals),
        price_impact,
        route,
        raw,
    })
}

/// Decode the base64 wire transaction returned by the swap endpoint
fn decode_transaction(encoded: &str) -> Result<VersionedTransaction, SwapError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| SwapError::external(format!("Invalid base64 transaction: {}", e)))?;
    bincode::deserialize::<VersionedTransaction>(&bytes)
        .map_err(|e| SwapError::external(format!("Invalid transaction bytes: {}", e)))
}

#[async_trait]
impl QuoteProvider for JupiterClient {
    fn name(&self) -> &'static str {
        "jupiter"
    }

    async fn quote(&self, request: &QuoteRequest) -> Result<Quote, SwapError> {
        let priced = self
            .fetch_route(
                &request.input_token,
                &request.output_token,
                request.amount_value,
                request.slippage.bps(),
                request.mode,
            )
            .await?;

        Ok(Quote {
            input_token: request.input_token.clone(),
            output_token: request.output_token.clone(),
            in_amount: format_token_amount(priced.in_amount, request.input_token.decimals, 6),
            out_amount: format_fixed(priced.out_amount, QUOTE_OUTPUT_DECIMALS),
            fee: format_token_amount(priced.fee, request.input_token.decimals, 6),
            price_impact: priced.price_impact,
            route: priced.route,
            issued_at: Utc::now(),
            mode: request.mode,
            slippage_bps: request.slippage.bps(),
        })
    }
}

#[async_trait]
impl SwapAggregator for JupiterClient {
    fn name(&self) -> &'static str {
        "jupiter"
    }

    async fn route(&self, request: &SwapRequest) -> Result<RouteQuote, SwapError> {
        let priced = self
            .fetch_route(
                &request.input_token,
                &request.output_token,
                request.amount_value,
                request.slippage.bps(),
                request.mode,
            )
            .await?;

        Ok(RouteQuote {
            in_amount: format_token_amount(priced.in_amount, request.input_token.decimals, 6),
            out_amount: format_token_amount(priced.out_amount, request.output_token.decimals, 6),
            fee: format_token_amount(priced.fee, request.input_token.decimals, 6),
            price_impact: priced.price_impact,
            route: priced.route,
            payload: priced.raw,
        })
    }

    async fn build_transaction(&self, route: &RouteQuote, owner: &Pubkey) -> Result<VersionedTransaction, SwapError> {
        let request = JupiterSwapRequest {
            user_public_key: owner.to_string(),
            quote_response: &route.payload,
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
        };

        debug!("Jupiter swap request for {}", owner);

        let response = self
            .http_client
            .post(&self.swap_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SwapError::external(format!("Jupiter swap request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown".to_string());
            return Err(classify_error(status.as_u16(), &body));
        }

        let swap: JupiterSwapResponse = response
            .json()
            .await
            .map_err(|e| SwapError::external(format!("Jupiter swap parse failed: {}", e)))?;

        let transaction = decode_transaction(&swap.swap_transaction)?;
        info!("✅ Jupiter built swap transaction ({} signers)", transaction.signatures.len());
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{TokenRegistry, SOL_MINT, USDC_MINT};
    use solana_sdk::{
        hash::Hash,
        message::{Message, VersionedMessage},
        signature::Signature,
    };

    const QUOTE_BODY: &str = r#"{
        "inputMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        "inAmount": "5000000",
        "outputMint": "So11111111111111111111111111111111111111112",
        "outAmount": "34916201",
        "otherAmountThreshold": "34741620",
        "swapMode": "ExactIn",
        "slippageBps": 50,
        "priceImpactPct": "0.0004",
        "routePlan": [
            {"swapInfo": {"ammKey": "HJPjoWUrhoZzkNfRpHuieeFk9WcZWjwy6PBjZ81ngndJ", "label": "Raydium",
                          "feeAmount": "12500", "feeMint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"},
             "percent": 100}
        ]
    }"#;

    fn usdc_sol() -> (Token, Token) {
        let registry = TokenRegistry::with_defaults();
        (
            registry.resolve(USDC_MINT).unwrap().clone(),
            registry.resolve(SOL_MINT).unwrap().clone(),
        )
    }

    #[test]
    fn test_parse_quote_body_converts_atomic_amounts() {
        let (usdc, sol) = usdc_sol();
        let priced = parse_quote_body(QUOTE_BODY, &usdc, &sol).unwrap();
        assert_eq!(format_fixed(priced.out_amount, QUOTE_OUTPUT_DECIMALS), "0.034916201");
        assert_eq!(priced.in_amount, 5.0);
        assert_eq!(format_token_amount(priced.fee, usdc.decimals, 6), "0.0125");
        assert_eq!(priced.route, vec!["USDC", "Raydium", "SOL"]);
        assert_eq!(priced.price_impact, "0.0004");
        // the raw payload is kept whole for the swap endpoint
        assert_eq!(priced.raw["otherAmountThreshold"], "34741620");
    }

    #[test]
    fn test_no_route_errors() {
        let body = r#"{"error":"Could not find any route","errorCode":"COULD_NOT_FIND_ANY_ROUTE"}"#;
        assert_eq!(classify_error(400, body), SwapError::QuoteUnavailable);
        assert!(matches!(classify_error(502, "bad gateway"), SwapError::ExternalServiceFailure(_)));
    }

    #[test]
    fn test_zero_output_is_unavailable() {
        let (usdc, sol) = usdc_sol();
        let body = r#"{"inAmount":"5","outAmount":"0","priceImpactPct":"0","routePlan":[]}"#;
        assert!(matches!(parse_quote_body(body, &usdc, &sol), Err(SwapError::QuoteUnavailable)));
    }

    #[test]
    fn test_decode_wire_transaction() {
        let payer = Pubkey::new_unique();
        let tx = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::Legacy(Message::new_with_blockhash(&[], Some(&payer), &Hash::default())),
        };
        let encoded = STANDARD.encode(bincode::serialize(&tx).unwrap());

        let decoded = decode_transaction(&encoded).unwrap();
        assert_eq!(decoded.message.static_account_keys()[0], payer);
        assert!(decode_transaction("not base64!").is_err());
    }
}
