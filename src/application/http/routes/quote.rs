use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{error_response, provided, swap_error_response};
use crate::application::http::state::AppState;
use crate::application::services::SwapService;
use crate::domain::quote::Quote;
use crate::shared::errors::SwapError;
use crate::shared::types::{SlippageBps, SwapMode};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteParams {
    pub input_mint: Option<String>,
    pub output_mint: Option<String>,
    pub amount: Option<String>,
    pub slippage_bps: Option<u16>,
    /// `ExactIn` (default) or `ExactOut`
    pub swap_mode: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/quote", get(get_quote))
}

/// GET /api/quote - read-only quote through the quote client
async fn get_quote(
    State(state): State<Arc<AppState>>,
    params: Result<Query<QuoteParams>, QueryRejection>,
) -> Response {
    let Ok(Query(params)) = params else {
        return error_response(StatusCode::BAD_REQUEST, "Missing or invalid parameters");
    };
    let (Some(input), Some(output), Some(amount)) = (
        provided(&params.input_mint),
        provided(&params.output_mint),
        provided(&params.amount),
    ) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing required parameters");
    };

    match quote_for(&state.service, input, output, amount, &params).await {
        Ok(quote) => Json(quote).into_response(),
        Err(e) => swap_error_response(&e),
    }
}

async fn quote_for(
    service: &SwapService,
    input: &str,
    output: &str,
    amount: &str,
    params: &QuoteParams,
) -> Result<Quote, SwapError> {
    let slippage = match params.slippage_bps {
        Some(bps) => SlippageBps::new(bps)?,
        None => service.default_slippage(),
    };
    let mode = match provided(&params.swap_mode) {
        Some(raw) => raw.parse::<SwapMode>()?,
        None => SwapMode::ExactIn,
    };
    let input_token = service.token_for_mint(input)?;
    let output_token = service.token_for_mint(output)?;
    service
        .quotes()
        .try_get_quote(&input_token, &output_token, amount, slippage, mode)
        .await
}
