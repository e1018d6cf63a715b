use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::{error_response, provided, swap_error_response, NumberOrString};
use crate::application::http::state::AppState;
use crate::domain::swap::SwapRequest;
use crate::shared::types::SlippageBps;
use crate::shared::utils::{generate_id, parse_positive_amount};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapBody {
    pub from_token: Option<String>,
    pub to_token: Option<String>,
    pub amount: Option<NumberOrString>,
    /// Percent, e.g. `0.5`
    pub slippage: Option<NumberOrString>,
    pub wallet_address: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/swap", post(execute_swap))
}

/// POST /api/swap
async fn execute_swap(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SwapBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing required parameters");
    };

    let (Some(from), Some(to), Some(wallet), Some(amount)) = (
        provided(&body.from_token),
        provided(&body.to_token),
        provided(&body.wallet_address),
        body.amount.as_ref().filter(|a| !a.is_blank()),
    ) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing required parameters");
    };

    let service = &state.service;
    let input_token = match service.token_for_mint(from) {
        Ok(token) => token,
        Err(e) => return swap_error_response(&e),
    };
    let output_token = match service.token_for_mint(to) {
        Ok(token) => token,
        Err(e) => return swap_error_response(&e),
    };

    let amount = amount.as_text();
    if parse_positive_amount(&amount).is_err() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid amount");
    }

    let slippage = match body.slippage.as_ref().filter(|s| !s.is_blank()) {
        None => service.default_slippage(),
        Some(raw) => match raw.as_text().parse::<f64>() {
            Ok(percent) => match SlippageBps::from_percent(percent) {
                Ok(slippage) => slippage,
                Err(e) => return swap_error_response(&e),
            },
            Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid slippage"),
        },
    };

    let request = match SwapRequest::new(input_token, output_token, &amount, slippage.bps(), wallet) {
        Ok(request) => request,
        Err(e) => return swap_error_response(&e),
    };

    let request_id = generate_id();
    info!(
        "🔁 [{}] Swap {} {} for {}",
        request_id,
        request.amount,
        request.pair_label(),
        request.wallet
    );

    match service.execute_for_owner(&request).await {
        Ok(result) => {
            info!("✅ [{}] Swap submitted: {}", request_id, result.tx_id);
            Json(result).into_response()
        }
        Err(e) => swap_error_response(&e),
    }
}
