use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::{error_response, provided, swap_error_response, NumberOrString};
use crate::application::http::state::AppState;
use crate::domain::liquidity::AddLiquidityRequest;
use crate::shared::utils::parse_positive_amount;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityBody {
    pub token_a: Option<String>,
    pub token_b: Option<String>,
    pub amount_a: Option<NumberOrString>,
    pub amount_b: Option<NumberOrString>,
    pub wallet_address: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/liquidity", post(add_liquidity))
}

/// POST /api/liquidity - simulated, nothing reaches the chain
async fn add_liquidity(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LiquidityBody>, JsonRejection>,
) -> Response {
    // non-string tokens fail deserialization
    let Ok(Json(body)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing or invalid parameters");
    };

    let (Some(token_a), Some(token_b), Some(wallet), Some(amount_a), Some(amount_b)) = (
        provided(&body.token_a),
        provided(&body.token_b),
        provided(&body.wallet_address),
        body.amount_a.as_ref().filter(|a| !a.is_blank()),
        body.amount_b.as_ref().filter(|a| !a.is_blank()),
    ) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing or invalid parameters");
    };

    let (amount_a, amount_b) = (amount_a.as_text(), amount_b.as_text());
    if parse_positive_amount(&amount_a).is_err() || parse_positive_amount(&amount_b).is_err() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid amount format");
    }

    let request = match AddLiquidityRequest::new(token_a, token_b, &amount_a, &amount_b, wallet) {
        Ok(request) => request,
        Err(e) => return swap_error_response(&e),
    };

    Json(state.service.add_liquidity(&request).await).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{post_json, WALLET};
    use crate::domain::token::{SOL_MINT, USDC_MINT};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_liquidity() {
        let (status, body) = post_json(
            "/api/liquidity",
            json!({
                "tokenA": SOL_MINT,
                "tokenB": USDC_MINT,
                "amountA": "10",
                "amountB": 20,
                "walletAddress": WALLET
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["lpTokens"], "2.000000");
        assert_eq!(body["poolShare"], "0.20");
        assert!(body["txId"].as_str().unwrap().starts_with("SimTx_"));
    }

    #[tokio::test]
    async fn test_invalid_amounts() {
        for (a, b) in [("abc", "20"), ("10", "-5"), ("0", "20")] {
            let (status, body) = post_json(
                "/api/liquidity",
                json!({ "tokenA": SOL_MINT, "tokenB": USDC_MINT, "amountA": a, "amountB": b, "walletAddress": WALLET }),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Invalid amount format");
        }
    }

    #[tokio::test]
    async fn test_overflowing_amounts() {
        let (status, body) = post_json(
            "/api/liquidity",
            json!({ "tokenA": SOL_MINT, "tokenB": USDC_MINT, "amountA": "1e200", "amountB": 1e200, "walletAddress": WALLET }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Amounts are too large");
    }

    #[tokio::test]
    async fn test_invalid_wallet() {
        let (status, body) = post_json(
            "/api/liquidity",
            json!({ "tokenA": SOL_MINT, "tokenB": USDC_MINT, "amountA": "10", "amountB": "20", "walletAddress": "0xabc" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid wallet address");
    }

    #[tokio::test]
    async fn test_missing_or_mistyped_parameters() {
        let (status, body) = post_json("/api/liquidity", json!({ "tokenA": SOL_MINT })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing or invalid parameters");

        let (status, body) = post_json(
            "/api/liquidity",
            json!({ "tokenA": 1, "tokenB": USDC_MINT, "amountA": "10", "amountB": "20", "walletAddress": WALLET }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing or invalid parameters");
    }
}
