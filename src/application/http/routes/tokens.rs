use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{provided, swap_error_response};
use crate::application::http::state::AppState;
use crate::domain::token::Token;
use crate::shared::utils::validate_address;

#[derive(Debug, Default, Deserialize)]
pub struct TokensQuery {
    pub q: Option<String>,
    /// Wallet whose balances order the list
    pub owner: Option<String>,
    /// Address already selected on the other side of the form
    pub exclude: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenEntry {
    #[serde(flatten)]
    pub token: Token,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub tokens: Vec<TokenEntry>,
    pub total: usize,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tokens", get(list_tokens))
}

/// GET /api/tokens?q=&owner=&exclude=
async fn list_tokens(State(state): State<Arc<AppState>>, Query(query): Query<TokensQuery>) -> Response {
    let registry = state.service.registry();

    let balances: Option<HashMap<String, f64>> = match provided(&query.owner) {
        Some(owner) => match validate_address(owner) {
            Ok(owner) => Some(state.service.balances().balances(&owner, registry.all()).await),
            Err(e) => return swap_error_response(&e),
        },
        None => None,
    };

    let tokens: Vec<TokenEntry> = registry
        .selection(
            query.q.as_deref().unwrap_or(""),
            balances.as_ref(),
            provided(&query.exclude),
        )
        .into_iter()
        .map(|token| TokenEntry {
            balance: balances.as_ref().and_then(|b| b.get(&token.address).copied()),
            token: token.clone(),
        })
        .collect();

    Json(TokensResponse {
        total: tokens.len(),
        tokens,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get, WALLET};
    use crate::domain::token::SOL_MINT;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_search_tokens() {
        let (status, body) = get("/api/tokens?q=staked").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["tokens"][0]["symbol"], "mSOL");
        assert!(body["tokens"][0]["logoURI"].is_string());
        assert!(body["tokens"][0].get("balance").is_none());
    }

    #[tokio::test]
    async fn test_owner_balances_and_exclusion() {
        let uri = format!("/api/tokens?owner={}&exclude={}", WALLET, SOL_MINT);
        let (status, body) = get(&uri).await;
        assert_eq!(status, StatusCode::OK);
        let tokens = body["tokens"].as_array().unwrap();
        assert!(tokens.iter().all(|t| t["address"] != SOL_MINT));
        assert!(tokens.iter().all(|t| t["balance"] == 10.0));
    }

    #[tokio::test]
    async fn test_invalid_owner() {
        let (status, _) = get("/api/tokens?owner=nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
