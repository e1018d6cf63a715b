use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::http::state::AppState;
use crate::shared::errors::SwapError;

pub mod liquidity;
pub mod quote;
pub mod swap;
pub mod tokens;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(swap::routes())
        .merge(liquidity::routes())
        .merge(quote::routes())
        .merge(tokens::routes())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
    aggregator: &'static str,
    tokens: usize,
}

/// GET /api/health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_seconds: state.uptime_seconds(),
        aggregator: state.service.quotes().provider_name(),
        tokens: state.service.registry().len(),
    })
}

/// `{ "error": ... }` body shared by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let error = message.into();
    warn!("❌ {} {}", status.as_u16(), error);
    (status, Json(ErrorBody { error })).into_response()
}

/// Only 400 and 500 leave the API: a missing session is a bad request
pub fn status_for(error: &SwapError) -> StatusCode {
    match error {
        SwapError::WalletNotConnected => StatusCode::BAD_REQUEST,
        e if e.is_user_input() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn swap_error_response(error: &SwapError) -> Response {
    let message = match error {
        SwapError::InvalidInput(reason) => reason.clone(),
        other => other.to_string(),
    };
    error_response(status_for(error), message)
}

/// JSON field that clients send either as a number or as a string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    pub fn as_text(&self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s.trim().to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, NumberOrString::Text(s) if s.trim().is_empty())
    }
}

/// Present and not blank
pub(crate) fn provided(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}


#[cfg(test)]
mod tests {
    use super::test_support::get;
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&SwapError::invalid("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&SwapError::QuoteUnavailable), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&SwapError::InsufficientBalance), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&SwapError::WalletNotConnected), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&SwapError::external("rpc")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status_for(&SwapError::TransactionRejected("declined".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_number_or_string() {
        let n: NumberOrString = serde_json::from_str("5").unwrap();
        assert_eq!(n.as_text(), "5");
        let s: NumberOrString = serde_json::from_str("\" 0.5 \"").unwrap();
        assert_eq!(s.as_text(), "0.5");
        assert!(NumberOrString::Text(" ".to_string()).is_blank());
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["aggregator"], "simulated");
    }
}
