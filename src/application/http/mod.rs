//! HTTP surface: swap, liquidity, quote and token endpoints (axum)

pub mod routes;
pub mod server;
pub mod state;

pub use server::{build_app, start_server};
pub use state::AppState;
