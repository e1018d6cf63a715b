//! solswap - quote-and-swap lifecycle for Solana tokens
//! Layered as domain / infrastructure / application / shared

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{FormController, SwapService};
pub use domain::form::SwapForm;
pub use domain::quote::QuoteClient;
pub use domain::swap::SwapExecutor;
pub use domain::token::TokenRegistry;
pub use shared::config::Config;
pub use shared::errors::{AppError, SwapError};
