//! Error handling for the application

use thiserror::Error;

/// Swap lifecycle errors
///
/// Every failure coming out of the quote client, the swap executor or the
/// swap form is one of these. External failures are converted at the
/// component boundary, never propagated raw.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("No available routes for this swap")]
    QuoteUnavailable,

    #[error("Quote expired, refresh required")]
    QuoteExpired,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("External service failure: {0}")]
    ExternalServiceFailure(String),

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),
}

impl SwapError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SwapError::InvalidInput(message.into())
    }

    pub fn external(message: impl Into<String>) -> Self {
        SwapError::ExternalServiceFailure(message.into())
    }

    /// Errors caused by the caller's input rather than by a collaborator
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            SwapError::InvalidInput(_)
                | SwapError::QuoteUnavailable
                | SwapError::QuoteExpired
                | SwapError::InsufficientBalance
        )
    }

    /// Short title for the transient notice shown after a failed attempt
    pub fn notice_title(&self) -> &'static str {
        match self {
            SwapError::InvalidInput(_) => "Invalid swap",
            SwapError::WalletNotConnected => "Wallet not connected",
            SwapError::QuoteUnavailable => "No route found",
            SwapError::QuoteExpired => "Quote expired",
            SwapError::InsufficientBalance => "Insufficient balance",
            SwapError::ExternalServiceFailure(_) | SwapError::TransactionRejected(_) => {
                "Swap failed"
            }
        }
    }
}

/// Wallet session errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("Signing rejected: {0}")]
    Rejected(String),

    #[error("Keypair error: {0}")]
    Keypair(String),
}

impl From<WalletError> for SwapError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotConnected => SwapError::WalletNotConnected,
            WalletError::Rejected(reason) => SwapError::TransactionRejected(reason),
            WalletError::Keypair(reason) => SwapError::ExternalServiceFailure(reason),
        }
    }
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Blockchain error: {0}")]
    BlockchainError(String),

    #[error("Token registry error: {0}")]
    RegistryError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Swap error: {0}")]
    Swap(#[from] SwapError),
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        AppError::Swap(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_error_mapping() {
        assert_eq!(SwapError::from(WalletError::NotConnected), SwapError::WalletNotConnected);
        assert_eq!(
            SwapError::from(WalletError::Rejected("user declined".to_string())),
            SwapError::TransactionRejected("user declined".to_string())
        );
    }

    #[test]
    fn test_user_input_classification() {
        assert!(SwapError::invalid("bad amount").is_user_input());
        assert!(SwapError::QuoteUnavailable.is_user_input());
        assert!(!SwapError::external("rpc down").is_user_input());
        assert!(!SwapError::WalletNotConnected.is_user_input());
    }
}
