use serde::Serialize;

use crate::shared::errors::SwapError;

/// Primary button of the swap form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwapAction {
    Connect,
    EnterAmount,
    InsufficientBalance,
    Swapping,
    Swap,
}

impl SwapAction {
    pub fn label(&self) -> &'static str {
        match self {
            SwapAction::Connect => "Connect",
            SwapAction::EnterAmount => "Enter an amount",
            SwapAction::InsufficientBalance => "Insufficient balance",
            SwapAction::Swapping => "Swapping...",
            SwapAction::Swap => "Swap",
        }
    }
}

/// Transient message shown after a swap attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub success: bool,
}

impl Notice {
    pub fn success(tx_id: &str) -> Self {
        Self {
            title: "Swap submitted".to_string(),
            message: format!("Transaction {}", tx_id),
            success: true,
        }
    }

    pub fn failure(error: &SwapError) -> Self {
        Self {
            title: error.notice_title().to_string(),
            message: error.to_string(),
            success: false,
        }
    }
}
