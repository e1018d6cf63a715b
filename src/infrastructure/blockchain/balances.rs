//! Balances that do not come from chain

use std::collections::HashMap;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use crate::domain::token::Token;
use crate::domain::wallet::BalanceSource;
use crate::shared::errors::SwapError;

/// Same balance for every token, with per-mint overrides
#[derive(Debug, Clone)]
pub struct FixedBalances {
    default_balance: f64,
    overrides: HashMap<String, f64>,
}

impl FixedBalances {
    pub fn new(default_balance: f64) -> Self {
        Self {
            default_balance,
            overrides: HashMap::new(),
        }
    }

    pub fn with_balance(mut self, mint: &str, balance: f64) -> Self {
        self.overrides.insert(mint.to_string(), balance);
        self
    }
}

#[async_trait]
impl BalanceSource for FixedBalances {
    async fn balance_of(&self, _owner: &Pubkey, token: &Token) -> Result<f64, SwapError> {
        Ok(self
            .overrides
            .get(&token.address)
            .copied()
            .unwrap_or(self.default_balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::{TokenRegistry, SOL_MINT};

    #[tokio::test]
    async fn test_fixed_balances_with_override() {
        let registry = TokenRegistry::with_defaults();
        let source = FixedBalances::new(10.0).with_balance(SOL_MINT, 0.5);
        let owner = Pubkey::new_unique();

        let balances = source.balances(&owner, registry.all()).await;
        assert_eq!(balances.len(), registry.len());
        assert_eq!(balances[SOL_MINT], 0.5);
        assert_eq!(balances[crate::domain::token::USDC_MINT], 10.0);
    }
}
