//! Solana RPC client: balance reads and transaction submission

use std::str::FromStr;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};
use spl_associated_token_account::get_associated_token_address;
use tracing::{debug, info};

use crate::domain::swap::{is_signed, TransactionSubmitter};
use crate::domain::token::{Token, SOL_MINT};
use crate::domain::wallet::BalanceSource;
use crate::shared::config::RpcCfg;
use crate::shared::errors::{AppError, SwapError};
use crate::shared::utils::{lamports_to_sol, validate_address};

/// Solana RPC client wrapper
pub struct SolanaRpcClient {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaRpcClient {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, commitment),
            commitment,
        }
    }

    pub fn from_config(cfg: &RpcCfg) -> Result<Self, AppError> {
        let commitment = CommitmentConfig::from_str(&cfg.commitment)
            .map_err(|e| AppError::ConfigError(format!("Invalid commitment {}: {}", cfg.commitment, e)))?;
        Ok(Self::new(cfg.url.clone(), commitment))
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// SOL balance in lamports
    pub async fn get_lamports(&self, owner: &Pubkey) -> Result<u64, AppError> {
        self.client
            .get_balance(owner)
            .await
            .map_err(|e| AppError::BlockchainError(format!("Failed to get balance: {}", e)))
    }

    /// SPL balance held in the owner's associated token account; 0 when the account does not exist
    pub async fn get_token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<f64, AppError> {
        let ata = get_associated_token_address(owner, mint);
        let account = self
            .client
            .get_account_with_commitment(&ata, self.commitment)
            .await
            .map_err(|e| AppError::BlockchainError(format!("Failed to get account {}: {}", ata, e)))?;
        if account.value.is_none() {
            debug!("No token account {} for mint {}", ata, mint);
            return Ok(0.0);
        }

        let amount = self
            .client
            .get_token_account_balance(&ata)
            .await
            .map_err(|e| AppError::BlockchainError(format!("Failed to get token balance: {}", e)))?;
        Ok(amount.ui_amount.unwrap_or(0.0))
    }
}

#[async_trait]
impl BalanceSource for SolanaRpcClient {
    async fn balance_of(&self, owner: &Pubkey, token: &Token) -> Result<f64, SwapError> {
        if token.address == SOL_MINT {
            let lamports = self.get_lamports(owner).await.map_err(|e| SwapError::external(e.to_string()))?;
            return Ok(lamports_to_sol(lamports));
        }
        let mint = validate_address(&token.address)?;
        self.get_token_balance(owner, &mint)
            .await
            .map_err(|e| SwapError::external(e.to_string()))
    }
}

#[async_trait]
impl TransactionSubmitter for SolanaRpcClient {
    async fn submit(&self, transaction: &VersionedTransaction) -> Result<Signature, SwapError> {
        if !is_signed(transaction) {
            return Err(SwapError::TransactionRejected("transaction is not signed".to_string()));
        }
        let signature = self
            .client
            .send_transaction(transaction)
            .await
            .map_err(|e| SwapError::external(format!("Failed to send transaction: {}", e)))?;
        info!("📤 Transaction sent: {}", signature);
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        message::{Message, VersionedMessage},
    };

    #[test]
    fn test_commitment_from_config() {
        let client = SolanaRpcClient::from_config(&RpcCfg::default()).unwrap();
        assert_eq!(client.url(), "https://api.devnet.solana.com");

        let bad = RpcCfg {
            commitment: "eventually".to_string(),
            ..RpcCfg::default()
        };
        assert!(SolanaRpcClient::from_config(&bad).is_err());
    }

    #[tokio::test]
    async fn test_unsigned_transaction_never_leaves_the_process() {
        // unreachable endpoint: the signature check must fail first
        let client = SolanaRpcClient::new("http://127.0.0.1:1".to_string(), CommitmentConfig::confirmed());
        let payer = Pubkey::new_unique();
        let unsigned = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::Legacy(Message::new_with_blockhash(&[], Some(&payer), &Hash::default())),
        };
        let result = client.submit(&unsigned).await;
        assert!(matches!(result, Err(SwapError::TransactionRejected(_))));
    }
}
