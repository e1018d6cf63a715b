//! Wallet domain - identity and signing capability supplied from outside

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction};

use crate::domain::token::Token;
use crate::shared::errors::{SwapError, WalletError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Wallet session capability. Passed explicitly to whatever needs to sign.
#[async_trait]
pub trait WalletSession: Send + Sync {
    fn status(&self) -> ConnectionStatus;

    /// Public identity, present only while connected
    fn public_key(&self) -> Option<Pubkey>;

    fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected && self.public_key().is_some()
    }

    async fn connect(&self) -> Result<Pubkey, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError>;

    /// Sign as fee payer; the returned transaction carries the signature
    async fn sign_transaction(&self, transaction: VersionedTransaction) -> Result<VersionedTransaction, WalletError>;
}

/// Maps a wallet address received over the wire to a connected session
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn session_for(&self, owner: &Pubkey) -> Result<Arc<dyn WalletSession>, SwapError>;
}

/// Resolver backed by a single session; only its own identity resolves
pub struct SingleSessionResolver {
    session: Arc<dyn WalletSession>,
}

impl SingleSessionResolver {
    pub fn new(session: Arc<dyn WalletSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl SessionResolver for SingleSessionResolver {
    async fn session_for(&self, owner: &Pubkey) -> Result<Arc<dyn WalletSession>, SwapError> {
        match self.session.public_key() {
            Some(key) if self.session.is_connected() && key == *owner => Ok(self.session.clone()),
            _ => Err(SwapError::WalletNotConnected),
        }
    }
}

/// Token balances of a wallet, in UI units
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balance_of(&self, owner: &Pubkey, token: &Token) -> Result<f64, SwapError>;

    /// Balances keyed by token address; tokens whose lookup fails are left out
    async fn balances(&self, owner: &Pubkey, tokens: &[Token]) -> HashMap<String, f64> {
        let lookups = tokens.iter().map(|token| async move {
            self.balance_of(owner, token)
                .await
                .ok()
                .map(|balance| (token.address.clone(), balance))
        });
        join_all(lookups).await.into_iter().flatten().collect()
    }
}
