//! Mock wallet session - simulated connection and signatures

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::Rng;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::domain::wallet::{ConnectionStatus, WalletSession};
use crate::shared::errors::WalletError;

#[derive(Debug)]
struct MockState {
    status: ConnectionStatus,
    public_key: Option<Pubkey>,
}

/// Wallet that connects to a random (or fixed) identity and produces
/// random signatures. Nothing it signs is valid on chain.
pub struct MockWallet {
    state: RwLock<MockState>,
    identity: Option<Pubkey>,
    connect_delay: Duration,
    sign_delay: Duration,
    reject_signatures: bool,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MockState {
                status: ConnectionStatus::Disconnected,
                public_key: None,
            }),
            identity: None,
            connect_delay: Duration::ZERO,
            sign_delay: Duration::ZERO,
            reject_signatures: false,
        }
    }

    /// Already-connected session for a known identity
    pub fn connected_as(identity: Pubkey) -> Self {
        let wallet = Self::new().with_identity(identity);
        {
            let mut state = wallet.state.write();
            state.status = ConnectionStatus::Connected;
            state.public_key = Some(identity);
        }
        wallet
    }

    pub fn with_identity(mut self, identity: Pubkey) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_delays(mut self, connect_delay: Duration, sign_delay: Duration) -> Self {
        self.connect_delay = connect_delay;
        self.sign_delay = sign_delay;
        self
    }

    /// Every signing request is declined, as if the user pressed "Reject"
    pub fn rejecting_signatures(mut self) -> Self {
        self.reject_signatures = true;
        self
    }

    fn ensure_connected(&self) -> Result<(), WalletError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(WalletError::NotConnected)
        }
    }

    fn mock_signature() -> Signature {
        let mut bytes = [0u8; 64];
        rand::thread_rng().fill(&mut bytes[..]);
        Signature::from(bytes)
    }

    async fn before_signing(&self) -> Result<(), WalletError> {
        self.ensure_connected()?;
        if !self.sign_delay.is_zero() {
            sleep(self.sign_delay).await;
        }
        if self.reject_signatures {
            return Err(WalletError::Rejected("user declined the signing request".to_string()));
        }
        Ok(())
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletSession for MockWallet {
    fn status(&self) -> ConnectionStatus {
        self.state.read().status
    }

    fn public_key(&self) -> Option<Pubkey> {
        self.state.read().public_key
    }

    async fn connect(&self) -> Result<Pubkey, WalletError> {
        if let Some(key) = self.public_key() {
            return Ok(key);
        }
        self.state.write().status = ConnectionStatus::Connecting;
        if !self.connect_delay.is_zero() {
            sleep(self.connect_delay).await;
        }
        let key = self.identity.unwrap_or_else(Pubkey::new_unique);
        {
            let mut state = self.state.write();
            state.status = ConnectionStatus::Connected;
            state.public_key = Some(key);
        }
        info!("🔗 Mock wallet connected: {}", key);
        Ok(key)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        let mut state = self.state.write();
        state.status = ConnectionStatus::Disconnected;
        state.public_key = None;
        debug!("Mock wallet disconnected");
        Ok(())
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Signature, WalletError> {
        self.before_signing().await?;
        Ok(Self::mock_signature())
    }

    async fn sign_transaction(&self, mut transaction: VersionedTransaction) -> Result<VersionedTransaction, WalletError> {
        self.before_signing().await?;
        let signature = Self::mock_signature();
        if transaction.signatures.is_empty() {
            transaction.signatures.push(signature);
        } else {
            transaction.signatures[0] = signature;
        }
        Ok(transaction)
    }
}
