//! Keypair-backed wallet session (local signer)

use async_trait::async_trait;
use parking_lot::RwLock;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signature},
    signer::Signer,
    transaction::VersionedTransaction,
};
use tracing::{debug, info};

use crate::domain::wallet::{ConnectionStatus, WalletSession};
use crate::shared::errors::WalletError;

/// Wallet that signs with a local keypair file
pub struct KeypairWallet {
    keypair: Keypair,
    status: RwLock<ConnectionStatus>,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair,
            status: RwLock::new(ConnectionStatus::Disconnected),
        }
    }

    /// Load a keypair file (JSON array of 64 bytes, as written by solana-keygen)
    pub fn from_file(path: &str) -> Result<Self, WalletError> {
        let keypair = read_keypair_file(path)
            .map_err(|e| WalletError::Keypair(format!("Failed to read keypair {}: {}", path, e)))?;
        info!("🔑 Loaded keypair {} from {}", keypair.pubkey(), path);
        Ok(Self::new(keypair))
    }

    pub fn identity(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl WalletSession for KeypairWallet {
    fn status(&self) -> ConnectionStatus {
        *self.status.read()
    }

    fn public_key(&self) -> Option<Pubkey> {
        match self.status() {
            ConnectionStatus::Connected => Some(self.keypair.pubkey()),
            _ => None,
        }
    }

    async fn connect(&self) -> Result<Pubkey, WalletError> {
        *self.status.write() = ConnectionStatus::Connected;
        Ok(self.keypair.pubkey())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        *self.status.write() = ConnectionStatus::Disconnected;
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        if !self.is_connected() {
            return Err(WalletError::NotConnected);
        }
        Ok(self.keypair.sign_message(message))
    }

    async fn sign_transaction(&self, mut transaction: VersionedTransaction) -> Result<VersionedTransaction, WalletError> {
        if !self.is_connected() {
            return Err(WalletError::NotConnected);
        }

        let owner = self.keypair.pubkey();
        let required = transaction.message.header().num_required_signatures as usize;
        let slot = transaction
            .message
            .static_account_keys()
            .iter()
            .take(required)
            .position(|key| *key == owner)
            .ok_or_else(|| WalletError::Rejected(format!("{} is not a required signer", owner)))?;

        if transaction.signatures.len() < required {
            transaction.signatures.resize(required, Signature::default());
        }
        let message_bytes = transaction.message.serialize();
        transaction.signatures[slot] = self.keypair.sign_message(&message_bytes);
        debug!("Signed transaction slot {} as {}", slot, owner);
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        hash::Hash,
        message::{Message, VersionedMessage},
    };

    fn unsigned_for(payer: &Pubkey) -> VersionedTransaction {
        VersionedTransaction {
            signatures: vec![],
            message: VersionedMessage::Legacy(Message::new_with_blockhash(&[], Some(payer), &Hash::default())),
        }
    }

    #[tokio::test]
    async fn test_signature_verifies_against_message() {
        let wallet = KeypairWallet::new(Keypair::new());
        let owner = wallet.connect().await.unwrap();

        let signed = wallet.sign_transaction(unsigned_for(&owner)).await.unwrap();
        assert_eq!(signed.signatures.len(), 1);
        assert!(signed.signatures[0].verify(owner.as_ref(), &signed.message.serialize()));
    }

    #[tokio::test]
    async fn test_foreign_fee_payer_is_rejected() {
        let wallet = KeypairWallet::new(Keypair::new());
        wallet.connect().await.unwrap();

        let result = wallet.sign_transaction(unsigned_for(&Pubkey::new_unique())).await;
        assert!(matches!(result, Err(WalletError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_disconnected_hides_identity() {
        let wallet = KeypairWallet::new(Keypair::new());
        assert!(wallet.public_key().is_none());
        assert_eq!(wallet.sign_message(b"x").await, Err(WalletError::NotConnected));
        wallet.connect().await.unwrap();
        assert_eq!(wallet.public_key(), Some(wallet.identity()));
    }

    #[test]
    fn test_missing_keypair_file() {
        assert!(matches!(
            KeypairWallet::from_file("/nonexistent/id.json"),
            Err(WalletError::Keypair(_))
        ));
    }
}
