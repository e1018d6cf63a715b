//! Wallet session implementations

mod keypair_wallet;
mod mock_wallet;

pub use keypair_wallet::KeypairWallet;
pub use mock_wallet::MockWallet;

use std::sync::Arc;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use crate::domain::wallet::{SessionResolver, WalletSession};
use crate::shared::errors::SwapError;

/// Resolves any well-formed owner to a connected mock session for that owner.
/// Used by the HTTP surface when no real signer is configured.
#[derive(Debug, Default)]
pub struct MockSessionResolver;

#[async_trait]
impl SessionResolver for MockSessionResolver {
    async fn session_for(&self, owner: &Pubkey) -> Result<Arc<dyn WalletSession>, SwapError> {
        Ok(Arc::new(MockWallet::connected_as(*owner)))
    }
}
