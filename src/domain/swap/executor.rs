//! Swap executor - runs quote -> build -> sign -> submit once, never retries

use std::sync::Arc;

use tracing::{error, info};

use super::{is_signed, SwapAggregator, SwapRequest, SwapResult, TransactionSubmitter};
use crate::domain::wallet::WalletSession;
use crate::shared::errors::SwapError;

pub struct SwapExecutor {
    aggregator: Arc<dyn SwapAggregator>,
    submitter: Arc<dyn TransactionSubmitter>,
}

impl SwapExecutor {
    pub fn new(aggregator: Arc<dyn SwapAggregator>, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        Self { aggregator, submitter }
    }

    /// Execute a validated swap with the given wallet session.
    ///
    /// Fails with `WalletNotConnected` before any external call when the
    /// session is not connected as `request.wallet`.
    pub async fn execute_swap(
        &self,
        request: &SwapRequest,
        wallet: &dyn WalletSession,
    ) -> Result<SwapResult, SwapError> {
        match wallet.public_key() {
            Some(key) if wallet.is_connected() && key == request.wallet => {}
            _ => return Err(SwapError::WalletNotConnected),
        }

        info!(
            "🚀 Executing swap {} {} via {} for {}",
            request.amount,
            request.pair_label(),
            self.aggregator.name(),
            request.wallet
        );

        let result = self.run_pipeline(request, wallet).await;
        match &result {
            Ok(swap) => info!("✅ Swap submitted: {}", swap.tx_id),
            Err(e) => error!("❌ Swap {} failed: {}", request.pair_label(), e),
        }
        result
    }

    async fn run_pipeline(
        &self,
        request: &SwapRequest,
        wallet: &dyn WalletSession,
    ) -> Result<SwapResult, SwapError> {
        let route = self.aggregator.route(request).await?;
        info!("   Route: {} (out {}, fee {})", route.route.join(" → "), route.out_amount, route.fee);

        let unsigned = self.aggregator.build_transaction(&route, &request.wallet).await?;

        let signed = wallet.sign_transaction(unsigned).await?;
        if !is_signed(&signed) {
            return Err(SwapError::TransactionRejected(
                "wallet returned an unsigned transaction".to_string(),
            ));
        }

        let signature = self.submitter.submit(&signed).await?;

        Ok(SwapResult {
            success: true,
            tx_id: signature.to_string(),
            amount_in: request.amount.clone(),
            amount_out: route.out_amount,
            fee: route.fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::swap::RouteQuote;
    use crate::domain::token::{TokenRegistry, SOL_MINT, USDC_MINT};
    use crate::infrastructure::wallet::MockWallet;
    use crate::domain::wallet::WalletSession;
    use async_trait::async_trait;
    use solana_sdk::{
        hash::Hash,
        message::{Message, VersionedMessage},
        pubkey::Pubkey,
        signature::Signature,
        transaction::VersionedTransaction,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingAggregator {
        routes: AtomicUsize,
        builds: AtomicUsize,
        fail_route: bool,
    }

    #[async_trait]
    impl SwapAggregator for RecordingAggregator {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn route(&self, request: &SwapRequest) -> Result<RouteQuote, SwapError> {
            self.routes.fetch_add(1, Ordering::SeqCst);
            if self.fail_route {
                return Err(SwapError::external("aggregator timeout"));
            }
            Ok(RouteQuote {
                in_amount: request.amount.clone(),
                out_amount: "0.0349".to_string(),
                fee: "0.0125".to_string(),
                price_impact: "0.04".to_string(),
                route: vec!["USDC".to_string(), "SOL".to_string()],
                payload: serde_json::Value::Null,
            })
        }

        async fn build_transaction(&self, _route: &RouteQuote, owner: &Pubkey) -> Result<VersionedTransaction, SwapError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            let message = Message::new_with_blockhash(&[], Some(owner), &Hash::default());
            Ok(VersionedTransaction {
                signatures: vec![Signature::default(); 1],
                message: VersionedMessage::Legacy(message),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSubmitter {
        submitted: AtomicUsize,
    }

    #[async_trait]
    impl TransactionSubmitter for RecordingSubmitter {
        async fn submit(&self, transaction: &VersionedTransaction) -> Result<Signature, SwapError> {
            self.submitted.fetch_add(1, Ordering::SeqCst);
            Ok(transaction.signatures[0])
        }
    }

    fn request_for(wallet: &Pubkey) -> SwapRequest {
        let registry = TokenRegistry::with_defaults();
        SwapRequest::new(
            registry.resolve(USDC_MINT).unwrap().clone(),
            registry.resolve(SOL_MINT).unwrap().clone(),
            "5",
            50,
            &wallet.to_string(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_disconnected_wallet_makes_no_external_call() {
        let aggregator = Arc::new(RecordingAggregator::default());
        let submitter = Arc::new(RecordingSubmitter::default());
        let executor = SwapExecutor::new(aggregator.clone(), submitter.clone());
        let wallet = MockWallet::new();

        let result = executor.execute_swap(&request_for(&Pubkey::new_unique()), &wallet).await;
        assert_eq!(result, Err(SwapError::WalletNotConnected));
        assert_eq!(aggregator.routes.load(Ordering::SeqCst), 0);
        assert_eq!(submitter.submitted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wallet_identity_must_match_request() {
        let executor = SwapExecutor::new(
            Arc::new(RecordingAggregator::default()),
            Arc::new(RecordingSubmitter::default()),
        );
        let wallet = MockWallet::new();
        wallet.connect().await.unwrap();

        let result = executor.execute_swap(&request_for(&Pubkey::new_unique()), &wallet).await;
        assert_eq!(result, Err(SwapError::WalletNotConnected));
    }

    #[tokio::test]
    async fn test_pipeline_signs_before_submit() {
        let aggregator = Arc::new(RecordingAggregator::default());
        let submitter = Arc::new(RecordingSubmitter::default());
        let executor = SwapExecutor::new(aggregator.clone(), submitter.clone());
        let wallet = MockWallet::new();
        let owner = wallet.connect().await.unwrap();

        let result = executor.execute_swap(&request_for(&owner), &wallet).await.unwrap();
        assert!(result.success);
        assert_ne!(result.tx_id, Signature::default().to_string());
        assert_eq!(result.amount_in, "5");
        assert_eq!(result.amount_out, "0.0349");
        assert_eq!(result.fee, "0.0125");
        assert_eq!(aggregator.builds.load(Ordering::SeqCst), 1);
        assert_eq!(submitter.submitted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_signature_is_not_submitted() {
        let submitter = Arc::new(RecordingSubmitter::default());
        let executor = SwapExecutor::new(Arc::new(RecordingAggregator::default()), submitter.clone());
        let wallet = MockWallet::new().rejecting_signatures();
        let owner = wallet.connect().await.unwrap();

        let result = executor.execute_swap(&request_for(&owner), &wallet).await;
        assert!(matches!(result, Err(SwapError::TransactionRejected(_))));
        assert_eq!(submitter.submitted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_is_surfaced_once_without_retry() {
        let aggregator = Arc::new(RecordingAggregator { fail_route: true, ..Default::default() });
        let submitter = Arc::new(RecordingSubmitter::default());
        let executor = SwapExecutor::new(aggregator.clone(), submitter.clone());
        let wallet = MockWallet::new();
        let owner = wallet.connect().await.unwrap();

        let result = executor.execute_swap(&request_for(&owner), &wallet).await;
        assert_eq!(result, Err(SwapError::external("aggregator timeout")));
        assert_eq!(aggregator.routes.load(Ordering::SeqCst), 1);
        assert_eq!(submitter.submitted.load(Ordering::SeqCst), 0);
    }
}
