//! Application services - wires the swap lifecycle from configuration

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::domain::form::SwapForm;
use crate::domain::liquidity::{AddLiquidityRequest, LiquidityResult, LiquiditySimulator};
use crate::domain::quote::{QuoteClient, QuoteProvider};
use crate::domain::swap::{SwapAggregator, SwapExecutor, SwapRequest, SwapResult, TransactionSubmitter};
use crate::domain::token::{Token, TokenRegistry};
use crate::domain::wallet::{BalanceSource, SessionResolver, SingleSessionResolver, WalletSession};
use crate::infrastructure::aggregator::{JupiterClient, SimulatedAggregator, SimulatedSubmitter};
use crate::infrastructure::blockchain::{FixedBalances, SolanaRpcClient};
use crate::infrastructure::wallet::{KeypairWallet, MockSessionResolver, MockWallet};
use crate::shared::config::{AggregatorMode, Config, WalletMode};
use crate::shared::errors::{AppError, SwapError};
use crate::shared::types::SlippageBps;
use crate::shared::utils::validate_address;

/// Decimals assumed for mints missing from the registry
const UNKNOWN_MINT_DECIMALS: u8 = 9;

/// Collaborators the service is assembled from
pub struct ServiceParts {
    pub registry: Arc<TokenRegistry>,
    pub provider: Arc<dyn QuoteProvider>,
    pub aggregator: Arc<dyn SwapAggregator>,
    pub submitter: Arc<dyn TransactionSubmitter>,
    pub balances: Arc<dyn BalanceSource>,
    pub wallet: Arc<dyn WalletSession>,
    pub sessions: Arc<dyn SessionResolver>,
}

/// Application service for the swap lifecycle
pub struct SwapService {
    config: Config,
    registry: Arc<TokenRegistry>,
    quotes: Arc<QuoteClient>,
    executor: Arc<SwapExecutor>,
    balances: Arc<dyn BalanceSource>,
    wallet: Arc<dyn WalletSession>,
    sessions: Arc<dyn SessionResolver>,
    liquidity: Arc<LiquiditySimulator>,
}

impl SwapService {
    pub fn new(config: Config, parts: ServiceParts) -> Self {
        let quotes = Arc::new(QuoteClient::new(parts.registry.clone(), parts.provider));
        let executor = Arc::new(SwapExecutor::new(parts.aggregator, parts.submitter));
        let liquidity = Arc::new(LiquiditySimulator::from_config(&config.liquidity));
        Self {
            config,
            registry: parts.registry,
            quotes,
            executor,
            balances: parts.balances,
            wallet: parts.wallet,
            sessions: parts.sessions,
            liquidity,
        }
    }

    /// Build every collaborator the configuration asks for
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let registry = Arc::new(Self::load_registry(config).await?);

        let (provider, aggregator, submitter): (
            Arc<dyn QuoteProvider>,
            Arc<dyn SwapAggregator>,
            Arc<dyn TransactionSubmitter>,
        ) = match config.aggregator.mode {
            AggregatorMode::Simulated => {
                let simulated = Arc::new(SimulatedAggregator::from_config(&config.aggregator));
                (simulated.clone(), simulated, Arc::new(SimulatedSubmitter))
            }
            AggregatorMode::Jupiter => {
                let jupiter = Arc::new(JupiterClient::new(&config.aggregator)?);
                let rpc = Arc::new(SolanaRpcClient::from_config(&config.rpc)?);
                (jupiter.clone(), jupiter, rpc)
            }
        };

        let (wallet, sessions, balances): (
            Arc<dyn WalletSession>,
            Arc<dyn SessionResolver>,
            Arc<dyn BalanceSource>,
        ) = match config.wallet.mode {
            WalletMode::Mock => {
                let wallet = MockWallet::new().with_delays(
                    Duration::from_millis(config.wallet.connect_delay_ms),
                    Duration::ZERO,
                );
                (
                    Arc::new(wallet),
                    Arc::new(MockSessionResolver),
                    Arc::new(FixedBalances::new(config.wallet.mock_balance)),
                )
            }
            WalletMode::Keypair => {
                let path = config
                    .wallet
                    .keypair_path
                    .as_deref()
                    .ok_or_else(|| AppError::ConfigError("wallet.keypair_path is required".to_string()))?;
                let wallet: Arc<dyn WalletSession> = Arc::new(KeypairWallet::from_file(path)?);
                // a local keypair has nobody to approve the connection
                let owner = wallet.connect().await?;
                info!("🔑 Keypair wallet connected: {}", owner);
                (
                    wallet.clone(),
                    Arc::new(SingleSessionResolver::new(wallet)),
                    Arc::new(SolanaRpcClient::from_config(&config.rpc)?),
                )
            }
        };

        info!(
            "⚙️ Swap service ready: {} tokens, aggregator {:?}, wallet {:?}",
            registry.len(),
            config.aggregator.mode,
            config.wallet.mode
        );

        Ok(Self::new(
            config.clone(),
            ServiceParts {
                registry,
                provider,
                aggregator,
                submitter,
                balances,
                wallet,
                sessions,
            },
        ))
    }

    async fn load_registry(config: &Config) -> Result<TokenRegistry, AppError> {
        let mut registry = TokenRegistry::from_config(&config.tokens)?;
        if let Some(url) = &config.tokens.token_list_url {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_millis(config.aggregator.timeout_ms))
                .build()
                .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
            // the built-in catalog is enough to run, so a failed fetch is not fatal
            match TokenRegistry::fetch_token_list(&client, url).await {
                Ok(tokens) => {
                    let added = registry.merge(tokens);
                    info!("✅ Merged {} tokens from token list", added);
                }
                Err(e) => warn!("⚠️ Token list unavailable: {}", e),
            }
        }
        Ok(registry)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<TokenRegistry> {
        &self.registry
    }

    pub fn quotes(&self) -> &Arc<QuoteClient> {
        &self.quotes
    }

    pub fn executor(&self) -> &Arc<SwapExecutor> {
        &self.executor
    }

    pub fn balances(&self) -> &Arc<dyn BalanceSource> {
        &self.balances
    }

    /// Local wallet session used by the CLI flows
    pub fn wallet(&self) -> &Arc<dyn WalletSession> {
        &self.wallet
    }

    pub fn default_slippage(&self) -> SlippageBps {
        self.config.default_slippage()
    }

    pub fn quote_freshness(&self) -> Duration {
        Duration::from_secs(self.config.quote.freshness_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.config.quote.refresh_interval_secs)
    }

    /// Registry token by address or symbol
    pub fn resolve_token(&self, key: &str) -> Result<Token, SwapError> {
        self.registry
            .lookup(key.trim())
            .cloned()
            .ok_or_else(|| SwapError::invalid(format!("Unknown token: {}", key)))
    }

    /// Registry token for a mint, or an unpriced placeholder for a valid unknown mint
    pub fn token_for_mint(&self, mint: &str) -> Result<Token, SwapError> {
        let address = validate_address(mint)?.to_string();
        Ok(self.registry.resolve(&address).cloned().unwrap_or_else(|| {
            let short = &address[..4];
            Token::new(&address, short, "Unknown token", UNKNOWN_MINT_DECIMALS, 0.0)
        }))
    }

    pub fn new_form(&self, input: Token, output: Token) -> SwapForm {
        SwapForm::new(input, output, self.default_slippage()).with_freshness(self.quote_freshness())
    }

    /// Execute on behalf of `request.wallet`, which must resolve to a connected session
    pub async fn execute_for_owner(&self, request: &SwapRequest) -> Result<SwapResult, SwapError> {
        let session = self.sessions.session_for(&request.wallet).await?;
        self.executor.execute_swap(request, session.as_ref()).await
    }

    pub async fn add_liquidity(&self, request: &AddLiquidityRequest) -> LiquidityResult {
        self.liquidity.add_liquidity(request).await
    }

    pub async fn balance_of(&self, owner: &Pubkey, token: &Token) -> Result<f64, SwapError> {
        self.balances.balance_of(owner, token).await
    }
}
