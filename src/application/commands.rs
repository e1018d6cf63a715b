//! CLI commands and handlers
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{info, warn};

use crate::application::form_controller::FormController;
use crate::application::http::{start_server, AppState};
use crate::application::services::SwapService;
use crate::domain::form::{FormPhase, FormSnapshot};
use crate::shared::config::Config;
use crate::shared::errors::{AppError, SwapError};
use crate::shared::types::{SlippageBps, SwapMode};
use crate::shared::utils::{format_token_amount, shorten_address, validate_address};

/// Longest wait for the first quote before a CLI swap gives up
const QUOTE_WAIT: Duration = Duration::from_secs(15);

#[derive(Parser)]
#[command(name = "solswap", version)]
#[command(about = "Solana token swap service: quotes, swaps and simulated liquidity")]
pub struct Cli {
    /// Path to config file (defaults to Config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log filter, e.g. "debug" or "solswap=trace" (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// RPC endpoint URL (overrides config)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// CLI arguments take priority over the config file
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(rpc_url) = &self.rpc_url {
            config.rpc.url = rpc_url.clone();
        }
        match &self.command {
            Commands::Serve { host, port } => {
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
            }
            Commands::Watch { interval: Some(secs), .. } if *secs > 0 => {
                config.quote.refresh_interval_secs = *secs;
            }
            _ => {}
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List known tokens
    Tokens {
        /// Case-insensitive filter on symbol, name or address
        #[arg(short, long)]
        search: Option<String>,

        /// Order by this wallet's balances
        #[arg(long)]
        owner: Option<String>,
    },

    /// Fetch a single quote
    Quote {
        /// Input token symbol or mint
        #[arg(long)]
        from: String,

        /// Output token symbol or mint
        #[arg(long)]
        to: String,

        #[arg(short, long)]
        amount: String,

        #[arg(long)]
        slippage_bps: Option<u16>,

        /// Treat the amount as the output to receive
        #[arg(long)]
        exact_out: bool,
    },

    /// Keep a quote fresh and log every update
    Watch {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(short, long)]
        amount: String,

        /// Refresh interval in seconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop after this many seconds
        #[arg(short, long, default_value_t = 30)]
        duration: u64,
    },

    /// Quote and execute a swap with the configured wallet
    Swap {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(short, long)]
        amount: String,

        #[arg(long)]
        slippage_bps: Option<u16>,
    },
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: Config) -> Result<(), AppError> {
        let service = Arc::new(SwapService::from_config(&config).await?);
        match command {
            Commands::Serve { .. } => Self::execute_serve_command(service).await,
            Commands::Tokens { search, owner } => Self::execute_tokens_command(&service, search, owner).await,
            Commands::Quote { from, to, amount, slippage_bps, exact_out } => {
                let mode = if exact_out { SwapMode::ExactOut } else { SwapMode::ExactIn };
                Self::execute_quote_command(&service, &from, &to, &amount, slippage_bps, mode).await
            }
            Commands::Watch { from, to, amount, duration, .. } => {
                Self::execute_watch_command(&service, &from, &to, &amount, Duration::from_secs(duration)).await
            }
            Commands::Swap { from, to, amount, slippage_bps } => {
                Self::execute_swap_command(&service, &from, &to, &amount, slippage_bps).await
            }
        }
    }

    async fn execute_serve_command(service: Arc<SwapService>) -> Result<(), AppError> {
        let host = service.config().server.host.clone();
        let port = service.config().server.port;
        start_server(Arc::new(AppState::new(service)), &host, port).await
    }

    async fn execute_tokens_command(
        service: &SwapService,
        search: Option<String>,
        owner: Option<String>,
    ) -> Result<(), AppError> {
        let registry = service.registry();
        let balances = match owner {
            Some(owner) => {
                let owner = validate_address(&owner)?;
                Some(service.balances().balances(&owner, registry.all()).await)
            }
            None => None,
        };

        let tokens = registry.selection(search.as_deref().unwrap_or(""), balances.as_ref(), None);
        info!("📋 {} of {} tokens", tokens.len(), registry.len());
        for (i, token) in tokens.iter().enumerate() {
            let balance = balances
                .as_ref()
                .and_then(|b| b.get(&token.address))
                .map(|b| format!(" balance {}", format_token_amount(*b, token.decimals, 6)))
                .unwrap_or_default();
            info!(
                "   {}. {:<6} {:<22} {} ${}{}",
                i + 1,
                token.symbol,
                token.name,
                shorten_address(&token.address, 4),
                token.price,
                balance
            );
        }
        Ok(())
    }

    async fn execute_quote_command(
        service: &SwapService,
        from: &str,
        to: &str,
        amount: &str,
        slippage_bps: Option<u16>,
        mode: SwapMode,
    ) -> Result<(), AppError> {
        let input = service.resolve_token(from)?;
        let output = service.resolve_token(to)?;
        let slippage = match slippage_bps {
            Some(bps) => SlippageBps::new(bps)?,
            None => service.default_slippage(),
        };

        let quote = service
            .quotes()
            .try_get_quote(&input, &output, amount, slippage, mode)
            .await?;

        info!("💱 {} {} -> {} {} ({})", quote.in_amount, input.symbol, quote.out_amount, output.symbol, mode);
        info!("   Minimum received: {} {} at {} slippage", quote.min_out_amount(), output.symbol, slippage);
        info!("   Fee: {}  Price impact: {}%", quote.fee, quote.price_impact);
        info!("   Route: {}", quote.route_label());
        Ok(())
    }

    async fn execute_watch_command(
        service: &SwapService,
        from: &str,
        to: &str,
        amount: &str,
        duration: Duration,
    ) -> Result<(), AppError> {
        let controller = FormController::from_service(service, service.resolve_token(from)?, service.resolve_token(to)?);
        let mut updates = controller.subscribe();

        info!(
            "👀 Watching {} {} -> {} for {:?} (refresh every {:?})",
            amount,
            from,
            to,
            duration,
            service.refresh_interval()
        );
        controller.set_amount(amount);

        let deadline = Instant::now() + duration;
        while let Ok(Ok(())) = timeout_at(deadline, updates.changed()).await {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.phase == FormPhase::QuoteReady {
                log_snapshot(&snapshot);
            }
        }
        info!("✅ Watch finished");
        Ok(())
    }

    async fn execute_swap_command(
        service: &SwapService,
        from: &str,
        to: &str,
        amount: &str,
        slippage_bps: Option<u16>,
    ) -> Result<(), AppError> {
        let controller = FormController::from_service(service, service.resolve_token(from)?, service.resolve_token(to)?);
        if let Some(bps) = slippage_bps {
            controller.set_slippage(SlippageBps::new(bps)?);
        }

        let owner = controller.connect().await?;
        info!("🔑 Swapping as {}", owner);

        let mut updates = controller.subscribe();
        controller.set_amount(amount);

        // wait for the quote answering this amount
        let ready = timeout(QUOTE_WAIT, async {
            updates
                .wait_for(|s| s.phase == FormPhase::QuoteReady)
                .await
                .map(|snapshot| snapshot.clone())
        })
        .await;
        match ready {
            Ok(Ok(snapshot)) => log_snapshot(&snapshot),
            _ => {
                warn!("⚠️ No quote within {:?}", QUOTE_WAIT);
                return Err(SwapError::QuoteUnavailable.into());
            }
        }

        let result = controller.swap().await?;
        info!(
            "✅ Swapped {} {} for {} {} (fee {})",
            result.amount_in, from, result.amount_out, to, result.fee
        );
        info!("   Transaction: {}", result.tx_id);
        Ok(())
    }
}

fn log_snapshot(snapshot: &FormSnapshot) {
    info!(
        "💱 {} {} -> {} {} (${} / ${})",
        snapshot.amount,
        snapshot.input_symbol,
        snapshot.estimated_output,
        snapshot.output_symbol,
        snapshot.input_usd,
        snapshot.output_usd
    );
    if let Some(rate) = &snapshot.rate {
        info!("   Rate: {}  Route: {}", rate, snapshot.route.as_deref().unwrap_or("-"));
    }
    if let Some(min_output) = &snapshot.min_output {
        info!("   Minimum received: {} {}", min_output, snapshot.output_symbol);
    }
}
