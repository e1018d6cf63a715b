//! Form controller - drives a [`SwapForm`] against the quote client, the
//! wallet session and the swap executor.
//!
//! Quote fetches run as spawned tasks and are applied by epoch, so only the
//! response to the latest input is ever displayed. A periodic refresher
//! re-quotes unchanged inputs; it restarts on every input change and stops
//! when the controller is dropped.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use solana_sdk::pubkey::Pubkey;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::application::services::SwapService;
use crate::domain::form::{FormSnapshot, QuoteTicket, SwapForm};
use crate::domain::quote::QuoteClient;
use crate::domain::swap::{SwapExecutor, SwapResult};
use crate::domain::token::Token;
use crate::domain::wallet::{BalanceSource, WalletSession};
use crate::shared::errors::{SwapError, WalletError};
use crate::shared::types::SlippageBps;

/// State shared with spawned fetch and refresh tasks
struct Shared {
    form: Mutex<SwapForm>,
    quotes: Arc<QuoteClient>,
    wallet: Arc<dyn WalletSession>,
    snapshots: watch::Sender<FormSnapshot>,
}

impl Shared {
    fn publish(&self) {
        let snapshot = self.form.lock().snapshot(self.wallet.is_connected());
        self.snapshots.send_replace(snapshot);
    }

    async fn fetch_and_apply(&self, ticket: QuoteTicket) {
        let quote = ticket.fetch(&self.quotes).await;
        let applied = self.form.lock().apply_quote(ticket.epoch, quote);
        if applied {
            self.publish();
        }
    }
}

pub struct FormController {
    shared: Arc<Shared>,
    executor: Arc<SwapExecutor>,
    balances: Arc<dyn BalanceSource>,
    refresh_interval: Duration,
    refresher: Mutex<Option<JoinHandle<()>>>,
}

impl FormController {
    pub fn new(
        form: SwapForm,
        quotes: Arc<QuoteClient>,
        executor: Arc<SwapExecutor>,
        wallet: Arc<dyn WalletSession>,
        balances: Arc<dyn BalanceSource>,
        refresh_interval: Duration,
    ) -> Self {
        let (snapshots, _) = watch::channel(form.snapshot(wallet.is_connected()));
        Self {
            shared: Arc::new(Shared {
                form: Mutex::new(form),
                quotes,
                wallet,
                snapshots,
            }),
            executor,
            balances,
            refresh_interval,
            refresher: Mutex::new(None),
        }
    }

    /// Controller for a fresh form using the service's collaborators and local wallet
    pub fn from_service(service: &SwapService, input: Token, output: Token) -> Self {
        Self::new(
            service.new_form(input, output),
            service.quotes().clone(),
            service.executor().clone(),
            service.wallet().clone(),
            service.balances().clone(),
            service.refresh_interval(),
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    /// Run `f` against the form; inputs changed through here are not re-quoted
    pub fn inspect<R>(&self, f: impl FnOnce(&SwapForm) -> R) -> R {
        f(&self.shared.form.lock())
    }

    // ---- inputs -------------------------------------------------------

    pub fn set_amount(&self, raw: &str) {
        let ticket = self.shared.form.lock().set_amount(raw);
        self.dispatch(ticket);
    }

    pub async fn set_input_token(&self, token: Token) {
        let ticket = self.shared.form.lock().set_input_token(token);
        self.dispatch(ticket);
        self.refresh_balance().await;
    }

    pub async fn set_output_token(&self, token: Token) {
        let ticket = self.shared.form.lock().set_output_token(token);
        self.dispatch(ticket);
        // picking the input token here switches the sides
        self.refresh_balance().await;
    }

    pub async fn switch_tokens(&self) {
        let ticket = self.shared.form.lock().switch_tokens();
        self.dispatch(ticket);
        self.refresh_balance().await;
    }

    pub fn set_slippage(&self, slippage: SlippageBps) {
        let ticket = self.shared.form.lock().set_slippage(slippage);
        self.dispatch(ticket);
    }

    pub fn set_max_amount(&self) {
        let ticket = self.shared.form.lock().set_max_amount();
        self.dispatch(ticket);
    }

    fn dispatch(&self, ticket: Option<QuoteTicket>) {
        self.shared.publish();
        if let Some(ticket) = ticket {
            debug!("Quote ticket {} for {} {}", ticket.epoch, ticket.amount, ticket.input_token.symbol);
            let shared = self.shared.clone();
            tokio::spawn(async move { shared.fetch_and_apply(ticket).await });
            self.restart_refresher();
        }
    }

    fn restart_refresher(&self) {
        let mut slot = self.refresher.lock();
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        if self.refresh_interval.is_zero() {
            return;
        }

        let shared = self.shared.clone();
        let period = self.refresh_interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let ticket = shared.form.lock().refresh_ticket();
                if let Some(ticket) = ticket {
                    debug!("🔄 Refreshing quote (epoch {})", ticket.epoch);
                    shared.publish();
                    shared.fetch_and_apply(ticket).await;
                }
            }
        }));
    }

    /// Supersede whatever is in flight with a quote for the current inputs
    pub fn requote(&self) {
        let ticket = self.shared.form.lock().refresh_ticket();
        self.dispatch(ticket);
    }

    // ---- wallet -------------------------------------------------------

    pub fn wallet_address(&self) -> Option<Pubkey> {
        if self.shared.wallet.is_connected() {
            self.shared.wallet.public_key()
        } else {
            None
        }
    }

    pub async fn connect(&self) -> Result<Pubkey, WalletError> {
        let owner = self.shared.wallet.connect().await?;
        info!("🔌 Wallet connected: {}", owner);
        self.refresh_balance().await;
        Ok(owner)
    }

    pub async fn disconnect(&self) -> Result<(), WalletError> {
        self.shared.wallet.disconnect().await?;
        self.shared.form.lock().set_balance(None);
        self.shared.publish();
        Ok(())
    }

    /// Reload the input-token balance of the connected wallet
    pub async fn refresh_balance(&self) {
        let Some(owner) = self.wallet_address() else {
            self.shared.form.lock().set_balance(None);
            self.shared.publish();
            return;
        };
        let token = self.shared.form.lock().input_token().clone();

        let balance = match self.balances.balance_of(&owner, &token).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!("⚠️ Balance of {} unavailable: {}", token.symbol, e);
                None
            }
        };

        {
            let mut form = self.shared.form.lock();
            // the input side may have changed while the lookup was running
            if form.input_token().same_asset(&token) {
                form.set_balance(balance);
            }
        }
        self.shared.publish();
    }

    // ---- swapping -----------------------------------------------------

    /// Run the swap for the current inputs. Gate failures leave the form
    /// untouched and make no external call.
    pub async fn swap(&self) -> Result<SwapResult, SwapError> {
        let begun = self.shared.form.lock().begin_swap(self.wallet_address());
        let request = match begun {
            Ok(request) => request,
            Err(error) => {
                warn!("⚠️ Swap blocked: {}", error);
                if error == SwapError::QuoteExpired {
                    self.requote();
                } else {
                    self.shared.publish();
                }
                return Err(error);
            }
        };
        self.shared.publish();

        let result = self.executor.execute_swap(&request, self.shared.wallet.as_ref()).await;
        self.shared.form.lock().finish_swap(&result);
        self.shared.publish();

        if result.is_ok() {
            self.refresh_balance().await;
        }
        result
    }
}

impl Drop for FormController {
    fn drop(&mut self) {
        if let Some(handle) = self.refresher.get_mut().take() {
            handle.abort();
        }
    }
}
