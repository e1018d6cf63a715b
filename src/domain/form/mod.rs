//! Swap form state machine
//!
//! Owns the user's inputs and the quote currently on display. Every input
//! change bumps an epoch and hands back a [`QuoteTicket`]; a quote is only
//! applied when it answers the latest ticket, so a slow early response can
//! never overwrite a fresher one. The form never performs I/O itself.

mod action;

pub use action::{Notice, SwapAction};

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::domain::quote::{Quote, QuoteClient, DEFAULT_QUOTE_FRESHNESS};
use crate::domain::swap::{SwapRequest, SwapResult};
use crate::domain::token::Token;
use crate::shared::errors::SwapError;
use crate::shared::types::{SlippageBps, SwapMode};
use crate::shared::utils::{calculate_usd_value, format_token_amount, parse_positive_amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormPhase {
    Idle,
    Quoting,
    QuoteReady,
    Swapping,
}

/// Quote request issued by the form for one input epoch
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteTicket {
    pub epoch: u64,
    pub input_token: Token,
    pub output_token: Token,
    pub amount: String,
    pub slippage: SlippageBps,
    pub mode: SwapMode,
}

impl QuoteTicket {
    pub async fn fetch(&self, client: &QuoteClient) -> Option<Quote> {
        client
            .get_quote(&self.input_token, &self.output_token, &self.amount, self.slippage, self.mode)
            .await
    }
}

/// Keep only digits and the decimal point, as typed into the amount field
pub fn sanitize_amount(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

/// Everything the form renders, at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub epoch: u64,
    pub phase: FormPhase,
    pub side_label: &'static str,
    pub input_symbol: String,
    pub output_symbol: String,
    pub amount: String,
    pub estimated_output: String,
    pub input_usd: String,
    pub output_usd: String,
    pub rate: Option<String>,
    pub min_output: Option<String>,
    pub route: Option<String>,
    pub balance: Option<f64>,
    pub action: &'static str,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub struct SwapForm {
    input_token: Token,
    output_token: Token,
    amount: String,
    slippage: SlippageBps,
    mode: SwapMode,
    phase: FormPhase,
    epoch: u64,
    quote: Option<Quote>,
    balance: Option<f64>,
    notice: Option<Notice>,
    freshness: Duration,
}

impl SwapForm {
    pub fn new(input_token: Token, output_token: Token, slippage: SlippageBps) -> Self {
        Self {
            input_token,
            output_token,
            amount: String::new(),
            slippage,
            mode: SwapMode::ExactIn,
            phase: FormPhase::Idle,
            epoch: 0,
            quote: None,
            balance: None,
            notice: None,
            freshness: DEFAULT_QUOTE_FRESHNESS,
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn input_token(&self) -> &Token {
        &self.input_token
    }

    pub fn output_token(&self) -> &Token {
        &self.output_token
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn slippage(&self) -> SlippageBps {
        self.slippage
    }

    pub fn mode(&self) -> SwapMode {
        self.mode
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn balance(&self) -> Option<f64> {
        self.balance
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Notices are transient: reading one this way clears it
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn is_swapping(&self) -> bool {
        self.phase == FormPhase::Swapping
    }

    pub fn has_positive_amount(&self) -> bool {
        parse_positive_amount(&self.amount).is_ok()
    }

    // ---- inputs -------------------------------------------------------

    pub fn set_amount(&mut self, raw: &str) -> Option<QuoteTicket> {
        if self.locked() {
            return None;
        }
        self.amount = sanitize_amount(raw);
        self.invalidate()
    }

    /// Picking the token already on the output side swaps the two sides
    pub fn set_input_token(&mut self, token: Token) -> Option<QuoteTicket> {
        if self.locked() {
            return None;
        }
        if token.same_asset(&self.output_token) {
            return self.switch_tokens();
        }
        self.input_token = token;
        // a different asset invalidates the balance
        self.balance = None;
        self.invalidate()
    }

    pub fn set_output_token(&mut self, token: Token) -> Option<QuoteTicket> {
        if self.locked() {
            return None;
        }
        if token.same_asset(&self.input_token) {
            return self.switch_tokens();
        }
        self.output_token = token;
        self.invalidate()
    }

    pub fn set_slippage(&mut self, slippage: SlippageBps) -> Option<QuoteTicket> {
        if self.locked() || slippage == self.slippage {
            return None;
        }
        self.slippage = slippage;
        self.invalidate()
    }

    /// Swap both tokens and flip the mode in one update (one epoch, one ticket)
    pub fn switch_tokens(&mut self) -> Option<QuoteTicket> {
        if self.locked() {
            return None;
        }
        std::mem::swap(&mut self.input_token, &mut self.output_token);
        self.mode = self.mode.flipped();
        self.balance = None;
        self.invalidate()
    }

    /// Fill the amount with the whole input balance
    pub fn set_max_amount(&mut self) -> Option<QuoteTicket> {
        let balance = self.balance.unwrap_or(0.0);
        let decimals = self.input_token.decimals;
        self.set_amount(&format_token_amount(balance, decimals, decimals))
    }

    pub fn set_balance(&mut self, balance: Option<f64>) {
        self.balance = balance;
    }

    fn locked(&self) -> bool {
        if self.is_swapping() {
            debug!("Swap in progress, input ignored");
            true
        } else {
            false
        }
    }

    fn invalidate(&mut self) -> Option<QuoteTicket> {
        self.epoch += 1;
        self.quote = None;
        if self.has_positive_amount() {
            self.phase = FormPhase::Quoting;
            Some(self.ticket())
        } else {
            self.phase = FormPhase::Idle;
            None
        }
    }

    fn ticket(&self) -> QuoteTicket {
        QuoteTicket {
            epoch: self.epoch,
            input_token: self.input_token.clone(),
            output_token: self.output_token.clone(),
            amount: self.amount.clone(),
            slippage: self.slippage,
            mode: self.mode,
        }
    }

    // ---- quotes -------------------------------------------------------

    /// Periodic re-quote of unchanged inputs. Supersedes any request in flight.
    pub fn refresh_ticket(&mut self) -> Option<QuoteTicket> {
        if self.is_swapping() || !self.has_positive_amount() {
            return None;
        }
        self.epoch += 1;
        if self.quote.is_none() {
            self.phase = FormPhase::Quoting;
        }
        Some(self.ticket())
    }

    /// Apply a quote answering ticket `epoch`. Returns `false` when the ticket
    /// was superseded and the response is dropped.
    pub fn apply_quote(&mut self, epoch: u64, quote: Option<Quote>) -> bool {
        if epoch != self.epoch {
            debug!("Dropping quote for epoch {} (current {})", epoch, self.epoch);
            return false;
        }
        self.quote = quote;
        if self.phase == FormPhase::Quoting {
            self.phase = FormPhase::QuoteReady;
        }
        true
    }

    /// Displayed quote, if still inside the freshness window at `now`
    pub fn quote_at(&self, now: DateTime<Utc>) -> Option<&Quote> {
        self.quote
            .as_ref()
            .filter(|quote| quote.is_fresh_at(now, self.freshness))
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote_at(Utc::now())
    }

    // ---- read model ---------------------------------------------------

    /// Output shown under the output token; "0" without a usable quote
    pub fn estimated_output_at(&self, now: DateTime<Utc>) -> String {
        match self.quote_at(now) {
            Some(quote) => match self.mode {
                SwapMode::ExactIn => quote.out_amount.clone(),
                // the requested amount is shown as is
                SwapMode::ExactOut => self.amount.clone(),
            },
            None => "0".to_string(),
        }
    }

    pub fn estimated_output(&self) -> String {
        self.estimated_output_at(Utc::now())
    }

    pub fn input_usd_value(&self) -> String {
        calculate_usd_value(&self.amount, Some(self.input_token.price))
    }

    pub fn output_usd_value(&self) -> String {
        calculate_usd_value(&self.estimated_output(), Some(self.output_token.price))
    }

    /// `1 SOL = 143.2 USDC`, shown once an amount is entered
    pub fn rate_label(&self) -> Option<String> {
        if !self.has_positive_amount() || self.input_token.price <= 0.0 {
            return None;
        }
        let rate = self.output_token.price / self.input_token.price;
        Some(format!(
            "1 {} = {} {}",
            self.output_token.symbol,
            format_token_amount(rate, self.input_token.decimals, 6),
            self.input_token.symbol
        ))
    }

    pub fn min_output(&self) -> Option<String> {
        self.quote().map(Quote::min_out_amount)
    }

    pub fn side_label(&self) -> &'static str {
        self.mode.side_label()
    }

    pub fn action(&self, wallet_connected: bool) -> SwapAction {
        if !wallet_connected {
            return SwapAction::Connect;
        }
        if self.is_swapping() {
            return SwapAction::Swapping;
        }
        let amount = match parse_positive_amount(&self.amount) {
            Ok(amount) => amount,
            Err(_) => return SwapAction::EnterAmount,
        };
        if amount > self.balance.unwrap_or(0.0) {
            return SwapAction::InsufficientBalance;
        }
        SwapAction::Swap
    }

    pub fn snapshot(&self, wallet_connected: bool) -> FormSnapshot {
        FormSnapshot {
            epoch: self.epoch,
            phase: self.phase,
            side_label: self.side_label(),
            input_symbol: self.input_token.symbol.clone(),
            output_symbol: self.output_token.symbol.clone(),
            amount: self.amount.clone(),
            estimated_output: self.estimated_output(),
            input_usd: self.input_usd_value(),
            output_usd: self.output_usd_value(),
            rate: self.rate_label(),
            min_output: self.min_output(),
            route: self.quote().map(Quote::route_label),
            balance: self.balance,
            action: self.action(wallet_connected).label(),
            notice: self.notice.clone(),
        }
    }

    // ---- swapping -----------------------------------------------------

    /// Enter `Swapping` and hand out the request to execute. A failed gate
    /// only leaves a notice behind; inputs and phase stay as they were.
    pub fn begin_swap_at(&mut self, wallet: Option<Pubkey>, now: DateTime<Utc>) -> Result<SwapRequest, SwapError> {
        if self.is_swapping() {
            return Err(SwapError::invalid("Swap already in progress"));
        }
        let request = self.swap_request_at(wallet, now);
        match &request {
            Ok(_) => {
                self.phase = FormPhase::Swapping;
                self.notice = None;
            }
            Err(error) => self.notice = Some(Notice::failure(error)),
        }
        request
    }

    fn swap_request_at(&self, wallet: Option<Pubkey>, now: DateTime<Utc>) -> Result<SwapRequest, SwapError> {
        let wallet = wallet.ok_or(SwapError::WalletNotConnected)?;
        let amount = parse_positive_amount(&self.amount)?;
        if amount > self.balance.unwrap_or(0.0) {
            return Err(SwapError::InsufficientBalance);
        }
        match &self.quote {
            None => return Err(SwapError::QuoteUnavailable),
            Some(quote) if !quote.is_fresh_at(now, self.freshness) => return Err(SwapError::QuoteExpired),
            Some(_) => {}
        }

        let request = SwapRequest::new(
            self.input_token.clone(),
            self.output_token.clone(),
            &self.amount,
            self.slippage.bps(),
            &wallet.to_string(),
        )?
        .with_mode(self.mode);
        Ok(request)
    }

    pub fn begin_swap(&mut self, wallet: Option<Pubkey>) -> Result<SwapRequest, SwapError> {
        self.begin_swap_at(wallet, Utc::now())
    }

    /// Leave `Swapping`. Success clears the amount; failure keeps every input.
    pub fn finish_swap(&mut self, result: &Result<SwapResult, SwapError>) {
        if !self.is_swapping() {
            return;
        }
        match result {
            Ok(swap) => {
                self.notice = Some(Notice::success(&swap.tx_id));
                self.amount.clear();
                self.epoch += 1;
                self.quote = None;
                self.phase = FormPhase::Idle;
            }
            Err(error) => {
                self.notice = Some(Notice::failure(error));
                self.phase = if self.quote.is_some() {
                    FormPhase::QuoteReady
                } else {
                    FormPhase::Idle
                };
            }
        }
    }
}
