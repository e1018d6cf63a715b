//! Utility functions and helpers

use rand::{distributions::Alphanumeric, Rng};
use solana_sdk::pubkey::Pubkey;

use crate::shared::errors::SwapError;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Parse a user-entered decimal amount, accepting only finite values above zero
pub fn parse_positive_amount(raw: &str) -> Result<f64, SwapError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SwapError::invalid("Amount is required"));
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| SwapError::invalid(format!("Invalid amount: {}", raw)))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(SwapError::invalid(format!("Invalid amount: {}", raw)));
    }
    Ok(value)
}

/// Fixed-point rendering with exactly `decimals` places
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Render a token amount with at most `min(decimals, max_decimals)` places, trailing zeros trimmed
pub fn format_token_amount(amount: f64, decimals: u8, max_decimals: u8) -> String {
    if amount == 0.0 {
        return "0".to_string();
    }
    let places = decimals.min(max_decimals) as usize;
    let fixed = format_fixed(amount, places);
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}

/// USD value of a decimal amount string; sub-cent values keep 6 places
pub fn calculate_usd_value(amount: &str, price: Option<f64>) -> String {
    let price = match price {
        Some(p) if p > 0.0 => p,
        _ => return "0.00".to_string(),
    };
    let amount: f64 = match amount.trim().parse() {
        Ok(a) => a,
        Err(_) => return "0.00".to_string(),
    };
    let value = amount * price;
    if !value.is_finite() {
        return "0.00".to_string();
    }
    if value > 0.0 && value < 0.01 {
        format_fixed(value, 6)
    } else {
        format_fixed(value, 2)
    }
}

/// Shorten an address for display, e.g. `So11...1112`
pub fn shorten_address(address: &str, chars: usize) -> String {
    if address.len() <= chars * 2 {
        return address.to_string();
    }
    format!("{}...{}", &address[..chars], &address[address.len() - chars..])
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Human-readable amount -> atomic units for a token with `decimals`
pub fn ui_to_atomic(amount: f64, decimals: u8) -> u64 {
    (amount * 10_f64.powi(decimals as i32)).round() as u64
}

/// Atomic units -> human-readable amount for a token with `decimals`
pub fn atomic_to_ui(amount: u64, decimals: u8) -> f64 {
    amount as f64 / 10_f64.powi(decimals as i32)
}

/// Validate a base58 on-chain address (32 bytes once decoded)
pub fn validate_address(address: &str) -> Result<Pubkey, SwapError> {
    let bytes = bs58::decode(address.trim())
        .into_vec()
        .map_err(|e| SwapError::invalid(format!("Invalid address {}: {}", address, e)))?;
    if bytes.len() != 32 {
        return Err(SwapError::invalid(format!(
            "Invalid address {}: expected 32 bytes, got {}",
            address,
            bytes.len()
        )));
    }
    Pubkey::try_from(bytes.as_slice())
        .map_err(|e| SwapError::invalid(format!("Invalid address {}: {}", address, e)))
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Identifier for transactions that never reach the chain
pub fn simulated_tx_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("SimTx_{}", suffix)
}
