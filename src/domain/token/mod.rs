//! Token domain - swappable assets and the registry that owns them

mod registry;

pub use registry::{TokenRegistry, SOL_MINT, TOP_TOKENS, USDC_MINT};

use serde::{Deserialize, Serialize};

/// Swappable asset. Immutable once loaded into the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Mint address, unique within the registry
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(rename = "logoURI", default)]
    pub logo_uri: String,
    /// Display-only USD price
    #[serde(default)]
    pub price: f64,
}

impl Token {
    pub fn new(address: &str, symbol: &str, name: &str, decimals: u8, price: f64) -> Self {
        Self {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            logo_uri: format!(
                "https://raw.githubusercontent.com/solana-labs/token-list/main/assets/mainnet/{}/logo.png",
                address
            ),
            price,
        }
    }

    pub fn same_asset(&self, other: &Token) -> bool {
        self.address == other.address
    }

    /// Case-insensitive substring match on symbol, name or address
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.symbol.to_lowercase().contains(&query)
            || self.name.to_lowercase().contains(&query)
            || self.address.to_lowercase().contains(&query)
    }
}
