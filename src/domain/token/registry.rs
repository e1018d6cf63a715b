//! Token registry - canonical catalog of swappable assets

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Deserialize;
use tracing::{info, warn};

use super::Token;
use crate::shared::config::TokensCfg;
use crate::shared::errors::AppError;

pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Built-in catalog: (address, symbol, name, decimals, display price)
pub const TOP_TOKENS: &[(&str, &str, &str, u8, f64)] = &[
    (SOL_MINT, "SOL", "Solana", 9, 143.2),
    (USDC_MINT, "USDC", "USD Coin", 6, 1.0),
    ("7dHbWXmci3dT8UFYWYZweBLXgycu7Y3iL6trKn1Y7ARj", "stSOL", "Lido Staked SOL", 9, 152.5),
    ("mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So", "mSOL", "Marinade Staked SOL", 9, 151.8),
    ("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", "JUP", "Jupiter", 6, 2.65),
    ("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", "USDT", "Tether USD", 6, 1.0),
    ("kinXdEcpDQeHPEuQnqmUgtYykqKGVFq6CeVX5iAHJq6", "KIN", "Kin", 5, 0.00001),
    ("orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6k2LkNjWrwJf", "ORCA", "Orca", 6, 0.85),
];

/// Token-list payloads come either wrapped (`{"tokens": [...]}`) or bare
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenListResponse {
    Wrapped { tokens: Vec<Token> },
    Bare(Vec<Token>),
}

/// Registry of known tokens, indexed by address
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
    index: HashMap<String, usize>,
}

impl TokenRegistry {
    /// Empty registry
    pub fn empty() -> Self {
        Self {
            tokens: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in catalog
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for (address, symbol, name, decimals, price) in TOP_TOKENS {
            registry.tokens.push(Token::new(address, symbol, name, *decimals, *price));
            registry.index.insert(address.to_string(), registry.tokens.len() - 1);
        }
        registry
    }

    /// Built-in catalog plus the tokens listed in the config
    pub fn from_config(cfg: &TokensCfg) -> Result<Self, AppError> {
        let mut registry = Self::with_defaults();
        for token in &cfg.extra {
            if !registry.insert(token.clone())? {
                warn!("⚠️ Token {} ({}) already registered, ignoring config entry", token.symbol, token.address);
            }
        }
        Ok(registry)
    }

    /// Add a token. Returns `false` when the address is already known.
    pub fn insert(&mut self, token: Token) -> Result<bool, AppError> {
        if token.address.trim().is_empty() {
            return Err(AppError::RegistryError(format!("Token {} has no address", token.symbol)));
        }
        if !token.price.is_finite() || token.price < 0.0 {
            return Err(AppError::RegistryError(format!(
                "Token {} has invalid price {}",
                token.symbol, token.price
            )));
        }
        if self.index.contains_key(&token.address) {
            return Ok(false);
        }
        self.index.insert(token.address.clone(), self.tokens.len());
        self.tokens.push(token);
        Ok(true)
    }

    /// Merge tokens from an external list; known addresses win. Returns the number added.
    pub fn merge(&mut self, tokens: Vec<Token>) -> usize {
        let mut added = 0;
        for token in tokens {
            match self.insert(token) {
                Ok(true) => added += 1,
                Ok(false) => {}
                Err(e) => warn!("⚠️ Skipping token list entry: {}", e),
            }
        }
        added
    }

    /// Fetch a token list from an external token-list service
    pub async fn fetch_token_list(client: &reqwest::Client, url: &str) -> Result<Vec<Token>, AppError> {
        info!("🔍 Fetching token list from: {}", url);

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::RegistryError(format!("Token list request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::RegistryError(format!(
                "Token list request failed with status: {}",
                response.status()
            )));
        }

        let list: TokenListResponse = response
            .json()
            .await
            .map_err(|e| AppError::RegistryError(format!("Invalid token list payload: {}", e)))?;

        let tokens = match list {
            TokenListResponse::Wrapped { tokens } => tokens,
            TokenListResponse::Bare(tokens) => tokens,
        };
        info!("✅ Token list contains {} tokens", tokens.len());
        Ok(tokens)
    }

    pub fn resolve(&self, address: &str) -> Option<&Token> {
        self.index.get(address).map(|&i| &self.tokens[i])
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Resolve by address first, then by symbol
    pub fn lookup(&self, key: &str) -> Option<&Token> {
        self.resolve(key).or_else(|| self.by_symbol(key))
    }

    /// True when the registry holds this exact token
    pub fn contains(&self, token: &Token) -> bool {
        self.resolve(&token.address)
            .map(|known| known == token)
            .unwrap_or(false)
    }

    pub fn all(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn search(&self, query: &str) -> Vec<&Token> {
        self.tokens.iter().filter(|t| t.matches(query)).collect()
    }

    /// Tokens offered in a selector: filtered by `query`, held tokens first
    /// (largest balance first), then alphabetical; `exclude` is the token
    /// already chosen on the other side.
    pub fn selection(
        &self,
        query: &str,
        balances: Option<&HashMap<String, f64>>,
        exclude: Option<&str>,
    ) -> Vec<&Token> {
        let mut tokens: Vec<&Token> = self
            .search(query)
            .into_iter()
            .filter(|t| exclude.map(|addr| t.address != addr).unwrap_or(true))
            .collect();

        tokens.sort_by(|a, b| {
            if let Some(balances) = balances {
                let balance_a = balances.get(&a.address).copied().unwrap_or(0.0);
                let balance_b = balances.get(&b.address).copied().unwrap_or(0.0);
                let by_balance = balance_b.partial_cmp(&balance_a).unwrap_or(Ordering::Equal);
                if by_balance != Ordering::Equal {
                    return by_balance;
                }
            }
            a.symbol
                .to_lowercase()
                .cmp(&b.symbol.to_lowercase())
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        tokens
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let registry = TokenRegistry::with_defaults();
        assert_eq!(registry.len(), TOP_TOKENS.len());
        let sol = registry.resolve(SOL_MINT).unwrap();
        assert_eq!(sol.symbol, "SOL");
        assert_eq!(sol.decimals, 9);
        assert_eq!(sol.price, 143.2);
        assert_eq!(registry.by_symbol("usdc").unwrap().address, USDC_MINT);
        assert_eq!(registry.lookup("JUP").unwrap().decimals, 6);
        assert!(registry.resolve("unknown").is_none());
    }

    #[test]
    fn test_insert_rejects_duplicates_and_bad_prices() {
        let mut registry = TokenRegistry::with_defaults();
        let dup = Token::new(SOL_MINT, "SOL2", "Other SOL", 9, 1.0);
        assert!(!registry.insert(dup).unwrap());
        assert_eq!(registry.resolve(SOL_MINT).unwrap().symbol, "SOL");

        let bad = Token::new("Bad1111111111111111111111111111111111111111", "BAD", "Bad", 6, -1.0);
        assert!(registry.insert(bad).is_err());
    }

    #[test]
    fn test_contains_requires_identical_token() {
        let registry = TokenRegistry::with_defaults();
        let sol = registry.resolve(SOL_MINT).unwrap().clone();
        assert!(registry.contains(&sol));
        let mut forged = sol.clone();
        forged.decimals = 2;
        assert!(!registry.contains(&forged));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let registry = TokenRegistry::with_defaults();
        let hits: Vec<&str> = registry.search("staked").iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(hits, vec!["stSOL", "mSOL"]);
        assert_eq!(registry.search("").len(), registry.len());
        assert_eq!(registry.search("orcaEKT").len(), 1);
    }

    #[test]
    fn test_selection_orders_by_balance_then_symbol() {
        let registry = TokenRegistry::with_defaults();
        let mut balances = HashMap::new();
        balances.insert(USDC_MINT.to_string(), 5.0);
        balances.insert("orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6k2LkNjWrwJf".to_string(), 50.0);

        let symbols: Vec<&str> = registry
            .selection("", Some(&balances), Some(SOL_MINT))
            .iter()
            .map(|t| t.symbol.as_str())
            .collect();

        assert_eq!(symbols[0], "ORCA");
        assert_eq!(symbols[1], "USDC");
        assert!(!symbols.contains(&"SOL"));
        // the rest alphabetically
        assert_eq!(&symbols[2..], &["JUP", "KIN", "mSOL", "stSOL", "USDT"]);
    }

    #[test]
    fn test_merge_token_list() {
        let mut registry = TokenRegistry::with_defaults();
        let payload = r#"{"tokens":[
            {"address":"DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263","symbol":"BONK","name":"Bonk","decimals":5,"logoURI":"x"},
            {"address":"So11111111111111111111111111111111111111112","symbol":"WSOL","name":"Wrapped SOL","decimals":9}
        ]}"#;
        let list: TokenListResponse = serde_json::from_str(payload).unwrap();
        let tokens = match list {
            TokenListResponse::Wrapped { tokens } => tokens,
            TokenListResponse::Bare(tokens) => tokens,
        };
        assert_eq!(registry.merge(tokens), 1);
        assert_eq!(registry.by_symbol("BONK").unwrap().price, 0.0);
        assert_eq!(registry.resolve(SOL_MINT).unwrap().symbol, "SOL");
    }
}
