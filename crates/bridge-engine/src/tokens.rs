//! # Token Table
//!
//! Shared token list with index-addressed, per-token atomic updates.
//! The balance poller is the only writer of `balance`/`is_loading`;
//! orchestrators and the UI read snapshots and never observe a
//! half-updated token record.

use bridge_types::{ChainLayer, Token, TokenBalance};
use parking_lot::RwLock;

/// Partial update applied atomically to one token.
#[derive(Debug, Clone, Default)]
pub struct TokenPatch {
    /// New balance, when present.
    pub balance: Option<TokenBalance>,
    /// New loading flag, when present.
    pub is_loading: Option<bool>,
}

impl TokenPatch {
    /// Patch carrying a new balance.
    pub fn balance(balance: TokenBalance) -> Self {
        Self {
            balance: Some(balance),
            ..Self::default()
        }
    }

    /// Patch carrying a loading-flag change.
    pub fn loading(is_loading: bool) -> Self {
        Self {
            is_loading: Some(is_loading),
            ..Self::default()
        }
    }

    /// Also set the loading flag.
    pub fn with_loading(mut self, is_loading: bool) -> Self {
        self.is_loading = Some(is_loading);
        self
    }
}

/// The session's token list.
pub struct TokenTable {
    tokens: RwLock<Vec<Token>>,
}

impl TokenTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(Vec::new()),
        }
    }

    /// Replace the whole token list (provider bootstrap).
    pub fn set_tokens(&self, tokens: Vec<Token>) {
        *self.tokens.write() = tokens;
    }

    /// Bootstrap the table from static token configuration, keeping only
    /// the supported symbols. Configured order is preserved.
    pub fn bootstrap(&self, configs: Vec<Token>, supported_symbols: &[&str]) {
        let tokens: Vec<Token> = configs
            .into_iter()
            .filter(|token| supported_symbols.contains(&token.symbol.as_str()))
            .collect();
        self.set_tokens(tokens);
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }

    /// Clone of the token at `index`.
    pub fn get(&self, index: usize) -> Option<Token> {
        self.tokens.read().get(index).cloned()
    }

    /// Snapshot of the whole list.
    pub fn snapshot(&self) -> Vec<Token> {
        self.tokens.read().clone()
    }

    /// First token with this symbol on the given side, with its index.
    pub fn find_on_layer(&self, symbol: &str, layer: ChainLayer) -> Option<(usize, Token)> {
        self.tokens
            .read()
            .iter()
            .enumerate()
            .find(|(_, t)| t.symbol == symbol && t.layer == layer)
            .map(|(i, t)| (i, t.clone()))
    }

    /// Apply a partial update to the token at `index` atomically.
    ///
    /// Returns false when the index is out of range.
    pub fn update_at(&self, index: usize, patch: TokenPatch) -> bool {
        let mut tokens = self.tokens.write();
        let Some(token) = tokens.get_mut(index) else {
            return false;
        };
        if let Some(balance) = patch.balance {
            token.balance = balance;
        }
        if let Some(is_loading) = patch.is_loading {
            token.is_loading = is_loading;
        }
        true
    }
}

impl Default for TokenTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::DecimalAmount;

    fn table_with(symbols: &[(&str, ChainLayer)]) -> TokenTable {
        let table = TokenTable::new();
        table.set_tokens(
            symbols
                .iter()
                .map(|(s, layer)| Token::new(s, s, 18, *layer))
                .collect(),
        );
        table
    }

    #[test]
    fn test_set_and_snapshot() {
        let table = table_with(&[("ETH", ChainLayer::L1), ("USDC", ChainLayer::L1)]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.snapshot()[1].symbol, "USDC");
    }

    #[test]
    fn test_update_at_is_partial() {
        let table = table_with(&[("ETH", ChainLayer::L1)]);
        let balance = TokenBalance::Known(DecimalAmount::new("1.5").unwrap());

        assert!(table.update_at(0, TokenPatch::balance(balance.clone())));
        let token = table.get(0).unwrap();
        assert_eq!(token.balance, balance);
        // Untouched field keeps its value.
        assert!(!token.is_loading);

        assert!(table.update_at(0, TokenPatch::loading(true)));
        let token = table.get(0).unwrap();
        assert!(token.is_loading);
        assert_eq!(token.balance, balance);
    }

    #[test]
    fn test_update_out_of_range() {
        let table = table_with(&[("ETH", ChainLayer::L1)]);
        assert!(!table.update_at(5, TokenPatch::loading(true)));
    }

    #[test]
    fn test_bootstrap_filters_unsupported_symbols() {
        let table = TokenTable::new();
        table.bootstrap(
            vec![
                Token::new("ETH", "Ether", 18, ChainLayer::L1),
                Token::new("WBTC", "Wrapped Bitcoin", 8, ChainLayer::L1),
                Token::new("USDC", "USD Coin", 6, ChainLayer::L1),
            ],
            &["ETH", "USDC"],
        );
        let symbols: Vec<String> = table.snapshot().into_iter().map(|t| t.symbol).collect();
        assert_eq!(symbols, vec!["ETH", "USDC"]);
    }

    #[test]
    fn test_find_on_layer() {
        let table = table_with(&[("ETH", ChainLayer::L1), ("ETH", ChainLayer::L2)]);
        let (index, token) = table.find_on_layer("ETH", ChainLayer::L2).unwrap();
        assert_eq!(index, 1);
        assert_eq!(token.layer, ChainLayer::L2);
        assert!(table.find_on_layer("DAI", ChainLayer::L1).is_none());
    }
}
