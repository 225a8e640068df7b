//! # Balance Poller
//!
//! Bounded-retry wrapper around balance reads. A failed fetch degrades the
//! token to an unknown balance instead of failing any workflow; this is the
//! one place in the engine where an error is deliberately swallowed.
//!
//! Retries are immediate, with no delay between attempts, and each token's
//! poll runs independently of every other token's.

use crate::domain::BridgeResult;
use crate::tokens::{TokenPatch, TokenTable};
use async_trait::async_trait;
use bridge_types::{DecimalAmount, Token, TokenBalance};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Balance read function - outbound dependency of the poller.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Fetch the decimal-normalized balance for a token.
    async fn balance_of(&self, token: &Token) -> BridgeResult<DecimalAmount>;
}

/// Bounded-retry balance poller over a shared token table.
pub struct BalancePoller {
    table: Arc<TokenTable>,
    max_attempts: u32,
}

impl BalancePoller {
    /// Create a poller performing at most `max_attempts` attempts per fetch.
    pub fn new(table: Arc<TokenTable>, max_attempts: u32) -> Self {
        Self {
            table,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Fetch one token's balance, retrying immediately on failure.
    ///
    /// On success stores the balance and clears the loading flag. After
    /// exhausting attempts stores `Unknown`, clears the loading flag, and
    /// returns normally; the caller never sees the read error. Tokens with
    /// a fetch already in flight are skipped.
    pub async fn fetch(&self, index: usize, reader: Arc<dyn BalanceReader>) {
        let Some(token) = self.table.get(index) else {
            warn!(index, "balance fetch for unknown token index");
            return;
        };
        if token.is_loading {
            debug!(symbol = %token.symbol, "balance fetch already in flight, skipping");
            return;
        }
        self.table.update_at(index, TokenPatch::loading(true));

        for attempt in 1..=self.max_attempts {
            match reader.balance_of(&token).await {
                Ok(balance) => {
                    info!(symbol = %token.symbol, %balance, attempt, "token balance updated");
                    self.table.update_at(
                        index,
                        TokenPatch::balance(TokenBalance::Known(balance)).with_loading(false),
                    );
                    return;
                }
                Err(error) => {
                    warn!(
                        symbol = %token.symbol,
                        attempt,
                        max_attempts = self.max_attempts,
                        %error,
                        "balance fetch failed, retrying"
                    );
                }
            }
        }

        warn!(symbol = %token.symbol, "balance fetch attempts exhausted, marking unknown");
        self.table.update_at(
            index,
            TokenPatch::balance(TokenBalance::Unknown).with_loading(false),
        );
    }

    /// Refresh every token, or just one symbol, each on its own task.
    ///
    /// Polls never serialize with each other; one slow token does not block
    /// the rest.
    pub fn refresh(self: &Arc<Self>, reader: Arc<dyn BalanceReader>, symbol: Option<&str>) {
        match symbol {
            Some(symbol) => info!(%symbol, "refreshing token balance"),
            None => info!("refreshing all token balances"),
        }
        for (index, token) in self.table.snapshot().into_iter().enumerate() {
            if symbol.is_some_and(|s| s != token.symbol) {
                continue;
            }
            let poller = Arc::clone(self);
            let reader = Arc::clone(&reader);
            tokio::spawn(async move {
                poller.fetch(index, reader).await;
            });
        }
    }
}
