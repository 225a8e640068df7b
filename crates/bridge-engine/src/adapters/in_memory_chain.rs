//! # In-Memory Chain Clients
//!
//! Deterministic chain clients for tests and local runs. Token balances,
//! allowances, and bridge constants are plain maps; sends are recorded and
//! mined immediately unless a failure is installed.

use crate::domain::ChainClientError;
use crate::ports::outbound::{
    EvmCallArg, EvmChainClient, L2ChainClient, PendingTransaction, TxOptions,
};
use async_trait::async_trait;
use bridge_types::{EthAddress, Felt, L2TransactionStatus, TxHash, U256};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// A recorded L1 mutating call.
#[derive(Debug, Clone)]
pub struct SentTransaction {
    /// Target contract.
    pub contract: EthAddress,
    /// Invoked method.
    pub method: String,
    /// Encoded arguments.
    pub args: Vec<EvmCallArg>,
    /// Native value attached to the call.
    pub value: Option<U256>,
    /// Hash assigned at submission.
    pub tx_hash: TxHash,
}

/// In-memory [`EvmChainClient`].
///
/// Understands the read methods the engine issues (`balanceOf`,
/// `allowance`, and the bridge cap constants); any other read reverts.
/// `approve` sends update the allowance map so approval effects are
/// observable.
pub struct InMemoryEvmChain {
    account: EthAddress,
    token_balances: RwLock<HashMap<(EthAddress, EthAddress), U256>>,
    native_balances: RwLock<HashMap<EthAddress, U256>>,
    allowances: RwLock<HashMap<(EthAddress, EthAddress), U256>>,
    constants: RwLock<HashMap<(EthAddress, String), U256>>,
    sent: Mutex<Vec<SentTransaction>>,
    next_nonce: AtomicU64,
    call_failure: Mutex<Option<ChainClientError>>,
    send_failure: Mutex<Option<ChainClientError>>,
    mining_failure: Mutex<Option<ChainClientError>>,
}

impl InMemoryEvmChain {
    /// Create a chain whose wallet is connected as `account`.
    pub fn new(account: EthAddress) -> Self {
        Self {
            account,
            token_balances: RwLock::new(HashMap::new()),
            native_balances: RwLock::new(HashMap::new()),
            allowances: RwLock::new(HashMap::new()),
            constants: RwLock::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            next_nonce: AtomicU64::new(1),
            call_failure: Mutex::new(None),
            send_failure: Mutex::new(None),
            mining_failure: Mutex::new(None),
        }
    }

    /// The connected wallet account.
    pub fn account(&self) -> &EthAddress {
        &self.account
    }

    /// Seed an ERC-20 balance.
    pub fn set_token_balance(&self, contract: &EthAddress, holder: &EthAddress, raw: U256) {
        self.token_balances.write().insert((*contract, *holder), raw);
    }

    /// Seed a native-asset balance.
    pub fn set_native_balance(&self, account: &EthAddress, raw: U256) {
        self.native_balances.write().insert(*account, raw);
    }

    /// Seed an allowance granted by the connected account.
    pub fn set_allowance(&self, token: &EthAddress, spender: &EthAddress, raw: U256) {
        self.allowances.write().insert((*token, *spender), raw);
    }

    /// Current allowance granted by the connected account.
    pub fn allowance_of(&self, token: &EthAddress, spender: &EthAddress) -> U256 {
        self.allowances
            .read()
            .get(&(*token, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Seed a constant method on a bridge contract.
    pub fn set_constant(&self, contract: &EthAddress, method: &str, raw: U256) {
        self.constants
            .write()
            .insert((*contract, method.to_string()), raw);
    }

    /// Make every subsequent read fail with `error`.
    pub fn fail_calls(&self, error: ChainClientError) {
        *self.call_failure.lock() = Some(error);
    }

    /// Make every subsequent send fail at submission with `error`.
    pub fn fail_sends(&self, error: ChainClientError) {
        *self.send_failure.lock() = Some(error);
    }

    /// Make every subsequent send submit but fail at mining with `error`.
    pub fn fail_mining(&self, error: ChainClientError) {
        *self.mining_failure.lock() = Some(error);
    }

    /// Everything sent so far, in submission order.
    pub fn sent(&self) -> Vec<SentTransaction> {
        self.sent.lock().clone()
    }

    /// Methods sent so far, in submission order.
    pub fn sent_methods(&self) -> Vec<String> {
        self.sent.lock().iter().map(|tx| tx.method.clone()).collect()
    }

    fn next_tx_hash(&self) -> TxHash {
        let nonce = self.next_nonce.fetch_add(1, Ordering::Relaxed);
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&nonce.to_be_bytes());
        hash
    }
}

#[async_trait]
impl EvmChainClient for InMemoryEvmChain {
    async fn call(
        &self,
        contract: &EthAddress,
        method: &str,
        args: &[EvmCallArg],
    ) -> Result<U256, ChainClientError> {
        if let Some(error) = self.call_failure.lock().clone() {
            return Err(error);
        }
        match (method, args) {
            ("balanceOf", [EvmCallArg::Address(holder)]) => Ok(self
                .token_balances
                .read()
                .get(&(*contract, *holder))
                .copied()
                .unwrap_or_default()),
            ("allowance", [EvmCallArg::Address(_), EvmCallArg::Address(spender)]) => {
                Ok(self.allowance_of(contract, spender))
            }
            _ => self
                .constants
                .read()
                .get(&(*contract, method.to_string()))
                .copied()
                .ok_or_else(|| ChainClientError::Reverted(format!("unknown method {method}"))),
        }
    }

    async fn native_balance(&self, account: &EthAddress) -> Result<U256, ChainClientError> {
        if let Some(error) = self.call_failure.lock().clone() {
            return Err(error);
        }
        Ok(self
            .native_balances
            .read()
            .get(account)
            .copied()
            .unwrap_or_default())
    }

    async fn send(
        &self,
        contract: &EthAddress,
        method: &str,
        args: &[EvmCallArg],
        options: TxOptions,
    ) -> Result<PendingTransaction, ChainClientError> {
        if let Some(error) = self.send_failure.lock().clone() {
            return Err(error);
        }
        if method == "approve" {
            if let [EvmCallArg::Address(spender), EvmCallArg::Uint(raw)] = args {
                self.allowances.write().insert((*contract, *spender), *raw);
            }
        }
        let tx_hash = self.next_tx_hash();
        self.sent.lock().push(SentTransaction {
            contract: *contract,
            method: method.to_string(),
            args: args.to_vec(),
            value: options.value,
            tx_hash,
        });

        let (mined_tx, mined_rx) = tokio::sync::oneshot::channel();
        let outcome = match self.mining_failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        };
        let _ = mined_tx.send(outcome);
        Ok(PendingTransaction {
            tx_hash,
            mined: mined_rx,
        })
    }
}

/// A recorded L2 mutating call.
#[derive(Debug, Clone)]
pub struct ExecutedCall {
    /// Target contract.
    pub contract: Felt,
    /// Invoked entrypoint.
    pub entrypoint: String,
    /// Raw calldata words.
    pub calldata: Vec<Felt>,
    /// Hash assigned at submission.
    pub tx_hash: Felt,
}

/// In-memory [`L2ChainClient`].
///
/// Balances answer `balanceOf` as a (low, high) pair. Statuses follow a
/// scripted sequence per hash, sticking at the last entry; unscripted
/// hashes report `Received`.
pub struct InMemoryL2Chain {
    balances: RwLock<HashMap<(Felt, Felt), U256>>,
    executed: Mutex<Vec<ExecutedCall>>,
    statuses: Mutex<HashMap<Felt, VecDeque<L2TransactionStatus>>>,
    status_queries: Mutex<HashMap<Felt, u32>>,
    next_nonce: AtomicU64,
    call_failure: Mutex<Option<ChainClientError>>,
    execute_failure: Mutex<Option<ChainClientError>>,
}

impl InMemoryL2Chain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
            statuses: Mutex::new(HashMap::new()),
            status_queries: Mutex::new(HashMap::new()),
            next_nonce: AtomicU64::new(1),
            call_failure: Mutex::new(None),
            execute_failure: Mutex::new(None),
        }
    }

    /// Seed a token balance.
    pub fn set_balance(&self, contract: &Felt, holder: &Felt, raw: U256) {
        self.balances.write().insert((*contract, *holder), raw);
    }

    /// Script the status sequence a hash reports; the last entry repeats.
    pub fn script_statuses(&self, tx_hash: &Felt, sequence: Vec<L2TransactionStatus>) {
        self.statuses.lock().insert(*tx_hash, sequence.into());
    }

    /// How many times a hash's status was queried.
    pub fn status_queries(&self, tx_hash: &Felt) -> u32 {
        self.status_queries.lock().get(tx_hash).copied().unwrap_or(0)
    }

    /// Make every subsequent read fail with `error`.
    pub fn fail_calls(&self, error: ChainClientError) {
        *self.call_failure.lock() = Some(error);
    }

    /// Make every subsequent execute fail with `error`.
    pub fn fail_executes(&self, error: ChainClientError) {
        *self.execute_failure.lock() = Some(error);
    }

    /// Everything executed so far, in submission order.
    pub fn executed(&self) -> Vec<ExecutedCall> {
        self.executed.lock().clone()
    }
}

impl Default for InMemoryL2Chain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl L2ChainClient for InMemoryL2Chain {
    async fn call(
        &self,
        contract: &Felt,
        entrypoint: &str,
        calldata: &[Felt],
    ) -> Result<Vec<Felt>, ChainClientError> {
        if let Some(error) = self.call_failure.lock().clone() {
            return Err(error);
        }
        match (entrypoint, calldata) {
            ("balanceOf", [holder]) => {
                let raw = self
                    .balances
                    .read()
                    .get(&(*contract, *holder))
                    .copied()
                    .unwrap_or_default();
                let (low, high) = crate::algorithms::units::to_uint256_parts(raw);
                Ok(vec![
                    crate::algorithms::units::felt_from_u128(low),
                    crate::algorithms::units::felt_from_u128(high),
                ])
            }
            _ => Err(ChainClientError::Reverted(format!(
                "unknown entrypoint {entrypoint}"
            ))),
        }
    }

    async fn execute(
        &self,
        contract: &Felt,
        entrypoint: &str,
        calldata: &[Felt],
    ) -> Result<Felt, ChainClientError> {
        if let Some(error) = self.execute_failure.lock().clone() {
            return Err(error);
        }
        let nonce = self.next_nonce.fetch_add(1, Ordering::Relaxed);
        let tx_hash = Felt::from(0x1_0000_0000u64 + nonce);
        self.executed.lock().push(ExecutedCall {
            contract: *contract,
            entrypoint: entrypoint.to_string(),
            calldata: calldata.to_vec(),
            tx_hash,
        });
        Ok(tx_hash)
    }

    async fn transaction_status(&self, tx_hash: &Felt) -> Result<L2TransactionStatus, ChainClientError> {
        *self.status_queries.lock().entry(*tx_hash).or_insert(0) += 1;
        let mut statuses = self.statuses.lock();
        let status = match statuses.get_mut(tx_hash) {
            Some(sequence) => {
                let status = sequence.pop_front().unwrap_or(L2TransactionStatus::Received);
                if sequence.is_empty() {
                    sequence.push_back(status);
                }
                status
            }
            None => L2TransactionStatus::Received,
        };
        Ok(status)
    }
}
