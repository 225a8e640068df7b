//! # Contract Call Gateway
//!
//! Read-only invocation against either chain's contracts, returning
//! decimal-normalized values. Bridge-wide constants are cached per
//! (constant, symbol) for the life of this gateway instance: first
//! successful read wins, no invalidation, and constant reads never retry.

use crate::algorithms::units::{
    address_to_felt, felt_from_u128, from_chain_units, from_uint256_parts, to_uint256_parts,
};
use crate::domain::{BridgeError, BridgeResult};
use crate::ports::outbound::{EvmCallArg, EvmChainClient, L2ChainClient};
use bridge_types::{ChainAddress, DecimalAmount, EthAddress, Felt, U256};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Bridge-wide constants readable from the L1 bridge contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeConstant {
    /// Cap on a single deposit.
    MaxDeposit,
    /// Cap on aggregate bridge-held balance.
    MaxTotalBalance,
}

impl BridgeConstant {
    /// The contract method implementing this constant.
    pub fn method(&self) -> &'static str {
        match self {
            BridgeConstant::MaxDeposit => "maxDeposit",
            BridgeConstant::MaxTotalBalance => "maxTotalBalance",
        }
    }
}

/// Argument to a read-only call, chain-agnostic.
///
/// The gateway translates to each chain's encoding: on L2, addresses become
/// field elements and integers become split uint256 pairs.
#[derive(Debug, Clone, Copy)]
pub enum CallArg {
    /// An account or contract address.
    Address(ChainAddress),
    /// An unsigned integer.
    Uint(U256),
}

/// Read-only contract gateway over both chain clients.
pub struct ContractCallGateway {
    evm: Arc<dyn EvmChainClient>,
    l2: Arc<dyn L2ChainClient>,
    constants: RwLock<HashMap<(BridgeConstant, String), DecimalAmount>>,
}

impl ContractCallGateway {
    /// Create a gateway over the two chain clients.
    pub fn new(evm: Arc<dyn EvmChainClient>, l2: Arc<dyn L2ChainClient>) -> Self {
        Self {
            evm,
            l2,
            constants: RwLock::new(HashMap::new()),
        }
    }

    /// Balance-like read, decimal-normalized with the token's `decimals`.
    pub async fn call(
        &self,
        contract: &ChainAddress,
        method: &str,
        args: &[CallArg],
        decimals: u32,
    ) -> BridgeResult<DecimalAmount> {
        let raw = self.call_raw(contract, method, args).await?;
        Ok(from_chain_units(raw, decimals))
    }

    /// Balance-like read returning raw chain units.
    pub async fn call_raw(
        &self,
        contract: &ChainAddress,
        method: &str,
        args: &[CallArg],
    ) -> BridgeResult<U256> {
        match contract {
            ChainAddress::Evm(address) => {
                let args = evm_args(method, args)?;
                self.evm
                    .call(address, method, &args)
                    .await
                    .map_err(|cause| BridgeError::call(method, cause))
            }
            ChainAddress::L2(address) => {
                let calldata = l2_calldata(args);
                let words = self
                    .l2
                    .call(address, method, &calldata)
                    .await
                    .map_err(|cause| BridgeError::call(method, cause))?;
                Ok(join_result_words(&words))
            }
        }
    }

    /// Native-asset balance of an L1 account, decimal-normalized.
    pub async fn native_balance(
        &self,
        account: &EthAddress,
        decimals: u32,
    ) -> BridgeResult<DecimalAmount> {
        let raw = self
            .evm
            .native_balance(account)
            .await
            .map_err(|cause| BridgeError::call("getBalance", cause))?;
        Ok(from_chain_units(raw, decimals))
    }

    /// Bridge constant for a symbol, read once and cached for the life of
    /// this gateway. Errors surface immediately; nothing is cached on
    /// failure.
    pub async fn constant(
        &self,
        bridge: &ChainAddress,
        constant: BridgeConstant,
        symbol: &str,
        decimals: u32,
    ) -> BridgeResult<DecimalAmount> {
        let key = (constant, symbol.to_string());
        if let Some(cached) = self.constants.read().get(&key) {
            return Ok(cached.clone());
        }

        let value = self.call(bridge, constant.method(), &[], decimals).await?;
        debug!(method = constant.method(), symbol, %value, "bridge constant cached");

        // First successful read wins under a race.
        let mut cache = self.constants.write();
        Ok(cache.entry(key).or_insert(value).clone())
    }
}

fn evm_args(method: &str, args: &[CallArg]) -> BridgeResult<Vec<EvmCallArg>> {
    args.iter()
        .map(|arg| match arg {
            CallArg::Address(ChainAddress::Evm(address)) => Ok(EvmCallArg::Address(*address)),
            CallArg::Uint(value) => Ok(EvmCallArg::Uint(*value)),
            CallArg::Address(ChainAddress::L2(_)) => Err(BridgeError::WrongChainHandle {
                method: method.to_string(),
            }),
        })
        .collect()
}

fn l2_calldata(args: &[CallArg]) -> Vec<Felt> {
    let mut calldata = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            CallArg::Address(ChainAddress::L2(felt)) => calldata.push(*felt),
            CallArg::Address(ChainAddress::Evm(address)) => {
                calldata.push(address_to_felt(address));
            }
            CallArg::Uint(value) => {
                let (low, high) = to_uint256_parts(*value);
                calldata.push(felt_from_u128(low));
                calldata.push(felt_from_u128(high));
            }
        }
    }
    calldata
}

/// Join an L2 call result into a single integer: a (low, high) uint256
/// pair when two words are returned, a single word otherwise.
fn join_result_words(words: &[Felt]) -> U256 {
    match words {
        [low, high, ..] => from_uint256_parts(low.to_u256().low_u128(), high.to_u256().low_u128()),
        [single] => single.to_u256(),
        [] => U256::zero(),
    }
}
