//! # Core Domain Entities
//!
//! Entities shared by the transfer engine and its consumers.
//!
//! Addresses are tagged by chain encoding: the L1 chain uses 20-byte
//! hex addresses, the L2 chain uses field elements. [`ChainAddress`] carries
//! both behind one variant so orchestration code never branches on chain
//! role outside the contract gateways.

use crate::amount::DecimalAmount;
use crate::errors::AddressError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// Re-export U256 from primitive-types for use across the workspace.
pub use primitive_types::U256;

/// A 32-byte L1 transaction hash.
pub type TxHash = [u8; 32];

// =============================================================================
// ADDRESSES & ENCODINGS
// =============================================================================

/// A 20-byte L1 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EthAddress([u8; 20]);

impl EthAddress {
    /// Wrap raw address bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse a `0x`-prefixed (or bare) 40-digit hex address.
    pub fn from_hex(text: &str) -> Result<Self, AddressError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        if digits.len() != 40 {
            return Err(AddressError::InvalidL1(text.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| AddressError::InvalidL1(text.to_string()))?;
        Ok(Self(bytes))
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// The address as a big-endian 256-bit integer.
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// The L2 field prime: 2^251 + 17 * 2^192 + 1.
pub fn field_prime() -> U256 {
    U256::from_str_radix(
        "800000000000011000000000000000000000000000000000000000000000001",
        16,
    )
    .unwrap_or_else(|_| unreachable!("constant is valid hex"))
}

/// An L2 field element (address, calldata word, or transaction hash).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Felt(U256);

impl Felt {
    /// Wrap a value, checking it lies below the field prime.
    pub fn new(value: U256) -> Result<Self, AddressError> {
        if value >= field_prime() {
            return Err(AddressError::FeltOutOfRange(format!("{value:#x}")));
        }
        Ok(Self(value))
    }

    /// Parse a `0x`-prefixed (or bare) hex field element.
    pub fn from_hex(text: &str) -> Result<Self, AddressError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        if digits.is_empty() || digits.len() > 64 {
            return Err(AddressError::InvalidFelt(text.to_string()));
        }
        let value = U256::from_str_radix(digits, 16)
            .map_err(|_| AddressError::InvalidFelt(text.to_string()))?;
        Self::new(value)
    }

    /// The inner 256-bit value.
    pub fn to_u256(&self) -> U256 {
        self.0
    }
}

impl From<EthAddress> for Felt {
    /// A 160-bit address always fits below the 251-bit field prime.
    fn from(address: EthAddress) -> Self {
        Self(address.to_u256())
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Supported network identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    /// L1 mainnet.
    Mainnet,
    /// L1 Goerli testnet.
    Goerli,
    /// L2 mainnet.
    L2Mainnet,
    /// L2 testnet.
    L2Testnet,
}

impl ChainId {
    /// Which bridge side this network sits on.
    pub fn layer(&self) -> ChainLayer {
        match self {
            ChainId::Mainnet | ChainId::Goerli => ChainLayer::L1,
            ChainId::L2Mainnet | ChainId::L2Testnet => ChainLayer::L2,
        }
    }
}

/// The two sides of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainLayer {
    /// The base settlement chain.
    L1,
    /// The rollup chain.
    L2,
}

/// An account or contract address on either chain, tagged by encoding.
///
/// This is the polymorphic contract handle consumed by the call and
/// transaction gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainAddress {
    /// An L1 address.
    Evm(EthAddress),
    /// An L2 address.
    L2(Felt),
}

impl ChainAddress {
    /// The L1 address, if this is an L1 handle.
    pub fn as_evm(&self) -> Option<&EthAddress> {
        match self {
            ChainAddress::Evm(address) => Some(address),
            ChainAddress::L2(_) => None,
        }
    }

    /// The L2 address, if this is an L2 handle.
    pub fn as_l2(&self) -> Option<&Felt> {
        match self {
            ChainAddress::L2(felt) => Some(felt),
            ChainAddress::Evm(_) => None,
        }
    }
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainAddress::Evm(address) => address.fmt(f),
            ChainAddress::L2(felt) => felt.fmt(f),
        }
    }
}

/// A transaction reference on either chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxRef {
    /// An L1 transaction hash.
    Evm(TxHash),
    /// An L2 transaction hash (a field element).
    L2(Felt),
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxRef::Evm(hash) => write!(f, "0x{}", hex::encode(hash)),
            TxRef::L2(felt) => felt.fmt(f),
        }
    }
}

// =============================================================================
// TOKENS
// =============================================================================

/// A token's last known balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenBalance {
    /// Balance could not be determined; a designed degraded state, not an
    /// error.
    #[default]
    Unknown,
    /// Last successfully fetched balance, decimal-normalized.
    Known(DecimalAmount),
}

/// A bridgeable token on one side of the bridge.
///
/// Constructed once per supported symbol from static configuration; only
/// `balance` and `is_loading` change afterwards, and only through the token
/// table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Ticker symbol, unique per side.
    pub symbol: String,
    /// Human-readable name.
    pub display_name: String,
    /// Fractional digits implied by the on-chain integer encoding.
    pub decimals: u32,
    /// Which side of the bridge this entry describes.
    pub layer: ChainLayer,
    /// Bridge contract address per network.
    pub bridge_address: HashMap<ChainId, ChainAddress>,
    /// Token contract address per network; absent for a chain's native asset.
    pub token_address: HashMap<ChainId, ChainAddress>,
    /// Last known balance.
    pub balance: TokenBalance,
    /// Whether a balance fetch is in flight.
    pub is_loading: bool,
}

impl Token {
    /// Create a token with no addresses configured yet.
    pub fn new(symbol: &str, display_name: &str, decimals: u32, layer: ChainLayer) -> Self {
        Self {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            decimals,
            layer,
            bridge_address: HashMap::new(),
            token_address: HashMap::new(),
            balance: TokenBalance::Unknown,
            is_loading: false,
        }
    }

    /// Add a bridge contract address for a network.
    pub fn with_bridge_address(mut self, chain: ChainId, address: ChainAddress) -> Self {
        self.bridge_address.insert(chain, address);
        self
    }

    /// Add a token contract address for a network.
    pub fn with_token_address(mut self, chain: ChainId, address: ChainAddress) -> Self {
        self.token_address.insert(chain, address);
        self
    }

    /// Bridge contract address on the given network.
    pub fn bridge_address_on(&self, chain: ChainId) -> Option<&ChainAddress> {
        self.bridge_address.get(&chain)
    }

    /// Token contract address on the given network.
    pub fn token_address_on(&self, chain: ChainId) -> Option<&ChainAddress> {
        self.token_address.get(&chain)
    }

    /// Whether this token is the chain's native asset on the given network.
    ///
    /// Native assets have no token contract, only a bridge contract.
    pub fn is_native(&self, chain: ChainId) -> bool {
        !self.token_address.contains_key(&chain)
    }
}

// =============================================================================
// TRANSFERS
// =============================================================================

/// Direction of a bridge transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    /// Deposit: L1 to L2.
    L1ToL2,
    /// Withdrawal: L2 to L1.
    L2ToL1,
}

/// A user-initiated bridge transfer.
///
/// Immutable fields are fixed at creation; transaction references and the
/// confirming event are filled in as confirmations arrive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    /// Transfer direction.
    pub direction: TransferDirection,
    /// Sending account on the source chain.
    pub sender: ChainAddress,
    /// Receiving account on the destination chain.
    pub recipient: ChainAddress,
    /// Token symbol.
    pub symbol: String,
    /// Token display name.
    pub display_name: String,
    /// Human decimal amount.
    pub amount: DecimalAmount,
    /// Source-chain transaction reference.
    pub source_tx: Option<TxRef>,
    /// Destination-chain transaction reference; populated only on completion.
    pub destination_tx: Option<TxRef>,
    /// The chain event that confirmed completion.
    pub event: Option<BridgeEvent>,
}

/// Payload of a bridge `Deposit` event emitted on L1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    /// L1 transaction that emitted the event.
    pub tx_hash: TxHash,
    /// Depositing L1 account.
    pub sender: EthAddress,
    /// Receiving L2 account.
    pub l2_recipient: Felt,
    /// Deposited amount in chain units.
    pub amount: U256,
}

/// Payload of a bridge `Withdrawal` event emitted on L1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalEvent {
    /// L1 transaction that emitted the event.
    pub tx_hash: TxHash,
    /// Receiving L1 account.
    pub recipient: EthAddress,
    /// Withdrawn amount in chain units.
    pub amount: U256,
}

/// A confirming chain event, either side of the bridge pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeEvent {
    /// A deposit completed on the L1 side.
    Deposit(DepositEvent),
    /// A withdrawal completed on the L1 side.
    Withdrawal(WithdrawalEvent),
}

impl BridgeEvent {
    /// The L1 transaction that emitted the event.
    pub fn tx_hash(&self) -> TxHash {
        match self {
            BridgeEvent::Deposit(event) => event.tx_hash,
            BridgeEvent::Withdrawal(event) => event.tx_hash,
        }
    }
}

// =============================================================================
// L2 TRANSACTION STATUS
// =============================================================================

/// Lifecycle status of an L2 transaction, as reported by status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum L2TransactionStatus {
    /// Not yet seen by the sequencer.
    NotReceived,
    /// Accepted into the sequencer's queue.
    Received,
    /// Executing, not yet final on L2.
    Pending,
    /// Final on L2.
    AcceptedOnL2,
    /// Proven and accepted on L1.
    AcceptedOnL1,
    /// Rejected; terminal failure.
    Rejected,
}

impl L2TransactionStatus {
    fn rank(self) -> Option<u8> {
        match self {
            L2TransactionStatus::NotReceived => Some(0),
            L2TransactionStatus::Received => Some(1),
            L2TransactionStatus::Pending => Some(2),
            L2TransactionStatus::AcceptedOnL2 => Some(3),
            L2TransactionStatus::AcceptedOnL1 => Some(4),
            L2TransactionStatus::Rejected => None,
        }
    }

    /// Whether this status is at least as far along as `target`.
    ///
    /// `Rejected` is never "at least" anything; callers must check
    /// [`Self::is_rejected`] first.
    pub fn at_least(self, target: L2TransactionStatus) -> bool {
        match (self.rank(), target.rank()) {
            (Some(current), Some(required)) => current >= required,
            _ => false,
        }
    }

    /// Whether the transaction was rejected.
    pub fn is_rejected(self) -> bool {
        matches!(self, L2TransactionStatus::Rejected)
    }
}
