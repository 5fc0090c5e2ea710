//! Data model shared by every session component.

use std::fmt;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An account or contract address. Addresses are not case-sensitive
/// identifiers, so equality and hashing ignore ASCII case.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub connected_account: Option<Address>,
    pub network: String,
    pub status: ConnectionStatus,
}

impl WalletSession {
    /// Forgets the account; the network identifier is kept.
    pub fn reset(&mut self) {
        self.connected_account = None;
        self.status = ConnectionStatus::Disconnected;
    }
}

/// Snapshot of the market. Always replaced as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketState {
    pub is_resolved: bool,
    pub outcome: bool,
    /// Display amount, already scaled by the chain's unit decimals
    pub total_pool: Decimal,
}

/// What the user typed into the bet form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BetIntent {
    pub amount: String,
    pub choice: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failure,
}

/// Confirmation record for an included transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub status: TxStatus,
    pub block_number: u64,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status == TxStatus::Success
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    Pending,
    Confirmed(TxHash),
    Reverted,
    Rejected,
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_address_ignores_case() {
        let lower = Address::new("0xabcdef0000000000000000000000000000000001");
        let upper = Address::new("0xABCDEF0000000000000000000000000000000001");
        assert_eq!(lower, upper);

        let set: HashSet<Address> = [lower, upper].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_market_state_default() {
        let state = MarketState::default();
        assert!(!state.is_resolved);
        assert!(!state.outcome);
        assert!(state.total_pool.is_zero());
    }
}
