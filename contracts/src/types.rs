//! Type definitions for the binary prediction market.

use soroban_sdk::{contracttype, Address, Bytes};

/// Storage keys for contract data
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Oracle,
    Resolved,
    Outcome,
    TotalPool,
    Balance(Address),
    Bet(Address),
}

/// A stake together with the salted choice it was placed with
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct BetRecord {
    pub amount: i128,
    pub payload: Bytes, // salt (32) ++ abi-encoded bool (32)
}
