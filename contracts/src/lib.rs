#![no_std]
//! # Binary Prediction Market
//!
//! Soroban contract holding a single yes/no market.
//! Users stake virtual tokens together with a salted choice payload.
//!
//! ## Key Features
//! - Oracle-only, one-time resolution
//! - Checked arithmetic on balances and the pool
//! - `BetPlaced` / `Resolved` events for client-side refresh

mod contract;
mod errors;
mod types;

#[cfg(test)]
mod tests;

pub use contract::{PredictionMarket, PredictionMarketClient, INITIAL_MINT, PAYLOAD_LEN};
pub use errors::ContractError;
pub use types::{BetRecord, DataKey};
