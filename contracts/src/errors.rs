//! Contract error types for the binary prediction market.

use soroban_sdk::contracterror;

/// Contract error types
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    /// Contract has already been initialized
    AlreadyInitialized = 1,
    /// Oracle address not set - call initialize first
    OracleNotSet = 2,
    /// Only oracle can perform this action
    UnauthorizedOracle = 3,
    /// Bet amount must be greater than zero
    InvalidBetAmount = 4,
    /// Choice payload must be a 32-byte salt followed by one ABI word
    InvalidPayload = 5,
    /// Market outcome is already fixed
    MarketResolved = 6,
    /// User has insufficient balance
    InsufficientBalance = 7,
    /// User has already placed a bet on this market
    AlreadyBet = 8,
    /// Arithmetic overflow occurred
    Overflow = 9,
}
