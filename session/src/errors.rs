//! Error types for the market session.
//!
//! Boundary failures arrive as [`ProviderError`] and are folded into the
//! user-facing [`SessionError`] taxonomy by [`classify`].

use thiserror::Error;

/// Everything that can go wrong in a session. `Display` is the plain-language
/// text surfaced to the user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No wallet provider found. Please install a wallet extension.")]
    ProviderUnavailable,
    #[error("No accounts were granted by the wallet.")]
    NoAccountsGranted,
    #[error("Prediction market contract not found on the current network.")]
    ContractNotFound,
    #[error("Please enter a valid amount greater than zero.")]
    InvalidAmount,
    #[error("Only the oracle can perform this action.")]
    Unauthorized,
    #[error("Insufficient funds to complete the transaction.")]
    InsufficientFunds,
    #[error("Transaction would fail. The market may already be resolved.")]
    TransactionWouldFail,
    #[error("Transaction was rejected in the wallet.")]
    UserRejected,
    #[error("Transaction was reverted by the contract.")]
    TransactionReverted,
    #[error("Please connect your wallet first.")]
    NotConnected,
    #[error("Choice payload is malformed.")]
    InvalidPayload,
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),
    #[error("{0}")]
    Failed(String),
}

/// Error codes reported by the wallet provider or the node behind it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RpcErrorCode {
    InsufficientFunds,
    UnpredictableGasLimit,
    /// EIP-1193 4001
    ActionRejected,
    /// The call reverted with a reason string in `message`
    CallException,
    Other(i64),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub code: RpcErrorCode,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn rejected() -> Self {
        Self::new(RpcErrorCode::ActionRejected, "User rejected the request.")
    }
}

const USER_REJECTED_CODE: i64 = 4001;

/// Maps a boundary failure onto the session taxonomy. Checks run in priority
/// order; the first match wins.
pub fn classify(err: ProviderError) -> SessionError {
    let text = err.message.to_ascii_lowercase();

    if err.code == RpcErrorCode::InsufficientFunds || text.contains("insufficient funds") {
        SessionError::InsufficientFunds
    } else if err.code == RpcErrorCode::UnpredictableGasLimit
        || text.contains("cannot estimate gas")
    {
        SessionError::TransactionWouldFail
    } else if matches!(
        err.code,
        RpcErrorCode::ActionRejected | RpcErrorCode::Other(USER_REJECTED_CODE)
    ) || text.contains("user rejected")
    {
        SessionError::UserRejected
    } else if text.contains("unauthorized") || text.contains("only oracle") {
        SessionError::Unauthorized
    } else {
        SessionError::Failed(err.message)
    }
}
