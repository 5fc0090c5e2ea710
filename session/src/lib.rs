//! # Market Session
//!
//! Client-side session controller for a single binary prediction market.
//! Connects an injected wallet, binds the market contract to the connected
//! account, keeps a market snapshot current from reads and contract events,
//! and submits bets and oracle resolutions.
//!
//! ## Key Features
//! - Binding is rebuilt whenever its signer no longer matches the wallet
//! - Atomic market snapshots from concurrent reads
//! - Listener tables with explicit teardown for provider and contract events
//! - One error taxonomy with plain-language messages
//! - In-process devnet running the Soroban contract (`devnet` feature)

mod binding;
mod config;
#[cfg(feature = "devnet")]
pub mod devnet;
mod encoding;
mod errors;
mod events;
mod market;
mod notify;
mod provider;
mod session;
mod tx;
mod types;
mod units;
mod wallet;

#[cfg(all(test, feature = "devnet"))]
mod tests;

pub use binding::{bind, verify_deployed, ContractBinding};
pub use config::{SessionConfig, CONTRACT_ADDRESS, NOTIFICATION_TTL_MS, UNIT_DECIMALS};
pub use encoding::{decode_choice, encode_choice, PAYLOAD_LEN, SALT_LEN};
pub use errors::{classify, ProviderError, RpcErrorCode, SessionError};
pub use events::{
    ContractEvent, EventRegistry, Handler, ListenerId, ProviderEvent, ProviderEventKind,
};
pub use market::MarketSynchronizer;
pub use notify::{MessageKind, Notifier, UserMessage};
pub use provider::{ContractAbi, MarketContract, WalletProvider, MARKET_ABI};
pub use session::MarketSession;
pub use tx::{outcome_of, place_bet, resolve_market};
pub use types::{
    Address, BetIntent, ConnectionStatus, MarketState, Receipt, TxHash, TxOutcome, TxStatus,
    WalletSession,
};
pub use units::{parse_amount, to_display};
