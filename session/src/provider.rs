//! Boundary traits for the wallet provider and the market contract.
//!
//! Every method that talks to the network is `async` and is a suspension
//! point. The session is single-threaded, so futures are not required to be
//! `Send`.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::events::{ContractEvent, Handler, ListenerId, ProviderEvent, ProviderEventKind};
use crate::types::{Address, Receipt, TxHash};

/// Names of the contract surface the session relies on.
#[derive(Debug, PartialEq, Eq)]
pub struct ContractAbi {
    pub reads: &'static [&'static str],
    pub writes: &'static [&'static str],
    pub events: &'static [&'static str],
}

pub const MARKET_ABI: ContractAbi = ContractAbi {
    reads: &["isResolved", "outcome", "totalPool", "getOracleAddress"],
    writes: &["placeBet", "resolve"],
    events: &["BetPlaced", "Resolved"],
};

/// An injected wallet: account access, chain queries, and lifecycle events.
#[async_trait(?Send)]
pub trait WalletProvider {
    type Contract: MarketContract;

    /// Capability flag; false means the injected object is not a usable wallet.
    fn is_wallet(&self) -> bool;

    /// `eth_accounts`: already-authorized accounts, never prompts.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// `eth_requestAccounts`: may prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn chain_id(&self) -> Result<String, ProviderError>;

    /// Deployed bytecode at `address`; empty when nothing is deployed there.
    async fn get_code(&self, address: &Address) -> Result<Vec<u8>, ProviderError>;

    async fn gas_price(&self) -> Result<u128, ProviderError>;

    /// Contract handle whose writes are signed by `signer`.
    fn contract_at(
        &self,
        address: &Address,
        abi: &'static ContractAbi,
        signer: &Address,
    ) -> Self::Contract;

    fn on(&self, kind: ProviderEventKind, handler: Handler<ProviderEvent>) -> ListenerId;

    fn remove_listener(&self, id: ListenerId) -> bool;
}

/// Read, write and event surface of the deployed market.
#[async_trait(?Send)]
pub trait MarketContract {
    async fn is_resolved(&self) -> Result<bool, ProviderError>;

    async fn outcome(&self) -> Result<bool, ProviderError>;

    /// Pool total in smallest units.
    async fn total_pool(&self) -> Result<u128, ProviderError>;

    async fn oracle_address(&self) -> Result<Address, ProviderError>;

    /// Payable call; `value` is attached in smallest units.
    async fn place_bet(
        &self,
        payload: Vec<u8>,
        value: u128,
        gas_price: u128,
    ) -> Result<TxHash, ProviderError>;

    async fn resolve(&self, outcome: bool) -> Result<TxHash, ProviderError>;

    /// Resolves once the transaction is included. No timeout is applied.
    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<Receipt, ProviderError>;

    fn on(&self, event: ContractEvent, handler: Handler<ContractEvent>) -> ListenerId;

    fn remove_listener(&self, id: ListenerId) -> bool;
}
