//! Contract existence check and signer-scoped binding.

use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::errors::{classify, SessionError};
use crate::events::ListenerId;
use crate::provider::{ContractAbi, MarketContract, WalletProvider, MARKET_ABI};
use crate::types::Address;

/// A contract handle coupled to the account that signs through it.
///
/// Only valid while `signer` is the session's connected account.
pub struct ContractBinding<C> {
    pub contract_address: Address,
    pub abi: &'static ContractAbi,
    pub signer: Address,
    pub oracle: Address,
    pub is_oracle: bool,
    pub(crate) contract: C,
    pub(crate) subscriptions: Vec<ListenerId>,
}

impl<C> ContractBinding<C> {
    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub fn is_signed_by(&self, account: &Address) -> bool {
        self.signer == *account
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

/// True when the current network has code at `address`.
pub async fn verify_deployed<P: WalletProvider>(
    provider: &P,
    address: &Address,
) -> Result<bool, SessionError> {
    let code = provider.get_code(address).await.map_err(classify)?;
    debug!(%address, code_len = code.len(), "checked contract bytecode");
    Ok(!code.is_empty())
}

/// Verifies the market contract and binds it to `account`.
pub async fn bind<P: WalletProvider>(
    provider: &P,
    config: &SessionConfig,
    account: &Address,
) -> Result<ContractBinding<P::Contract>, SessionError> {
    let address = &config.contract_address;

    if !verify_deployed(provider, address).await? {
        warn!(%address, "no contract code at configured address");
        return Err(SessionError::ContractNotFound);
    }

    let contract = provider.contract_at(address, &MARKET_ABI, account);
    let oracle = contract.oracle_address().await.map_err(classify)?;
    let is_oracle = oracle == *account;

    info!(%account, %oracle, is_oracle, "bound market contract");

    Ok(ContractBinding {
        contract_address: address.clone(),
        abi: &MARKET_ABI,
        signer: account.clone(),
        oracle,
        is_oracle,
        contract,
        subscriptions: Vec::new(),
    })
}
