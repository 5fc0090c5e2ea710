//! In-process development chain.
//!
//! Runs the [`prediction_market`] contract inside a Soroban test environment
//! and exposes it through the [`WalletProvider`] and [`MarketContract`]
//! traits, so a [`MarketSession`](crate::MarketSession) can be driven end to
//! end without a node or a browser wallet. Wallet-side behaviour (prompts,
//! rejections, account and network switches) is scripted through the
//! methods on [`Devnet`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use prediction_market::{ContractError, PredictionMarket, PredictionMarketClient};
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address as ChainAddress, Bytes, Env};
use tracing::debug;

use crate::config::{SessionConfig, CONTRACT_ADDRESS, NOTIFICATION_TTL_MS};
use crate::encoding::encode_choice;
use crate::errors::{ProviderError, RpcErrorCode};
use crate::events::{
    ContractEvent, EventRegistry, Handler, ListenerId, ProviderEvent, ProviderEventKind,
};
use crate::provider::{ContractAbi, MarketContract, WalletProvider};
use crate::types::{Address, Receipt, TxHash, TxStatus};

/// Hardhat's default chain id
pub const DEVNET_CHAIN_ID: &str = "0x7a69";

/// Contract amounts use 7 decimal places
pub const DEVNET_DECIMALS: u32 = 7;

pub const DEVNET_GAS_PRICE: u128 = 100;

const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6d];

struct Account {
    label: Address,
    chain: ChainAddress,
}

struct DevnetState {
    env: Env,
    contract_id: ChainAddress,
    contract_address: Address,
    deployed_chain: String,
    accounts: Vec<Account>,
    oracle: usize,
    chain_id: RefCell<String>,
    installed: Cell<bool>,
    authorized: Cell<bool>,
    selected: Cell<usize>,
    reject_next: Cell<bool>,
    grant_none: Cell<bool>,
    preflight: Cell<bool>,
    gas_price: Cell<u128>,
    failing_read: RefCell<Option<String>>,
    block: Cell<u64>,
    requests: RefCell<Vec<String>>,
    receipts: RefCell<HashMap<TxHash, Receipt>>,
    provider_events: EventRegistry<ProviderEventKind, ProviderEvent>,
    contract_events: EventRegistry<ContractEvent, ContractEvent>,
}

/// Handle to the development chain. Clones share the same chain.
#[derive(Clone)]
pub struct Devnet {
    state: Rc<DevnetState>,
}

/// Contract handle returned by [`Devnet::contract_at`].
pub struct DevnetContract {
    state: Rc<DevnetState>,
    address: Address,
    signer: Address,
}

fn account_label(index: usize) -> Address {
    Address::new(format!("0x{:040x}", 0xfacade_u64 + index as u64))
}

/// Contracts report addresses in upper case while the wallet hands out lower case.
fn chain_rendition(address: &Address) -> Address {
    let hex = address.as_str().trim_start_matches("0x");
    Address::new(format!("0x{}", hex.to_uppercase()))
}

impl Devnet {
    /// Deploys the market with `account_count` funded wallet accounts; the
    /// account at `oracle` becomes the market oracle.
    pub fn new(account_count: usize, oracle: usize) -> Self {
        let account_count = account_count.max(1);
        let oracle = oracle.min(account_count - 1);

        let env = Env::default();
        env.mock_all_auths();

        let contract_id = env.register(PredictionMarket, ());
        let client = PredictionMarketClient::new(&env, &contract_id);

        let admin = ChainAddress::generate(&env);
        let accounts: Vec<Account> = (0..account_count)
            .map(|i| {
                let chain = ChainAddress::generate(&env);
                client.mint_initial(&chain);
                Account {
                    label: account_label(i),
                    chain,
                }
            })
            .collect();
        client.initialize(&admin, &accounts[oracle].chain);

        debug!(account_count, oracle, "devnet deployed");

        Self {
            state: Rc::new(DevnetState {
                env,
                contract_id,
                contract_address: Address::new(CONTRACT_ADDRESS.to_ascii_lowercase()),
                deployed_chain: DEVNET_CHAIN_ID.to_string(),
                accounts,
                oracle,
                chain_id: RefCell::new(DEVNET_CHAIN_ID.to_string()),
                installed: Cell::new(true),
                authorized: Cell::new(false),
                selected: Cell::new(0),
                reject_next: Cell::new(false),
                grant_none: Cell::new(false),
                preflight: Cell::new(true),
                gas_price: Cell::new(DEVNET_GAS_PRICE),
                failing_read: RefCell::new(None),
                block: Cell::new(0),
                requests: RefCell::new(Vec::new()),
                receipts: RefCell::new(HashMap::new()),
                provider_events: EventRegistry::new(),
                contract_events: EventRegistry::new(),
            }),
        }
    }

    /// Configuration pointing a session at this chain.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            contract_address: Address::new(CONTRACT_ADDRESS),
            unit_decimals: DEVNET_DECIMALS,
            notification_ttl_ms: NOTIFICATION_TTL_MS,
        }
    }

    pub fn account(&self, index: usize) -> Option<Address> {
        self.state.accounts.get(index).map(|a| a.label.clone())
    }

    pub fn oracle_account(&self) -> Address {
        self.state.accounts[self.state.oracle].label.clone()
    }

    pub fn contract_address(&self) -> Address {
        self.state.contract_address.clone()
    }

    // wallet controls

    /// Marks the injected object as a usable wallet or not.
    pub fn set_installed(&self, installed: bool) {
        self.state.installed.set(installed);
    }

    /// The next prompt or signature request is declined by the user.
    pub fn reject_next_request(&self) {
        self.state.reject_next.set(true);
    }

    /// Account requests succeed but share no accounts.
    pub fn grant_no_accounts(&self, grant_none: bool) {
        self.state.grant_none.set(grant_none);
    }

    /// Lets the dapp see the selected account without a prompt.
    pub fn authorize(&self) {
        self.state.authorized.set(true);
    }

    /// Switches the wallet's active account, notifying listeners when the dapp
    /// is authorized.
    pub fn select_account(&self, index: usize) {
        if index >= self.state.accounts.len() {
            return;
        }
        self.state.selected.set(index);
        if self.state.authorized.get() {
            let accounts = vec![self.state.accounts[index].label.clone()];
            self.emit_provider(ProviderEvent::AccountsChanged(accounts));
        }
    }

    /// Locks the wallet; listeners see an empty account list.
    pub fn lock(&self) {
        self.state.authorized.set(false);
        self.emit_provider(ProviderEvent::AccountsChanged(Vec::new()));
    }

    pub fn switch_chain(&self, chain_id: &str) {
        *self.state.chain_id.borrow_mut() = chain_id.to_string();
        self.emit_provider(ProviderEvent::ChainChanged(chain_id.to_string()));
    }

    pub fn disconnect(&self) {
        self.emit_provider(ProviderEvent::Disconnect {
            message: "Disconnected from chain".into(),
        });
    }

    pub fn reconnect(&self) {
        let chain_id = self.state.chain_id.borrow().clone();
        self.emit_provider(ProviderEvent::Connect { chain_id });
    }

    /// With preflight off, failing calls are mined and produce failed receipts
    /// instead of being refused up front.
    pub fn set_preflight(&self, enabled: bool) {
        self.state.preflight.set(enabled);
    }

    pub fn set_gas_price(&self, gas_price: u128) {
        self.state.gas_price.set(gas_price);
    }

    /// The next read of `method` (e.g. `"outcome"`) fails at the node.
    pub fn fail_next_read(&self, method: &str) {
        *self.state.failing_read.borrow_mut() = Some(method.to_string());
    }

    // other actors

    /// Bet placed by `account` outside any session.
    pub fn external_bet(
        &self,
        account: usize,
        amount: i128,
        choice: bool,
    ) -> Result<TxHash, ProviderError> {
        let account = self.state.account_at(account)?;
        self.state.submit_bet(account, &encode_choice(choice), amount)
    }

    /// Resolution signed by the oracle outside any session.
    pub fn external_resolve(&self, outcome: bool) -> Result<TxHash, ProviderError> {
        let oracle = &self.state.accounts[self.state.oracle];
        self.state.submit_resolve(oracle, outcome)
    }

    // inspection

    pub fn requests(&self) -> Vec<String> {
        self.state.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.borrow().len()
    }

    pub fn provider_listener_count(&self) -> usize {
        self.state.provider_events.len()
    }

    pub fn contract_listener_count(&self) -> usize {
        self.state.contract_events.len()
    }

    pub fn balance(&self, account: usize) -> Option<i128> {
        let account = self.state.accounts.get(account)?;
        Some(self.state.client().balance(&account.chain))
    }

    pub fn total_pool_raw(&self) -> i128 {
        self.state.client().total_pool()
    }

    /// Payload stored with `account`'s bet, exactly as submitted.
    pub fn bet_payload(&self, account: usize) -> Option<Vec<u8>> {
        let account = self.state.accounts.get(account)?;
        let record = self.state.client().get_bet(&account.chain)?;
        Some(record.payload.iter().collect())
    }

    fn emit_provider(&self, event: ProviderEvent) {
        self.state.provider_events.emit(event.kind(), &event);
    }
}

impl DevnetState {
    fn client(&self) -> PredictionMarketClient<'_> {
        PredictionMarketClient::new(&self.env, &self.contract_id)
    }

    fn log(&self, request: &str) {
        self.requests.borrow_mut().push(request.to_string());
    }

    fn on_deployed_chain(&self, address: &Address) -> bool {
        *address == self.contract_address && *self.chain_id.borrow() == self.deployed_chain
    }

    fn account_at(&self, index: usize) -> Result<&Account, ProviderError> {
        self.accounts
            .get(index)
            .ok_or_else(|| ProviderError::new(RpcErrorCode::Other(-32602), "unknown account"))
    }

    fn account_for(&self, label: &Address) -> Result<&Account, ProviderError> {
        self.accounts
            .iter()
            .find(|a| a.label == *label)
            .ok_or_else(|| ProviderError::new(RpcErrorCode::Other(-32602), "unknown account"))
    }

    fn label_for(&self, chain: &ChainAddress) -> Option<&Address> {
        self.accounts
            .iter()
            .find(|a| a.chain == *chain)
            .map(|a| &a.label)
    }

    fn take_rejection(&self) -> Result<(), ProviderError> {
        if self.reject_next.take() {
            return Err(ProviderError::rejected());
        }
        Ok(())
    }

    fn mine(&self, status: TxStatus) -> TxHash {
        let block = self.block.get() + 1;
        self.block.set(block);

        let tx_hash = TxHash(format!("0x{block:064x}"));
        self.receipts.borrow_mut().insert(
            tx_hash.clone(),
            Receipt {
                tx_hash: tx_hash.clone(),
                status,
                block_number: block,
            },
        );
        tx_hash
    }

    /// Translates a contract failure into what a wallet reports for it.
    fn failed_call(&self, err: ContractError) -> Result<TxHash, ProviderError> {
        if !self.preflight.get() {
            return Ok(self.mine(TxStatus::Failure));
        }

        Err(match err {
            ContractError::InsufficientBalance => ProviderError::new(
                RpcErrorCode::InsufficientFunds,
                "insufficient funds for gas * price + value",
            ),
            ContractError::UnauthorizedOracle => ProviderError::new(
                RpcErrorCode::CallException,
                "execution reverted: Unauthorized: caller is not the oracle",
            ),
            other => ProviderError::new(
                RpcErrorCode::UnpredictableGasLimit,
                format!("cannot estimate gas; transaction may fail ({other:?})"),
            ),
        })
    }

    fn host_failure() -> ProviderError {
        ProviderError::new(RpcErrorCode::Other(-32603), "Internal JSON-RPC error.")
    }

    fn submit_bet(
        &self,
        account: &Account,
        payload: &[u8],
        amount: i128,
    ) -> Result<TxHash, ProviderError> {
        let payload = Bytes::from_slice(&self.env, payload);
        match self.client().try_place_bet(&account.chain, &payload, &amount) {
            Ok(_) => {
                let tx = self.mine(TxStatus::Success);
                self.contract_events
                    .emit(ContractEvent::BetPlaced, &ContractEvent::BetPlaced);
                Ok(tx)
            }
            Err(Ok(err)) => self.failed_call(err),
            Err(Err(_)) => Err(Self::host_failure()),
        }
    }

    fn submit_resolve(&self, account: &Account, outcome: bool) -> Result<TxHash, ProviderError> {
        match self.client().try_resolve(&account.chain, &outcome) {
            Ok(_) => {
                let tx = self.mine(TxStatus::Success);
                self.contract_events
                    .emit(ContractEvent::Resolved, &ContractEvent::Resolved);
                Ok(tx)
            }
            Err(Ok(err)) => self.failed_call(err),
            Err(Err(_)) => Err(Self::host_failure()),
        }
    }
}

#[async_trait(?Send)]
impl WalletProvider for Devnet {
    type Contract = DevnetContract;

    fn is_wallet(&self) -> bool {
        self.state.installed.get()
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.state.log("eth_accounts");
        if !self.state.authorized.get() {
            return Ok(Vec::new());
        }
        Ok(vec![self.state.accounts[self.state.selected.get()].label.clone()])
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.state.log("eth_requestAccounts");
        self.state.take_rejection()?;
        if self.state.grant_none.get() {
            return Ok(Vec::new());
        }
        self.state.authorized.set(true);
        Ok(vec![self.state.accounts[self.state.selected.get()].label.clone()])
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        self.state.log("eth_chainId");
        Ok(self.state.chain_id.borrow().clone())
    }

    async fn get_code(&self, address: &Address) -> Result<Vec<u8>, ProviderError> {
        self.state.log("eth_getCode");
        if self.state.on_deployed_chain(address) {
            Ok(WASM_MAGIC.to_vec())
        } else {
            Ok(Vec::new())
        }
    }

    async fn gas_price(&self) -> Result<u128, ProviderError> {
        self.state.log("eth_gasPrice");
        Ok(self.state.gas_price.get())
    }

    fn contract_at(
        &self,
        address: &Address,
        _abi: &'static ContractAbi,
        signer: &Address,
    ) -> DevnetContract {
        DevnetContract {
            state: Rc::clone(&self.state),
            address: address.clone(),
            signer: signer.clone(),
        }
    }

    fn on(&self, kind: ProviderEventKind, handler: Handler<ProviderEvent>) -> ListenerId {
        self.state.provider_events.on(kind, handler)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.provider_events.remove_listener(id)
    }
}

impl DevnetContract {
    fn call(&self, method: &str) -> Result<(), ProviderError> {
        self.state.log(&format!("eth_call:{method}"));
        if !self.state.on_deployed_chain(&self.address) {
            return Err(ProviderError::new(
                RpcErrorCode::CallException,
                "call to an address without contract code",
            ));
        }
        let failing = self.state.failing_read.borrow().as_deref() == Some(method);
        if failing {
            self.state.failing_read.borrow_mut().take();
            return Err(DevnetState::host_failure());
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl MarketContract for DevnetContract {
    async fn is_resolved(&self) -> Result<bool, ProviderError> {
        self.call("isResolved")?;
        Ok(self.state.client().is_resolved())
    }

    async fn outcome(&self) -> Result<bool, ProviderError> {
        self.call("outcome")?;
        Ok(self.state.client().outcome())
    }

    async fn total_pool(&self) -> Result<u128, ProviderError> {
        self.call("totalPool")?;
        let raw = self.state.client().total_pool();
        u128::try_from(raw).map_err(|_| DevnetState::host_failure())
    }

    async fn oracle_address(&self) -> Result<Address, ProviderError> {
        self.call("getOracleAddress")?;
        match self.state.client().try_get_oracle_address() {
            Ok(Ok(oracle)) => self
                .state
                .label_for(&oracle)
                .map(chain_rendition)
                .ok_or_else(DevnetState::host_failure),
            _ => Err(ProviderError::new(
                RpcErrorCode::CallException,
                "execution reverted: oracle not set",
            )),
        }
    }

    async fn place_bet(
        &self,
        payload: Vec<u8>,
        value: u128,
        _gas_price: u128,
    ) -> Result<TxHash, ProviderError> {
        self.state.log("eth_sendTransaction:placeBet");
        self.state.take_rejection()?;

        let account = self.state.account_for(&self.signer)?;
        let amount = i128::try_from(value).map_err(|_| {
            ProviderError::new(RpcErrorCode::InsufficientFunds, "insufficient funds for value")
        })?;
        self.state.submit_bet(account, &payload, amount)
    }

    async fn resolve(&self, outcome: bool) -> Result<TxHash, ProviderError> {
        self.state.log("eth_sendTransaction:resolve");
        self.state.take_rejection()?;

        let account = self.state.account_for(&self.signer)?;
        self.state.submit_resolve(account, outcome)
    }

    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<Receipt, ProviderError> {
        self.state.log("eth_getTransactionReceipt");
        self.state
            .receipts
            .borrow()
            .get(tx)
            .cloned()
            .ok_or_else(|| ProviderError::new(RpcErrorCode::Other(-32000), "unknown transaction"))
    }

    fn on(&self, event: ContractEvent, handler: Handler<ContractEvent>) -> ListenerId {
        self.state.contract_events.on(event, handler)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.contract_events.remove_listener(id)
    }
}
