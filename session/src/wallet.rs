//! Wallet connection lifecycle: initial detection, explicit connect, and the
//! reactions to provider-originated events.

use tracing::{debug, info, warn};

use crate::binding;
use crate::errors::{classify, SessionError};
use crate::events::{ProviderEvent, ProviderEventKind};
use crate::provider::WalletProvider;
use crate::session::{MarketSession, SessionEvent};
use crate::types::{Address, BetIntent, ConnectionStatus, WalletSession};

impl<P: WalletProvider> MarketSession<P> {
    /// Registers the provider listeners and reconnects an account the user
    /// already authorized, without prompting. Later calls are no-ops until
    /// the session is reset.
    pub async fn initialize(&mut self) -> Result<(), SessionError> {
        if self.initialized {
            debug!("session already initialized");
            return Ok(());
        }

        if !self.has_wallet() {
            return Err(self.fail_session(SessionError::ProviderUnavailable));
        }
        self.register_provider_listeners();
        self.initialized = true;

        let Some(provider) = self.provider.as_ref() else {
            return Err(self.fail_session(SessionError::ProviderUnavailable));
        };
        let network = provider.chain_id().await;
        let accounts = provider.accounts().await;

        match network {
            Ok(chain_id) => self.wallet.network = chain_id,
            Err(err) => warn!(%err, "could not read network identifier"),
        }

        let accounts = match accounts {
            Ok(accounts) => accounts,
            Err(err) => return Err(self.fail_session(classify(err))),
        };

        match accounts.into_iter().next() {
            Some(account) => self.connect_account(account).await.map(|_| ()),
            None => {
                info!("no previously authorized account");
                Ok(())
            }
        }
    }

    /// Asks the wallet for account access (may prompt) and connects the
    /// primary account.
    pub async fn connect(&mut self) -> Result<Address, SessionError> {
        if !self.has_wallet() {
            return Err(self.fail_session(SessionError::ProviderUnavailable));
        }
        self.register_provider_listeners();

        let Some(provider) = self.provider.as_ref() else {
            return Err(self.fail_session(SessionError::ProviderUnavailable));
        };
        self.wallet.status = ConnectionStatus::Connecting;
        let granted = provider.request_accounts().await;

        let accounts = match granted {
            Ok(accounts) => accounts,
            Err(err) => return Err(self.fail_session(classify(err))),
        };
        let Some(primary) = accounts.into_iter().next() else {
            return Err(self.fail_session(SessionError::NoAccountsGranted));
        };

        self.connect_account(primary).await
    }

    /// Connect flow for a known account: drops the old binding, binds the
    /// contract for `account`, subscribes to its events and reads the market.
    pub(crate) async fn connect_account(
        &mut self,
        account: Address,
    ) -> Result<Address, SessionError> {
        self.teardown_binding();
        self.wallet.connected_account = Some(account.clone());
        self.wallet.status = ConnectionStatus::Connecting;

        let Some(provider) = self.provider.as_ref() else {
            return Err(self.fail_session(SessionError::ProviderUnavailable));
        };
        let mut binding = match binding::bind(provider, &self.config, &account).await {
            Ok(binding) => binding,
            Err(err) => return Err(self.fail_session(err)),
        };

        self.epoch += 1;
        self.market.subscribe(&mut binding, &self.events_tx, self.epoch);

        if let Err(err) = self.market.refresh(&binding).await {
            warn!(%err, "initial market read failed");
            self.notifier.error(err.to_string());
        }

        info!(%account, is_oracle = binding.is_oracle, "wallet connected");
        self.binding = Some(binding);
        self.wallet.status = ConnectionStatus::Connected;
        self.error = None;
        Ok(account)
    }

    pub(crate) async fn handle_provider_event(&mut self, event: ProviderEvent) {
        debug!(event = event.kind().name(), "provider event");
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                Some(account) => {
                    if let Err(err) = self.connect_account(account).await {
                        warn!(%err, "reconnect after account switch failed");
                    }
                }
                None => {
                    info!("wallet exposes no accounts, disconnecting");
                    self.teardown_binding();
                    self.wallet.reset();
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                info!(%chain_id, "network changed, reloading session");
                if let Err(err) = self.reload().await {
                    warn!(%err, "reload after network change failed");
                }
            }
            ProviderEvent::Connect { chain_id } => {
                self.wallet.network = chain_id;
                if self.binding.is_some() && self.wallet.connected_account.is_some() {
                    self.wallet.status = ConnectionStatus::Connected;
                }
            }
            ProviderEvent::Disconnect { message } => {
                warn!(%message, "provider disconnected");
                self.teardown_binding();
                self.wallet.reset();
            }
        }
    }

    /// Tears everything down: listeners, subscriptions, queued events, and all
    /// session state. Safe to call repeatedly.
    pub fn reset_session(&mut self) {
        self.teardown_binding();
        self.remove_provider_listeners();
        while self.events_rx.try_recv().is_ok() {}

        self.wallet = WalletSession::default();
        self.market.reset();
        self.notifier.clear();
        self.bet = BetIntent::default();
        self.last_tx = None;
        self.error = None;
        self.initialized = false;
        self.epoch += 1;
    }

    /// Rebuilds the session from the chain, as after a network switch.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        self.reset_session();
        self.initialize().await
    }

    /// Deregisters every listener this session holds on the provider and contract.
    pub fn shutdown(&mut self) {
        self.teardown_binding();
        self.remove_provider_listeners();
    }

    fn has_wallet(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.is_wallet())
    }

    fn register_provider_listeners(&mut self) {
        if !self.provider_listeners.is_empty() {
            return;
        }
        let Some(provider) = self.provider.as_ref() else {
            return;
        };

        for kind in ProviderEventKind::ALL {
            let events = self.events_tx.clone();
            let id = provider.on(
                kind,
                Box::new(move |event: &ProviderEvent| {
                    let _ = events.send(SessionEvent::Provider(event.clone()));
                }),
            );
            self.provider_listeners.push(id);
        }
        debug!(count = self.provider_listeners.len(), "provider listeners registered");
    }

    fn remove_provider_listeners(&mut self) {
        let ids: Vec<_> = self.provider_listeners.drain(..).collect();
        if let Some(provider) = self.provider.as_ref() {
            for id in ids {
                provider.remove_listener(id);
            }
        }
    }

    pub(crate) fn teardown_binding(&mut self) {
        if let Some(mut binding) = self.binding.take() {
            let removed = self.market.unsubscribe(&mut binding);
            debug!(signer = %binding.signer, removed, "binding torn down");
        }
    }

    /// Records a connection-level failure and leaves the session disconnected.
    fn fail_session(&mut self, err: SessionError) -> SessionError {
        warn!(%err, "session failure");
        self.teardown_binding();
        self.wallet.reset();
        self.error = Some(err.clone());
        err
    }
}
