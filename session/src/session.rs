//! The session object every user action goes through.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::binding::ContractBinding;
use crate::config::SessionConfig;
use crate::errors::SessionError;
use crate::events::{ContractEvent, ListenerId, ProviderEvent};
use crate::market::MarketSynchronizer;
use crate::notify::{Notifier, UserMessage};
use crate::provider::WalletProvider;
use crate::tx;
use crate::types::{Address, BetIntent, MarketState, Receipt, TxOutcome, WalletSession};
use crate::units;

/// Work queued by provider and contract listeners, drained by
/// [`MarketSession::process_events`] and [`MarketSession::next_events`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    Provider(ProviderEvent),
    Contract { event: ContractEvent, epoch: u64 },
}

/// Wallet connection, contract binding and market state for one user.
///
/// `provider` is `None` when no wallet is injected.
pub struct MarketSession<P: WalletProvider> {
    pub(crate) provider: Option<P>,
    pub(crate) config: SessionConfig,
    pub(crate) wallet: WalletSession,
    pub(crate) binding: Option<ContractBinding<P::Contract>>,
    pub(crate) market: MarketSynchronizer,
    pub(crate) notifier: Notifier,
    pub(crate) bet: BetIntent,
    pub(crate) last_tx: Option<TxOutcome>,
    pub(crate) error: Option<SessionError>,
    pub(crate) provider_listeners: Vec<ListenerId>,
    pub(crate) initialized: bool,
    /// Bumped whenever a binding is built or the session is reset
    pub(crate) epoch: u64,
    pub(crate) events_tx: UnboundedSender<SessionEvent>,
    pub(crate) events_rx: UnboundedReceiver<SessionEvent>,
}

impl<P: WalletProvider> MarketSession<P> {
    pub fn new(provider: Option<P>, config: SessionConfig) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            provider,
            market: MarketSynchronizer::new(config.unit_decimals),
            notifier: Notifier::new(config.notification_ttl()),
            config,
            wallet: WalletSession::default(),
            binding: None,
            bet: BetIntent::default(),
            last_tx: None,
            error: None,
            provider_listeners: Vec::new(),
            initialized: false,
            epoch: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn wallet(&self) -> &WalletSession {
        &self.wallet
    }

    pub fn account(&self) -> Option<&Address> {
        self.wallet.connected_account.as_ref()
    }

    pub fn binding(&self) -> Option<&ContractBinding<P::Contract>> {
        self.binding.as_ref()
    }

    pub fn is_oracle(&self) -> bool {
        self.binding.as_ref().is_some_and(|b| b.is_oracle)
    }

    pub fn market(&self) -> &MarketState {
        self.market.state()
    }

    pub fn bet_intent(&self) -> &BetIntent {
        &self.bet
    }

    pub fn last_tx(&self) -> Option<&TxOutcome> {
        self.last_tx.as_ref()
    }

    /// Persistent connection or binding failure, cleared by the next successful connect.
    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn notification(&self) -> Option<&UserMessage> {
        self.notifier.current()
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    pub fn set_bet_amount(&mut self, amount: impl Into<String>) {
        self.bet.amount = amount.into();
    }

    pub fn set_bet_choice(&mut self, choice: bool) {
        self.bet.choice = choice;
    }

    /// Explicit full refresh through a binding that matches the connected account.
    pub async fn refresh(&mut self) -> Result<MarketState, SessionError> {
        self.ensure_binding().await?;
        let binding = self.binding.as_ref().ok_or(SessionError::NotConnected)?;
        self.market.refresh(binding).await
    }

    /// Submits the current [`BetIntent`]. On success the pool is re-read and
    /// the intent's amount cleared.
    pub async fn place_bet(&mut self) -> Result<Receipt, SessionError> {
        let result = self.submit_bet().await;
        self.report(&result, "Bet placed successfully!");
        result
    }

    /// Resolves the market as the oracle, then re-reads the whole market.
    pub async fn resolve_market(&mut self, outcome: bool) -> Result<Receipt, SessionError> {
        let result = self.submit_resolution(outcome).await;
        self.report(&result, "Market resolved successfully!");
        result
    }

    async fn submit_bet(&mut self) -> Result<Receipt, SessionError> {
        let decimals = self.config.unit_decimals;
        // Reject bad input before a stale binding could trigger a rebuild
        units::parse_amount(&self.bet.amount, decimals)?;

        self.ensure_binding().await?;
        let provider = self.provider.as_ref().ok_or(SessionError::ProviderUnavailable)?;
        let binding = self.binding.as_ref().ok_or(SessionError::NotConnected)?;

        self.last_tx = Some(TxOutcome::Pending);
        let receipt =
            tx::place_bet(provider, binding, &self.bet.amount, self.bet.choice, decimals).await?;

        if let Err(err) = self.market.refresh_pool(binding).await {
            warn!(%err, "pool refresh after bet failed");
        }
        self.bet.amount.clear();
        Ok(receipt)
    }

    async fn submit_resolution(&mut self, outcome: bool) -> Result<Receipt, SessionError> {
        self.ensure_binding().await?;
        let binding = self.binding.as_ref().ok_or(SessionError::NotConnected)?;
        if !binding.is_oracle {
            return Err(SessionError::Unauthorized);
        }

        self.last_tx = Some(TxOutcome::Pending);
        let receipt = tx::resolve_market(binding, outcome).await?;

        if let Err(err) = self.market.refresh(binding).await {
            warn!(%err, "market refresh after resolution failed");
        }
        Ok(receipt)
    }

    fn report(&mut self, result: &Result<Receipt, SessionError>, success: &str) {
        if self.last_tx == Some(TxOutcome::Pending) {
            self.last_tx = Some(tx::outcome_of(result));
        }
        match result {
            Ok(_) => self.notifier.success(success),
            Err(err) => {
                warn!(%err, "action failed");
                self.notifier.error(err.to_string());
            }
        }
    }

    /// Rebuilds the binding unless its signer is the connected account.
    pub(crate) async fn ensure_binding(&mut self) -> Result<(), SessionError> {
        let account = self
            .wallet
            .connected_account
            .clone()
            .ok_or(SessionError::NotConnected)?;

        let current = self
            .binding
            .as_ref()
            .is_some_and(|b| b.is_signed_by(&account));
        if !current {
            info!(%account, "binding does not match connected account, rebuilding");
            self.connect_account(account).await?;
        }
        Ok(())
    }

    /// Handles everything listeners have queued so far. Returns how many
    /// events were taken off the queue.
    pub async fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            handled += 1;
            self.handle_event(event).await;
        }
        handled
    }

    /// Waits until a listener queues an event, then handles it together with
    /// anything queued behind it. Returns how many events were handled.
    pub async fn next_events(&mut self) -> usize {
        // The session keeps a sender, so the queue never closes
        let Some(event) = self.events_rx.recv().await else {
            return 0;
        };
        self.handle_event(event).await;
        1 + self.process_events().await
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Provider(event) => self.handle_provider_event(event).await,
            SessionEvent::Contract { event, epoch } => {
                self.handle_contract_event(event, epoch).await
            }
        }
    }

    async fn handle_contract_event(&mut self, event: ContractEvent, epoch: u64) {
        if epoch != self.epoch {
            debug!(event = event.name(), epoch, "dropping event from a torn-down binding");
            return;
        }

        debug!(event = event.name(), "contract event, refreshing market");
        if let Err(err) = self.refresh().await {
            warn!(%err, event = event.name(), "event-driven refresh failed");
        }
    }
}

impl<P: WalletProvider> Drop for MarketSession<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
