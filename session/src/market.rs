//! Market state snapshots and their event-driven refresh.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::binding::ContractBinding;
use crate::errors::{classify, SessionError};
use crate::events::ContractEvent;
use crate::provider::MarketContract;
use crate::session::SessionEvent;
use crate::types::MarketState;
use crate::units;

/// Sole owner of [`MarketState`]. Every refresh replaces the snapshot whole,
/// and only after all of its reads succeeded.
#[derive(Debug)]
pub struct MarketSynchronizer {
    state: MarketState,
    decimals: u32,
}

impl MarketSynchronizer {
    pub fn new(decimals: u32) -> Self {
        Self {
            state: MarketState::default(),
            decimals,
        }
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    /// Reads the three market fields concurrently and swaps in the result.
    pub async fn refresh<C: MarketContract>(
        &mut self,
        binding: &ContractBinding<C>,
    ) -> Result<MarketState, SessionError> {
        let contract = binding.contract();
        let (resolved, outcome, pool) = tokio::join!(
            contract.is_resolved(),
            contract.outcome(),
            contract.total_pool()
        );

        let snapshot = MarketState {
            is_resolved: resolved.map_err(classify)?,
            outcome: outcome.map_err(classify)?,
            total_pool: units::to_display(pool.map_err(classify)?, self.decimals)?,
        };

        debug!(?snapshot, "market state refreshed");
        self.state = snapshot.clone();
        Ok(snapshot)
    }

    /// Re-reads only the pool; the other fields carry over from the last snapshot.
    pub async fn refresh_pool<C: MarketContract>(
        &mut self,
        binding: &ContractBinding<C>,
    ) -> Result<MarketState, SessionError> {
        let raw = binding.contract().total_pool().await.map_err(classify)?;
        let snapshot = MarketState {
            total_pool: units::to_display(raw, self.decimals)?,
            ..self.state.clone()
        };

        debug!(total_pool = %snapshot.total_pool, "pool refreshed");
        self.state = snapshot.clone();
        Ok(snapshot)
    }

    /// Forwards `BetPlaced` and `Resolved` into the session queue, tagged with
    /// the binding's epoch.
    pub(crate) fn subscribe<C: MarketContract>(
        &self,
        binding: &mut ContractBinding<C>,
        events: &UnboundedSender<SessionEvent>,
        epoch: u64,
    ) {
        for event in ContractEvent::ALL {
            let events = events.clone();
            let id = binding.contract.on(
                event,
                Box::new(move |ev: &ContractEvent| {
                    let _ = events.send(SessionEvent::Contract { event: *ev, epoch });
                }),
            );
            binding.subscriptions.push(id);
        }
    }

    pub fn unsubscribe<C: MarketContract>(&self, binding: &mut ContractBinding<C>) -> usize {
        let ids: Vec<_> = binding.subscriptions.drain(..).collect();
        for id in &ids {
            binding.contract.remove_listener(*id);
        }
        ids.len()
    }

    pub fn reset(&mut self) {
        self.state = MarketState::default();
    }
}
