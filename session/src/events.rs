//! Event kinds and the listener registration table.
//!
//! Handlers are invoked synchronously, in registration order, by whoever
//! calls [`EventRegistry::emit`]. Every registration returns a
//! [`ListenerId`] that must be handed back to `remove_listener` at teardown.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::types::Address;

pub type Handler<E> = Box<dyn Fn(&E)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Lifecycle notifications raised by the wallet provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(String),
    Connect { chain_id: String },
    Disconnect { message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
    Connect,
    Disconnect,
}

impl ProviderEventKind {
    pub const ALL: [ProviderEventKind; 4] = [
        ProviderEventKind::AccountsChanged,
        ProviderEventKind::ChainChanged,
        ProviderEventKind::Connect,
        ProviderEventKind::Disconnect,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProviderEventKind::AccountsChanged => "accountsChanged",
            ProviderEventKind::ChainChanged => "chainChanged",
            ProviderEventKind::Connect => "connect",
            ProviderEventKind::Disconnect => "disconnect",
        }
    }
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            ProviderEvent::ChainChanged(_) => ProviderEventKind::ChainChanged,
            ProviderEvent::Connect { .. } => ProviderEventKind::Connect,
            ProviderEvent::Disconnect { .. } => ProviderEventKind::Disconnect,
        }
    }
}

/// Events emitted by the market contract. Only the fact that something
/// changed is consumed, so they carry no payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractEvent {
    BetPlaced,
    Resolved,
}

impl ContractEvent {
    pub const ALL: [ContractEvent; 2] = [ContractEvent::BetPlaced, ContractEvent::Resolved];

    pub fn name(self) -> &'static str {
        match self {
            ContractEvent::BetPlaced => "BetPlaced",
            ContractEvent::Resolved => "Resolved",
        }
    }
}

struct Listener<K, E> {
    id: ListenerId,
    kind: K,
    handler: Rc<dyn Fn(&E)>,
}

pub struct EventRegistry<K, E> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<Listener<K, E>>>,
}

impl<K, E> Default for EventRegistry<K, E> {
    fn default() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }
}

impl<K: Copy + Eq, E> EventRegistry<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, kind: K, handler: Handler<E>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push(Listener {
            id,
            kind,
            handler: Rc::from(handler),
        });
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    /// Calls every handler registered for `kind`. Handlers are snapshotted
    /// first, so a handler may register or remove listeners while running.
    pub fn emit(&self, kind: K, event: &E) -> usize {
        let handlers: Vec<Rc<dyn Fn(&E)>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| Rc::clone(&l.handler))
            .collect();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn listener_count(&self, kind: K) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recorder(log: &Log, tag: &'static str) -> Handler<ContractEvent> {
        let log = Rc::clone(log);
        Box::new(move |_| log.borrow_mut().push(tag))
    }

    #[test]
    fn test_emit_in_registration_order() {
        let registry = EventRegistry::<ContractEvent, ContractEvent>::new();
        let log: Log = Rc::default();

        registry.on(ContractEvent::BetPlaced, recorder(&log, "first"));
        registry.on(ContractEvent::Resolved, recorder(&log, "other"));
        registry.on(ContractEvent::BetPlaced, recorder(&log, "second"));

        let called = registry.emit(ContractEvent::BetPlaced, &ContractEvent::BetPlaced);
        assert_eq!(called, 2);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_remove_listener() {
        let registry = EventRegistry::<ContractEvent, ContractEvent>::new();
        let log: Log = Rc::default();

        let id = registry.on(ContractEvent::Resolved, recorder(&log, "gone"));
        assert_eq!(registry.listener_count(ContractEvent::Resolved), 1);

        assert!(registry.remove_listener(id));
        assert!(!registry.remove_listener(id));
        assert!(registry.is_empty());

        registry.emit(ContractEvent::Resolved, &ContractEvent::Resolved);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_handler_may_deregister_during_dispatch() {
        let registry = Rc::new(EventRegistry::<ContractEvent, ContractEvent>::new());
        let own_id: Rc<Cell<Option<ListenerId>>> = Rc::default();

        let id = {
            let handle = Rc::clone(&registry);
            let own_id = Rc::clone(&own_id);
            registry.on(
                ContractEvent::BetPlaced,
                Box::new(move |_| {
                    if let Some(id) = own_id.get() {
                        handle.remove_listener(id);
                    }
                }),
            )
        };
        own_id.set(Some(id));

        assert_eq!(registry.emit(ContractEvent::BetPlaced, &ContractEvent::BetPlaced), 1);
        assert_eq!(registry.emit(ContractEvent::BetPlaced, &ContractEvent::BetPlaced), 0);
    }

    #[test]
    fn test_provider_event_kinds() {
        let event = ProviderEvent::AccountsChanged(vec![]);
        assert_eq!(event.kind(), ProviderEventKind::AccountsChanged);
        assert_eq!(event.kind().name(), "accountsChanged");
        assert_eq!(
            ProviderEvent::Disconnect { message: "bye".into() }.kind(),
            ProviderEventKind::Disconnect
        );
    }
}
