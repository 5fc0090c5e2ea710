//! Tests for the wallet connection lifecycle.

use super::{connected, count_requests, setup};
use crate::config::SessionConfig;
use crate::devnet::{Devnet, DEVNET_CHAIN_ID};
use crate::errors::SessionError;
use crate::session::MarketSession;
use crate::types::ConnectionStatus;

#[tokio::test]
async fn test_connect_without_provider() {
    let mut session = MarketSession::<Devnet>::new(None, SessionConfig::default());

    assert_eq!(session.connect().await, Err(SessionError::ProviderUnavailable));
    assert_eq!(session.initialize().await, Err(SessionError::ProviderUnavailable));
    assert_eq!(session.error(), Some(&SessionError::ProviderUnavailable));
    assert_eq!(session.wallet().status, ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_connect_when_not_a_wallet() {
    let (devnet, mut session) = setup(1, 0);
    devnet.set_installed(false);

    assert_eq!(session.connect().await, Err(SessionError::ProviderUnavailable));
    assert_eq!(devnet.request_count(), 0);
    assert_eq!(devnet.provider_listener_count(), 0);
}

#[tokio::test]
async fn test_connect_returns_primary_account() {
    let (devnet, mut session) = setup(2, 0);
    session.initialize().await.unwrap();

    let account = session.connect().await.unwrap();

    assert_eq!(Some(account.clone()), devnet.account(0));
    assert_eq!(session.account(), Some(&account));
    assert_eq!(session.wallet().status, ConnectionStatus::Connected);
    assert_eq!(session.wallet().network, DEVNET_CHAIN_ID);
    assert!(session.binding().is_some());
    assert!(session.error().is_none());
}

#[tokio::test]
async fn test_connect_with_no_accounts_granted() {
    let (devnet, mut session) = setup(1, 0);
    devnet.grant_no_accounts(true);

    assert_eq!(session.connect().await, Err(SessionError::NoAccountsGranted));
    assert_eq!(session.wallet().status, ConnectionStatus::Disconnected);
    assert!(session.account().is_none());
    assert_eq!(session.error(), Some(&SessionError::NoAccountsGranted));
}

#[tokio::test]
async fn test_connect_rejected_by_user() {
    let (devnet, mut session) = setup(1, 0);
    devnet.reject_next_request();

    assert_eq!(session.connect().await, Err(SessionError::UserRejected));
    assert_eq!(session.wallet().status, ConnectionStatus::Disconnected);

    // The user changes their mind
    let account = session.connect().await.unwrap();
    assert_eq!(Some(account), devnet.account(0));
    assert!(session.error().is_none());
}

#[tokio::test]
async fn test_initialize_without_prior_authorization() {
    let (devnet, mut session) = setup(1, 0);

    session.initialize().await.unwrap();

    assert_eq!(session.wallet().status, ConnectionStatus::Disconnected);
    assert_eq!(devnet.provider_listener_count(), 4);
    assert_eq!(count_requests(&devnet, "eth_accounts"), 1);
    assert_eq!(count_requests(&devnet, "eth_requestAccounts"), 0);
}

#[tokio::test]
async fn test_initialize_reconnects_authorized_account() {
    let (devnet, mut session) = setup(1, 0);
    devnet.authorize();

    session.initialize().await.unwrap();

    assert_eq!(session.wallet().status, ConnectionStatus::Connected);
    assert_eq!(session.account(), devnet.account(0).as_ref());
    assert_eq!(count_requests(&devnet, "eth_requestAccounts"), 0);
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let (devnet, mut session) = setup(1, 0);

    session.initialize().await.unwrap();
    let requests = devnet.request_count();
    session.initialize().await.unwrap();

    assert_eq!(devnet.request_count(), requests);
    assert_eq!(devnet.provider_listener_count(), 4);
}

#[tokio::test]
async fn test_locked_wallet_disconnects() {
    let (devnet, mut session) = connected(1, 0).await;
    assert_eq!(devnet.contract_listener_count(), 2);

    devnet.lock();
    session.process_events().await;

    assert_eq!(session.wallet().status, ConnectionStatus::Disconnected);
    assert!(session.account().is_none());
    assert!(session.binding().is_none());
    assert_eq!(devnet.contract_listener_count(), 0);
}

#[tokio::test]
async fn test_provider_disconnect_and_connect_events() {
    let (devnet, mut session) = connected(1, 0).await;

    devnet.disconnect();
    session.process_events().await;

    assert_eq!(session.wallet().status, ConnectionStatus::Disconnected);
    assert!(session.account().is_none());
    assert!(session.binding().is_none());

    // A provider reconnect alone does not bring an account back
    devnet.reconnect();
    session.process_events().await;
    assert_eq!(session.wallet().status, ConnectionStatus::Disconnected);
    assert_eq!(session.wallet().network, DEVNET_CHAIN_ID);
}

#[tokio::test]
async fn test_shutdown_deregisters_listeners() {
    let (devnet, mut session) = connected(1, 0).await;
    assert_eq!(devnet.provider_listener_count(), 4);
    assert_eq!(devnet.contract_listener_count(), 2);

    session.shutdown();

    assert_eq!(devnet.provider_listener_count(), 0);
    assert_eq!(devnet.contract_listener_count(), 0);
}

#[tokio::test]
async fn test_drop_deregisters_listeners() {
    let (devnet, session) = connected(1, 0).await;

    drop(session);

    assert_eq!(devnet.provider_listener_count(), 0);
    assert_eq!(devnet.contract_listener_count(), 0);
}
