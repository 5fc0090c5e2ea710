//! Tests for market snapshots and event-driven refresh.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::{connected, count_requests, setup};
use crate::types::MarketState;

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

#[tokio::test]
async fn test_state_defaults_before_first_read() {
    let (_devnet, session) = setup(1, 0);

    assert_eq!(*session.market(), MarketState::default());
}

#[tokio::test]
async fn test_connect_reads_existing_market() {
    let (devnet, mut session) = setup(2, 0);
    devnet.external_bet(1, 2_5000000, true).unwrap();

    session.connect().await.unwrap();

    assert_eq!(session.market().total_pool, dec("2.5"));
    assert!(!session.market().is_resolved);
}

#[tokio::test]
async fn test_resolved_event_without_local_transaction() {
    let (devnet, mut session) = connected(2, 1).await;

    devnet.external_resolve(true).unwrap();
    assert!(!session.market().is_resolved);

    assert_eq!(session.process_events().await, 1);

    assert!(session.market().is_resolved);
    assert!(session.market().outcome);
}

#[tokio::test]
async fn test_bet_placed_event_refreshes_pool() {
    let (devnet, mut session) = connected(2, 0).await;

    devnet.external_bet(1, 1_0000000, false).unwrap();
    session.process_events().await;

    assert_eq!(session.market().total_pool, dec("1"));
}

#[tokio::test]
async fn test_events_from_replaced_binding_are_dropped() {
    let (devnet, mut session) = connected(2, 0).await;

    // The account switch is queued before the bet event of the old binding
    devnet.select_account(1);
    devnet.external_bet(1, 3_0000000, true).unwrap();

    let reads_before = count_requests(&devnet, "eth_call:isResolved");
    assert_eq!(session.process_events().await, 2);

    // Only the reconnect read the market; the stale event did not
    assert_eq!(count_requests(&devnet, "eth_call:isResolved") - reads_before, 1);
    assert_eq!(session.market().total_pool, dec("3"));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let (devnet, mut session) = connected(2, 0).await;
    devnet.external_bet(1, 1_0000000, true).unwrap();
    session.process_events().await;
    let before = session.market().clone();

    // The chain moves on, then reads start failing before the switch is processed
    devnet.external_resolve(false).unwrap();
    devnet.switch_chain("0x1");

    assert!(session.refresh().await.is_err());
    assert_eq!(*session.market(), before);
}

#[tokio::test]
async fn test_redundant_refreshes_converge() {
    let (devnet, mut session) = connected(2, 0).await;
    devnet.external_bet(1, 4_0000000, true).unwrap();

    let explicit = session.refresh().await.unwrap();
    session.process_events().await;

    assert_eq!(*session.market(), explicit);
    assert_eq!(explicit.total_pool, dec("4"));
}

#[tokio::test]
async fn test_single_failed_read_keeps_previous_snapshot() {
    let (devnet, mut session) = connected(2, 1).await;
    devnet.external_bet(0, 2_0000000, true).unwrap();
    session.process_events().await;
    let before = session.market().clone();

    // Pool and resolution both change, but the outcome read fails
    devnet.external_bet(1, 1_0000000, false).unwrap();
    devnet.external_resolve(true).unwrap();
    devnet.fail_next_read("outcome");

    assert!(session.refresh().await.is_err());
    assert_eq!(*session.market(), before);
    assert_eq!(session.market().total_pool, dec("2"));
    assert!(!session.market().is_resolved);

    // The queued events then bring the whole snapshot up to date
    session.process_events().await;
    assert!(session.market().is_resolved);
    assert!(session.market().outcome);
    assert_eq!(session.market().total_pool, dec("3"));
}

#[tokio::test]
async fn test_next_events_handles_queued_resolution() {
    let (devnet, mut session) = connected(2, 1).await;
    devnet.external_resolve(true).unwrap();

    assert_eq!(session.next_events().await, 1);

    assert!(session.market().is_resolved);
    assert!(session.market().outcome);
}

#[tokio::test]
async fn test_next_events_waits_for_the_next_event() {
    let (devnet, mut session) = connected(2, 1).await;

    let (handled, resolved) = tokio::join!(session.next_events(), async {
        tokio::task::yield_now().await;
        devnet.external_resolve(false)
    });

    assert!(resolved.is_ok());
    assert_eq!(handled, 1);
    assert!(session.market().is_resolved);
    assert!(!session.market().outcome);
}
