//! Session tests running against the in-process devnet.

mod connection;
mod sync;

use crate::devnet::Devnet;
use crate::session::MarketSession;

fn setup(accounts: usize, oracle: usize) -> (Devnet, MarketSession<Devnet>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let devnet = Devnet::new(accounts, oracle);
    let session = MarketSession::new(Some(devnet.clone()), devnet.session_config());
    (devnet, session)
}

async fn connected(accounts: usize, oracle: usize) -> (Devnet, MarketSession<Devnet>) {
    let (devnet, mut session) = setup(accounts, oracle);
    session.initialize().await.expect("initialize");
    session.connect().await.expect("connect");
    (devnet, session)
}

fn count_requests(devnet: &Devnet, request: &str) -> usize {
    devnet.requests().iter().filter(|r| r.as_str() == request).count()
}
