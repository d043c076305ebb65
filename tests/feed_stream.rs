mod common;

use std::time::Duration;

use common::MockBackend;
use desk_core::{Endpoints, ReconnectPolicy, StreamMessage, StreamStatus};
use market_desk::feed::{Feed, FeedEvent};

const WAIT: Duration = Duration::from_secs(5);

async fn next_matching<F>(feed: &mut Feed, mut predicate: F) -> FeedEvent
where
    F: FnMut(&FeedEvent) -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT;
    loop {
        let event = tokio::time::timeout_at(deadline, feed.next_event())
            .await
            .expect("timed out waiting for feed event")
            .expect("feed stopped unexpectedly");
        if predicate(&event) {
            return event;
        }
    }
}

fn market_symbol(event: &FeedEvent) -> Option<&str> {
    match event {
        FeedEvent::Message(StreamMessage::MarketData(tick)) => tick.symbol.as_deref(),
        _ => None,
    }
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn feed_delivers_ticks_and_reconnects_after_server_close() {
    let backend = MockBackend::start().await;
    backend.hub.drop_first_connection();
    let endpoints = Endpoints::from_base(&backend.base_url()).expect("endpoints");
    let policy = ReconnectPolicy::fixed(Duration::from_millis(50));

    let mut feed = Feed::spawn(endpoints, policy, "AAPL");

    next_matching(&mut feed, |event| {
        *event == FeedEvent::Status(StreamStatus::Connected)
    })
    .await;
    let first = next_matching(&mut feed, |event| market_symbol(event).is_some()).await;
    assert_eq!(market_symbol(&first), Some("AAPL"));

    next_matching(&mut feed, |event| {
        *event
            == FeedEvent::Status(StreamStatus::Reconnecting {
                attempt: 1,
                delay_ms: 50,
            })
    })
    .await;
    next_matching(&mut feed, |event| {
        *event == FeedEvent::Status(StreamStatus::Connected)
    })
    .await;
    next_matching(&mut feed, |event| market_symbol(event) == Some("AAPL")).await;

    assert_eq!(backend.hub.opened(), vec!["AAPL", "AAPL"]);
    feed.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn switching_symbols_closes_the_old_socket() {
    let backend = MockBackend::start().await;
    let endpoints = Endpoints::from_base(&backend.base_url()).expect("endpoints");
    let mut feed = Feed::spawn(
        endpoints,
        ReconnectPolicy::fixed(Duration::from_millis(50)),
        "AAPL",
    );

    next_matching(&mut feed, |event| market_symbol(event) == Some("AAPL")).await;
    assert!(feed.handle().switch("MSFT"));
    next_matching(&mut feed, |event| market_symbol(event) == Some("MSFT")).await;

    // Nothing from the superseded socket may follow the first frame of the new one.
    let quiet_until = tokio::time::Instant::now() + Duration::from_millis(200);
    while let Ok(Some(event)) = tokio::time::timeout_at(quiet_until, feed.next_event()).await {
        assert_ne!(market_symbol(&event), Some("AAPL"), "stale frame leaked");
    }

    let hub = backend.hub.clone();
    wait_until(|| hub.active() == 1).await;
    assert_eq!(backend.hub.opened(), vec!["AAPL", "MSFT"]);
    feed.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_cancels_pending_retry() {
    let backend = MockBackend::start().await;
    backend.hub.drop_first_connection();
    let endpoints = Endpoints::from_base(&backend.base_url()).expect("endpoints");
    let mut feed = Feed::spawn(
        endpoints,
        ReconnectPolicy::fixed(Duration::from_millis(300)),
        "AAPL",
    );

    next_matching(&mut feed, |event| {
        matches!(event, FeedEvent::Status(StreamStatus::Reconnecting { .. }))
    })
    .await;
    feed.shutdown().await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(backend.hub.opened(), vec!["AAPL"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unreachable_backend_gives_up_after_retry_cap() {
    // Bind then drop to get a port with nothing listening.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        listener.local_addr().expect("addr")
    };
    let endpoints = Endpoints::from_base(&format!("http://{addr}")).expect("endpoints");
    let policy = ReconnectPolicy::fixed(Duration::from_millis(20)).with_max_attempts(Some(2));
    let mut feed = Feed::spawn(endpoints, policy, "AAPL");

    let mut attempts = Vec::new();
    loop {
        match next_matching(&mut feed, |event| matches!(event, FeedEvent::Status(_))).await {
            FeedEvent::Status(StreamStatus::Reconnecting { attempt, .. }) => attempts.push(attempt),
            FeedEvent::Status(StreamStatus::Failed) => break,
            _ => continue,
        }
    }
    assert_eq!(attempts, vec![1, 2]);

    // An explicit reconnect starts over.
    assert!(feed.handle().reconnect());
    next_matching(&mut feed, |event| {
        *event == FeedEvent::Status(StreamStatus::Connecting)
    })
    .await;
    feed.shutdown().await;
}
