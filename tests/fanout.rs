//! End-to-end fan-out through client sessions

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;

use relay_registry::{
    ClientSession, ConnectionMeta, Event, Filter, Filters, RelayMessage, SubscriptionRegistry,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn event(id: &str, kind: u32) -> Event {
    Event {
        id: id.into(),
        pubkey: "alice".into(),
        created_at: 1_700_000_000,
        kind,
        tags: vec![vec!["t".into(), "nostr".into()]],
        content: "gm".into(),
        sig: "sig".into(),
    }
}

fn drain(rx: &mut mpsc::Receiver<RelayMessage>) -> Vec<RelayMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

#[tokio::test]
async fn kind_filter_reaches_both_connections() {
    init_tracing();
    let registry = Arc::new(SubscriptionRegistry::new());

    let (c1, mut rx1) = ClientSession::open(Arc::clone(&registry), ConnectionMeta::default());
    let (c2, mut rx2) = ClientSession::open(Arc::clone(&registry), ConnectionMeta::default());

    c1.subscribe("a", Filter::new().kind(1)).await.unwrap();
    c2.subscribe("b", Filter::new().kind(1)).await.unwrap();

    registry.notify(event("one", 1)).await;

    let to_c1 = drain(&mut rx1);
    let to_c2 = drain(&mut rx2);
    assert_eq!(to_c1.len(), 1);
    assert_eq!(to_c2.len(), 1);

    let ev = serde_json::to_value(event("one", 1)).unwrap();
    assert_eq!(serde_json::to_value(&to_c1[0]).unwrap(), json!(["EVENT", "a", ev]));
    assert_eq!(serde_json::to_value(&to_c2[0]).unwrap(), json!(["EVENT", "b", ev]));

    registry.notify(event("two", 2)).await;
    assert!(drain(&mut rx1).is_empty());
    assert!(drain(&mut rx2).is_empty());
}

#[tokio::test]
async fn filters_parsed_from_wire_match_live_events() {
    init_tracing();
    let registry = Arc::new(SubscriptionRegistry::new());
    let (session, mut rx) = ClientSession::open(Arc::clone(&registry), ConnectionMeta::default());

    let filters: Filters =
        serde_json::from_value(json!([{ "kinds": [30023] }, { "#t": ["nostr"], "since": 10 }]))
            .unwrap();
    session.subscribe("req-1", filters).await.unwrap();

    let report = registry.notify(event("tagged", 1)).await;
    assert_eq!(report.delivered, 1);

    let encoded = drain(&mut rx)[0].encode().unwrap();
    let decoded: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
    assert_eq!(decoded[0], "EVENT");
    assert_eq!(decoded[1], "req-1");
    assert_eq!(decoded[2]["id"], "tagged");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn drop_is_atomic_with_notify() {
    init_tracing();
    let registry = Arc::new(SubscriptionRegistry::new());

    for round in 0..50 {
        let (session, mut rx) =
            ClientSession::open(Arc::clone(&registry), ConnectionMeta::default());
        for i in 0..8 {
            session
                .subscribe(&format!("sub-{}", i), Filter::new())
                .await
                .unwrap();
        }

        let publisher = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.notify(event(&format!("ev-{}", round), 1)).await })
        };
        session.close().await;
        publisher.await.unwrap();

        // The publisher saw either all eight subscriptions or none of them
        let delivered = drain(&mut rx).len();
        assert!(delivered == 0 || delivered == 8, "saw {} deliveries", delivered);
    }

    assert_eq!(registry.connection_count().await, 0);
}

#[tokio::test]
async fn introspection_reflects_sessions() {
    init_tracing();
    let registry = Arc::new(SubscriptionRegistry::new());

    let (s1, _rx1) = ClientSession::open(
        Arc::clone(&registry),
        ConnectionMeta::new("203.0.113.7", "https://client.example"),
    );
    let (s2, _rx2) = ClientSession::open(
        Arc::clone(&registry),
        ConnectionMeta::new("198.51.100.2", "https://other.example"),
    );

    s1.subscribe("x", vec![Filter::new().kind(1), Filter::new().author("bob")])
        .await
        .unwrap();
    s2.subscribe("y", Filter::new().author("bob")).await.unwrap();

    assert_eq!(registry.active_filters().await.len(), 2);

    let stats = registry.stats().await;
    assert_eq!(stats.len(), 2);
    assert!(stats
        .iter()
        .any(|s| s.address == "203.0.113.7" && s.origin == "https://client.example"));

    s1.close().await;
    assert_eq!(
        registry.active_filters().await,
        vec![Filter::new().author("bob")]
    );
}
