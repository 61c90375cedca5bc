//! In-process fan-out walkthrough
//!
//! Run with: RUST_LOG=debug cargo run --example fanout
//!
//! Opens two client sessions, installs subscriptions from NIP-01 JSON,
//! publishes a few events, and prints what each client would receive along
//! with the registry's introspection output.

use std::sync::Arc;

use relay_registry::{ClientSession, ConnectionMeta, Event, Filters, SubscriptionRegistry};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> relay_registry::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_registry=info".into()),
        )
        .init();

    let registry = Arc::new(SubscriptionRegistry::new());

    let (alice, alice_rx) = ClientSession::open(
        Arc::clone(&registry),
        ConnectionMeta::new("203.0.113.7", "https://alice.example"),
    );
    let (bob, bob_rx) = ClientSession::open(
        Arc::clone(&registry),
        ConnectionMeta::new("198.51.100.2", "https://bob.example"),
    );

    let notes: Filters = serde_json::from_str(r#"[{"kinds":[1]}]"#)?;
    let mentions: Filters =
        serde_json::from_str(r##"[{"#p":["bob"]},{"kinds":[1],"limit":10}]"##)?;

    alice.subscribe("notes", notes).await?;
    bob.subscribe("mentions", mentions).await?;

    let writers = [spawn_writer("alice", alice_rx), spawn_writer("bob", bob_rx)];

    let mention = vec![vec!["p".to_string(), "bob".to_string()]];
    let published = [(1, Vec::new()), (7, mention), (3, Vec::new())];

    for (i, (kind, tags)) in published.into_iter().enumerate() {
        let event = Event {
            id: format!("{:064x}", i),
            pubkey: "carol".into(),
            created_at: 1_700_000_000 + i as u64,
            kind,
            tags,
            content: format!("event #{}", i),
            sig: String::new(),
        };
        let report = registry.notify(event).await;
        println!("kind {} -> {:?}", kind, report);
    }

    println!(
        "active filters: {}",
        serde_json::to_string(&registry.active_filters().await)?
    );
    println!("stats: {}", serde_json::to_string(&registry.stats().await)?);

    alice.close().await;
    bob.close().await;

    for writer in writers {
        let _ = writer.await;
    }

    Ok(())
}

/// Stand-in for a websocket writer task
fn spawn_writer(
    name: &'static str,
    mut rx: mpsc::Receiver<relay_registry::RelayMessage>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message.encode() {
                Ok(frame) => println!("[{}] {}", name, String::from_utf8_lossy(&frame)),
                Err(e) => eprintln!("[{}] encode failed: {}", name, e),
            }
        }
    })
}
