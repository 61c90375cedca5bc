//! Subscription registry and event fan-out
//!
//! The registry maps each live connection to its named subscriptions and
//! delivers every accepted event to the subscriptions whose filters match.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<SubscriptionRegistry>
//!                  ┌────────────────────────────────┐
//!                  │ Mutex<HashMap<ConnectionId,    │
//!                  │   ConnectionEntry {            │
//!                  │     handle: mpsc::Sender,      │
//!                  │     subscriptions: HashMap<    │
//!                  │       String, Subscription>,   │
//!                  │   }>>                          │
//!                  └───────────────┬────────────────┘
//!                                  │
//!        ┌─────────────────────────┼─────────────────────────┐
//!        │                         │                         │
//!        ▼                         ▼                         ▼
//!   [Session A]               [Session B]             [Publish path]
//!   try_subscribe()           unsubscribe()           notify(event)
//!        ▲                                                   │
//!        └──── try_send(["EVENT", id, event]) ◄──────────────┘
//! ```
//!
//! # Locking
//!
//! A single mutex covers the whole map. Every operation holds it for its
//! full duration and never awaits while holding it: fan-out uses
//! `try_send`, so a stalled client costs one failed send, not a stalled
//! publisher. Because of this a `drop_connection` is never observed half
//! applied by a concurrent `notify`.
//!
//! # Zero-Copy Delivery
//!
//! Events are fanned out as `Arc<Event>`. Each matching subscription gets its
//! own envelope, but all envelopes share one allocation of the event.

pub mod config;
pub mod connection;
pub mod entry;
pub mod error;
pub mod fanout;
pub mod introspect;
pub mod store;

pub use config::RegistryConfig;
pub use connection::{ConnectionHandle, ConnectionId, ConnectionMeta};
pub use entry::{ConnectionEntry, ConnectionStats, Subscription};
pub use error::RegistryError;
pub use fanout::DeliveryReport;
pub use store::SubscriptionRegistry;
