//! Subscription registry and event fan-out for nostr-style relays
//!
//! The registry tracks which client connections want which event filters and
//! pushes each newly accepted event to exactly the subscriptions that match.
//!
//! ```text
//!   [transport]            [protocol layer]            [publish pipeline]
//!   accept/close              REQ / CLOSE                 accepted event
//!        │                        │                             │
//!        ▼                        ▼                             ▼
//!   ClientSession ──► SubscriptionRegistry::try_subscribe   registry.notify()
//!        │                 unsubscribe / drop_connection        │
//!        │                                                      │
//!        └──── mpsc::Receiver<RelayMessage> ◄── ["EVENT", id, event] ─┘
//! ```
//!
//! Transport handshakes, message parsing, storage and signature checks live
//! outside this crate.

pub mod error;
pub mod event;
pub mod filter;
pub mod message;
pub mod registry;
pub mod session;

pub use error::{Error, Result};
pub use event::Event;
pub use filter::{Filter, Filters};
pub use message::RelayMessage;
pub use registry::{
    ConnectionHandle, ConnectionId, ConnectionMeta, ConnectionStats, DeliveryReport,
    RegistryConfig, RegistryError, SubscriptionRegistry,
};
pub use session::ClientSession;
