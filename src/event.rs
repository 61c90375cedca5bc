//! Published event type
//!
//! The registry never inspects an event beyond what filters ask of it.
//! Signature and id verification happen before an event reaches fan-out.

use serde::{Deserialize, Serialize};

/// A signed nostr event as accepted by the publish pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Hex-encoded event id
    pub id: String,
    /// Hex-encoded author public key
    pub pubkey: String,
    /// Unix timestamp in seconds
    pub created_at: u64,
    /// Event kind
    pub kind: u32,
    /// Tags, each `[name, value, ...]`
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    /// Free-form content
    #[serde(default)]
    pub content: String,
    /// Hex-encoded signature
    pub sig: String,
}

impl Event {
    /// Iterate over the values of every tag named `name`
    ///
    /// Only the first value after the tag name is yielded; extra positional
    /// entries (relay hints, markers) are skipped.
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags.iter().filter_map(move |tag| match tag.as_slice() {
            [tag_name, value, ..] if tag_name == name => Some(value.as_str()),
            _ => None,
        })
    }
}
