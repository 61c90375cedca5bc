//! Client session handling
//!
//! A [`ClientSession`] is what the protocol and lifecycle layers hold for one
//! connection: it turns `REQ`/`CLOSE`/disconnect into registry calls.

pub mod client;

pub use client::ClientSession;
