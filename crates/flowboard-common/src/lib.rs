//! Shared domain types for the Flowboard task board client.
//!
//! These mirror the JSON shapes served by the board API (camelCase fields,
//! upper-case enum tags). They carry no I/O; the `flowboard` crate owns the
//! HTTP/WebSocket plumbing and the in-memory engine built on top of them.

pub mod models;
pub mod payloads;

pub use models::*;
pub use payloads::*;
