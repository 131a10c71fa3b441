//! Wire types and clients for lnhook.
//!
//! The types in [`objects`] are shared by the relay server and anything that
//! talks to it: webhook receivers, realtime WebSocket clients, and backends
//! that register subscriptions.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
