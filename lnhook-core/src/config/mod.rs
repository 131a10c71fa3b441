//! Configuration types for lnhook.
//!
//! These types represent the validated runtime configuration handed to the
//! core components. The actual config loading/parsing is handled by the
//! server crate.

mod delivery;
mod reconnect;
mod upstream;

pub use delivery::{DEFAULT_PEER_QUEUE_CAPACITY, DEFAULT_WEBHOOK_TIMEOUT, DeliveryConfig};
pub use reconnect::ReconnectPolicy;
pub use upstream::LndConfig;
