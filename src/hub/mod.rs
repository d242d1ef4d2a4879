//! Broadcast hub: tracks connected subscribers and fans telemetry out to them.

pub mod engine;
pub mod message;

pub use engine::{DeliveryReport, Hub, SharedHub, lock};
pub use message::ServerEvent;
