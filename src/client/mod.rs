//! The `client` module defines the server-side view of a connected dashboard.
//!
//! It provides the `Subscriber` struct, which pairs a unique identifier with
//! the channel used to push telemetry events to that connection.

pub mod subscriber;
pub use subscriber::{Subscriber, SubscriberId};
