//! The `transport` module serves the telemetry stream to dashboards over
//! WebSockets.

pub mod websocket;

pub use websocket::{serve, start_websocket_server};
