//! # turbine-relay
//!
//! `turbine-relay` reads newline-delimited JSON telemetry from a turbine
//! controller on a serial port, or synthesizes it when no hardware is
//! available, and broadcasts every valid reading to connected dashboards over
//! WebSockets.
//!
//! ## Core Modules
//!
//! - `telemetry`: the record type and the frame parser.
//! - `source`: the hardware link, the simulator, the one-way fallback
//!   between them, and a device emulator for the other end of the link.
//! - `hub`: the broadcast hub that fans records out to subscribers.
//! - `relay`: the pump wiring a source to the hub.
//! - `transport`: the WebSocket server.
//! - `client`: the server-side view of a connected dashboard.
//! - `history`: the bounded window dashboards chart from, plus a terminal
//!   dashboard.
//! - `config`: layered configuration loading.
//! - `utils`: error type and logging setup.

pub mod client;
pub mod config;
pub mod history;
pub mod hub;
pub mod relay;
pub mod source;
pub mod telemetry;
pub mod transport;
pub mod utils;
