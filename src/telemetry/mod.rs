//! Telemetry data model and frame parsing.
//!
//! A [`RawFrame`] comes out of a telemetry source; [`parse_frame`] turns it
//! into a [`TelemetryRecord`] or a [`FrameError`] that the relay logs and drops.

pub mod parser;
pub mod record;

pub use parser::{FrameError, parse_frame, parse_line, validate};
pub use record::{RawFrame, TelemetryRecord};
