use serde::{Deserialize, Serialize};

/// One turbine measurement as relayed to dashboards.
///
/// Records are immutable once parsed. `power` is carried as reported by the
/// device and is not re-derived from `voltage * current`.
///
/// # Example
///
/// ```rust
/// use turbine_relay::telemetry::TelemetryRecord;
///
/// let record = TelemetryRecord {
///     voltage: 12.1,
///     current: 2.05,
///     power: 24.805,
///     rpm: 310.0,
/// };
/// assert_eq!(record.rpm, 310.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Volts, roughly 0..30.
    pub voltage: f64,
    /// Amps, roughly 0..10.
    pub current: f64,
    /// Watts.
    pub power: f64,
    /// Rotor speed, never negative.
    pub rpm: f64,
}

/// A single unit of input from a telemetry source, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFrame {
    /// One line read from the serial link, delimiter already stripped.
    Line(String),
    /// A record synthesized by the simulator.
    Record(TelemetryRecord),
}
