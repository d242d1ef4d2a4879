use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Interval, MissedTickBehavior};

use crate::telemetry::TelemetryRecord;

pub const NOMINAL_VOLTAGE: f64 = 12.0;
pub const VOLTAGE_SPREAD: f64 = 1.0;
pub const NOMINAL_CURRENT: f64 = 2.0;
pub const CURRENT_SPREAD: f64 = 0.5;
pub const NOMINAL_RPM: i32 = 300;
pub const RPM_SPREAD: i32 = 50;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generates plausible turbine readings around fixed nominal values.
///
/// Voltage and current are uniform around their nominal values and rounded to
/// two decimals, power is the product of the rounded values (also rounded),
/// and rpm is an integral offset from nominal.
#[derive(Debug)]
pub struct Simulator<R = StdRng> {
    rng: R,
}

impl Simulator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic generator, for tests and reproducible demos.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for Simulator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Simulator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self) -> TelemetryRecord {
        let voltage =
            round2(NOMINAL_VOLTAGE + self.rng.random_range(-VOLTAGE_SPREAD..=VOLTAGE_SPREAD));
        let current =
            round2(NOMINAL_CURRENT + self.rng.random_range(-CURRENT_SPREAD..=CURRENT_SPREAD));
        let rpm = NOMINAL_RPM + self.rng.random_range(-RPM_SPREAD..=RPM_SPREAD);

        TelemetryRecord {
            voltage,
            current,
            power: round2(voltage * current),
            rpm: f64::from(rpm),
        }
    }
}

/// A simulator paced by a timer: one record per tick.
#[derive(Debug)]
pub struct SimulatedFeed {
    simulator: Simulator,
    ticker: Interval,
}

impl SimulatedFeed {
    /// Must be called from within a Tokio runtime. The first record is
    /// available immediately.
    pub fn new(simulator: Simulator, period: Duration) -> Self {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { simulator, ticker }
    }

    pub async fn next_record(&mut self) -> TelemetryRecord {
        self.ticker.tick().await;
        self.simulator.generate()
    }
}
