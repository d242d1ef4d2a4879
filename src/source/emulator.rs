//! Turbine emulator.
//!
//! Plays the device side of the serial link: one simulated record per tick,
//! written as a JSON line. Pointed at one end of a virtual serial pair it lets
//! the relay run end to end without hardware.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info};

use super::serial::open_port;
use super::simulation::{SimulatedFeed, Simulator};
use crate::config::SerialSettings;
use crate::telemetry::TelemetryRecord;
use crate::utils::Result;

/// Writes simulated records to `W` at the feed's pace.
#[derive(Debug)]
pub struct Emulator<W> {
    port: W,
    feed: SimulatedFeed,
    sent: u64,
}

impl<W: Write> Emulator<W> {
    pub fn new(port: W, feed: SimulatedFeed) -> Self {
        Self {
            port,
            feed,
            sent: 0,
        }
    }

    /// Wait for the next tick and write one record followed by `\n`.
    pub async fn send_next(&mut self) -> Result<TelemetryRecord> {
        let record = self.feed.next_record().await;
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        self.port.write_all(line.as_bytes())?;
        self.port.flush()?;
        self.sent += 1;
        debug!(sent = self.sent, line = line.trim_end(), "Sent record");
        Ok(record)
    }

    /// Send records until writing fails.
    pub async fn run(mut self) -> Result<()> {
        loop {
            self.send_next().await?;
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn into_inner(self) -> W {
        self.port
    }
}

/// Emulate a turbine on the configured serial device, one record per `interval`.
pub async fn emulate(settings: &SerialSettings, interval: Duration) -> Result<()> {
    let port = open_port(settings)?;
    info!(path = %settings.path, ?interval, "Emulating turbine");
    Emulator::new(port, SimulatedFeed::new(Simulator::new(), interval))
        .run()
        .await
}
