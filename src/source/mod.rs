//! Telemetry source.
//!
//! The source is chosen once at startup: the serial hardware link, or the
//! simulator when configured or when the port cannot be opened. The only
//! transition is `Hardware -> Simulation`, and it is permanent. Either way the
//! source is an infinite, non-restartable sequence of [`RawFrame`]s.

pub mod emulator;
pub mod serial;
pub mod simulation;

use std::time::Duration;

use futures_util::Stream;
use tracing::{error, info, warn};

use crate::config::{SerialSettings, SourceSettings};
use crate::telemetry::RawFrame;

pub use emulator::{Emulator, emulate};
pub use serial::SerialLink;
pub use simulation::{SimulatedFeed, Simulator};

/// Where frames currently come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Hardware,
    Simulation,
}

#[derive(Debug)]
enum Mode {
    Hardware(SerialLink),
    Simulation(SimulatedFeed),
}

enum Step {
    Frame(RawFrame),
    Fault(std::io::Error),
    Closed,
}

/// The relay's single stream of raw frames.
#[derive(Debug)]
pub struct TelemetrySource {
    mode: Mode,
    interval: Duration,
    fallback_on_fault: bool,
}

impl TelemetrySource {
    /// Select the source from configuration. A port that cannot be opened is
    /// logged and replaced by the simulator; this never fails.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(serial: &SerialSettings, settings: &SourceSettings) -> Self {
        if settings.simulate {
            info!("Running in simulation mode");
            return Self::simulated(Simulator::new(), settings);
        }

        match SerialLink::open(serial) {
            Ok(link) => Self::hardware(link, settings),
            Err(e) => {
                error!(error = %e, "Failed to open serial port");
                warn!("Switching to simulation mode");
                Self::simulated(Simulator::new(), settings)
            }
        }
    }

    /// Read frames from an already opened link.
    pub fn hardware(link: SerialLink, settings: &SourceSettings) -> Self {
        Self {
            mode: Mode::Hardware(link),
            interval: settings.interval(),
            fallback_on_fault: settings.fallback_on_fault,
        }
    }

    /// Must be called from within a Tokio runtime.
    pub fn simulated(simulator: Simulator, settings: &SourceSettings) -> Self {
        Self {
            mode: Mode::Simulation(SimulatedFeed::new(simulator, settings.interval())),
            interval: settings.interval(),
            fallback_on_fault: settings.fallback_on_fault,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self.mode {
            Mode::Hardware(_) => SourceKind::Hardware,
            Mode::Simulation(_) => SourceKind::Simulation,
        }
    }

    /// Wait for the next frame. Never returns once a hardware link without
    /// fallback has closed.
    pub async fn next_frame(&mut self) -> RawFrame {
        loop {
            let step = match &mut self.mode {
                Mode::Simulation(feed) => Step::Frame(RawFrame::Record(feed.next_record().await)),
                Mode::Hardware(link) => match link.next_line().await {
                    Some(Ok(line)) => Step::Frame(RawFrame::Line(line)),
                    Some(Err(e)) => Step::Fault(e),
                    None => Step::Closed,
                },
            };

            match step {
                Step::Frame(frame) => return frame,
                Step::Fault(e) => {
                    error!(error = %e, "Serial port error");
                    if self.fallback_on_fault {
                        self.fall_back();
                    }
                }
                Step::Closed if self.fallback_on_fault => self.fall_back(),
                Step::Closed => {
                    warn!("Serial link closed, no further hardware frames");
                    std::future::pending::<()>().await;
                }
            }
        }
    }

    /// The source as an endless stream of frames.
    pub fn into_frames(self) -> impl Stream<Item = RawFrame> {
        futures_util::stream::unfold(self, |mut source| async move {
            let frame = source.next_frame().await;
            Some((frame, source))
        })
    }

    fn fall_back(&mut self) {
        warn!("Switching to simulation mode");
        self.mode = Mode::Simulation(SimulatedFeed::new(Simulator::new(), self.interval));
    }
}
