//! Relay pump: pulls frames from a telemetry source, validates them and
//! publishes the survivors through the hub, in arrival order.

use std::sync::Mutex;

use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::hub::{self, DeliveryReport, Hub, SharedHub};
use crate::source::TelemetrySource;
use crate::telemetry::{FrameError, RawFrame, parse_frame};
use crate::utils::{RelayError, Result};

/// Running totals for one pump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub published: u64,
    pub dropped: u64,
}

/// Parse one frame and publish it. Malformed frames are logged with their raw
/// content and dropped; they never reach subscribers.
pub fn relay_frame(hub: &Mutex<Hub>, frame: &RawFrame) -> Option<DeliveryReport> {
    match parse_frame(frame) {
        Ok(record) => {
            let report = hub::lock(hub).publish(&record);
            debug!(
                rpm = record.rpm,
                power = record.power,
                attempted = report.attempted,
                failed = report.failed,
                "Published telemetry"
            );
            Some(report)
        }
        Err(FrameError::Empty) => {
            debug!("Skipping empty frame");
            None
        }
        Err(e) => {
            match frame {
                RawFrame::Line(raw) => warn!(error = %e, raw = %raw, "Dropping malformed frame"),
                RawFrame::Record(raw) => warn!(error = %e, raw = ?raw, "Dropping invalid record"),
            }
            None
        }
    }
}

/// Relay every frame of `frames`, returning once the stream ends.
pub async fn pump<S>(frames: S, hub: &Mutex<Hub>) -> RelayStats
where
    S: Stream<Item = RawFrame>,
{
    let mut stats = RelayStats::default();
    let mut frames = std::pin::pin!(frames);

    while let Some(frame) = frames.next().await {
        if relay_frame(hub, &frame).is_some() {
            stats.published += 1;
        } else {
            stats.dropped += 1;
        }
    }
    stats
}

/// Relay `frames` for as long as they last. A live source never runs dry, so
/// reaching the end is reported as [`RelayError::SourceEnded`].
pub async fn drive<S>(frames: S, hub: &Mutex<Hub>) -> Result<()>
where
    S: Stream<Item = RawFrame>,
{
    let stats = pump(frames, hub).await;
    Err(RelayError::SourceEnded {
        published: stats.published,
        dropped: stats.dropped,
    })
}

/// Relay a telemetry source for the life of the process.
pub async fn run(source: TelemetrySource, hub: SharedHub) -> Result<()> {
    info!(mode = ?source.kind(), "Telemetry relay started");
    drive(source.into_frames(), &hub).await
}

#[cfg(test)]
mod tests;
