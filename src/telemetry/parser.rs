//! Frame parser.
//!
//! Turns raw frames into validated [`TelemetryRecord`]s. The reader is
//! tolerant of unknown extra fields, but all four measurements must be present
//! and numeric and `rpm` must not be negative.

use thiserror::Error;

use super::record::{RawFrame, TelemetryRecord};

/// Why a frame was rejected.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The line was blank after trimming.
    #[error("empty frame")]
    Empty,

    /// The line was not a JSON object with the expected numeric fields.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The frame decoded but a field holds an impossible value.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Parse a single line from the serial link.
pub fn parse_line(line: &str) -> Result<TelemetryRecord, FrameError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(FrameError::Empty);
    }

    let record: TelemetryRecord = serde_json::from_str(trimmed)?;
    validate(&record)?;
    Ok(record)
}

/// Parse any raw frame. Simulated records only go through validation.
pub fn parse_frame(frame: &RawFrame) -> Result<TelemetryRecord, FrameError> {
    match frame {
        RawFrame::Line(line) => parse_line(line),
        RawFrame::Record(record) => {
            validate(record)?;
            Ok(*record)
        }
    }
}

/// Check the invariants decoding alone cannot express.
pub fn validate(record: &TelemetryRecord) -> Result<(), FrameError> {
    let fields = [
        ("voltage", record.voltage),
        ("current", record.current),
        ("power", record.power),
        ("rpm", record.rpm),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(FrameError::Invalid {
                field,
                reason: format!("{value} is not a finite number"),
            });
        }
    }

    if record.rpm < 0.0 {
        return Err(FrameError::Invalid {
            field: "rpm",
            reason: format!("{} is negative", record.rpm),
        });
    }

    Ok(())
}
