//! Crate-wide error type.
//!
//! Frame-level rejections live in [`crate::telemetry::FrameError`]; they are
//! logged and dropped by the relay and never surface as a `RelayError`.

use thiserror::Error;

/// Result alias used by the relay's fallible operations.
pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Socket or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial device could not be opened.
    #[error("failed to open serial port {path}: {source}")]
    SerialOpen {
        path: String,
        #[source]
        source: serialport::Error,
    },

    /// A record could not be encoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The telemetry source stopped producing frames.
    #[error("telemetry source ended after {published} published and {dropped} dropped frames")]
    SourceEnded { published: u64, dropped: u64 },

    /// The hub refused a new subscriber.
    #[error("subscriber limit of {0} reached")]
    SubscriberLimit(usize),

    /// WebSocket handshake or protocol failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}
