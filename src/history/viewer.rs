//! Terminal dashboard
//!
//! A minimal consumer of the relay's WebSocket stream. It keeps its own
//! [`HistoryWindow`] of records exactly as a browser dashboard would and logs
//! each update, which makes it handy for smoke-testing a running relay.

use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tracing::{info, warn};
use tungstenite::protocol::Message as WsMessage;

use super::window::HistoryWindow;
use crate::hub::ServerEvent;
use crate::telemetry::TelemetryRecord;
use crate::utils::Result;

/// Client-side state for one dashboard view.
#[derive(Debug, Default)]
pub struct Dashboard {
    window: HistoryWindow<TelemetryRecord>,
}

impl Dashboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: HistoryWindow::new(capacity),
        }
    }

    /// Apply one text frame from the relay, appending its record to the window.
    pub fn handle_text(&mut self, text: &str) -> serde_json::Result<TelemetryRecord> {
        let ServerEvent::TurbineData { data, .. } = serde_json::from_str(text)?;
        self.window.push(data);
        Ok(data)
    }

    pub fn window(&self) -> &HistoryWindow<TelemetryRecord> {
        &self.window
    }

    /// Mean power over the window, `None` while it is empty.
    pub fn average_power(&self) -> Option<f64> {
        if self.window.is_empty() {
            return None;
        }
        let total: f64 = self.window.iter().map(|r| r.power).sum();
        Some(total / self.window.len() as f64)
    }
}

/// Connect to a relay and log every record until the connection closes.
pub async fn watch(url: &str, capacity: usize) -> Result<()> {
    let (mut ws_stream, _response) = connect_async(url).await?;
    info!(url, "Connected to relay");

    let mut dashboard = Dashboard::new(capacity);

    while let Some(msg) = ws_stream.next().await {
        match msg? {
            WsMessage::Text(text) => match dashboard.handle_text(&text) {
                Ok(record) => info!(
                    voltage = record.voltage,
                    current = record.current,
                    power = record.power,
                    rpm = record.rpm,
                    window = dashboard.window().len(),
                    avg_power = dashboard.average_power().unwrap_or_default(),
                    "turbine-data"
                ),
                Err(e) => warn!(error = %e, raw = text.as_str(), "Ignoring unrecognized event"),
            },
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    info!("Relay closed the connection");
    Ok(())
}
