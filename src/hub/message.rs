use serde::{Deserialize, Serialize};
use tungstenite::protocol::Message as WsMessage;

use crate::telemetry::TelemetryRecord;

/// Events pushed from the relay to dashboards.
///
/// Serialized with an `event` tag so a `turbine-data` frame reads:
///
/// ```json
/// {"event":"turbine-data","data":{"voltage":12.1,"current":2.05,"power":24.805,"rpm":310.0},"received_at":1725000000000}
/// ```
///
/// `received_at` is the relay's receipt time in Unix milliseconds. It is
/// informational; the device itself sends no timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ServerEvent {
    #[serde(rename = "turbine-data")]
    TurbineData {
        data: TelemetryRecord,
        received_at: i64,
    },
}

impl ServerEvent {
    /// Wrap a record, stamping it with the current time.
    pub fn turbine_data(record: TelemetryRecord) -> Self {
        Self::TurbineData {
            data: record,
            received_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn to_ws_message(&self) -> Result<WsMessage, serde_json::Error> {
        serde_json::to_string(self).map(WsMessage::text)
    }
}
