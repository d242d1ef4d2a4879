use futures_util::stream;
use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

use super::{RelayStats, drive, pump, relay_frame};
use crate::hub::{Hub, ServerEvent};
use crate::telemetry::{RawFrame, TelemetryRecord, parse_line};
use crate::utils::RelayError;
use crate::utils::logging::capture::{warn_lines, with_captured_logs};

fn line(text: &str) -> RawFrame {
    RawFrame::Line(text.to_string())
}

fn drain(rx: &mut mpsc::UnboundedReceiver<WsMessage>) -> Vec<TelemetryRecord> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .map(|msg| {
            let text = msg.into_text().unwrap();
            match serde_json::from_str::<ServerEvent>(&text).unwrap() {
                ServerEvent::TurbineData { data, .. } => data,
            }
        })
        .collect()
}

#[test]
fn test_relay_frame_publishes_valid_line() {
    let hub = Hub::default().shared();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.lock().unwrap().subscribe(tx).unwrap();

    let report = relay_frame(
        &hub,
        &line(r#"{"voltage":12.1,"current":2.05,"power":24.805,"rpm":310}"#),
    )
    .unwrap();

    assert_eq!(report.attempted, 1);
    assert_eq!(
        drain(&mut rx),
        vec![TelemetryRecord {
            voltage: 12.1,
            current: 2.05,
            power: 24.805,
            rpm: 310.0,
        }]
    );
}

#[test]
fn test_relay_frame_drops_malformed_line() {
    let hub = Hub::default().shared();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.lock().unwrap().subscribe(tx).unwrap();

    assert!(relay_frame(&hub, &line("not json")).is_none());
    assert!(relay_frame(&hub, &line("")).is_none());
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_malformed_line_logs_one_warning_with_error_and_raw_text() {
    let hub = Hub::default().shared();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.lock().unwrap().subscribe(tx).unwrap();

    let (report, logs) = with_captured_logs(|| relay_frame(&hub, &line("not json")));

    assert!(report.is_none());
    assert!(drain(&mut rx).is_empty());

    let warnings = warn_lines(&logs);
    assert_eq!(warnings.len(), 1, "logs: {logs}");
    let expected_error = parse_line("not json").unwrap_err().to_string();
    assert!(warnings[0].contains("raw=not json"), "{}", warnings[0]);
    assert!(warnings[0].contains(&expected_error), "{}", warnings[0]);
}

#[test]
fn test_valid_line_logs_no_warning() {
    let hub = Hub::default().shared();
    let (tx, _rx) = mpsc::unbounded_channel();
    hub.lock().unwrap().subscribe(tx).unwrap();

    let (report, logs) = with_captured_logs(|| {
        relay_frame(
            &hub,
            &line(r#"{"voltage":12.1,"current":2.05,"power":24.805,"rpm":310}"#),
        )
    });

    assert_eq!(report.unwrap().delivered(), 1);
    assert!(warn_lines(&logs).is_empty(), "logs: {logs}");
}

#[test]
fn test_relay_frame_drops_invalid_record() {
    let hub = Hub::default().shared();
    let record = TelemetryRecord {
        voltage: 12.0,
        current: 2.0,
        power: 24.0,
        rpm: -1.0,
    };
    assert!(relay_frame(&hub, &RawFrame::Record(record)).is_none());
}

#[tokio::test]
async fn test_pump_end_to_end_scenario() {
    let hub = Hub::default().shared();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.lock().unwrap().subscribe(tx).unwrap();

    let frames = stream::iter(vec![
        line(r#"{"voltage":12.1,"current":2.05,"power":24.805,"rpm":310}"#),
        line("not json"),
        line(r#"{"voltage":11.5,"current":1.9,"power":21.85,"rpm":295}"#),
    ]);

    let stats = pump(frames, &hub).await;

    assert_eq!(
        stats,
        RelayStats {
            published: 2,
            dropped: 1,
        }
    );
    let received = drain(&mut rx);
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].rpm, 310.0);
    assert_eq!(received[0].power, 24.805);
    assert_eq!(received[1].rpm, 295.0);
}

#[tokio::test]
async fn test_drive_reports_a_source_that_runs_dry() {
    let hub = Hub::default().shared();
    let frames = stream::iter(vec![
        line(r#"{"voltage":12.1,"current":2.05,"power":24.805,"rpm":310}"#),
        line("not json"),
    ]);

    match drive(frames, &hub).await {
        Err(RelayError::SourceEnded { published, dropped }) => {
            assert_eq!((published, dropped), (1, 1));
        }
        other => panic!("expected SourceEnded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_pump_preserves_order_for_every_subscriber() {
    let hub = Hub::default().shared();
    let mut receivers = Vec::new();
    for _ in 0..3 {
        let (tx, rx) = mpsc::unbounded_channel();
        hub.lock().unwrap().subscribe(tx).unwrap();
        receivers.push(rx);
    }

    let frames = stream::iter((0..50).map(|i| {
        RawFrame::Record(TelemetryRecord {
            voltage: 12.0,
            current: 2.0,
            power: 24.0,
            rpm: f64::from(i),
        })
    }));
    pump(frames, &hub).await;

    let expected: Vec<f64> = (0..50).map(f64::from).collect();
    for rx in &mut receivers {
        let rpms: Vec<f64> = drain(rx).iter().map(|r| r.rpm).collect();
        assert_eq!(rpms, expected);
    }
}
