use std::io::Cursor;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use turbine_relay::config::SourceSettings;
use turbine_relay::history::Dashboard;
use turbine_relay::hub::{self, Hub, SharedHub};
use turbine_relay::relay;
use turbine_relay::source::{SerialLink, Simulator, TelemetrySource};
use turbine_relay::telemetry::TelemetryRecord;
use turbine_relay::transport::serve;

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn start_server(hub: SharedHub) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, hub));
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}"))
        .await
        .expect("WebSocket handshake failed");
    ws
}

async fn wait_for_subscribers(hub: &SharedHub, count: usize) {
    for _ in 0..200 {
        if hub::lock(hub).len() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("subscribers never reached {count}");
}

/// Feed the next text frame into the dashboard; `None` if nothing arrives in time.
async fn receive(ws: &mut Client, dashboard: &mut Dashboard, wait: Duration) -> Option<TelemetryRecord> {
    let msg = tokio::time::timeout(wait, ws.next()).await.ok()??.ok()?;
    let text = msg.into_text().ok()?;
    dashboard.handle_text(&text).ok()
}

fn settings(fallback_on_fault: bool) -> SourceSettings {
    SourceSettings {
        simulate: false,
        interval_ms: 10,
        fallback_on_fault,
    }
}

#[tokio::test]
async fn serial_lines_reach_dashboards_and_malformed_lines_do_not() {
    let hub = Hub::default().shared();
    let addr = start_server(hub.clone()).await;
    let mut ws = connect(addr).await;
    wait_for_subscribers(&hub, 1).await;

    let input = concat!(
        "{\"voltage\":12.1,\"current\":2.05,\"power\":24.805,\"rpm\":310}\r\n",
        "not json\r\n",
        "{\"voltage\":11.8,\"current\":1.95,\"power\":23.01,\"rpm\":298}\r\n",
    );
    let link = SerialLink::from_reader(Cursor::new(input.as_bytes().to_vec())).unwrap();
    let source = TelemetrySource::hardware(link, &settings(false));
    tokio::spawn(relay::run(source, hub.clone()));

    let mut dashboard = Dashboard::new(20);
    let first = receive(&mut ws, &mut dashboard, Duration::from_secs(2))
        .await
        .expect("first record");
    assert_eq!(
        first,
        TelemetryRecord {
            voltage: 12.1,
            current: 2.05,
            power: 24.805,
            rpm: 310.0,
        }
    );

    let second = receive(&mut ws, &mut dashboard, Duration::from_secs(2))
        .await
        .expect("second record");
    assert_eq!(second.rpm, 298.0);

    // the link is exhausted and fallback is off: nothing else arrives
    assert!(
        receive(&mut ws, &mut dashboard, Duration::from_millis(200))
            .await
            .is_none()
    );
    assert_eq!(dashboard.window().len(), 2);
}

#[tokio::test]
async fn simulated_stream_is_identical_for_every_dashboard() {
    let hub = Hub::default().shared();
    let addr = start_server(hub.clone()).await;
    let mut a = connect(addr).await;
    let mut b = connect(addr).await;
    wait_for_subscribers(&hub, 2).await;

    let source = TelemetrySource::simulated(Simulator::seeded(11), &settings(true));
    tokio::spawn(relay::run(source, hub.clone()));

    let mut dash_a = Dashboard::new(3);
    let mut dash_b = Dashboard::new(3);
    for _ in 0..5 {
        let ra = receive(&mut a, &mut dash_a, Duration::from_secs(2)).await.unwrap();
        let rb = receive(&mut b, &mut dash_b, Duration::from_secs(2)).await.unwrap();
        assert_eq!(ra, rb);
        assert!((11.0..=13.0).contains(&ra.voltage));
    }

    assert_eq!(dash_a.window().len(), 3);
    assert_eq!(dash_a.window().to_vec(), dash_b.window().to_vec());
}

#[tokio::test]
async fn hardware_fault_falls_back_to_simulation() {
    let hub = Hub::default().shared();
    let addr = start_server(hub.clone()).await;
    let mut ws = connect(addr).await;
    wait_for_subscribers(&hub, 1).await;

    let link = SerialLink::from_reader(Cursor::new(
        b"{\"voltage\":5,\"current\":1,\"power\":5,\"rpm\":10}\r\n".to_vec(),
    ))
    .unwrap();
    let source = TelemetrySource::hardware(link, &settings(true));
    tokio::spawn(relay::run(source, hub.clone()));

    let mut dashboard = Dashboard::new(20);
    let from_hardware = receive(&mut ws, &mut dashboard, Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(from_hardware.voltage, 5.0);

    let simulated = receive(&mut ws, &mut dashboard, Duration::from_secs(2))
        .await
        .unwrap();
    assert!((11.0..=13.0).contains(&simulated.voltage));
    assert!((250.0..=350.0).contains(&simulated.rpm));
}
