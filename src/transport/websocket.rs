//! WebSocket transport
//!
//! Accepts dashboard connections and turns each into a hub subscriber:
//! - every accepted connection is subscribed before anything else happens,
//!   so it sees every record published after that point
//! - a per-connection task drains the subscriber's channel into the socket
//! - the subscription is dropped when the peer closes or the socket errors
//!
//! Handshakes are accepted from any origin. Nothing a client sends is acted
//! upon; the stream is one-directional.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::Utf8Bytes;
use tungstenite::protocol::Message as WsMessage;
use tungstenite::protocol::frame::CloseFrame;
use tungstenite::protocol::frame::coding::CloseCode;

use crate::hub::{self, SharedHub};
use crate::utils::Result;

/// Bind `addr` and serve dashboards until accepting fails.
pub async fn start_websocket_server(addr: &str, hub: SharedHub) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, hub).await
}

/// Serve dashboards on an already-bound listener.
pub async fn serve(listener: TcpListener, hub: SharedHub) -> Result<()> {
    info!(addr = %listener.local_addr()?, "WebSocket server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let hub = hub.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, hub).await {
                warn!(%peer, error = %e, "Connection ended with error");
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, hub: SharedHub) -> Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let subscribed = hub::lock(&hub).subscribe(tx);
    let subscriber_id = match subscribed {
        Ok(id) => id,
        Err(e) => {
            let frame = CloseFrame {
                code: CloseCode::Again,
                reason: Utf8Bytes::from_static("subscriber limit reached"),
            };
            let _ = ws_sender.send(WsMessage::Close(Some(frame))).await;
            return Err(e);
        }
    };
    debug!(%peer, subscriber = %subscriber_id, "Dashboard connected");

    // hub -> socket; ends once the hub drops our sender or the peer is gone
    let forward = {
        let subscriber_id = subscriber_id.clone();
        let hub = hub.clone();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    debug!(subscriber = %subscriber_id, error = %e, "Send failed");
                    hub::lock(&hub).unsubscribe(&subscriber_id);
                    break;
                }
            }
            let _ = ws_sender.close().await;
        })
    };

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(WsMessage::Close(_)) => break,
            Ok(WsMessage::Text(text)) => {
                debug!(
                    subscriber = %subscriber_id,
                    text = text.as_str(),
                    "Ignoring client message"
                );
            }
            Ok(_) => {}
            Err(e) => {
                debug!(subscriber = %subscriber_id, error = %e, "Read failed");
                break;
            }
        }
    }

    hub::lock(&hub).unsubscribe(&subscriber_id);
    let _ = forward.await;
    debug!(%peer, subscriber = %subscriber_id, "Dashboard disconnected");
    Ok(())
}
