//! Subscriber representation
//!
//! `Subscriber` models one connected dashboard and holds the sending side of
//! its per-connection channel. The transport drains the receiving side into
//! the WebSocket.

use tokio::sync::mpsc::{UnboundedSender, error::SendError};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

/// Opaque handle identifying a subscriber for its connection's lifetime.
pub type SubscriberId = String;

#[derive(Debug)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub sender: UnboundedSender<WsMessage>,
}

impl Subscriber {
    /// Create a subscriber around a sender channel with a fresh UUID-based id.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: format!("subscriber-{}", Uuid::new_v4()),
            sender,
        }
    }

    /// Queue a message for this subscriber. Fails only once the connection's
    /// receiving side is gone.
    pub fn deliver(&self, msg: WsMessage) -> Result<(), SendError<WsMessage>> {
        self.sender.send(msg)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
