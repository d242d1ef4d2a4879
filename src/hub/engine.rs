//! Hub engine
//!
//! The hub owns the set of connected subscribers and fans every telemetry
//! record out to all of them.
//!
//! Concurrency and usage notes:
//! - The API is synchronous and meant to sit behind a lock (`SharedHub`).
//!   Callers must not hold the lock across an `.await`.
//! - Delivery goes through each subscriber's unbounded channel, so `publish`
//!   never waits on a slow connection. A closed channel only affects its own
//!   subscriber; the transport unsubscribes it when the connection ends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::client::{Subscriber, SubscriberId};
use crate::hub::message::ServerEvent;
use crate::telemetry::TelemetryRecord;
use crate::utils::{RelayError, Result};

/// The hub as shared between the relay pump and the accept loop.
pub type SharedHub = Arc<Mutex<Hub>>;

/// Outcome of one publish: one attempt per subscriber registered at the time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn delivered(&self) -> usize {
        self.attempted - self.failed
    }
}

/// The set of connected subscribers.
#[derive(Debug)]
pub struct Hub {
    subscribers: HashMap<SubscriberId, Subscriber>,
    max_subscribers: usize,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_SUBSCRIBERS)
    }
}

impl Hub {
    pub const DEFAULT_MAX_SUBSCRIBERS: usize = 1000;

    /// An empty hub accepting at most `max_subscribers` at a time.
    pub fn new(max_subscribers: usize) -> Self {
        Self {
            subscribers: HashMap::new(),
            max_subscribers,
        }
    }

    pub fn shared(self) -> SharedHub {
        Arc::new(Mutex::new(self))
    }

    /// Register a new subscriber. It receives every record published from now
    /// on; nothing published earlier is replayed.
    pub fn subscribe(&mut self, sender: UnboundedSender<WsMessage>) -> Result<SubscriberId> {
        if self.subscribers.len() >= self.max_subscribers {
            warn!(
                limit = self.max_subscribers,
                "Refusing subscriber: limit reached"
            );
            return Err(RelayError::SubscriberLimit(self.max_subscribers));
        }

        let subscriber = Subscriber::new(sender);
        let id = subscriber.id.clone();
        self.subscribers.insert(id.clone(), subscriber);
        info!(subscriber = %id, total = self.subscribers.len(), "Subscriber connected");
        Ok(id)
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: &SubscriberId) -> bool {
        let removed = self.subscribers.remove(id).is_some();
        if removed {
            info!(subscriber = %id, total = self.subscribers.len(), "Subscriber disconnected");
        } else {
            debug!(subscriber = %id, "Unsubscribe for unknown subscriber ignored");
        }
        removed
    }

    /// Publish a record to every subscriber as a `turbine-data` event.
    pub fn publish(&self, record: &TelemetryRecord) -> DeliveryReport {
        self.broadcast(&ServerEvent::turbine_data(*record))
    }

    /// Serialize `event` once and attempt delivery to every subscriber.
    pub fn broadcast(&self, event: &ServerEvent) -> DeliveryReport {
        let ws_msg = match event.to_ws_message() {
            Ok(msg) => msg,
            Err(e) => {
                error!(error = %e, "Failed to serialize event");
                return DeliveryReport::default();
            }
        };

        let mut report = DeliveryReport::default();
        for (id, subscriber) in &self.subscribers {
            report.attempted += 1;
            // only fails once the connection side is gone; the transport
            // unsubscribes it shortly
            if subscriber.deliver(ws_msg.clone()).is_err() {
                report.failed += 1;
                debug!(subscriber = %id, "Subscriber channel closed, event skipped");
            }
        }
        report
    }

    /// Whether `id` is currently subscribed.
    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.subscribers.contains_key(id)
    }

    /// Number of connected subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Lock a shared hub, recovering the guard if a previous holder panicked.
/// No hub method leaves the subscriber map half-updated.
pub fn lock(hub: &Mutex<Hub>) -> MutexGuard<'_, Hub> {
    hub.lock().unwrap_or_else(PoisonError::into_inner)
}
