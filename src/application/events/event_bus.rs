//! In-process fan-out of workflow events
//!
//! Backed by a `tokio::sync::broadcast` channel. Publishing never blocks;
//! a subscriber that falls more than `capacity` events behind skips ahead
//! and logs how many it missed.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{trace, warn};

use super::types::{Event, EventMessage};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventMessage>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity).0,
        }
    }

    /// Wrap `event` in an envelope and hand it to every live subscriber.
    /// Returns how many received it.
    pub fn publish(&self, event: Event) -> usize {
        let kind = event.event_type();
        metrics::counter!("workflow_events_total", "kind" => kind).increment(1);

        let subject = event.subject_id().to_string();
        let delivered = self.tx.send(EventMessage::new(event)).unwrap_or(0);
        trace!(kind, %subject, delivered, "Workflow event");
        delivered
    }

    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventSubscriber {
    rx: broadcast::Receiver<EventMessage>,
}

impl EventSubscriber {
    /// `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.rx.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(missed)) => warn!(missed, "Event subscriber fell behind"),
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}
