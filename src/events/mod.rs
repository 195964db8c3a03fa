//! Outbound domain notifications.
//!
//! Services publish after their transaction commits. Delivery is
//! best-effort: a full or closed channel is logged and counted, never
//! surfaced to the caller.

use async_trait::async_trait;
use chrono::NaiveDate;
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::entities::batch;
use crate::models::{ApprovalStatus, SnapshotPeriod};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum Event {
    BatchCreated(Box<batch::Model>),
    BatchUpdated(Box<batch::Model>),
    BatchDeleted { batch_id: Uuid, batch_code: String },
    FarmApprovalChanged { farm_id: Uuid, status: ApprovalStatus },
    SnapshotComputed { period: SnapshotPeriod, date: NaiveDate },
}

impl Event {
    /// Channel name used by real-time subscribers.
    pub fn name(&self) -> &'static str {
        match self {
            Event::BatchCreated(_) => "batch-created",
            Event::BatchUpdated(_) => "batch-updated",
            Event::BatchDeleted { .. } => "batch-deleted",
            Event::FarmApprovalChanged { .. } => "farm-approval-changed",
            Event::SnapshotComputed { .. } => "snapshot-computed",
        }
    }

    pub fn batch_id(&self) -> Option<Uuid> {
        match self {
            Event::BatchCreated(b) | Event::BatchUpdated(b) => Some(b.id),
            Event::BatchDeleted { batch_id, .. } => Some(*batch_id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Fire-and-forget publish.
    pub fn emit(&self, event: Event) {
        let name = event.name();
        match self.sender.try_send(event) {
            Ok(()) => {
                counter!("woolchain.events.emitted", 1, "event" => name);
            }
            Err(TrySendError::Full(event)) => {
                counter!("woolchain.events.dropped", 1, "event" => name, "reason" => "full");
                warn!(event = name, batch_id = ?event.batch_id(), "event channel full, notification dropped");
            }
            Err(TrySendError::Closed(event)) => {
                counter!("woolchain.events.dropped", 1, "event" => name, "reason" => "closed");
                warn!(event = name, batch_id = ?event.batch_id(), "event channel closed, notification dropped");
            }
        }
    }
}

/// External real-time fan-out (websocket hub, message broker, ...).
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn deliver(&self, event: &Event) -> Result<(), String>;
}

/// Writes notifications to the log.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn deliver(&self, event: &Event) -> Result<(), String> {
        let payload = serde_json::to_string(event).map_err(|e| e.to_string())?;
        info!(event = event.name(), %payload, "notification");
        Ok(())
    }
}

pub async fn process_events(mut rx: mpsc::Receiver<Event>, transport: Arc<dyn NotificationTransport>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        debug!(event = event.name(), "delivering notification");
        if let Err(e) = transport.deliver(&event).await {
            counter!("woolchain.events.delivery_failed", 1, "event" => event.name());
            error!(event = event.name(), error = %e, "notification delivery failed");
        }
    }

    info!("Event channel closed; processing loop stopped");
}
