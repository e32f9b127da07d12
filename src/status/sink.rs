//! Status sink implementations

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::Notification;

/// Receiver of progress notifications
///
/// Implementations must not block and must swallow their own failures.
pub trait StatusSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl StatusSink for NoopSink {
    fn notify(&self, _notification: Notification) {}
}

/// Sink that forwards notifications to `tracing` at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::StatusUpdate(update) => {
                tracing::debug!(status = ?update.status, "{}", update.message);
            }
            Notification::AnalystUpdate(update) => {
                tracing::debug!(analyst = %update.analyst, queries = ?update.queries, "analyst queries");
            }
        }
    }
}

/// Notification stamped with its job and send time
#[derive(Debug, Clone)]
pub struct JobMessage {
    pub job_id: String,
    pub timestamp: DateTime<Utc>,
    pub notification: Notification,
}

impl JobMessage {
    /// Wire form: the notification envelope plus an RFC 3339 `timestamp`
    pub fn to_json(&self) -> Value {
        let mut value = serde_json::to_value(&self.notification).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.insert(
                "timestamp".to_string(),
                Value::String(self.timestamp.to_rfc3339()),
            );
        }
        value
    }
}

/// Sink that queues notifications for one job on an unbounded channel
///
/// The receiving half is handed to whatever transport delivers updates to
/// clients. Sends after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    job_id: String,
    tx: UnboundedSender<JobMessage>,
}

impl ChannelSink {
    pub fn new(job_id: impl Into<String>) -> (Self, UnboundedReceiver<JobMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                job_id: job_id.into(),
                tx,
            },
            rx,
        )
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

impl StatusSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        let message = JobMessage {
            job_id: self.job_id.clone(),
            timestamp: Utc::now(),
            notification,
        };
        if self.tx.send(message).is_err() {
            tracing::trace!(job_id = %self.job_id, "status receiver dropped");
        }
    }
}
