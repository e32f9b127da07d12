//! Status notifications
//!
//! Research steps report progress through a [`StatusSink`]. Sinks are
//! fire-and-forget: `notify` never blocks and never fails, and a missing
//! sink is represented by [`NoopSink`].

mod sink;

pub use sink::{ChannelSink, JobMessage, NoopSink, StatusSink, TracingSink};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status kind carried by a status update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    ResearchStart,
    SearchStart,
    SiteScrapeStart,
    SiteScrapeComplete,
    SiteScrapeError,
    SiteScrapeSkip,
    ContextComplete,
    GroundingComplete,
    QueryGenerating,
    QueryGenerated,
    Processing,
    QuerySearching,
    QuerySearched,
    QueryError,
    SearchComplete,
    CollectionComplete,
    EditorComplete,
    Error,
}

/// A status update: what happened, a human message and a structured payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: Status,
    pub message: String,
    pub error: Option<String>,
    pub result: Option<Value>,
}

impl StatusUpdate {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
            result: None,
        }
    }

    /// Attach a structured payload
    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Attach an error description
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Queries chosen by one analyst
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalystUpdate {
    pub analyst: String,
    pub queries: Vec<String>,
}

/// Notification envelope, serialized as `{"type": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notification {
    StatusUpdate(StatusUpdate),
    AnalystUpdate(AnalystUpdate),
}

impl From<StatusUpdate> for Notification {
    fn from(update: StatusUpdate) -> Self {
        Notification::StatusUpdate(update)
    }
}

impl From<AnalystUpdate> for Notification {
    fn from(update: AnalystUpdate) -> Self {
        Notification::AnalystUpdate(update)
    }
}

impl Notification {
    /// Status of a status update, `None` for analyst updates
    pub fn status(&self) -> Option<Status> {
        match self {
            Notification::StatusUpdate(update) => Some(update.status),
            Notification::AnalystUpdate(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&Status::QueryGenerated).unwrap();
        assert_eq!(json, "\"query_generated\"");
    }

    #[test]
    fn test_status_update_builder() {
        let update = StatusUpdate::new(Status::QueryError, "Search failed for: acme")
            .with_result(json!({"query": "acme"}))
            .with_error("timeout");
        assert_eq!(update.status, Status::QueryError);
        assert_eq!(update.error.as_deref(), Some("timeout"));
        assert_eq!(update.result.unwrap()["query"], "acme");
    }

    #[test]
    fn test_notification_envelope() {
        let notification: Notification =
            StatusUpdate::new(Status::Processing, "Using Tavily search...").into();
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "status_update");
        assert_eq!(value["data"]["status"], "processing");
        assert_eq!(notification.status(), Some(Status::Processing));
    }

    #[test]
    fn test_analyst_update_envelope() {
        let notification: Notification = AnalystUpdate {
            analyst: "news_analyst".to_string(),
            queries: vec!["Acme Corp recent news".to_string()],
        }
        .into();
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["type"], "analyst_update");
        assert_eq!(value["data"]["queries"][0], "Acme Corp recent news");
        assert!(notification.status().is_none());
    }
}
