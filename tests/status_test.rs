//! Notification wire format and channel delivery

use briefcraft::status::{AnalystUpdate, ChannelSink, Notification, Status, StatusSink, StatusUpdate};
use serde_json::json;

#[test]
fn test_status_update_wire_format() {
    let notification: Notification = StatusUpdate::new(
        Status::QuerySearched,
        "Found 3 results for: Acme Corp recent news",
    )
    .with_result(json!({
        "step": "Searching",
        "query": "Acme Corp recent news",
        "results_count": 3,
    }))
    .into();

    insta::assert_json_snapshot!(notification, @r###"
    {
      "type": "status_update",
      "data": {
        "status": "query_searched",
        "message": "Found 3 results for: Acme Corp recent news",
        "error": null,
        "result": {
          "query": "Acme Corp recent news",
          "results_count": 3,
          "step": "Searching"
        }
      }
    }
    "###);
}

#[test]
fn test_analyst_update_wire_format() {
    let notification: Notification = AnalystUpdate {
        analyst: "financial_analyst".to_string(),
        queries: vec![
            "Acme Corp revenue 2024".to_string(),
            "Acme Corp funding rounds".to_string(),
        ],
    }
    .into();

    insta::assert_json_snapshot!(notification, @r###"
    {
      "type": "analyst_update",
      "data": {
        "analyst": "financial_analyst",
        "queries": [
          "Acme Corp revenue 2024",
          "Acme Corp funding rounds"
        ]
      }
    }
    "###);
}

#[tokio::test]
async fn test_channel_sink_stamps_job() {
    let (sink, mut rx) = ChannelSink::new("job-42");
    sink.notify(StatusUpdate::new(Status::ResearchStart, "Starting research for Acme Corp").into());

    let message = rx.recv().await.expect("message");
    assert_eq!(message.job_id, "job-42");

    let wire = message.to_json();
    assert_eq!(wire["type"], "status_update");
    assert_eq!(wire["data"]["status"], "research_start");
    assert!(wire["timestamp"].as_str().is_some());
}

#[test]
fn test_channel_sink_after_receiver_dropped() {
    let (sink, rx) = ChannelSink::new("job-43");
    drop(rx);
    // Must not panic
    sink.notify(StatusUpdate::new(Status::Error, "late").into());
    assert_eq!(sink.job_id(), "job-43");
}
