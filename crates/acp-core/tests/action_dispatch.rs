//! Dispatching flat JSON arguments through the action catalog.

mod common;

use acp_core::{AcpError, Action, SessionOperations, ValidationError};
use common::{labeled, running, target, Call, FakeApi};
use serde_json::json;

#[tokio::test]
async fn test_dispatch_list_sessions() {
    let api = FakeApi::with_sessions(running(&["b", "a"]));
    let ops = SessionOperations::new(api.clone());

    let value = Action::ListSessions
        .dispatch(json!({"project": "my-project", "sort_by": "name"}), &ops, &target())
        .await
        .unwrap();

    assert_eq!(value["total"], 2);
    assert_eq!(value["sessions"][0]["id"], "a");
    assert_eq!(value["filters_applied"], json!({"sort_by": "name"}));
}

#[tokio::test]
async fn test_dispatch_missing_required_argument() {
    let api = FakeApi::new();
    let ops = SessionOperations::new(api.clone());

    let err = Action::GetSession
        .dispatch(json!({}), &ops, &target())
        .await
        .unwrap_err();

    match err {
        AcpError::Validation(ValidationError::Arguments(message)) => {
            assert!(message.contains("session"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_dispatch_bulk_without_confirm() {
    let api = FakeApi::with_sessions(running(&["a", "b"]));
    let ops = SessionOperations::new(api.clone());

    let err = Action::BulkDeleteSessions
        .dispatch(json!({"sessions": ["a", "b"]}), &ops, &target())
        .await
        .unwrap_err();

    assert!(matches!(err, AcpError::ConfirmationRequired { .. }));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_dispatch_bulk_outcome_shape() {
    let api = FakeApi::with_sessions(running(&["a"]));
    let ops = SessionOperations::new(api.clone());

    let value = Action::BulkStopSessions
        .dispatch(json!({"sessions": ["a"], "confirm": true}), &ops, &target())
        .await
        .unwrap();

    assert_eq!(
        value,
        json!({
            "operation": "stop",
            "status": "completed",
            "succeeded": ["a"],
            "failed": []
        })
    );
}

#[tokio::test]
async fn test_dispatch_bulk_dry_run_shape() {
    let api = FakeApi::with_sessions(vec![labeled("a", &[("env", "test")])]);
    let ops = SessionOperations::new(api.clone());

    let value = Action::BulkDeleteSessionsByLabel
        .dispatch(json!({"labels": {"env": "test"}, "dry_run": true}), &ops, &target())
        .await
        .unwrap();

    assert_eq!(value["dry_run"], true);
    assert_eq!(value["would_execute"], json!([{"id": "a", "status": "running"}]));
    assert_eq!(value["labels_filter"], json!({"env": "test"}));
    assert!(api.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_dispatch_label_resource() {
    let api = FakeApi::with_sessions(running(&["a"]));
    let ops = SessionOperations::new(api.clone());

    let value = Action::LabelSession
        .dispatch(
            json!({"name": "a", "resource_type": "agenticsession", "labels": {"env": "qa"}}),
            &ops,
            &target(),
        )
        .await
        .unwrap();

    assert_eq!(value["labels_added"], json!({"env": "qa"}));
    assert!(matches!(api.calls()[0], Call::Patch(..)));
}

#[tokio::test]
async fn test_dispatch_update_with_no_fields() {
    let api = FakeApi::with_sessions(running(&["a"]));
    let ops = SessionOperations::new(api.clone());

    let err = Action::UpdateSession
        .dispatch(json!({"session": "a"}), &ops, &target())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "no fields to update. Provide display_name or timeout"
    );
    assert!(api.calls().is_empty());
}
