//! HTTP transport against a mocked public API

use std::time::Duration;

use acp_client::HttpSessionApi;
use acp_core::{
    ClusterTarget, ListQuery, LogOptions, RemoteError, RemoteSessionApi, SessionOperations,
    SessionPatch, SessionSpec, SessionStatus, TranscriptFormat,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn target(server: &MockServer) -> ClusterTarget {
    ClusterTarget::new(server.uri(), "my-project", "test-token")
}

fn api() -> HttpSessionApi {
    HttpSessionApi::new().unwrap()
}

#[tokio::test]
async fn test_list_sends_auth_and_project_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("x-ambient-project", "my-project"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "session-1", "status": "Running"},
                {"id": "session-2", "status": "stopped"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = api()
        .list(&target(&server), &ListQuery::default())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].status, SessionStatus::Running);
    assert_eq!(page.total, None);
}

#[tokio::test]
async fn test_list_forwards_label_selector_and_total() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions"))
        .and(query_param("labelSelector", "acp.ambient-code.io/env=test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "a", "status": "running"}],
            "total": 7
        })))
        .mount(&server)
        .await;

    let query = ListQuery {
        label_selector: Some("acp.ambient-code.io/env=test".to_string()),
    };
    let page = api().list(&target(&server), &query).await.unwrap();

    assert_eq!(page.total, Some(7));
    assert_eq!(page.match_count(), 7);
}

#[tokio::test]
async fn test_trailing_slash_on_server_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions/session-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "session-1", "status": "running"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let target = ClusterTarget::new(format!("{}/", server.uri()), "my-project", "test-token");
    let session = api().get(&target, "session-1").await.unwrap();
    assert_eq!(session.id, "session-1");
}

#[tokio::test]
async fn test_status_codes_map_to_remote_errors() {
    let server = MockServer::start().await;
    Mock::given(path("/v1/sessions/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(path("/v1/sessions/locked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(path("/v1/sessions/expired"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(path("/v1/sessions/broken"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "database unavailable"})),
        )
        .mount(&server)
        .await;

    let api = api();
    let target = target(&server);

    assert!(matches!(
        api.get(&target, "missing").await,
        Err(RemoteError::NotFound)
    ));
    assert!(matches!(
        api.get(&target, "locked").await,
        Err(RemoteError::Forbidden)
    ));
    assert!(matches!(
        api.get(&target, "expired").await,
        Err(RemoteError::Unauthorized)
    ));

    match api.get(&target, "broken").await {
        Err(RemoteError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_without_json_body_keeps_text() {
    let server = MockServer::start().await;
    Mock::given(path("/v1/sessions/bad"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream reset"))
        .mount(&server)
        .await;

    match api().get(&target(&server), "bad").await {
        Err(RemoteError::Api { message, .. }) => assert_eq!(message, "HTTP 502: upstream reset"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_posts_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sessions"))
        .and(body_json(json!({
            "displayName": "Fix bug",
            "initialPrompt": "Fix the flaky test",
            "interactive": false,
            "timeout": 900
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "session-42"})))
        .expect(1)
        .mount(&server)
        .await;

    let spec = SessionSpec {
        display_name: Some("Fix bug".to_string()),
        initial_prompt: Some("Fix the flaky test".to_string()),
        timeout: Some(900),
        ..Default::default()
    };
    let id = api().create(&target(&server), &spec).await.unwrap();
    assert_eq!(id, "session-42");
}

#[tokio::test]
async fn test_delete_and_patch_accept_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/sessions/session-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v1/sessions/session-1"))
        .and(body_json(json!({"stopped": true})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = api();
    let target = target(&server);

    api.delete(&target, "session-1").await.unwrap();
    let session = api
        .patch(&target, "session-1", &SessionPatch::stop())
        .await
        .unwrap();
    assert_eq!(session.id, "session-1");
}

#[tokio::test]
async fn test_logs_request_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sessions/session-1/logs"))
        .and(header("accept", "text/plain"))
        .and(query_param("tailLines", "50"))
        .and(query_param("container", "runner"))
        .respond_with(ResponseTemplate::new(200).set_body_string("line 1\nline 2\n"))
        .mount(&server)
        .await;

    let options = LogOptions {
        container: Some("runner".to_string()),
        tail_lines: 50,
    };
    let logs = api()
        .get_logs(&target(&server), "session-1", &options)
        .await
        .unwrap();
    assert_eq!(logs, "line 1\nline 2\n");
}

#[tokio::test]
async fn test_transcript_and_metrics() {
    let server = MockServer::start().await;
    Mock::given(path("/v1/sessions/session-1/transcript"))
        .and(query_param("format", "markdown"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "# Session"})))
        .mount(&server)
        .await;
    Mock::given(path("/v1/sessions/session-1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tokens": 1200})))
        .mount(&server)
        .await;

    let api = api();
    let target = target(&server);

    let transcript = api
        .get_transcript(&target, "session-1", TranscriptFormat::Markdown)
        .await
        .unwrap();
    assert_eq!(transcript["content"], "# Session");

    let metrics = api.get_metrics(&target, "session-1").await.unwrap();
    assert_eq!(metrics["tokens"], 1200);
}

#[tokio::test]
async fn test_slow_response_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(path("/v1/sessions/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "slow"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let api = HttpSessionApi::with_timeout(Duration::from_millis(100)).unwrap();
    assert!(matches!(
        api.get(&target(&server), "slow").await,
        Err(RemoteError::Timeout)
    ));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(path("/v1/sessions/odd"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    assert!(matches!(
        api().get(&target(&server), "odd").await,
        Err(RemoteError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_bulk_stop_through_http_transport() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v1/sessions/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a", "status": "stopped"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v1/sessions/b"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let ops = SessionOperations::new(api());
    let report = ops
        .bulk_stop_sessions(
            &target(&server),
            vec!["a".to_string(), "b".to_string()],
            true,
            false,
        )
        .await
        .unwrap();

    let value = serde_json::to_value(report).unwrap();
    assert_eq!(value["status"], "partially_failed");
    assert_eq!(value["succeeded"], json!(["a"]));
    assert_eq!(value["failed"][0]["id"], "b");
}
