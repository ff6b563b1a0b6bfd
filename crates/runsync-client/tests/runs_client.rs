//! Integration tests for RunsClient.
//!
//! Uses wiremock for HTTP mocking. Tests cover each endpoint, status mapping
//! (401/403/404/400/429/5xx), and retry behavior.

use std::time::Duration;

use runsync_client::{ClientConfig, RunsClient, CLIENT_USER_AGENT};
use runsync_core::{
    AttachmentKind, AttachmentRequest, RemoteRunHandle, ResultData, RunData, RunUpdateModel,
    RunsService, ServiceError, TestOutcome,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "Project1";

fn create_test_client(mock_server: &MockServer) -> RunsClient {
    let config = ClientConfig::default()
        .with_url(mock_server.uri())
        .with_token("test-token")
        .with_max_retries(0);
    RunsClient::new(config).expect("failed to create client")
}

#[tokio::test]
async fn test_create_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs"))
        .and(query_param("api-version", "5.0"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("user-agent", CLIENT_USER_AGENT))
        .and(body_partial_json(json!({ "name": "nightly", "automated": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "TestRun",
            "state": "InProgress",
            "url": "http://example/runs/1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let handle = client
        .create_run(PROJECT, &RunData::new("nightly"))
        .await
        .expect("create run failed");

    assert_eq!(handle, RemoteRunHandle::new(1, "TestRun"));
}

#[tokio::test]
async fn test_update_run_sends_completed_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/Project1/_apis/test/runs/42"))
        .and(body_json(json!({ "state": "Completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    client
        .update_run(PROJECT, 42, &RunUpdateModel::completed(None))
        .await
        .expect("update failed");
}

#[tokio::test]
async fn test_add_results_returns_ids_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs/1/results"))
        .and(body_partial_json(json!([
            { "testCaseTitle": "a", "outcome": "Passed" },
            { "testCaseTitle": "b", "outcome": "Failed" }
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "value": [{ "id": 100000 }, { "id": 100001 }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let results = vec![
        ResultData::new("a", TestOutcome::Passed),
        ResultData::new("b", TestOutcome::Failed).with_console_log("not sent"),
    ];
    let ids = client
        .add_results(&results, PROJECT, 1)
        .await
        .expect("add results failed");

    assert_eq!(ids, vec![100000, 100001]);
}

#[tokio::test]
async fn test_add_results_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs/1/results"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client
        .add_results(&[ResultData::default()], PROJECT, 1)
        .await;

    assert!(matches!(result, Err(ServiceError::InvalidResponse { .. })));
}

#[tokio::test]
async fn test_run_attachment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs/1/attachments"))
        .and(body_json(json!({
            "attachmentType": "TmiTestRunSummary",
            "fileName": "run.trx",
            "comment": "",
            "stream": "PFRlc3RSdW4vPg=="
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let request = AttachmentRequest::from_bytes(AttachmentKind::RunSummary, "run.trx", b"<TestRun/>");
    client
        .create_run_attachment(&request, PROJECT, 1)
        .await
        .expect("attachment failed");
}

#[tokio::test]
async fn test_result_attachment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs/1/results/100000/attachments"))
        .and(body_partial_json(json!({
            "attachmentType": "ConsoleLog",
            "fileName": "Standard_Console_Output.log"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let request = AttachmentRequest::console_log("hello").unwrap();
    client
        .create_result_attachment(&request, PROJECT, 1, 100000)
        .await
        .expect("attachment failed");
}

#[tokio::test]
async fn test_status_mapping() {
    let cases: [(u16, fn(&ServiceError) -> bool); 5] = [
        (401, |e| matches!(e, ServiceError::Unauthorized { .. })),
        (403, |e| matches!(e, ServiceError::Unauthorized { .. })),
        (404, |e| matches!(e, ServiceError::NotFound { .. })),
        (400, |e| matches!(e, ServiceError::Rejected { status: 400, .. })),
        (503, |e| matches!(e, ServiceError::Server { status: 503, .. })),
    ];

    for (status, expected) in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client
            .create_run(PROJECT, &RunData::new("x"))
            .await
            .unwrap_err();
        assert!(expected(&err), "HTTP {status} mapped to {err:?}");
    }
}

#[tokio::test]
async fn test_rejected_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad run"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::default()
        .with_url(mock_server.uri())
        .with_max_retries(3);
    let client = RunsClient::new(config).unwrap();
    let err = client
        .create_run(PROJECT, &RunData::new("x"))
        .await
        .unwrap_err();

    match err {
        ServiceError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad run");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limiting_with_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.create_run(PROJECT, &RunData::new("x")).await;

    match result {
        Err(ServiceError::RateLimited { retry_after }) => {
            assert_eq!(retry_after, Some(Duration::from_secs(5)));
        }
        other => panic!("expected RateLimited error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/Project1/_apis/test/runs/1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/Project1/_apis/test/runs/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::default()
        .with_url(mock_server.uri())
        .with_max_retries(1);
    let client = RunsClient::new(config).unwrap();

    client
        .update_run(PROJECT, 1, &RunUpdateModel::completed(None))
        .await
        .expect("retry should succeed");
}

#[tokio::test]
async fn test_network_error_is_retryable() {
    let config = ClientConfig::default()
        .with_url("http://127.0.0.1:9")
        .with_max_retries(0)
        .with_timeout_secs(2);
    let client = RunsClient::new(config).unwrap();

    let err = client
        .create_run(PROJECT, &RunData::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Network { .. }));
    assert!(err.is_retryable());
}
