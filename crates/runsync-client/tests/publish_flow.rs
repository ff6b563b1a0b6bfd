//! Publisher driving RunsClient against a mock service.

use std::sync::Arc;

use runsync_client::{ClientConfig, RunsClient};
use runsync_core::{
    JsonResultReader, PublishError, PublisherConfig, RunAttachmentMode, RunContext,
    ServiceError, TestRunPublisher,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn publisher(mock_server: &MockServer) -> TestRunPublisher {
    let client = RunsClient::new(
        ClientConfig::default()
            .with_url(mock_server.uri())
            .with_token("test-token")
            .with_max_retries(0),
    )
    .expect("failed to create client");

    TestRunPublisher::new(
        Arc::new(client),
        Arc::new(JsonResultReader),
        PublisherConfig::new("Project1"),
    )
}

#[tokio::test]
async fn publishes_json_results_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("run.trx"), "<TestRun/>").unwrap();
    std::fs::write(dir.path().join("screenshot.png"), [0x89, 0x50]).unwrap();
    let results_file = dir.path().join("results.json");
    std::fs::write(
        &results_file,
        serde_json::to_vec(&json!({
            "name": "from-file",
            "attachments": ["run.trx"],
            "results": [
                { "testCaseTitle": "adds", "outcome": "Passed" },
                {
                    "testCaseTitle": "subtracts",
                    "outcome": "Failed",
                    "attachments": ["screenshot.png"],
                    "consoleLog": "expected 1 got 2"
                }
            ]
        }))
        .unwrap(),
    )
    .unwrap();

    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs"))
        .and(body_partial_json(json!({ "name": "nightly", "build": { "id": 42 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "nightly" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs/1/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "value": [{ "id": 100 }, { "id": 101 }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs/1/results/101/attachments"))
        .and(body_partial_json(json!({ "attachmentType": "GeneralAttachment", "fileName": "screenshot.png" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs/1/results/101/attachments"))
        .and(body_partial_json(json!({ "attachmentType": "ConsoleLog" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/Project1/_apis/test/runs/1"))
        .and(body_partial_json(json!({ "state": "Completed" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Project1/_apis/test/runs/1/attachments"))
        .and(body_partial_json(json!({ "attachmentType": "TmiTestRunSummary", "fileName": "run.trx" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let publisher = publisher(&mock_server);
    let mut context = RunContext::new("ci", "x64", "Release", 42, "", "", "");
    let run = publisher
        .read_results_from_file(&mut context, &results_file, Some("nightly"))
        .unwrap();

    let handle = publisher.start(&run).await.unwrap();
    let ids = publisher.add_results(&handle, &run.results).await.unwrap();
    publisher
        .end(&run, &handle, RunAttachmentMode::Individual)
        .await
        .unwrap();

    assert_eq!(ids, vec![100, 101]);
}

#[tokio::test]
async fn create_failure_surfaces_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let publisher = publisher(&mock_server);
    let err = publisher
        .start(&runsync_core::RunData::new("nightly"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PublishError::RunCreateFailed {
            source: Some(ServiceError::Unauthorized { .. }),
            ..
        }
    ));
}
