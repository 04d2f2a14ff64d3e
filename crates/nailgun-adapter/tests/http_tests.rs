/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for HTTP client through the ClusterApi seam
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use std::sync::Arc;

use common::{client_for, setup_mock_server, task_json};
use nailgun_adapter::{ClientConfig, ClusterApi, NailgunClient, NailgunError, TaskStatus};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_client_creation() {
    let _client = assert_ok!(NailgunClient::new());
}

#[test]
fn test_client_with_config() {
    let config = ClientConfig::default();
    let _client = assert_ok!(NailgunClient::with_config(config));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let result = NailgunClient::with_config_and_base_url(ClientConfig::default(), "not a url");
    assert!(matches!(result, Err(NailgunError::UrlParse(_))));
}

#[test]
fn test_auth_token_roundtrip() {
    let mut client = assert_ok!(NailgunClient::new());
    assert!(client.auth_token().is_none());
    client.set_auth_token("token-1");
    assert_eq!(client.auth_token(), Some("token-1"));
}

#[tokio::test]
async fn test_task_poll_through_trait_object() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(7, "deploy", "ready", 100)))
        .expect(1)
        .mount(&server)
        .await;

    let api: Arc<dyn ClusterApi> = Arc::new(client_for(&server));
    let task = assert_ok!(api.get_task(7).await);
    assert_eq!(task.status, TaskStatus::Ready);
    assert_eq!(task.progress, 100);
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/clusters/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"id\": \"oops\"}"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_cluster(1)
        .await
        .expect_err("malformed cluster");
    assert!(matches!(err, NailgunError::Serialization(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_server_is_retryable() {
    let client = assert_ok!(NailgunClient::with_config_and_base_url(
        ClientConfig::default(),
        "http://127.0.0.1:9"
    ));

    let err = client.list_nodes(1).await.expect_err("nothing listens on the discard port");
    assert!(err.is_retryable());
}
