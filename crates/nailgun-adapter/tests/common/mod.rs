/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for nailgun-adapter tests

use nailgun_adapter::{ClientConfig, NailgunClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> NailgunClient {
    NailgunClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init")
}

/// Task JSON fixture
pub fn task_json(id: u64, name: &str, status: &str, progress: u8) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "status": status,
        "progress": progress,
        "cluster": 1
    })
}
