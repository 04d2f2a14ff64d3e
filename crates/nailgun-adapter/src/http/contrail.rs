/*
[INPUT]:  Cluster identifier and contrail settings
[OUTPUT]: Stored/default contrail settings
[POS]:    HTTP layer - contrail overlay endpoints
[UPDATE]: When contrail attribute schema changes
*/

use crate::http::{NailgunClient, Result};
use crate::types::ContrailSettings;
use reqwest::Method;

impl NailgunClient {
    /// Fetch the cluster contrail settings
    ///
    /// GET /api/clusters/{id}/contrail
    pub async fn get_contrail_settings(&self, cluster_id: u64) -> Result<ContrailSettings> {
        let endpoint = format!("/api/clusters/{}/contrail", cluster_id);
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(&endpoint, builder).await
    }

    /// Save the cluster contrail settings
    ///
    /// PUT /api/clusters/{id}/contrail
    /// Fails with `Forbidden` once the cluster is deployed or deploying.
    pub async fn update_contrail_settings(
        &self,
        cluster_id: u64,
        settings: &ContrailSettings,
    ) -> Result<ContrailSettings> {
        let endpoint = format!("/api/clusters/{}/contrail", cluster_id);
        let builder = self.request(Method::PUT, &endpoint)?.json(settings);
        self.send_json(&endpoint, builder).await
    }

    /// Fetch default contrail settings
    ///
    /// GET /api/clusters/{id}/contrail/defaults
    pub async fn get_contrail_defaults(&self, cluster_id: u64) -> Result<ContrailSettings> {
        let endpoint = format!("/api/clusters/{}/contrail/defaults", cluster_id);
        let builder = self.request(Method::GET, &endpoint)?;
        self.send_json(&endpoint, builder).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, NailgunClient, NailgunError};
    use crate::types::{ContrailAttributes, ContrailSettings, DEFAULT_AS_NUMBER, WanGateway};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> NailgunClient {
        NailgunClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .expect("client init")
    }

    #[tokio::test]
    async fn test_get_contrail_settings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clusters/1/contrail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "editable": {
                    "as_number": 64600,
                    "wan_gateways": [{"hostname": "gw1", "ip": "10.0.0.1"}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = client(&server)
            .get_contrail_settings(1)
            .await
            .expect("get_contrail_settings failed");

        let expected = ContrailSettings {
            editable: ContrailAttributes {
                as_number: 64600,
                wan_gateways: vec![WanGateway {
                    hostname: "gw1".to_string(),
                    ip: "10.0.0.1".to_string(),
                }],
            },
        };
        assert_eq!(settings, expected);
    }

    #[tokio::test]
    async fn test_update_contrail_settings_locked() {
        let server = MockServer::start().await;
        let settings = ContrailSettings::default();
        Mock::given(method("PUT"))
            .and(path("/api/clusters/1/contrail"))
            .and(body_json(serde_json::json!({
                "editable": {"as_number": DEFAULT_AS_NUMBER, "wan_gateways": []}
            })))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_string("Environment attributes can't be changed after, or in deploy."),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .update_contrail_settings(1, &settings)
            .await
            .expect_err("locked cluster");
        assert!(matches!(err, NailgunError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_get_contrail_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/clusters/1/contrail/defaults"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "editable": {"as_number": 64512, "wan_gateways": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let defaults = client(&server)
            .get_contrail_defaults(1)
            .await
            .expect("get_contrail_defaults failed");
        assert_eq!(defaults, ContrailSettings::default());
    }
}
