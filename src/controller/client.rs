use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;

use super::types::*;
use super::{ControllerApi, ControllerError, ControllerSession, Result};

const AUTH_PATH: &str = "/dna/system/api/v1/auth/token";
const INTENT: &str = "/dna/intent/api/v1";

/// Catalyst Center REST client
pub struct ControllerClient {
    client: Client,
}

impl ControllerClient {
    /// `verify_tls = false` accepts the controller's self-signed certificate.
    pub fn new(verify_tls: bool) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self { client })
    }

    fn api_url(base_url: &str, path: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, session: &ControllerSession, path: &str) -> RequestBuilder {
        self.client
            .request(method, Self::api_url(&session.base_url, path))
            .header("X-Auth-Token", &session.access_token)
            .header("Accept", "application/json")
    }

    /// Send and fail on any non-2xx status
    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let resp = req.send().await.map_err(transport_error)?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }
        Ok(resp)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        self.send(req)
            .await?
            .json()
            .await
            .map_err(|e| ControllerError::Remote(format!("invalid response body: {}", e)))
    }
}

/// Map an HTTP status to the workflow's error taxonomy
pub(crate) fn status_error(status: StatusCode, body: String) -> ControllerError {
    let msg = format!("{}: {}", status, body);
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ControllerError::Auth(msg)
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        ControllerError::Transient(msg)
    } else {
        ControllerError::Remote(msg)
    }
}

fn transport_error(e: reqwest::Error) -> ControllerError {
    if e.is_timeout() || e.is_connect() {
        ControllerError::Transient(e.to_string())
    } else {
        ControllerError::Remote(e.to_string())
    }
}

#[async_trait]
impl ControllerApi for ControllerClient {
    async fn authenticate(&self, base_url: &str, username: &str, password: &str) -> Result<String> {
        // Any failure here (bad credentials, unreachable host, TLS) is an auth failure
        let resp = self
            .client
            .post(Self::api_url(base_url, AUTH_PATH))
            .basic_auth(username, Some(password))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ControllerError::Auth(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ControllerError::Auth(format!("{}: {}", status, body)));
        }

        let token: AuthToken = resp
            .json()
            .await
            .map_err(|e| ControllerError::Auth(format!("invalid token response: {}", e)))?;
        Ok(token.token)
    }

    async fn list_devices(&self, session: &ControllerSession, family: &str, hostname: &str) -> Result<Vec<NetworkDevice>> {
        let req = self
            .request(Method::GET, session, &format!("{}/network-device", INTENT))
            .query(&[("family", family), ("hostname", hostname)]);
        let env: Envelope<Vec<NetworkDevice>> = self.get_json(req).await?;
        Ok(env.response)
    }

    async fn device_detail(&self, session: &ControllerSession, device_id: &str) -> Result<DeviceDetail> {
        let req = self
            .request(Method::GET, session, &format!("{}/device-detail", INTENT))
            .query(&[("identifier", "uuid"), ("searchBy", device_id)]);
        let env: Envelope<DeviceDetail> = self.get_json(req).await?;
        Ok(env.response)
    }

    async fn device_interfaces(&self, session: &ControllerSession, device_id: &str) -> Result<Vec<DeviceInterface>> {
        let req = self.request(
            Method::GET,
            session,
            &format!("{}/interface/network-device/{}", INTENT, device_id),
        );
        let env: Envelope<Vec<DeviceInterface>> = self.get_json(req).await?;
        Ok(env.response)
    }

    // --- Template programmer ---

    async fn list_projects(&self, session: &ControllerSession, name: &str) -> Result<Vec<Project>> {
        let req = self
            .request(Method::GET, session, &format!("{}/template-programmer/project", INTENT))
            .query(&[("name", name)]);
        self.get_json(req).await
    }

    async fn list_templates(&self, session: &ControllerSession, project_id: &str) -> Result<Vec<TemplateSummary>> {
        let req = self
            .request(Method::GET, session, &format!("{}/template-programmer/template", INTENT))
            .query(&[("projectId", project_id)]);
        self.get_json(req).await
    }

    async fn create_template(&self, session: &ControllerSession, project_id: &str, body: &TemplateBody) -> Result<()> {
        let req = self
            .request(
                Method::POST,
                session,
                &format!("{}/template-programmer/project/{}/template", INTENT, project_id),
            )
            .json(body);
        self.send(req).await?;
        Ok(())
    }

    async fn update_template(&self, session: &ControllerSession, body: &TemplateBody) -> Result<()> {
        let req = self
            .request(Method::PUT, session, &format!("{}/template-programmer/template", INTENT))
            .json(body);
        self.send(req).await?;
        Ok(())
    }

    async fn version_template(&self, session: &ControllerSession, template_id: &str, comments: &str) -> Result<()> {
        let req = self
            .request(Method::POST, session, &format!("{}/template-programmer/template/version", INTENT))
            .json(&VersionRequest {
                template_id: template_id.to_string(),
                comments: comments.to_string(),
            });
        self.send(req).await?;
        Ok(())
    }

    async fn deploy_template(&self, session: &ControllerSession, template_id: &str, device_id: &str) -> Result<String> {
        let req = self
            .request(Method::POST, session, &format!("{}/template-programmer/template/deploy", INTENT))
            .json(&DeployRequest {
                template_id: template_id.to_string(),
                target_info: vec![TargetInfo {
                    id: device_id.to_string(),
                    target_type: "MANAGED_DEVICE_UUID".to_string(),
                }],
            });

        let body = self
            .send(req)
            .await?
            .text()
            .await
            .map_err(|e| ControllerError::Remote(e.to_string()))?;

        // Hand back the whole body when the field is missing so the caller
        // can report what the controller actually said.
        let deployment_id = serde_json::from_str::<DeployResponse>(&body)
            .ok()
            .and_then(|r| r.deployment_id)
            .unwrap_or(body);
        Ok(deployment_id)
    }

    async fn deployment_status(&self, session: &ControllerSession, deployment_id: &str) -> Result<DeploymentStatusReport> {
        let req = self.request(
            Method::GET,
            session,
            &format!("{}/template-programmer/template/deploy/status/{}", INTENT, deployment_id),
        );
        self.get_json(req).await
    }

    async fn delete_template(&self, session: &ControllerSession, template_id: &str) -> Result<()> {
        let req = self.request(
            Method::DELETE,
            session,
            &format!("{}/template-programmer/template/{}", INTENT, template_id),
        );
        self.send(req).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_trims_trailing_slash() {
        assert_eq!(
            ControllerClient::api_url("https://10.0.0.5/", AUTH_PATH),
            "https://10.0.0.5/dna/system/api/v1/auth/token"
        );
        assert_eq!(
            ControllerClient::api_url("https://10.0.0.5", "/x"),
            "https://10.0.0.5/x"
        );
    }

    #[test]
    fn test_status_error_classification() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            ControllerError::Auth(_)
        ));
        assert!(status_error(StatusCode::INTERNAL_SERVER_ERROR, String::new()).is_transient());
        assert!(status_error(StatusCode::GATEWAY_TIMEOUT, String::new()).is_transient());
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS, String::new()).is_transient());
        assert_eq!(
            status_error(StatusCode::BAD_REQUEST, "bad body".into()),
            ControllerError::Remote("400 Bad Request: bad body".into())
        );
    }

    #[test]
    fn test_deploy_response_parsing() {
        let ok: DeployResponse = serde_json::from_str(
            r#"{"deploymentId": "Deployment of  Template: 3f2e..., ApplicableTargets: [...]", "startTime": ""}"#,
        )
        .unwrap();
        assert!(ok.deployment_id.is_some());

        let missing: DeployResponse = serde_json::from_str(r#"{"status": "FAILURE"}"#).unwrap();
        assert!(missing.deployment_id.is_none());
    }

    #[test]
    fn test_status_report_detail() {
        let report: DeploymentStatusReport = serde_json::from_str(
            r#"{"status": "FAILURE", "devices": [{"status": "FAILURE", "detailedStatusMessage": "Line 3: invalid input"}]}"#,
        )
        .unwrap();
        assert_eq!(report.detail(), "Line 3: invalid input");

        let bare: DeploymentStatusReport = serde_json::from_str(r#"{"status": "IN_PROGRESS"}"#).unwrap();
        assert!(bare.detail().contains("IN_PROGRESS"));
    }

    #[test]
    fn test_network_device_tolerates_nulls() {
        let dev: NetworkDevice = serde_json::from_str(
            r#"{"managementIpAddress": "10.1.1.1", "instanceUuid": "abc", "hostname": null, "series": "Cisco Catalyst 9300 Series Switches", "lastUpdateTime": 1700000000000}"#,
        )
        .unwrap();
        assert_eq!(dev.management_ip_address.as_deref(), Some("10.1.1.1"));
        assert!(dev.hostname.is_none());
        assert_eq!(dev.last_update_time, Some(1_700_000_000_000));
    }

    #[test]
    fn test_template_body_wire_shape() {
        let body = TemplateBody::ios_xe(
            "vlan-provision-alice",
            "p1",
            "alice",
            vec![DeviceType {
                product_family: "Switches and Hubs".into(),
                product_series: "Cisco Catalyst 9300 Series Switches".into(),
            }],
            "vlan 10",
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["projectId"], "p1");
        assert_eq!(json["softwareType"], "IOS-XE");
        assert_eq!(json["language"], "VELOCITY");
        assert_eq!(json["templateContent"], "vlan 10");
        assert_eq!(json["deviceTypes"][0]["productFamily"], "Switches and Hubs");
        assert!(json.get("id").is_none());
    }
}
