//! Client for the bare-metal ("robot") API.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::auth::{BasicAuth, BasicCredentials};
use super::models::{Server, ServerResponse};
use crate::adapters::ReqwestHttpClient;
use crate::error::{ApiError, CredentialError};
use crate::hotreload::{
    ApiFamily, CredentialMaterial, ReloadCounters, ROBOT_PASSWORD_FILE, ROBOT_USER_FILE,
};
use crate::traits::{ApplyOutcome, Headers, HttpClient, Reloadable, RobotApi};

/// Base URL of the bare-metal API.
pub const DEFAULT_ENDPOINT: &str = "https://robot-ws.your-server.de";

/// Bare-metal API client with hot-reloadable basic auth.
pub struct RobotClient {
    endpoint: String,
    auth: BasicAuth,
    http: Arc<dyn HttpClient>,
}

impl RobotClient {
    /// Create a client for the public endpoint.
    pub fn new(username: &str, password: &str) -> Result<Self, CredentialError> {
        let credentials = BasicCredentials::new(username, password)?;
        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth: BasicAuth::new(credentials),
            http: Arc::new(ReqwestHttpClient::new()),
        })
    }

    /// Create a client from `robot-user` and `robot-password` in `dir`.
    pub fn from_directory(dir: &Path) -> Result<Self, CredentialError> {
        let material = CredentialMaterial::read(dir, &[ROBOT_USER_FILE, ROBOT_PASSWORD_FILE])?;
        let credentials = BasicCredentials::from_material(&material)?;
        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth: BasicAuth::new(credentials),
            http: Arc::new(ReqwestHttpClient::new()),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    /// Count reloads on `counters` instead of the process-wide counters.
    pub fn with_counters(mut self, counters: &'static ReloadCounters) -> Self {
        self.auth = self.auth.with_counters(counters);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The credential holder.
    pub fn auth(&self) -> &BasicAuth {
        &self.auth
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.endpoint, path);
        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), self.auth.authorization());
        headers.insert("Accept".to_string(), "application/json".to_string());

        tracing::debug!(url = %url, "robot request");
        let response = self.http.get(&url, &headers).await?;
        if !response.is_success() {
            let err = ApiError::from_response(&response);
            tracing::debug!(url = %url, status = response.status, error = %err, "robot request failed");
            return Err(err);
        }
        response
            .json()
            .map_err(|source| ApiError::Decode { url, source })
    }
}

#[async_trait]
impl RobotApi for RobotClient {
    /// An account without servers answers 404; that is an empty list.
    async fn server_get_list(&self) -> Result<Vec<Server>, ApiError> {
        match self.get_json::<Vec<ServerResponse>>("/server").await {
            Ok(list) => Ok(list.into_iter().map(|entry| entry.server).collect()),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    async fn server_get(&self, server_number: u32) -> Result<Server, ApiError> {
        let response: ServerResponse = self
            .get_json(&format!("/server/{}", server_number))
            .await?;
        Ok(response.server)
    }
}

impl Reloadable for RobotClient {
    fn family(&self) -> ApiFamily {
        ApiFamily::Robot
    }

    fn apply(&self, material: &CredentialMaterial) -> Result<ApplyOutcome, CredentialError> {
        self.auth.apply(material)
    }
}

impl std::fmt::Debug for RobotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotClient")
            .field("endpoint", &self.endpoint)
            .field("auth", &self.auth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::traits::Response;
    use serde_json::json;

    const ENDPOINT: &str = "https://robot.test";

    fn client(mock: &MockHttpClient) -> RobotClient {
        RobotClient::new("user", "pass")
            .unwrap()
            .with_endpoint(ENDPOINT)
            .with_http_client(Arc::new(mock.clone()))
            .with_counters(Box::leak(Box::new(ReloadCounters::new())))
    }

    fn server_json(number: u32) -> serde_json::Value {
        json!({"server": {
            "server_ip": "123.123.123.123",
            "server_ipv6_net": "2a01:f48:111:4221::",
            "server_number": number,
            "server_name": format!("bm-server{}", number)
        }})
    }

    #[tokio::test]
    async fn test_server_get_list_sends_basic_auth() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/server", ENDPOINT),
            MockResponse::Success(Response::json_body(200, &json!([server_json(321)]))),
        );

        let servers = client(&mock).server_get_list().await.unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name, "bm-server321");

        let request = mock.last_request().unwrap();
        assert_eq!(request.authorization(), Some("Basic dXNlcjpwYXNz"));
    }

    #[tokio::test]
    async fn test_server_get_list_not_found_is_empty() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/server", ENDPOINT),
            MockResponse::Success(Response::json_body(
                404,
                &json!({"error": {"status": 404, "code": "SERVER_NOT_FOUND", "message": "Server not found"}}),
            )),
        );

        assert!(client(&mock).server_get_list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_get() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/server/321", ENDPOINT),
            MockResponse::Success(Response::json_body(200, &server_json(321))),
        );

        let server = client(&mock).server_get(321).await.unwrap();
        assert_eq!(server.server_number, 321);
    }

    #[tokio::test]
    async fn test_unauthorized_is_surfaced() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::json_body(
            401,
            &json!({"error": {"status": 401, "code": "UNAUTHORIZED", "message": "Unauthorized"}}),
        )));

        let err = client(&mock).server_get(1).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(mock.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_surfaced() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::json_body(
            403,
            &json!({"error": {"status": 403, "code": "RATE_LIMIT_EXCEEDED", "message": "Rate limit exceeded"}}),
        )));

        let err = client(&mock).server_get_list().await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_rotated_pair_is_used_for_next_request() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::json_body(
            200,
            &server_json(1),
        )));
        let client = client(&mock);

        client.server_get(1).await.unwrap();
        let material = CredentialMaterial::from_pairs([
            (ROBOT_USER_FILE, "user2"),
            (ROBOT_PASSWORD_FILE, "password2"),
        ]);
        assert!(client.apply(&material).unwrap().is_applied());
        client.server_get(1).await.unwrap();

        let requests = mock.get_requests();
        assert_eq!(requests[0].authorization(), Some("Basic dXNlcjpwYXNz"));
        // base64("user2:password2")
        assert_eq!(
            requests[1].authorization(),
            Some("Basic dXNlcjI6cGFzc3dvcmQy")
        );
    }
}
