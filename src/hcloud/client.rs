//! Client for the cloud API.
//!
//! Every request reads the bearer token once, through [`BearerToken`], so a
//! rotation never changes the credential of a request that already started.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::models::{Network, NetworkEnvelope, Server, ServerEnvelope, ServerListEnvelope};
use super::token::BearerToken;
use super::PROVIDER_ID_PREFIX;
use crate::adapters::ReqwestHttpClient;
use crate::error::{ApiError, CredentialError};
use crate::hotreload::{ApiFamily, CredentialMaterial, ReloadCounters, HCLOUD_TOKEN_FILE};
use crate::traits::{ApplyOutcome, Headers, HttpClient, Reloadable, Response};

/// Base URL of the public cloud API.
pub const DEFAULT_ENDPOINT: &str = "https://api.hetzner.cloud/v1";

/// Page size requested when listing servers.
const PER_PAGE: u32 = 50;

/// Parse a node provider ID of the form `hcloud://<server id>`.
pub fn parse_provider_id(provider_id: &str) -> Result<u64, ApiError> {
    provider_id
        .strip_prefix(PROVIDER_ID_PREFIX)
        .and_then(|id| id.parse::<u64>().ok())
        .ok_or_else(|| ApiError::InvalidProviderId(provider_id.to_string()))
}

/// Cloud API client with a hot-reloadable bearer token.
pub struct HcloudClient {
    endpoint: String,
    token: BearerToken,
    http: Arc<dyn HttpClient>,
}

impl HcloudClient {
    /// Create a client for the public endpoint.
    pub fn new(token: &str) -> Result<Self, CredentialError> {
        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: BearerToken::new(token)?,
            http: Arc::new(ReqwestHttpClient::new()),
        })
    }

    /// Create a client from the `hcloud` file in `dir`.
    pub fn from_directory(dir: &Path) -> Result<Self, CredentialError> {
        let material = CredentialMaterial::read(dir, &[HCLOUD_TOKEN_FILE])?;
        Self::new(material.text(HCLOUD_TOKEN_FILE)?)
    }

    /// Use a different API base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different transport.
    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    /// Count reloads on `counters` instead of the process-wide counters.
    pub fn with_counters(mut self, counters: &'static ReloadCounters) -> Self {
        self.token = self.token.with_counters(counters);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The token holder.
    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    async fn get(&self, path: &str) -> Result<(String, Response), ApiError> {
        let url = format!("{}{}", self.endpoint, path);
        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), self.token.authorization());
        headers.insert("Accept".to_string(), "application/json".to_string());

        tracing::debug!(url = %url, "hcloud request");
        let response = self.http.get(&url, &headers).await?;
        if !response.is_success() {
            let err = ApiError::from_response(&response);
            tracing::debug!(url = %url, status = response.status, error = %err, "hcloud request failed");
            return Err(err);
        }
        Ok((url, response))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (url, response) = self.get(path).await?;
        response
            .json()
            .map_err(|source| ApiError::Decode { url, source })
    }

    /// Fetch a server; `None` when it does not exist.
    pub async fn server_get(&self, id: u64) -> Result<Option<Server>, ApiError> {
        match self
            .get_json::<ServerEnvelope>(&format!("/servers/{}", id))
            .await
        {
            Ok(envelope) => Ok(Some(envelope.server)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// List all servers, following pagination.
    pub async fn server_list(&self) -> Result<Vec<Server>, ApiError> {
        let mut servers = Vec::new();
        let mut page = 1;
        loop {
            let envelope: ServerListEnvelope = self
                .get_json(&format!("/servers?page={}&per_page={}", page, PER_PAGE))
                .await?;
            servers.extend(envelope.servers);

            match envelope.meta.and_then(|meta| meta.pagination.next_page) {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }
        Ok(servers)
    }

    /// Fetch a private network; `None` when it does not exist.
    pub async fn network_get(&self, id: u64) -> Result<Option<Network>, ApiError> {
        match self
            .get_json::<NetworkEnvelope>(&format!("/networks/{}", id))
            .await
        {
            Ok(envelope) => Ok(Some(envelope.network)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Whether the server behind a node's provider ID still exists.
    pub async fn instance_exists(&self, provider_id: &str) -> Result<bool, ApiError> {
        let id = parse_provider_id(provider_id)?;
        Ok(self.server_get(id).await?.is_some())
    }

    /// Check that the API accepts the active token.
    pub async fn verify(&self) -> Result<(), ApiError> {
        self.get("/servers").await.map(|_| ())
    }
}

impl Reloadable for HcloudClient {
    fn family(&self) -> ApiFamily {
        ApiFamily::Hcloud
    }

    fn apply(&self, material: &CredentialMaterial) -> Result<ApplyOutcome, CredentialError> {
        self.token.apply(material)
    }
}

impl std::fmt::Debug for HcloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HcloudClient")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::error::ErrorCategory;
    use crate::traits::HttpError;
    use serde_json::json;

    const ENDPOINT: &str = "https://api.test/v1";

    fn token(c: char) -> String {
        std::iter::repeat(c).take(64).collect()
    }

    fn client(mock: &MockHttpClient) -> HcloudClient {
        HcloudClient::new(&token('a'))
            .unwrap()
            .with_endpoint(format!("{}/", ENDPOINT))
            .with_http_client(Arc::new(mock.clone()))
            .with_counters(Box::leak(Box::new(ReloadCounters::new())))
    }

    fn server_json(id: u64) -> serde_json::Value {
        json!({"id": id, "name": format!("node-{}", id), "status": "running"})
    }

    #[test]
    fn test_parse_provider_id() {
        assert_eq!(parse_provider_id("hcloud://123").unwrap(), 123);
        assert!(matches!(
            parse_provider_id("hrobot://123"),
            Err(ApiError::InvalidProviderId(_))
        ));
        assert!(parse_provider_id("hcloud://").is_err());
        assert!(parse_provider_id("hcloud://abc").is_err());
    }

    #[test]
    fn test_endpoint_trailing_slash_is_removed() {
        let mock = MockHttpClient::new();
        assert_eq!(client(&mock).endpoint(), ENDPOINT);
    }

    #[tokio::test]
    async fn test_server_get_sends_bearer_token() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/servers/42", ENDPOINT),
            MockResponse::Success(Response::json_body(200, &json!({"server": server_json(42)}))),
        );
        let client = client(&mock);

        let server = client.server_get(42).await.unwrap().unwrap();
        assert_eq!(server.name, "node-42");

        let request = mock.last_request().unwrap();
        let expected = format!("Bearer {}", token('a'));
        assert_eq!(request.authorization(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_server_get_not_found_is_none() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/servers/7", ENDPOINT),
            MockResponse::Success(Response::json_body(
                404,
                &json!({"error": {"code": "not_found", "message": "server not found"}}),
            )),
        );

        assert!(client(&mock).server_get(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rotated_token_is_used_for_next_request() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::json_body(
            200,
            &json!({"server": server_json(1)}),
        )));
        let client = client(&mock);

        client.server_get(1).await.unwrap();
        let material = CredentialMaterial::from_pairs([(HCLOUD_TOKEN_FILE, token('b'))]);
        assert!(client.apply(&material).unwrap().is_applied());
        client.server_get(1).await.unwrap();

        let requests = mock.get_requests();
        assert_eq!(requests[0].authorization(), Some(format!("Bearer {}", token('a')).as_str()));
        assert_eq!(requests[1].authorization(), Some(format!("Bearer {}", token('b')).as_str()));
    }

    #[tokio::test]
    async fn test_server_list_follows_pagination() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/servers?page=1&per_page=50", ENDPOINT),
            MockResponse::Success(Response::json_body(
                200,
                &json!({
                    "servers": [server_json(1), server_json(2)],
                    "meta": {"pagination": {"page": 1, "next_page": 2}}
                }),
            )),
        );
        mock.set_response(
            &format!("{}/servers?page=2&per_page=50", ENDPOINT),
            MockResponse::Success(Response::json_body(
                200,
                &json!({
                    "servers": [server_json(3)],
                    "meta": {"pagination": {"page": 2, "next_page": null}}
                }),
            )),
        );

        let servers = client(&mock).server_list().await.unwrap();
        let ids: Vec<u64> = servers.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(mock.get_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_network_get() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/networks/9", ENDPOINT),
            MockResponse::Success(Response::json_body(
                200,
                &json!({"network": {"id": 9, "name": "k8s", "ip_range": "10.0.0.0/8"}}),
            )),
        );

        let network = client(&mock).network_get(9).await.unwrap().unwrap();
        assert_eq!(network.name, "k8s");
    }

    #[tokio::test]
    async fn test_instance_exists() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/servers/5", ENDPOINT),
            MockResponse::Success(Response::json_body(200, &json!({"server": server_json(5)}))),
        );
        mock.set_response(
            &format!("{}/servers/6", ENDPOINT),
            MockResponse::Success(Response::json_body(
                404,
                &json!({"error": {"code": "not_found", "message": "server not found"}}),
            )),
        );
        let client = client(&mock);

        assert!(client.instance_exists("hcloud://5").await.unwrap());
        assert!(!client.instance_exists("hcloud://6").await.unwrap());
        assert!(client.instance_exists("aws://5").await.is_err());
    }

    #[tokio::test]
    async fn test_verify_reports_unauthorized() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &format!("{}/servers", ENDPOINT),
            MockResponse::Success(Response::json_body(
                401,
                &json!({"error": {"code": "unauthorized", "message": "unable to authenticate"}}),
            )),
        );

        let err = client(&mock).verify().await.unwrap_err();
        assert_eq!(err.to_string(), "unable to authenticate (unauthorized)");
        assert_eq!(err.category(), ErrorCategory::Auth);
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Error(HttpError::Timeout("30s".to_string())));

        let err = client(&mock).server_get(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Http(HttpError::Timeout(_))));
        assert!(err.category().is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Success(Response::json_body(
            200,
            &json!({"unexpected": true}),
        )));

        let err = client(&mock).network_get(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
