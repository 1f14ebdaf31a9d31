//! Response cache in front of the bare-metal API.
//!
//! The bare-metal API is heavily rate limited, so list and get responses are
//! kept for a freshness window. The cache stores response data only, never
//! a credential: every upstream call goes through the wrapped client and
//! therefore uses whatever credential is active at that moment. A rotation
//! does not invalidate cached data.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::client::RobotClient;
use super::models::Server;
use crate::error::{ApiError, CredentialError};
use crate::hotreload::{ApiFamily, CredentialMaterial};
use crate::traits::{ApplyOutcome, Reloadable, RobotApi};

/// Default freshness window.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(5 * 60);

/// Identity of a cacheable call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// `GET /server`
    ServerList,
    /// `GET /server/<number>`
    Server(u32),
}

/// A response captured for a [`RequestKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum CachedResponse {
    ServerList(Vec<Server>),
    Server(Server),
}

#[derive(Debug)]
struct CacheEntry {
    response: CachedResponse,
    fetched_at: Instant,
}

/// Hit/miss statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// [`RobotClient`] with a response cache.
///
/// Concurrent misses for the same kind may each call upstream; the last
/// response stored wins. The entry lock is never held across a call.
pub struct CachedRobotClient {
    inner: Arc<RobotClient>,
    freshness: Duration,
    entries: Mutex<HashMap<RequestKind, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedRobotClient {
    /// Wrap `inner`. A zero `freshness` disables caching.
    pub fn new(inner: Arc<RobotClient>, freshness: Duration) -> Self {
        Self {
            inner,
            freshness,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped client.
    pub fn inner(&self) -> &Arc<RobotClient> {
        &self.inner
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<RequestKind, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup(&self, kind: RequestKind) -> Option<CachedResponse> {
        if self.freshness.is_zero() {
            return None;
        }
        let entries = self.entries();
        entries
            .get(&kind)
            .filter(|entry| entry.fetched_at.elapsed() < self.freshness)
            .map(|entry| entry.response.clone())
    }

    fn store(&self, kind: RequestKind, response: &CachedResponse) {
        if self.freshness.is_zero() {
            return;
        }
        self.entries().insert(
            kind,
            CacheEntry {
                response: response.clone(),
                fetched_at: Instant::now(),
            },
        );
    }

    async fn fetch(&self, kind: RequestKind) -> Result<CachedResponse, ApiError> {
        match kind {
            RequestKind::ServerList => self
                .inner
                .server_get_list()
                .await
                .map(CachedResponse::ServerList),
            RequestKind::Server(number) => self
                .inner
                .server_get(number)
                .await
                .map(CachedResponse::Server),
        }
    }

    /// Cached response for `kind` if fresh, otherwise a live call.
    ///
    /// Failed calls are not cached.
    pub async fn get(&self, kind: RequestKind) -> Result<CachedResponse, ApiError> {
        if let Some(response) = self.lookup(kind) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(kind = ?kind, "robot cache hit");
            return Ok(response);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(kind = ?kind, "robot cache miss");
        self.refresh(kind).await
    }

    /// Live call for `kind`, bypassing the cache, storing the result.
    pub async fn refresh(&self, kind: RequestKind) -> Result<CachedResponse, ApiError> {
        let response = self.fetch(kind).await?;
        self.store(kind, &response);
        Ok(response)
    }

    /// Drop the entry for `kind`.
    pub fn invalidate(&self, kind: RequestKind) {
        self.entries().remove(&kind);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries().len(),
        }
    }
}

#[async_trait]
impl RobotApi for CachedRobotClient {
    async fn server_get_list(&self) -> Result<Vec<Server>, ApiError> {
        match self.get(RequestKind::ServerList).await? {
            CachedResponse::ServerList(servers) => Ok(servers),
            CachedResponse::Server(server) => Ok(vec![server]),
        }
    }

    async fn server_get(&self, server_number: u32) -> Result<Server, ApiError> {
        match self.get(RequestKind::Server(server_number)).await? {
            CachedResponse::Server(server) => Ok(server),
            CachedResponse::ServerList(_) => self.inner.server_get(server_number).await,
        }
    }
}

impl Reloadable for CachedRobotClient {
    fn family(&self) -> ApiFamily {
        ApiFamily::Robot
    }

    fn apply(&self, material: &CredentialMaterial) -> Result<ApplyOutcome, CredentialError> {
        self.inner.apply(material)
    }
}

impl std::fmt::Debug for CachedRobotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRobotClient")
            .field("inner", &self.inner)
            .field("freshness", &self.freshness)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::hotreload::{ReloadCounters, ROBOT_PASSWORD_FILE, ROBOT_USER_FILE};
    use crate::traits::{HttpError, Response};
    use serde_json::json;

    const ENDPOINT: &str = "https://robot.test";

    fn list_url() -> String {
        format!("{}/server", ENDPOINT)
    }

    fn list_response() -> MockResponse {
        MockResponse::Success(Response::json_body(
            200,
            &json!([{"server": {"server_ip": "1.2.3.4", "server_number": 321, "server_name": "bm"}}]),
        ))
    }

    fn cached(mock: &MockHttpClient, freshness: Duration) -> CachedRobotClient {
        let inner = RobotClient::new("user", "pass")
            .unwrap()
            .with_endpoint(ENDPOINT)
            .with_http_client(Arc::new(mock.clone()))
            .with_counters(Box::leak(Box::new(ReloadCounters::new())));
        CachedRobotClient::new(Arc::new(inner), freshness)
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let mock = MockHttpClient::new();
        mock.set_response(&list_url(), list_response());
        let client = cached(&mock, Duration::from_secs(60));

        let first = client.server_get_list().await.unwrap();
        let second = client.server_get_list().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.request_count(&list_url()), 1);
        assert_eq!(
            client.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let mock = MockHttpClient::new();
        mock.set_response(&list_url(), list_response());
        let client = cached(&mock, Duration::from_millis(50));

        client.server_get_list().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        client.server_get_list().await.unwrap();

        assert_eq!(mock.request_count(&list_url()), 2);
    }

    #[tokio::test]
    async fn test_zero_freshness_disables_cache() {
        let mock = MockHttpClient::new();
        mock.set_response(&list_url(), list_response());
        let client = cached(&mock, Duration::ZERO);

        client.server_get_list().await.unwrap();
        client.server_get_list().await.unwrap();

        assert_eq!(mock.request_count(&list_url()), 2);
        assert_eq!(client.stats().entries, 0);
    }

    #[tokio::test]
    async fn test_kinds_are_cached_separately() {
        let mock = MockHttpClient::new();
        mock.set_response(&list_url(), list_response());
        mock.set_response(
            &format!("{}/server/321", ENDPOINT),
            MockResponse::Success(Response::json_body(
                200,
                &json!({"server": {"server_ip": "1.2.3.4", "server_number": 321}}),
            )),
        );
        let client = cached(&mock, Duration::from_secs(60));

        client.server_get_list().await.unwrap();
        client.server_get(321).await.unwrap();
        client.server_get(321).await.unwrap();

        assert_eq!(mock.get_requests().len(), 2);
        assert_eq!(client.stats().entries, 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let mock = MockHttpClient::new();
        mock.set_response(
            &list_url(),
            MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
        );
        let client = cached(&mock, Duration::from_secs(60));

        assert!(client.server_get_list().await.is_err());
        mock.set_response(&list_url(), list_response());
        assert!(client.server_get_list().await.is_ok());

        assert_eq!(mock.request_count(&list_url()), 2);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_and_invalidate_drops() {
        let mock = MockHttpClient::new();
        mock.set_response(&list_url(), list_response());
        let client = cached(&mock, Duration::from_secs(60));

        client.get(RequestKind::ServerList).await.unwrap();
        client.refresh(RequestKind::ServerList).await.unwrap();
        assert_eq!(mock.request_count(&list_url()), 2);

        client.invalidate(RequestKind::ServerList);
        assert_eq!(client.stats().entries, 0);
        client.get(RequestKind::ServerList).await.unwrap();
        assert_eq!(mock.request_count(&list_url()), 3);

        client.clear();
        assert_eq!(client.stats().entries, 0);
    }

    #[tokio::test]
    async fn test_rotation_keeps_data_and_uses_new_credential() {
        let mock = MockHttpClient::new();
        mock.set_response(&list_url(), list_response());
        let client = cached(&mock, Duration::from_secs(60));

        let before = client.server_get_list().await.unwrap();

        let material = CredentialMaterial::from_pairs([
            (ROBOT_USER_FILE, "user2"),
            (ROBOT_PASSWORD_FILE, "password2"),
        ]);
        assert!(client.apply(&material).unwrap().is_applied());

        // cached data survives the rotation
        assert_eq!(client.server_get_list().await.unwrap(), before);
        assert_eq!(mock.request_count(&list_url()), 1);

        client.refresh(RequestKind::ServerList).await.unwrap();
        let request = mock.last_request().unwrap();
        assert_eq!(request.authorization(), Some("Basic dXNlcjI6cGFzc3dvcmQy"));
    }
}
