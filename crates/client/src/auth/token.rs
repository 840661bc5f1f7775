//! Shared bearer token cache.
//!
//! A single [`TokenCache`] backs every outbound call. The check-and-refresh
//! sequence runs under one async mutex, so callers that find the token stale
//! at the same moment wait for a single credential exchange and then all see
//! its result.

use crate::auth::clock::Clock;
use crate::config::Credentials;
use crate::error::{DigiKeyError, DigiKeyResult};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

/// A token is refreshed once it has this many seconds or fewer left.
pub const REFRESH_MARGIN_SECS: i64 = 300;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Upper bound on an advertised token lifetime (one year).
pub const MAX_EXPIRES_IN_SECS: i64 = 86_400 * 365;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Default)]
struct TokenState {
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenState {
    /// The cached token, if it still has more than the refresh margin left.
    fn usable(&self, now: DateTime<Utc>) -> Option<&str> {
        match (&self.access_token, self.expires_at) {
            (Some(token), Some(expires_at))
                if expires_at - now > Duration::seconds(REFRESH_MARGIN_SECS) =>
            {
                Some(token.as_str())
            }
            _ => None,
        }
    }
}

/// Process-wide cache of the client-credentials access token.
pub struct TokenCache {
    http: reqwest::Client,
    token_url: Url,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    state: Mutex<TokenState>,
}

impl TokenCache {
    /// Create an empty cache. No network call happens until the first
    /// [`get_token`](Self::get_token).
    pub fn new(
        http: reqwest::Client,
        token_url: Url,
        credentials: Credentials,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            token_url,
            credentials,
            clock,
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Return a token with more than five minutes of validity left,
    /// refreshing first when needed.
    pub async fn get_token(&self) -> DigiKeyResult<String> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.usable(self.clock.now()) {
            return Ok(token.to_string());
        }

        self.refresh(&mut state).await
    }

    /// Mark the cached token as expired now.
    pub async fn force_expire(&self) {
        let mut state = self.state.lock().await;
        state.expires_at = Some(self.clock.now());
        debug!("Access token marked as expired");
    }

    /// Expire the cached token only if it is still `rejected`.
    ///
    /// Returns `true` when the token was expired. A concurrent caller that
    /// already replaced the token leaves nothing to do.
    pub async fn invalidate(&self, rejected: &str) -> bool {
        let mut state = self.state.lock().await;
        if state.access_token.as_deref() != Some(rejected) {
            debug!("Rejected token already replaced, skipping forced expiry");
            return false;
        }
        state.expires_at = Some(self.clock.now());
        debug!("Access token marked as expired");
        true
    }

    /// Expiry of the cached token, if any.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.expires_at
    }

    /// Exchange the credentials for a new token and store it.
    ///
    /// On failure the previous state is kept as is.
    async fn refresh(&self, state: &mut TokenState) -> DigiKeyResult<String> {
        let first = state.access_token.is_none();
        info!(
            token_url = %self.token_url,
            client_id = %self.credentials.client_id_hint(),
            first,
            "Requesting access token"
        );

        let response = self.exchange().await?;
        let expires_in = response
            .expires_in
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS)
            .min(MAX_EXPIRES_IN_SECS);
        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| self.clock.now().checked_add_signed(lifetime))
            .ok_or_else(|| DigiKeyError::Authentication {
                status: 200,
                message: format!("Token lifetime out of range: {}s", expires_in),
            })?;

        state.access_token = Some(response.access_token.clone());
        state.expires_at = Some(expires_at);

        info!(expires_in, expires_at = %expires_at, "Obtained access token");
        Ok(response.access_token)
    }

    async fn exchange(&self) -> DigiKeyResult<TokenResponse> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret()),
        ];

        let response = self
            .http
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Token request failed to reach provider");
                DigiKeyError::from_transport(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(DigiKeyError::from_transport)?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "OAuth token request rejected");
            return Err(DigiKeyError::Authentication {
                status: status.as_u16(),
                message: body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Token response is not valid JSON");
            DigiKeyError::Authentication {
                status: status.as_u16(),
                message: format!("Malformed token response: {}", e),
            }
        })?;

        if token.access_token.is_empty() {
            return Err(DigiKeyError::Authentication {
                status: status.as_u16(),
                message: "Token response carried an empty access_token".to_string(),
            });
        }

        if let Some(expires_in) = token.expires_in.filter(|secs| *secs <= 0) {
            error!(expires_in, "Token response carried a non-positive expires_in");
            return Err(DigiKeyError::Authentication {
                status: status.as_u16(),
                message: format!("Token response carried a non-positive expires_in: {}", expires_in),
            });
        }

        Ok(token)
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("token_url", &self.token_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use serde_json::json;
    use std::time::Duration as StdDuration;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_body(token: &str, expires_in: i64) -> serde_json::Value {
        json!({
            "access_token": token,
            "expires_in": expires_in,
            "token_type": "Bearer"
        })
    }

    fn create_cache(server: &MockServer, clock: Arc<ManualClock>) -> TokenCache {
        let token_url = Url::parse(&format!("{}/v1/oauth2/token", server.uri())).unwrap();
        let http = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(5))
            .build()
            .unwrap();
        TokenCache::new(
            http,
            token_url,
            Credentials::new("test-client-id", "test-secret").unwrap(),
            clock,
        )
    }

    #[tokio::test]
    async fn test_client_credentials_grant_form() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=test-client-id"))
            .and(body_string_contains("client_secret=test-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let cache = create_cache(&server, Arc::new(ManualClock::default()));
        assert_eq!(cache.get_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_token_reused_until_refresh_margin() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let clock = Arc::new(ManualClock::default());
        let cache = create_cache(&server, clock.clone());

        assert_eq!(cache.get_token().await.unwrap(), "abc");

        // 3600 - 300 = 3300 seconds of reuse; stay just inside that window.
        for _ in 0..11 {
            clock.advance(Duration::seconds(299));
            assert_eq!(cache.get_token().await.unwrap(), "abc");
        }
    }

    #[tokio::test]
    async fn test_refresh_inside_margin() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("first", 3600)))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("second", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let clock = Arc::new(ManualClock::default());
        let cache = create_cache(&server, clock.clone());

        assert_eq!(cache.get_token().await.unwrap(), "first");

        clock.advance(Duration::seconds(3300));
        assert_eq!(cache.get_token().await.unwrap(), "second");
        assert_eq!(cache.get_token().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_missing_expires_in_defaults_to_one_hour() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc"})))
            .expect(1)
            .mount(&server)
            .await;

        let clock = Arc::new(ManualClock::default());
        let start = clock.now();
        let cache = create_cache(&server, clock.clone());

        cache.get_token().await.unwrap();
        assert_eq!(
            cache.expires_at().await,
            Some(start + Duration::seconds(DEFAULT_EXPIRES_IN_SECS))
        );
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(token_body("shared", 3600))
                    .set_delay(StdDuration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(create_cache(&server, Arc::new(ManualClock::default())));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_token().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "shared");
        }
    }

    #[tokio::test]
    async fn test_force_expire_triggers_one_refresh() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc", 3600)))
            .expect(2)
            .mount(&server)
            .await;

        let cache = create_cache(&server, Arc::new(ManualClock::default()));

        cache.get_token().await.unwrap();
        cache.force_expire().await;
        cache.get_token().await.unwrap();
        cache.get_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidate_ignores_replaced_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("current", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let cache = create_cache(&server, Arc::new(ManualClock::default()));

        cache.get_token().await.unwrap();
        assert!(!cache.invalidate("stale").await);
        assert_eq!(cache.get_token().await.unwrap(), "current");
    }

    #[tokio::test]
    async fn test_first_exchange_failure_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})),
            )
            .mount(&server)
            .await;

        let cache = create_cache(&server, Arc::new(ManualClock::default()));

        match cache.get_token().await {
            Err(DigiKeyError::Authentication { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("invalid_client"));
            }
            other => panic!("Expected authentication error, got {:?}", other),
        }
        assert!(cache.state.lock().await.access_token.is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_prior_state() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc", 3600)))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let clock = Arc::new(ManualClock::default());
        let cache = create_cache(&server, clock.clone());

        cache.get_token().await.unwrap();
        cache.force_expire().await;
        let expired_at = cache.expires_at().await;

        assert!(cache.get_token().await.is_err());

        let state = cache.state.lock().await;
        assert_eq!(state.access_token.as_deref(), Some("abc"));
        assert_eq!(state.expires_at, expired_at);
    }

    #[tokio::test]
    async fn test_malformed_token_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let cache = create_cache(&server, Arc::new(ManualClock::default()));
        assert!(matches!(
            cache.get_token().await,
            Err(DigiKeyError::Authentication { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn test_huge_expires_in_is_capped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc", i64::MAX)))
            .expect(1)
            .mount(&server)
            .await;

        let clock = Arc::new(ManualClock::default());
        let cache = create_cache(&server, clock.clone());
        let start = clock.now();

        assert_eq!(cache.get_token().await.unwrap(), "abc");
        assert_eq!(
            cache.expires_at().await.unwrap(),
            start + Duration::seconds(MAX_EXPIRES_IN_SECS)
        );
    }

    #[tokio::test]
    async fn test_non_positive_expires_in_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc", -60)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc", 0)))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let cache = create_cache(&server, Arc::new(ManualClock::default()));
        for _ in 0..2 {
            assert!(matches!(
                cache.get_token().await,
                Err(DigiKeyError::Authentication { status: 200, .. })
            ));
        }
        assert!(cache.expires_at().await.is_none());
    }
}
