//! HTTP relay for the DigiKey product API.
//!
//! Every call goes through [`HttpTransport::relay`], which attaches the
//! current bearer token and DigiKey headers, retries once after a forced
//! token refresh when the upstream answers 401, and converts every other
//! failure into an [`UpstreamError`].

use crate::auth::{Clock, TokenCache};
use crate::config::ClientConfig;
use crate::error::{DigiKeyError, DigiKeyResult, RelayResult, UpstreamError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// Attempts per relayed call: the first request plus one retry after a
/// forced token refresh.
pub const MAX_ATTEMPTS: u32 = 2;

/// Customer id used when the caller does not supply one.
pub const DEFAULT_CUSTOMER_ID: &str = "0";

const CLIENT_ID_HEADER: &str = "x-digikey-client-id";
const LOCALE_SITE_HEADER: &str = "x-digikey-locale-site";
const LOCALE_LANGUAGE_HEADER: &str = "x-digikey-locale-language";
const LOCALE_CURRENCY_HEADER: &str = "x-digikey-locale-currency";
const CUSTOMER_ID_HEADER: &str = "x-digikey-customer-id";

/// HTTP transport shared by all endpoint APIs.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
    tokens: Arc<TokenCache>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>, clock: Arc<dyn Clock>) -> DigiKeyResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("digikey-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        let tokens = Arc::new(TokenCache::new(
            client.clone(),
            config.token_url.clone(),
            config.credentials.clone(),
            clock,
        ));

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// The token cache backing this transport.
    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a GET request.
    pub async fn get(&self, url: Url, customer_id: Option<&str>) -> RelayResult {
        self.relay(Method::GET, url, customer_id, None).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post(
        &self,
        url: Url,
        customer_id: Option<&str>,
        body: &serde_json::Value,
    ) -> RelayResult {
        self.relay(Method::POST, url, customer_id, Some(body)).await
    }

    /// Perform one logical upstream call.
    ///
    /// A 401 on the first attempt expires the token and repeats the call
    /// once with a fresh one; a second 401 is returned as an
    /// authentication error.
    pub async fn relay(
        &self,
        method: Method,
        url: Url,
        customer_id: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> RelayResult {
        let customer_id = customer_id.unwrap_or(DEFAULT_CUSTOMER_ID);
        let base_headers = self
            .base_headers(customer_id)
            .map_err(|e| UpstreamError::invalid_request(Some(url.as_str()), e.to_string()))?;

        info!(method = %method, url = %url, "Relaying request");
        if let Some(body) = body {
            debug!(body = %body, "Request body");
        }

        let mut attempt = 0;
        loop {
            attempt += 1;

            let token = self
                .tokens
                .get_token()
                .await
                .map_err(|e| UpstreamError::from_token_error(url.as_str(), &e))?;

            let mut headers = base_headers.clone();
            headers.insert(AUTHORIZATION, bearer(&token, url.as_str())?);

            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .headers(headers);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    error!(url = %url, error = %e, "Request failed to reach upstream");
                    return Err(UpstreamError::transport(url.as_str(), &e));
                }
            };

            let status = response.status();
            info!(status = status.as_u16(), attempt, "Response received");

            if status == StatusCode::UNAUTHORIZED && attempt < MAX_ATTEMPTS {
                warn!(url = %url, "Access token rejected, forcing refresh and retrying");
                self.tokens.invalidate(&token).await;
                continue;
            }

            return classify(&url, response).await;
        }
    }

    /// Headers that do not depend on the token.
    fn base_headers(&self, customer_id: &str) -> DigiKeyResult<HeaderMap> {
        let locale = &self.config.locale;
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        insert(
            &mut headers,
            CLIENT_ID_HEADER,
            self.config.credentials.client_id(),
        )?;
        insert(&mut headers, LOCALE_SITE_HEADER, &locale.site)?;
        insert(&mut headers, LOCALE_LANGUAGE_HEADER, &locale.language)?;
        insert(&mut headers, LOCALE_CURRENCY_HEADER, &locale.currency)?;
        insert(&mut headers, CUSTOMER_ID_HEADER, customer_id)?;

        Ok(headers)
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> DigiKeyResult<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| DigiKeyError::InvalidInput(format!("Invalid value for header {}", name)))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

fn bearer(token: &str, url: &str) -> Result<HeaderValue, UpstreamError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        UpstreamError::from_token_error(
            url,
            &DigiKeyError::Config("Access token is not a valid header value".to_string()),
        )
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Turn a final response into a relay result.
async fn classify(url: &Url, response: Response) -> RelayResult {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| UpstreamError::transport(url.as_str(), &e))?;

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        return serde_json::from_str(&body).map_err(|e| {
            error!(url = %url, error = %e, "Upstream returned non-JSON body");
            UpstreamError::invalid_response(status.as_u16(), url.as_str(), &body)
        });
    }

    if status == StatusCode::NOT_FOUND {
        warn!(url = %url, "Upstream resource not found");
    } else {
        error!(status = status.as_u16(), body = %body, "API error");
    }

    Err(UpstreamError::from_response(status.as_u16(), url.as_str(), &body))
}
