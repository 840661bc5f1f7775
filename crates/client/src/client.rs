//! Main client for the DigiKey Product Information API.

use crate::api::*;
use crate::auth::{Clock, SystemClock, TokenCache};
use crate::config::{normalize_base, ClientConfig, Credentials, Environment, Locale, TOKEN_PATH};
use crate::error::{DigiKeyError, DigiKeyResult};
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Main client for interacting with the DigiKey API.
///
/// Cloning is cheap; clones share the token cache.
#[derive(Debug, Clone)]
pub struct DigiKeyClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl DigiKeyClient {
    /// Create a new client builder.
    pub fn builder() -> DigiKeyClientBuilder {
        DigiKeyClientBuilder::new()
    }

    /// Create a client from configuration.
    fn from_config(config: ClientConfig, clock: Arc<dyn Clock>) -> DigiKeyResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone(), clock)?;

        Ok(Self { config, http })
    }

    /// Fetch the first token eagerly.
    ///
    /// Call before serving requests so bad credentials fail at startup.
    pub async fn authenticate(&self) -> DigiKeyResult<()> {
        info!(
            environment = self.config.environment.name(),
            client_id = %self.config.credentials.client_id_hint(),
            "Authenticating with DigiKey"
        );
        self.http.tokens().get_token().await?;
        Ok(())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The shared token cache.
    pub fn tokens(&self) -> &Arc<TokenCache> {
        self.http.tokens()
    }

    /// The underlying relay, for endpoints without a typed wrapper.
    pub fn transport(&self) -> &HttpTransport {
        &self.http
    }

    pub(crate) fn products_url(&self) -> DigiKeyResult<Url> {
        self.config.products_url()
    }

    /// Get the search API.
    pub fn search(&self) -> SearchApi<'_> {
        SearchApi::new(self)
    }

    /// Get the product API.
    pub fn products(&self) -> ProductApi<'_> {
        ProductApi::new(self)
    }

    /// Get the pricing API.
    pub fn pricing(&self) -> PricingApi<'_> {
        PricingApi::new(self)
    }
}

/// Builder for creating a DigiKeyClient.
pub struct DigiKeyClientBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    environment: Environment,
    api_base: Option<String>,
    token_url: Option<String>,
    timeout: Duration,
    locale: Locale,
    clock: Arc<dyn Clock>,
}

impl DigiKeyClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            environment: Environment::default(),
            api_base: None,
            token_url: None,
            timeout: Duration::from_secs(30),
            locale: Locale::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the OAuth2 client id and secret.
    pub fn credentials(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Select production or sandbox.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Override the API root (the token endpoint follows unless set
    /// separately).
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = Some(url.into());
        self
    }

    /// Override the token endpoint.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Replace the time source used for token expiry.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the client. Fails when credentials are missing.
    pub fn build(self) -> DigiKeyResult<DigiKeyClient> {
        let credentials = Credentials::new(
            self.client_id
                .ok_or_else(|| DigiKeyError::Config("CLIENT_ID must be set".to_string()))?,
            self.client_secret
                .ok_or_else(|| DigiKeyError::Config("CLIENT_SECRET must be set".to_string()))?,
        )?;

        let mut config = ClientConfig::new(self.environment, credentials)?;

        if let Some(base) = self.api_base {
            config.api_base = Url::parse(&base)?;
            config.token_url = normalize_base(&config.api_base).join(TOKEN_PATH)?;
        }
        if let Some(token_url) = self.token_url {
            config.token_url = Url::parse(&token_url)?;
        }
        config.timeout = self.timeout;
        config.locale = self.locale;

        DigiKeyClient::from_config(config, self.clock)
    }

    /// Build the client and fetch the first token.
    pub async fn connect(self) -> DigiKeyResult<DigiKeyClient> {
        let client = self.build()?;
        client.authenticate().await?;
        Ok(client)
    }
}

impl Default for DigiKeyClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
