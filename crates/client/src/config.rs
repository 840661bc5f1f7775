//! Configuration types for the DigiKey client.

use crate::error::{DigiKeyError, DigiKeyResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const PRODUCTION_BASE: &str = "https://api.digikey.com";
const SANDBOX_BASE: &str = "https://sandbox-api.digikey.com";

/// Path of the OAuth2 token endpoint relative to the API base.
pub const TOKEN_PATH: &str = "v1/oauth2/token";

/// Path of the product search API relative to the API base.
pub const PRODUCTS_PATH: &str = "products/v4/search/";

/// Which DigiKey deployment to talk to.
///
/// Defaults to [`Environment::Production`]; the sandbox must be selected
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

impl Environment {
    /// Select the environment from a `USE_SANDBOX`-style flag.
    pub fn from_sandbox_flag(sandbox: bool) -> Self {
        if sandbox {
            Self::Sandbox
        } else {
            Self::Production
        }
    }

    /// Root URL of the deployment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_BASE,
            Self::Sandbox => SANDBOX_BASE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Production => "PRODUCTION",
            Self::Sandbox => "SANDBOX",
        }
    }
}

/// Locale headers sent with every product API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    pub site: String,
    pub language: String,
    pub currency: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            site: "US".to_string(),
            language: "en".to_string(),
            currency: "USD".to_string(),
        }
    }
}

/// OAuth2 client credentials.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: SecretString,
}

impl Credentials {
    /// Create credentials, rejecting missing or blank values.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> DigiKeyResult<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.trim().is_empty() {
            return Err(DigiKeyError::Config("CLIENT_ID must be set".to_string()));
        }
        if client_secret.trim().is_empty() {
            return Err(DigiKeyError::Config("CLIENT_SECRET must be set".to_string()));
        }

        Ok(Self {
            client_id,
            client_secret: SecretString::from(client_secret),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }

    /// Short prefix of the client id, safe for logs.
    pub fn client_id_hint(&self) -> String {
        let prefix: String = self.client_id.chars().take(10).collect();
        format!("{}...", prefix)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id_hint())
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for the DigiKey client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deployment the client was configured for.
    pub environment: Environment,
    /// Root URL; the product API and token endpoint hang off it.
    pub api_base: Url,
    /// OAuth2 token endpoint.
    pub token_url: Url,
    /// Client id and secret.
    pub credentials: Credentials,
    /// Timeout applied to the token exchange and every relayed call.
    pub timeout: Duration,
    /// Locale headers.
    pub locale: Locale,
}

impl ClientConfig {
    /// Create a configuration for the given environment.
    pub fn new(environment: Environment, credentials: Credentials) -> DigiKeyResult<Self> {
        let api_base = Url::parse(environment.base_url())?;
        let token_url = api_base.join(TOKEN_PATH)?;

        Ok(Self {
            environment,
            api_base,
            token_url,
            credentials,
            timeout: Duration::from_secs(30),
            locale: Locale::default(),
        })
    }

    /// Base URL of the product search API.
    pub fn products_url(&self) -> DigiKeyResult<Url> {
        Ok(normalize_base(&self.api_base).join(PRODUCTS_PATH)?)
    }
}

/// Ensure the base ends with `/` so relative joins append instead of replace.
pub(crate) fn normalize_base(base: &Url) -> Url {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("abcdefghijklmnop", "secret").unwrap()
    }

    #[test]
    fn test_default_environment_is_production() {
        assert_eq!(Environment::default(), Environment::Production);
        assert_eq!(Environment::from_sandbox_flag(false), Environment::Production);
        assert_eq!(Environment::from_sandbox_flag(true), Environment::Sandbox);
    }

    #[test]
    fn test_environment_urls() {
        let config = ClientConfig::new(Environment::Sandbox, credentials()).unwrap();
        assert_eq!(
            config.token_url.as_str(),
            "https://sandbox-api.digikey.com/v1/oauth2/token"
        );
        assert_eq!(
            config.products_url().unwrap().as_str(),
            "https://sandbox-api.digikey.com/products/v4/search/"
        );

        let config = ClientConfig::new(Environment::Production, credentials()).unwrap();
        assert_eq!(config.token_url.as_str(), "https://api.digikey.com/v1/oauth2/token");
    }

    #[test]
    fn test_products_url_with_prefixed_base() {
        let mut config = ClientConfig::new(Environment::Production, credentials()).unwrap();
        config.api_base = Url::parse("http://localhost:9000/mock").unwrap();
        assert_eq!(
            config.products_url().unwrap().as_str(),
            "http://localhost:9000/mock/products/v4/search/"
        );
    }

    #[test]
    fn test_missing_credentials_rejected() {
        assert!(matches!(Credentials::new("", "secret"), Err(DigiKeyError::Config(_))));
        assert!(matches!(Credentials::new("id", "  "), Err(DigiKeyError::Config(_))));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("abcdefghij..."));
        assert!(!debug.contains("\"secret\""));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new(Environment::Production, credentials()).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.locale, Locale::default());
        assert_eq!(config.locale.currency, "USD");
    }
}
