use anyhow::{Context, Result};
use digikey_client::{DigiKeyClientBuilder, Environment, Locale};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Optional file configuration. Credentials never live here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub digikey: DigiKeyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigiKeyConfig {
    #[serde(default)]
    pub sandbox: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Replaces the environment's API root, e.g. for a local mock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    #[serde(default)]
    pub locale: Locale,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DigiKeyConfig {
    fn default() -> Self {
        Self {
            sandbox: false,
            timeout_secs: default_timeout_secs(),
            api_base: None,
            locale: Locale::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if !config_path.exists() {
            tracing::info!(path = %config_path.display(), "Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read configuration file {}", config_path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", config_path.display()))?;

        if config.digikey.timeout_secs == 0 {
            anyhow::bail!("digikey.timeout_secs must be greater than zero");
        }

        tracing::info!(path = %config_path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Apply file settings to a client builder. `sandbox` wins over the
    /// file's setting when given.
    pub fn apply(&self, builder: DigiKeyClientBuilder, sandbox: Option<bool>) -> DigiKeyClientBuilder {
        let environment = Environment::from_sandbox_flag(sandbox.unwrap_or(self.digikey.sandbox));

        let builder = builder
            .environment(environment)
            .timeout(Duration::from_secs(self.digikey.timeout_secs))
            .locale(self.digikey.locale.clone());

        match &self.digikey.api_base {
            Some(base) => builder.api_base(base.clone()),
            None => builder,
        }
    }
}
