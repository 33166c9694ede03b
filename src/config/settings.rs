use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::verify::DEFAULT_VERIFY_URL;

pub const ENV_API_KEY: &str = "ADCAPTCHA_API_KEY";
pub const ENV_PLACEMENT_ID: &str = "ADCAPTCHA_PLACEMENT_ID";
pub const ENV_VERIFY_URL: &str = "ADCAPTCHA_VERIFY_URL";
pub const ENV_TIMEOUT_MS: &str = "ADCAPTCHA_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid json configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid verification url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid timeout '{0}': expected a positive number of milliseconds")]
    InvalidTimeout(String),
}

/// Operator-provided settings.
///
/// Both the API key and the placement ID are opaque: the key is forwarded as a
/// bearer credential, the placement ID into the widget markup.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AdCaptchaConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub placement_id: String,
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
    /// Request timeout in milliseconds; the HTTP client default applies when unset.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_verify_url() -> String {
    DEFAULT_VERIFY_URL.to_string()
}

impl Default for AdCaptchaConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            placement_id: String::new(),
            verify_url: default_verify_url(),
            timeout_ms: None,
        }
    }
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for AdCaptchaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdCaptchaConfig")
            .field("api_key", &if self.api_key.is_empty() { "<empty>" } else { "<redacted>" })
            .field("placement_id", &self.placement_id)
            .field("verify_url", &self.verify_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl AdCaptchaConfig {
    pub fn new(api_key: impl Into<String>, placement_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            placement_id: placement_id.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `ADCAPTCHA_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            api_key: lookup(ENV_API_KEY).unwrap_or_default().trim().to_string(),
            placement_id: lookup(ENV_PLACEMENT_ID).unwrap_or_default().trim().to_string(),
            ..Self::default()
        };

        if let Some(url) = lookup(ENV_VERIFY_URL).filter(|value| !value.trim().is_empty()) {
            config.verify_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS).filter(|value| !value.trim().is_empty()) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout_ms = Some(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the endpoint parses and any timeout is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::InvalidTimeout("0".into()));
        }
        Ok(())
    }

    /// Parsed verification endpoint.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.verify_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.verify_url.clone(),
            source,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// `true` once both the API key and the placement ID are set.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.placement_id.is_empty()
    }
}

impl TryFrom<&HashMap<String, String>> for AdCaptchaConfig {
    type Error = ConfigError;

    /// Builds a config from a flat key/value map using the env variable names.
    fn try_from(values: &HashMap<String, String>) -> Result<Self, Self::Error> {
        Self::from_lookup(|name| values.get(name).cloned())
    }
}
