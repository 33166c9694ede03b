//! High level entry point for host integrations.
//!
//! Wires the operator configuration, the token verifier, the event handlers
//! and the widget snippets together so a form integration only needs one
//! value it can clone into its handlers.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{AdCaptchaConfig, ConfigError};
use crate::events::{EventDispatcher, EventHandler, LoggingHandler};
use crate::submission::SubmissionGuard;
use crate::verify::{
    ReqwestVerifyHttpClient, TokenVerifier, VerificationOutcome, VerifyHttpClient,
    VerifyHttpClientError,
};
use crate::widget;

/// Result alias used across the facade.
pub type AdCaptchaResult<T> = Result<T, AdCaptchaError>;

/// Errors raised while assembling an [`AdCaptcha`].
#[derive(Debug, Error)]
pub enum AdCaptchaError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("http client error: {0}")]
    Client(#[from] VerifyHttpClientError),
}

/// Fluent builder for [`AdCaptcha`].
pub struct AdCaptchaBuilder {
    config: AdCaptchaConfig,
    http_client: Option<Arc<dyn VerifyHttpClient>>,
    handlers: Vec<Arc<dyn EventHandler>>,
    enable_logging: bool,
}

impl AdCaptchaBuilder {
    pub fn new() -> Self {
        Self {
            config: AdCaptchaConfig::default(),
            http_client: None,
            handlers: Vec::new(),
            enable_logging: true,
        }
    }

    pub fn with_config(mut self, config: AdCaptchaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    pub fn with_placement_id(mut self, placement_id: impl Into<String>) -> Self {
        self.config.placement_id = placement_id.into();
        self
    }

    pub fn with_verify_url(mut self, url: impl Into<String>) -> Self {
        self.config.verify_url = url.into();
        self
    }

    /// Only applies to the default reqwest transport. Sub-millisecond
    /// timeouts round down to zero and are rejected by [`build`](Self::build).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_http_client(mut self, client: Arc<dyn VerifyHttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn disable_logging(mut self) -> Self {
        self.enable_logging = false;
        self
    }

    pub fn build(self) -> AdCaptchaResult<AdCaptcha> {
        self.config.validate()?;
        let endpoint = self.config.endpoint()?;

        let client = match self.http_client {
            Some(client) => client,
            None => Arc::new(ReqwestVerifyHttpClient::new(self.config.timeout())?),
        };

        let mut dispatcher = EventDispatcher::new();
        if self.enable_logging {
            dispatcher.register_handler(Arc::new(LoggingHandler));
        }
        for handler in self.handlers {
            dispatcher.register_handler(handler);
        }

        if !self.config.is_configured() {
            log::warn!("adCAPTCHA is not fully configured: {:?}", self.config);
        }

        let verifier = TokenVerifier::with_client(client)
            .with_endpoint(endpoint)
            .with_events(Arc::new(dispatcher));

        Ok(AdCaptcha {
            config: Arc::new(self.config),
            verifier,
        })
    }
}

impl Default for AdCaptchaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configured adCAPTCHA integration. Cheap to clone.
#[derive(Clone)]
pub struct AdCaptcha {
    config: Arc<AdCaptchaConfig>,
    verifier: TokenVerifier,
}

impl AdCaptcha {
    pub fn new(config: AdCaptchaConfig) -> AdCaptchaResult<Self> {
        AdCaptchaBuilder::new().with_config(config).build()
    }

    pub fn builder() -> AdCaptchaBuilder {
        AdCaptchaBuilder::new()
    }

    pub fn config(&self) -> &AdCaptchaConfig {
        &self.config
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Verifies `token` with the configured API key.
    pub async fn verify_token(&self, token: &str) -> bool {
        self.verifier.verify(token, &self.config.api_key).await
    }

    pub async fn verify_token_outcome(&self, token: &str) -> VerificationOutcome {
        self.verifier
            .verify_outcome(token, &self.config.api_key)
            .await
    }

    /// Submission guard reading the default token field.
    pub fn guard(&self) -> SubmissionGuard {
        SubmissionGuard::new(self.verifier.clone(), self.config.api_key.clone())
    }

    pub fn placeholder_markup(&self) -> String {
        widget::placeholder_markup(&self.config.placement_id)
    }

    pub fn capture_script(&self) -> String {
        widget::emit_capture_script()
    }

    pub fn insert_before_submit(&self, html: &str) -> String {
        widget::insert_before_submit(html, &self.config.placement_id)
    }
}
