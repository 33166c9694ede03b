//! Transport contract used by the token verifier.
//!
//! The verifier only ever needs one kind of request: a JSON POST to the
//! verification endpoint. Abstracting it behind a trait keeps the outcome
//! logic testable without a network.

use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use thiserror::Error;
use url::Url;

/// Contract that abstracts the HTTP transport used to reach the verification endpoint.
#[async_trait]
pub trait VerifyHttpClient: Send + Sync {
    async fn post_json(
        &self,
        url: &Url,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<VerifyHttpResponse, VerifyHttpClientError>;
}

/// Minimal response representation returned by the transport abstraction.
#[derive(Debug, Clone)]
pub struct VerifyHttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl VerifyHttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// `Content-Type` of the answer, when present and printable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum VerifyHttpClientError {
    #[error("http transport error: {0}")]
    Transport(String),
    #[error("failed to build http client: {0}")]
    Build(String),
}
