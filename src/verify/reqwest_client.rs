//! Reqwest-based implementation of the `VerifyHttpClient` trait.
//!
//! Provides a thin adapter around `reqwest::Client` so the verifier can share
//! one connection pool across every form submission.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use reqwest::Client;
use url::Url;

use super::{VerifyHttpClient, VerifyHttpClientError, VerifyHttpResponse};

/// Reqwest-backed HTTP client used for token verification.
#[derive(Debug, Clone)]
pub struct ReqwestVerifyHttpClient {
    client: Client,
}

impl ReqwestVerifyHttpClient {
    /// Creates a new client. Without a timeout the reqwest default applies.
    pub fn new(timeout: Option<Duration>) -> Result<Self, VerifyHttpClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|err| VerifyHttpClientError::Build(err.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VerifyHttpClient for ReqwestVerifyHttpClient {
    async fn post_json(
        &self,
        url: &Url,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<VerifyHttpResponse, VerifyHttpClientError> {
        let response = self
            .client
            .post(url.as_str())
            .headers(headers.clone())
            .body(body.to_vec())
            .send()
            .await
            .map_err(|err| VerifyHttpClientError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| VerifyHttpClientError::Transport(err.to_string()))?;

        Ok(VerifyHttpResponse {
            status,
            headers,
            body,
        })
    }
}

type _AssertSync = Arc<ReqwestVerifyHttpClient>;
