//! Remote verification of widget success tokens.
//!
//! Every form submission maps to exactly one POST against the adCAPTCHA
//! verification endpoint. The endpoint is the only authority on a token's
//! validity: nothing is cached, nothing is retried, and an empty token is
//! still sent so the remote side makes the call.
//!
//! Every failure mode (transport error, non-2xx status, malformed body,
//! unexpected message) collapses to `false` at [`TokenVerifier::verify`].
//! [`TokenVerifier::verify_outcome`] keeps the reason around for logging.

mod client;
mod outcome;
mod reqwest_client;
mod types;

pub use client::{VerifyHttpClient, VerifyHttpClientError, VerifyHttpResponse};
pub use outcome::{FailureReason, VerificationOutcome};
pub use reqwest_client::ReqwestVerifyHttpClient;
pub use types::{SUCCESS_MESSAGE, VerifyRequest, VerifyResponse};

use std::sync::Arc;
use std::time::Instant;

use http::HeaderMap;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use once_cell::sync::Lazy;
use url::Url;

use crate::events::{EventDispatcher, VerificationEvent};

/// Production verification endpoint.
pub const DEFAULT_VERIFY_URL: &str = "https://api.adcaptcha.com/v1/verify";

static DEFAULT_ENDPOINT: Lazy<Url> =
    Lazy::new(|| Url::parse(DEFAULT_VERIFY_URL).expect("default verify url is valid"));

/// Checks success tokens against the remote verification endpoint.
#[derive(Clone)]
pub struct TokenVerifier {
    client: Arc<dyn VerifyHttpClient>,
    endpoint: Url,
    events: Arc<EventDispatcher>,
}

impl TokenVerifier {
    /// Verifier backed by a default reqwest client and the production endpoint.
    pub fn new() -> Result<Self, VerifyHttpClientError> {
        let client = ReqwestVerifyHttpClient::new(None)?;
        Ok(Self::with_client(Arc::new(client)))
    }

    pub fn with_client(client: Arc<dyn VerifyHttpClient>) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.clone(),
            events: Arc::new(EventDispatcher::new()),
        }
    }

    /// Point the verifier at another endpoint (staging, local proxy, tests).
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Attach the dispatcher that receives one event per verification.
    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = events;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns `true` only when the endpoint confirms the token.
    pub async fn verify(&self, token: &str, api_key: &str) -> bool {
        self.verify_outcome(token, api_key).await.is_verified()
    }

    /// Same call as [`verify`](Self::verify), keeping the failure reason.
    pub async fn verify_outcome(&self, token: &str, api_key: &str) -> VerificationOutcome {
        let started = Instant::now();
        let outcome = self.request(token, api_key).await;

        self.events.dispatch(VerificationEvent::new(
            self.endpoint.clone(),
            !token.is_empty(),
            outcome.clone(),
            started.elapsed(),
        ));

        outcome
    }

    async fn request(&self, token: &str, api_key: &str) -> VerificationOutcome {
        let headers = match build_headers(api_key) {
            Ok(headers) => headers,
            Err(reason) => return VerificationOutcome::NotVerified(reason),
        };

        let body = match serde_json::to_vec(&VerifyRequest { token }) {
            Ok(body) => body,
            Err(err) => {
                return VerificationOutcome::NotVerified(FailureReason::Request(err.to_string()));
            }
        };

        match self.client.post_json(&self.endpoint, &headers, &body).await {
            Ok(response) => interpret_response(&response),
            Err(err) => VerificationOutcome::NotVerified(FailureReason::Transport(err.to_string())),
        }
    }
}

fn build_headers(api_key: &str) -> Result<HeaderMap, FailureReason> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| FailureReason::Request("api key is not a valid header value".into()))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    Ok(headers)
}

/// Maps an endpoint answer to an outcome.
pub fn interpret_response(response: &VerifyHttpResponse) -> VerificationOutcome {
    if !response.is_success() {
        return VerificationOutcome::NotVerified(FailureReason::Status(response.status));
    }

    let parsed: VerifyResponse = match serde_json::from_slice(&response.body) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::debug!(
                "verification body not parseable (content-type {}): {err}",
                response.content_type().unwrap_or("<none>")
            );
            return VerificationOutcome::NotVerified(FailureReason::MalformedBody);
        }
    };

    if parsed.is_verified() {
        VerificationOutcome::Verified
    } else {
        VerificationOutcome::NotVerified(FailureReason::UnexpectedMessage(parsed.message))
    }
}
