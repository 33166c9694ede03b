//! Wire types for the verification endpoint.

use serde::{Deserialize, Serialize};

/// Literal `message` value the endpoint returns for an accepted token.
pub const SUCCESS_MESSAGE: &str = "Token verified";

/// JSON body posted to the verification endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest<'a> {
    pub token: &'a str,
}

/// The part of the endpoint's answer this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl VerifyResponse {
    pub fn is_verified(&self) -> bool {
        self.message.as_deref() == Some(SUCCESS_MESSAGE)
    }
}
