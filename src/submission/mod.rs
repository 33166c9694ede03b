//! Gatekeeping for submitted forms.
//!
//! A host integration hands over the decoded form fields; the guard reads the
//! success token, asks the verifier, and answers with either `Ok(())` or a
//! [`SubmissionRejected`] the host turns into its own validation error.

use std::collections::HashMap;

use thiserror::Error;

use crate::verify::{FailureReason, TokenVerifier, VerificationOutcome};
use crate::widget::{TOKEN_FIELD, capture_script_for};

/// Hidden field Contact Form 7 posts the token under.
pub const CF7_TOKEN_FIELD: &str = "_wpcf7_adcaptcha_response";

/// Message shown to the user when verification fails.
pub const DEFAULT_ERROR_MESSAGE: &str = "Please complete the I am human box.";

/// A submission that did not pass verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmissionRejected {
    /// User-facing text.
    pub message: String,
    /// Diagnostic cause. Do not show this to the user.
    pub reason: FailureReason,
}

/// Decodes an `application/x-www-form-urlencoded` body. Later duplicates win.
pub fn parse_form_body(body: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

/// Trimmed token from `field`, empty when the field is absent.
pub fn extract_token(fields: &HashMap<String, String>, field: &str) -> String {
    fields
        .get(field)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Verifies the token carried by a form submission.
#[derive(Clone)]
pub struct SubmissionGuard {
    verifier: TokenVerifier,
    api_key: String,
    token_field: String,
    message: String,
}

impl SubmissionGuard {
    pub fn new(verifier: TokenVerifier, api_key: impl Into<String>) -> Self {
        Self {
            verifier,
            api_key: api_key.into(),
            token_field: TOKEN_FIELD.to_string(),
            message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }

    /// Read the token from another field (e.g. [`CF7_TOKEN_FIELD`]).
    pub fn with_token_field(mut self, field: impl Into<String>) -> Self {
        self.token_field = field.into();
        self
    }

    /// Replace the user-facing rejection message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn token_field(&self) -> &str {
        &self.token_field
    }

    /// Capture script that fills the field this guard reads.
    pub fn capture_script(&self) -> String {
        capture_script_for(&self.token_field)
    }

    pub async fn check(&self, fields: &HashMap<String, String>) -> Result<(), SubmissionRejected> {
        let token = extract_token(fields, &self.token_field);

        match self.verifier.verify_outcome(&token, &self.api_key).await {
            VerificationOutcome::Verified => Ok(()),
            VerificationOutcome::NotVerified(reason) => Err(SubmissionRejected {
                message: self.message.clone(),
                reason,
            }),
        }
    }

    /// [`check`](Self::check) over a raw urlencoded body.
    pub async fn check_body(&self, body: &[u8]) -> Result<(), SubmissionRejected> {
        self.check(&parse_form_body(body)).await
    }
}
