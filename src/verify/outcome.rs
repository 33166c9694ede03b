//! Result type at the verifier boundary.

use std::fmt;

/// Why a token was not accepted. Diagnostic only; callers map every variant
/// to the same user-facing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The request could not be built (e.g. the API key is not a valid header value).
    Request(String),
    /// The endpoint could not be reached or the body could not be read.
    Transport(String),
    /// The endpoint answered with a non-2xx status.
    Status(u16),
    /// The body was not a JSON object.
    MalformedBody,
    /// The body parsed but did not carry the success message.
    UnexpectedMessage(Option<String>),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Request(detail) => write!(f, "request rejected locally: {detail}"),
            FailureReason::Transport(detail) => write!(f, "transport failure: {detail}"),
            FailureReason::Status(status) => write!(f, "endpoint returned status {status}"),
            FailureReason::MalformedBody => f.write_str("endpoint returned a malformed body"),
            FailureReason::UnexpectedMessage(Some(message)) => {
                write!(f, "endpoint returned message {message:?}")
            }
            FailureReason::UnexpectedMessage(None) => f.write_str("endpoint returned no message"),
        }
    }
}

/// Outcome of a single verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    NotVerified(FailureReason),
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified)
    }

    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            VerificationOutcome::Verified => None,
            VerificationOutcome::NotVerified(reason) => Some(reason),
        }
    }
}

impl From<VerificationOutcome> for bool {
    fn from(outcome: VerificationOutcome) -> Self {
        outcome.is_verified()
    }
}
