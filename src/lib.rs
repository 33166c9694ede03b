//! # adcaptcha
//!
//! Server-side building blocks for the adCAPTCHA human-verification widget.
//!
//! A form integration renders the widget placeholder, lets the widget's
//! success token travel with the submitted form, and asks the remote
//! verification endpoint whether that token is valid before accepting the
//! submission.
//!
//! ## Features
//!
//! - One-call token verification against the adCAPTCHA API
//! - Widget placeholder markup and client-side capture/reset snippets
//! - Submission guard reading the token out of urlencoded form bodies
//! - Verification events with `log`-backed logging
//!
//! ## Example
//!
//! ```no_run
//! use adcaptcha::{AdCaptcha, AdCaptchaConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adcaptcha = AdCaptcha::new(AdCaptchaConfig::from_env()?)?;
//!     let form = adcaptcha.insert_before_submit(r#"<form><input type="submit"></form>"#);
//!     println!("{form}");
//!
//!     let allowed = adcaptcha.verify_token("token-from-the-form").await;
//!     println!("verified: {allowed}");
//!     Ok(())
//! }
//! ```

mod adcaptcha;

pub mod config;
pub mod events;
pub mod submission;
pub mod verify;
pub mod widget;

pub use crate::adcaptcha::{AdCaptcha, AdCaptchaBuilder, AdCaptchaError, AdCaptchaResult};

pub use crate::config::{AdCaptchaConfig, ConfigError};

pub use crate::events::{
    EventDispatcher, EventHandler, LoggingHandler, OutcomeCounter, OutcomeSnapshot,
    VerificationEvent,
};

pub use crate::submission::{
    CF7_TOKEN_FIELD, DEFAULT_ERROR_MESSAGE, SubmissionGuard, SubmissionRejected, extract_token,
    parse_form_body,
};

pub use crate::verify::{
    DEFAULT_VERIFY_URL, FailureReason, ReqwestVerifyHttpClient, TokenVerifier,
    VerificationOutcome, VerifyHttpClient, VerifyHttpClientError, VerifyHttpResponse,
};

pub use crate::widget::{
    SCRIPT_HANDLE, SCRIPT_URL, SUCCESS_EVENT, TOKEN_FIELD, capture_script_for,
    emit_capture_script, placeholder_markup,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
