//! Settings and configuration module
//!
//! Provides the operator configuration with:
//! - JSON loading
//! - Environment loading (`ADCAPTCHA_*`)
//! - Defaults for the production endpoint

pub mod settings;

pub use settings::{
    AdCaptchaConfig, ConfigError, ENV_API_KEY, ENV_PLACEMENT_ID, ENV_TIMEOUT_MS, ENV_VERIFY_URL,
};
