//! Verification events.
//!
//! The verifier emits one event per call. Handlers decide what to do with
//! it: log it, count it, forward it to the host's own telemetry.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use url::Url;

use crate::verify::VerificationOutcome;

/// Structured record of one verification attempt. Never carries the token or the key.
#[derive(Debug, Clone)]
pub struct VerificationEvent {
    pub endpoint: Url,
    pub token_present: bool,
    pub outcome: VerificationOutcome,
    pub latency: Duration,
    pub timestamp: DateTime<Utc>,
}

impl VerificationEvent {
    pub fn new(
        endpoint: Url,
        token_present: bool,
        outcome: VerificationOutcome,
        latency: Duration,
    ) -> Self {
        Self {
            endpoint,
            token_present,
            outcome,
            latency,
            timestamp: Utc::now(),
        }
    }
}

/// Trait implemented by event handlers.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &VerificationEvent);
}

/// Dispatcher that broadcasts events to registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn dispatch(&self, event: VerificationEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

/// Logs events using the `log` crate.
#[derive(Debug)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle(&self, event: &VerificationEvent) {
        match &event.outcome {
            VerificationOutcome::Verified => {
                log::debug!(
                    "token verified via {} ({:.2}s)",
                    event.endpoint,
                    event.latency.as_secs_f64()
                );
            }
            VerificationOutcome::NotVerified(reason) => {
                log::warn!(
                    "token rejected via {} token_present={} ({:.2}s): {}",
                    event.endpoint,
                    event.token_present,
                    event.latency.as_secs_f64(),
                    reason
                );
            }
        }
    }
}

/// Running totals of verification outcomes.
#[derive(Clone, Debug, Default)]
pub struct OutcomeCounter {
    verified: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeSnapshot {
    pub verified: u64,
    pub rejected: u64,
}

impl OutcomeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> OutcomeSnapshot {
        OutcomeSnapshot {
            verified: self.verified.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

impl EventHandler for OutcomeCounter {
    fn handle(&self, event: &VerificationEvent) {
        let counter = if event.outcome.is_verified() {
            &self.verified
        } else {
            &self.rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
