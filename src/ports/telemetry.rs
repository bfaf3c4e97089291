//! Telemetry port
//!
//! Lifecycle events the aggregator reports around quoting, execution and
//! status polling. Emission is best effort: the aggregator never waits on an
//! emitter and only logs its failures.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub const SWAP_QUOTE_REQUEST: &str = "swap_quote_request";
pub const SWAP_QUOTES_RECEIVED: &str = "swap_quotes_received";
pub const SWAP_EXECUTE_START: &str = "swap_execute_start";
pub const SWAP_EXECUTE_SUCCESS: &str = "swap_execute_success";
pub const SWAP_EXECUTE_ERROR: &str = "swap_execute_error";
pub const SWAP_STATUS_CHECK: &str = "swap_status_check";
pub const SWAP_STATUS_RESULT: &str = "swap_status_result";
pub const SWAP_STATUS_ERROR: &str = "swap_status_error";

/// Telemetry error type
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Telemetry session not initialized")]
    NotInitialized,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Collector rejected event with status {status}")]
    Rejected { status: u16 },
}

impl From<reqwest::Error> for TelemetryError {
    fn from(e: reqwest::Error) -> Self {
        TelemetryError::Http(e.to_string())
    }
}

/// Named event with flat attributes
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    pub name: &'static str,
    pub attributes: Map<String, Value>,
}

impl TelemetryEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Map::new(),
        }
    }

    /// Add an attribute. `None` values are skipped.
    pub fn attr(mut self, key: &str, value: impl Into<Option<Value>>) -> Self {
        if let Some(value) = value.into() {
            self.attributes.insert(key.to_string(), value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Sink for lifecycle events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError>;
}

/// Emitter that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEmitter;

#[async_trait]
impl EventEmitter for NoopEmitter {
    async fn emit(&self, _event: TelemetryEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}
