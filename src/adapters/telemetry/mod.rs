//! Telemetry Adapters
//!
//! Implementations of the EventEmitter port:
//! - `TracingEmitter`: writes each event as a structured log line
//! - `SessionTraceEmitter`: posts events to a session trace collector over HTTP

mod logging;
mod session;

pub use logging::TracingEmitter;
pub use session::{SessionIds, SessionTraceConfig, SessionTraceEmitter};
