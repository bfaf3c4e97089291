//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Fixture: JSON snapshot swap providers for offline runs
//! - Telemetry: structured-log and session-trace event emitters
//! - CLI: Command-line interface definitions

pub mod fixture;
pub mod telemetry;
pub mod cli;

pub use fixture::{FixtureError, FixtureProvider, FixtureSet, FixtureSnapshot};
pub use telemetry::{SessionIds, SessionTraceConfig, SessionTraceEmitter, TracingEmitter};
pub use cli::CliApp;
