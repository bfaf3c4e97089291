//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Swap providers (token lists, quotes, trade building, execution, status)
//! - Telemetry sinks (best-effort lifecycle events)

pub mod provider;
pub mod telemetry;
pub mod mocks;

pub use provider::{ProviderError, ProviderFactory, SwapProvider};
pub use telemetry::{EventEmitter, NoopEmitter, TelemetryError, TelemetryEvent};
