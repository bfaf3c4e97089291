//! Swap Aggregator Library
//!
//! Client-side aggregation over several swap providers: merged token lists,
//! ranked quotes and tag-based routing of trade, execution and status calls.
//!
//! # Modules
//!
//! - `domain`: Core types (Chain, Token, Quote, TradeInfo, ExchangeInfo)
//! - `ports`: Trait abstractions (SwapProvider, EventEmitter)
//! - `adapters`: External implementations (fixture providers, telemetry, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: The SwapAggregator use cases

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;

pub use application::{AggregatorConfig, AggregatorError, SwapAggregator};
pub use domain::{Chain, Quote, QuoteRequest, Token, TokenUniverse};
pub use ports::{EventEmitter, ProviderError, SwapProvider};
