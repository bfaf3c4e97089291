//! Domain Layer - Core types for the swap aggregator
//!
//! This module contains pure domain types and logic with no external dependencies.
//! All external interactions happen through the ports layer.
//!
//! - `chain`: Networks and the flagship set
//! - `token`: Tokens, the ordered merge registry and the from/to universe
//! - `quote`: Quote requests, quotes and ranking
//! - `exchange_info`: Static exchange display metadata
//! - `trade`: Provider-tagged dispatch payloads and results
//! - `decimals`: Amount precision helper

pub mod chain;
pub mod token;
pub mod quote;
pub mod exchange_info;
pub mod trade;
pub mod decimals;

pub use chain::Chain;
pub use token::{Token, TokenRegistry, TokenUniverse, DOGE_ADDRESS, MAIN_TOKEN_ADDRESS};
pub use quote::{enrich_quotes, rank_quotes, AmountRank, Magnitude, Quote, QuoteRequest};
pub use exchange_info::{exchange_info_for, known_exchange, ExchangeInfo};
pub use trade::{
    AddressInfo, ConfirmInfo, Dispatchable, ExecutionResult, MinMaxAmount, StatusRequest,
    StatusResult, TradeInfo, TradeResult,
};
pub use decimals::has_valid_decimals;
