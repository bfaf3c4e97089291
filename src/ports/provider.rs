//! Swap provider port
//!
//! Uniform contract every liquidity/swap provider client implements. The
//! aggregator fans read calls out to all eligible providers and routes
//! follow-up calls to the single provider whose `id()` matches the payload tag.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{
    AddressInfo, Chain, ConfirmInfo, ExecutionResult, MinMaxAmount, Quote, QuoteRequest,
    StatusRequest, StatusResult, Token, TradeInfo, TradeResult,
};

/// Errors a provider call can fail with
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{operation} is not supported by {provider}")]
    Unsupported { operation: String, provider: String },
}

/// Swap provider port trait
#[async_trait]
pub trait SwapProvider: Send + Sync {
    /// Stable provider tag carried on every quote this provider produces
    fn id(&self) -> &str;

    /// Whether the provider operates on `chain` at all
    fn is_supported_network(&self, chain: &Chain) -> bool;

    /// Tokens this provider can swap
    async fn get_supported_tokens(&self) -> Result<Vec<Token>, ProviderError>;

    /// Zero or more quotes for the request
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Vec<Quote>, ProviderError>;

    /// Build the trade for a selected quote
    async fn get_trade(&self, trade: &TradeInfo) -> Result<TradeResult, ProviderError>;

    async fn execute_trade(
        &self,
        trade: &TradeInfo,
        confirm: &ConfirmInfo,
    ) -> Result<ExecutionResult, ProviderError>;

    async fn is_valid_to_address(&self, address: &AddressInfo) -> Result<bool, ProviderError>;

    async fn get_min_max_amount(&self, trade: &TradeInfo) -> Result<MinMaxAmount, ProviderError>;

    async fn get_status(&self, status: &StatusRequest) -> Result<StatusResult, ProviderError>;
}

/// Builds the ordered provider list for a chain.
///
/// Implemented by whatever holds the RPC/transaction context the provider
/// clients need.
pub trait ProviderFactory {
    fn build(&self, chain: &Chain) -> Vec<Arc<dyn SwapProvider>>;
}
