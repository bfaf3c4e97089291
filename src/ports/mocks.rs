use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use serde_json::json;

use crate::domain::{
    AddressInfo, Chain, ConfirmInfo, ExecutionResult, MinMaxAmount, Quote, QuoteRequest,
    StatusRequest, StatusResult, Token, TradeInfo, TradeResult,
};
use super::provider::{ProviderError, SwapProvider};
use super::telemetry::{EventEmitter, TelemetryError, TelemetryEvent};

/// A call received by a [`MockProvider`], with the payload it was given
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    SupportedTokens,
    Quote(QuoteRequest),
    Trade(TradeInfo),
    Execute(TradeInfo, ConfirmInfo),
    ValidateAddress(AddressInfo),
    MinMax(TradeInfo),
    Status(StatusRequest),
}

/// Mock swap provider that records calls and allows controlled responses
#[derive(Debug, Clone)]
pub struct MockProvider {
    id: String,
    networks: Option<Vec<Chain>>,
    tokens: Vec<Token>,
    quotes: Vec<Quote>,
    fail_tokens: bool,
    fail_quotes: bool,
    fail_execute: bool,
    fail_status: bool,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
}

impl MockProvider {
    /// Provider supporting every network with no tokens and no quotes
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            networks: None,
            tokens: Vec::new(),
            quotes: Vec::new(),
            fail_tokens: false,
            fail_quotes: false,
            fail_execute: false,
            fail_status: false,
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Restrict the provider to the given networks
    pub fn with_networks(mut self, networks: Vec<Chain>) -> Self {
        self.networks = Some(networks);
        self
    }

    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Quotes returned for every request, tagged with this provider's id
    pub fn with_quotes(mut self, quotes: &[(&str, &str)]) -> Self {
        self.quotes = quotes
            .iter()
            .map(|(amount, exchange)| Quote::new(self.id.clone(), *amount, *exchange))
            .collect();
        self
    }

    pub fn failing_tokens(mut self) -> Self {
        self.fail_tokens = true;
        self
    }

    pub fn failing_quotes(mut self) -> Self {
        self.fail_quotes = true;
        self
    }

    pub fn failing_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    /// Sleep before answering any async call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn failure(&self, what: &str) -> ProviderError {
        ProviderError::Api(format!("{} failed on {}", what, self.id))
    }
}

#[async_trait]
impl SwapProvider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_supported_network(&self, chain: &Chain) -> bool {
        self.networks
            .as_ref()
            .map_or(true, |networks| networks.contains(chain))
    }

    async fn get_supported_tokens(&self) -> Result<Vec<Token>, ProviderError> {
        self.record(ProviderCall::SupportedTokens).await;
        if self.fail_tokens {
            return Err(self.failure("token listing"));
        }
        Ok(self.tokens.clone())
    }

    async fn get_quote(&self, request: &QuoteRequest) -> Result<Vec<Quote>, ProviderError> {
        self.record(ProviderCall::Quote(request.clone())).await;
        if self.fail_quotes {
            return Err(self.failure("quote"));
        }
        Ok(self.quotes.clone())
    }

    async fn get_trade(&self, trade: &TradeInfo) -> Result<TradeResult, ProviderError> {
        self.record(ProviderCall::Trade(trade.clone())).await;
        Ok(json!({ "provider": self.id, "transactions": [] }))
    }

    async fn execute_trade(
        &self,
        trade: &TradeInfo,
        confirm: &ConfirmInfo,
    ) -> Result<ExecutionResult, ProviderError> {
        self.record(ProviderCall::Execute(trade.clone(), confirm.clone())).await;
        if self.fail_execute {
            return Err(self.failure("execution"));
        }
        Ok(ExecutionResult {
            tx_hash: Some(format!("0x{}-tx", self.id)),
            ..Default::default()
        })
    }

    async fn is_valid_to_address(&self, address: &AddressInfo) -> Result<bool, ProviderError> {
        self.record(ProviderCall::ValidateAddress(address.clone())).await;
        Ok(address.address.starts_with("0x"))
    }

    async fn get_min_max_amount(&self, trade: &TradeInfo) -> Result<MinMaxAmount, ProviderError> {
        self.record(ProviderCall::MinMax(trade.clone())).await;
        Ok(MinMaxAmount {
            min: "0.01".to_string(),
            max: "100".to_string(),
        })
    }

    async fn get_status(&self, status: &StatusRequest) -> Result<StatusResult, ProviderError> {
        self.record(ProviderCall::Status(status.clone())).await;
        if self.fail_status {
            return Err(self.failure("status"));
        }
        Ok(StatusResult::new("finished"))
    }
}

/// Emitter that keeps every event, optionally failing each emit afterwards
#[derive(Debug, Default, Clone)]
pub struct RecordingEmitter {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    fail: bool,
    delay: Option<Duration>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record events but report every emit as failed
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Simulate a slow collector; events are recorded once the delay elapses
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name).collect()
    }
}

#[async_trait]
impl EventEmitter for RecordingEmitter {
    async fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.events.lock().unwrap().push(event);
        if self.fail {
            return Err(TelemetryError::Http("collector unavailable".to_string()));
        }
        Ok(())
    }
}
