//! Swap Aggregator
//!
//! Coordinates a fixed, ordered set of swap providers for one chain:
//! - fans token listings and quote requests out to every eligible provider
//!   and merges the answers (token universe, ranked quotes)
//! - routes follow-up calls (trade build, execution, limits, address checks,
//!   status) to the one provider whose tag is on the payload
//! - reports lifecycle events to a telemetry emitter without waiting on it

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::{join_all, try_join_all};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{
    enrich_quotes, rank_quotes, AddressInfo, Chain, ConfirmInfo, Dispatchable, ExecutionResult,
    MinMaxAmount, Quote, QuoteRequest, StatusRequest, StatusResult, TokenRegistry, TokenUniverse,
    TradeInfo, TradeResult,
};
use crate::ports::telemetry::{
    SWAP_EXECUTE_ERROR, SWAP_EXECUTE_START, SWAP_EXECUTE_SUCCESS, SWAP_QUOTES_RECEIVED,
    SWAP_QUOTE_REQUEST, SWAP_STATUS_CHECK, SWAP_STATUS_ERROR, SWAP_STATUS_RESULT,
};
use crate::ports::{EventEmitter, NoopEmitter, ProviderError, ProviderFactory, SwapProvider, TelemetryEvent};

/// Base token-list provider on flagship chains
pub const FLAGSHIP_BASE_INDEX: usize = 0;

/// Base token-list provider everywhere else (also serves batch quotes)
pub const FALLBACK_BASE_INDEX: usize = 3;

/// Default bound on a single provider read
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("Provider {provider} failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },
    #[error("Provider {provider} timed out after {after:?}")]
    Timeout { provider: String, after: Duration },
    #[error("No provider at base index {index} for chain {chain}")]
    MissingBaseProvider { index: usize, chain: Chain },
}

impl AggregatorError {
    /// Tag of the provider the error came from, if any
    pub fn provider(&self) -> Option<&str> {
        match self {
            AggregatorError::Provider { provider, .. } | AggregatorError::Timeout { provider, .. } => {
                Some(provider)
            }
            AggregatorError::MissingBaseProvider { .. } => None,
        }
    }
}

/// Aggregator behavior knobs
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    pub chain: Chain,
    /// Bound on each provider read; `None` waits indefinitely. Trade
    /// execution is never bounded.
    pub provider_timeout: Option<Duration>,
    /// Drop failing providers from a quote fan-out instead of failing the call
    pub isolate_quote_failures: bool,
    pub flagship_base_index: usize,
    pub fallback_base_index: usize,
}

impl AggregatorConfig {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            provider_timeout: Some(DEFAULT_PROVIDER_TIMEOUT),
            isolate_quote_failures: true,
            flagship_base_index: FLAGSHIP_BASE_INDEX,
            fallback_base_index: FALLBACK_BASE_INDEX,
        }
    }

    pub fn with_provider_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_quote_isolation(mut self, isolate: bool) -> Self {
        self.isolate_quote_failures = isolate;
        self
    }

    /// Index of the provider whose token list seeds the universe
    pub fn base_index(&self) -> usize {
        if self.chain.is_flagship() {
            self.flagship_base_index
        } else {
            self.fallback_base_index
        }
    }
}

/// Multi-provider swap aggregator bound to one chain.
///
/// Every call is independent, so one instance can be shared behind an `Arc`
/// by concurrent callers. The only mutable state is the list of telemetry
/// tasks still in flight, drained by [`SwapAggregator::flush`].
pub struct SwapAggregator {
    providers: Vec<Arc<dyn SwapProvider>>,
    by_tag: HashMap<String, usize>,
    emitter: Arc<dyn EventEmitter>,
    config: AggregatorConfig,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl SwapAggregator {
    /// Aggregator with default settings and no telemetry
    pub fn new(chain: Chain, providers: Vec<Arc<dyn SwapProvider>>) -> Self {
        Self::with_config(AggregatorConfig::new(chain), providers, Arc::new(NoopEmitter))
    }

    pub fn with_config(
        config: AggregatorConfig,
        providers: Vec<Arc<dyn SwapProvider>>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        let mut by_tag = HashMap::with_capacity(providers.len());
        for (index, provider) in providers.iter().enumerate() {
            if by_tag.contains_key(provider.id()) {
                warn!(
                    provider = provider.id(),
                    index,
                    "Duplicate provider tag, earlier provider keeps dispatch"
                );
                continue;
            }
            by_tag.insert(provider.id().to_string(), index);
        }

        info!(
            chain = %config.chain,
            providers = ?providers.iter().map(|p| p.id()).collect::<Vec<_>>(),
            "Swap aggregator ready"
        );

        Self {
            providers,
            by_tag,
            emitter,
            config,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Build the provider list for the configured chain from a factory
    pub fn from_factory(
        factory: &impl ProviderFactory,
        config: AggregatorConfig,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        let providers = factory.build(&config.chain);
        Self::with_config(config, providers, emitter)
    }

    pub fn chain(&self) -> &Chain {
        &self.config.chain
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Provider tags in configured order
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Provider that handles dispatch for `tag`
    pub fn provider(&self, tag: &str) -> Option<&Arc<dyn SwapProvider>> {
        self.by_tag.get(tag).map(|&index| &self.providers[index])
    }

    /// Merge the supported-token lists of all providers on this chain.
    ///
    /// The base provider is fetched first and its failure fails the call.
    /// Other eligible providers are fetched concurrently and a failing one is
    /// logged and skipped. First listing of a contract wins.
    pub async fn get_all_tokens(&self) -> Result<TokenUniverse, AggregatorError> {
        let chain = &self.config.chain;
        let base_index = self.config.base_index();
        let base = self
            .providers
            .get(base_index)
            .ok_or_else(|| AggregatorError::MissingBaseProvider {
                index: base_index,
                chain: chain.clone(),
            })?;

        let mut registry = TokenRegistry::new();
        let base_tokens = self.call(base.id(), base.get_supported_tokens()).await?;
        let added = registry.extend(base_tokens);
        debug!(provider = base.id(), added, "Base token list loaded");

        let listings = self
            .providers
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != base_index)
            .filter(|(_, provider)| {
                let supported = provider.is_supported_network(chain);
                if !supported {
                    debug!(provider = provider.id(), %chain, "Skipping provider, network not supported");
                }
                supported
            })
            .map(|(_, provider)| async move {
                (provider.id(), self.call(provider.id(), provider.get_supported_tokens()).await)
            });

        for (provider, result) in join_all(listings).await {
            match result {
                Ok(tokens) => {
                    let added = registry.extend(tokens);
                    debug!(provider, added, "Merged provider token list");
                }
                Err(e) => warn!(provider, "Token listing failed, skipping provider: {}", e),
            }
        }

        let universe = registry.into_universe();
        info!(
            %chain,
            to_tokens = universe.to_tokens.len(),
            from_tokens = universe.from_tokens.len(),
            "Token universe built"
        );
        Ok(universe)
    }

    /// Quote every eligible provider and return all quotes, best first.
    pub async fn get_all_quotes(&self, request: &QuoteRequest) -> Result<Vec<Quote>, AggregatorError> {
        self.track(
            TelemetryEvent::new(SWAP_QUOTE_REQUEST)
                .attr("fromToken", json!(request.from_token.label()))
                .attr("toToken", json!(request.to_token.label()))
                .attr("fromAmount", json!(request.from_amount)),
        );

        let chain = &self.config.chain;
        let eligible: Vec<_> = self
            .providers
            .iter()
            .filter(|provider| provider.is_supported_network(chain))
            .collect();

        let mut quotes = Vec::new();
        if self.config.isolate_quote_failures {
            let requests = eligible.iter().map(|provider| async move {
                (provider.id(), self.call(provider.id(), provider.get_quote(request)).await)
            });
            for (provider, result) in join_all(requests).await {
                match result {
                    Ok(batch) => {
                        debug!(provider, count = batch.len(), "Quotes received");
                        quotes.extend(batch);
                    }
                    Err(e) => warn!(provider, "Quote request failed, skipping provider: {}", e),
                }
            }
        } else {
            let requests = eligible
                .iter()
                .map(|provider| self.call(provider.id(), provider.get_quote(request)));
            for batch in try_join_all(requests).await? {
                quotes.extend(batch);
            }
        }

        rank_quotes(&mut quotes);

        self.track(
            TelemetryEvent::new(SWAP_QUOTES_RECEIVED)
                .attr("fromToken", json!(request.from_token.label()))
                .attr("toToken", json!(request.to_token.label()))
                .attr("quotesCount", json!(quotes.len()))
                .attr("bestQuote", quotes.first().map(|q| json!(q.amount)))
                .attr(
                    "providers",
                    json!(quotes.iter().map(|q| q.exchange.as_str()).collect::<Vec<_>>().join(",")),
                ),
        );

        enrich_quotes(&mut quotes);
        info!(
            from = request.from_token.label(),
            to = request.to_token.label(),
            count = quotes.len(),
            best = quotes.first().map(|q| q.amount.as_str()).unwrap_or("-"),
            "Quotes aggregated"
        );
        Ok(quotes)
    }

    /// Quote a batch of requests against the fallback base provider.
    ///
    /// All-or-nothing: the first failing request fails the batch. Results come
    /// back in request order.
    pub async fn get_quotes_for_set(
        &self,
        requests: &[QuoteRequest],
    ) -> Result<Vec<Vec<Quote>>, AggregatorError> {
        let index = self.config.fallback_base_index;
        let provider = self
            .providers
            .get(index)
            .ok_or_else(|| AggregatorError::MissingBaseProvider {
                index,
                chain: self.config.chain.clone(),
            })?;

        try_join_all(
            requests
                .iter()
                .map(|request| self.call(provider.id(), provider.get_quote(request))),
        )
        .await
    }

    /// Build the trade on the provider that quoted it
    pub async fn get_trade(&self, trade: &TradeInfo) -> Result<Option<TradeResult>, AggregatorError> {
        let Some(provider) = self.resolve(trade) else {
            return Ok(None);
        };
        self.call(provider.id(), provider.get_trade(trade)).await.map(Some)
    }

    pub async fn is_valid_to_address(
        &self,
        address: &AddressInfo,
    ) -> Result<Option<bool>, AggregatorError> {
        let Some(provider) = self.resolve(address) else {
            return Ok(None);
        };
        self.call(provider.id(), provider.is_valid_to_address(address))
            .await
            .map(Some)
    }

    pub async fn get_min_max_amount(
        &self,
        trade: &TradeInfo,
    ) -> Result<Option<MinMaxAmount>, AggregatorError> {
        let Some(provider) = self.resolve(trade) else {
            return Ok(None);
        };
        self.call(provider.id(), provider.get_min_max_amount(trade))
            .await
            .map(Some)
    }

    /// Execute the trade on the provider that quoted it.
    ///
    /// Emits start/success/error events; provider failures are returned as is.
    /// Not bounded by `provider_timeout`: the provider may already have
    /// submitted the swap when a deadline would fire.
    pub async fn execute_trade(
        &self,
        trade: &TradeInfo,
        confirm: &ConfirmInfo,
    ) -> Result<Option<ExecutionResult>, AggregatorError> {
        self.track(
            TelemetryEvent::new(SWAP_EXECUTE_START)
                .attr("provider", json!(trade.provider))
                .attr("fromToken", opt(trade.from_label()))
                .attr("toToken", opt(trade.to_label()))
                .attr("fromAmount", opt(trade.from_amount.as_deref()))
                .attr("expectedAmount", opt(trade.amount.as_deref())),
        );

        let Some(provider) = self.resolve(trade) else {
            return Ok(None);
        };

        match call_within(provider.id(), None, provider.execute_trade(trade, confirm)).await {
            Ok(result) => {
                info!(provider = provider.id(), tx = ?result.reference(), "Trade executed");
                self.track(
                    TelemetryEvent::new(SWAP_EXECUTE_SUCCESS)
                        .attr("provider", json!(trade.provider))
                        .attr("fromToken", opt(trade.from_label()))
                        .attr("toToken", opt(trade.to_label()))
                        .attr("txHash", opt(result.reference())),
                );
                Ok(Some(result))
            }
            Err(e) => {
                warn!(provider = provider.id(), "Trade execution failed: {}", e);
                self.track(
                    TelemetryEvent::new(SWAP_EXECUTE_ERROR)
                        .attr("provider", json!(trade.provider))
                        .attr("fromToken", opt(trade.from_label()))
                        .attr("toToken", opt(trade.to_label()))
                        .attr("error", json!(e.to_string())),
                );
                Err(e)
            }
        }
    }

    /// Poll order status on the provider that executed it
    pub async fn get_status(
        &self,
        status: &StatusRequest,
    ) -> Result<Option<StatusResult>, AggregatorError> {
        self.track(
            TelemetryEvent::new(SWAP_STATUS_CHECK)
                .attr("provider", json!(status.provider))
                .attr("orderId", opt(status.reference())),
        );

        let Some(provider) = self.resolve(status) else {
            return Ok(None);
        };

        match self.call(provider.id(), provider.get_status(status)).await {
            Ok(result) => {
                self.track(
                    TelemetryEvent::new(SWAP_STATUS_RESULT)
                        .attr("provider", json!(status.provider))
                        .attr("orderId", opt(status.reference()))
                        .attr("status", opt(result.label())),
                );
                Ok(Some(result))
            }
            Err(e) => {
                self.track(
                    TelemetryEvent::new(SWAP_STATUS_ERROR)
                        .attr("provider", json!(status.provider))
                        .attr("orderId", opt(status.reference()))
                        .attr("error", json!(e.to_string())),
                );
                Err(e)
            }
        }
    }

    fn resolve(&self, payload: &impl Dispatchable) -> Option<&Arc<dyn SwapProvider>> {
        let provider = self.provider(payload.provider());
        if provider.is_none() {
            warn!(
                provider = payload.provider(),
                configured = ?self.provider_ids(),
                "No provider matches dispatch tag"
            );
        }
        provider
    }

    /// Run one provider read under the configured timeout
    async fn call<T>(
        &self,
        provider: &str,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, AggregatorError> {
        call_within(provider, self.config.provider_timeout, call).await
    }

    /// Fire-and-forget telemetry; failures are only logged
    fn track(&self, event: TelemetryEvent) {
        let event = event.attr("chain", json!(self.config.chain.name()));
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(event = event.name, "No runtime, dropping telemetry event");
            return;
        };

        let emitter = Arc::clone(&self.emitter);
        let handle = runtime.spawn(async move {
            let name = event.name;
            if let Err(e) = emitter.emit(event).await {
                warn!(event = name, "Failed to emit telemetry event: {}", e);
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }

    /// Wait until every telemetry event emitted so far has been delivered
    /// (or has failed). Call before closing the emitter's session.
    pub async fn flush(&self) {
        let tasks = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        if tasks.is_empty() {
            return;
        }

        debug!(tasks = tasks.len(), "Flushing telemetry");
        for result in join_all(tasks).await {
            if let Err(e) = result {
                warn!("Telemetry task ended abnormally: {}", e);
            }
        }
    }
}

/// Run one provider call, bounded by `limit` when set
async fn call_within<T>(
    provider: &str,
    limit: Option<Duration>,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, AggregatorError> {
    let result = match limit {
        Some(after) => tokio::time::timeout(after, call).await.map_err(|_| {
            AggregatorError::Timeout {
                provider: provider.to_string(),
                after,
            }
        })?,
        None => call.await,
    };

    result.map_err(|source| AggregatorError::Provider {
        provider: provider.to_string(),
        source,
    })
}

fn opt(value: Option<&str>) -> Option<Value> {
    value.map(Value::from)
}
