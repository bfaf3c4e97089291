//! Fixture Provider
//!
//! `SwapProvider` backed by a JSON snapshot of one provider: its networks,
//! token list, per-pair rates and trade limits. Used for offline runs of the
//! CLI and for tests. Quotes are priced as `from_amount * rate`. Execution and
//! status polling are not available offline.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::domain::{
    AddressInfo, Chain, ConfirmInfo, ExecutionResult, MinMaxAmount, Quote, QuoteRequest,
    StatusRequest, StatusResult, Token, TradeInfo, TradeResult,
};
use crate::ports::{ProviderError, ProviderFactory, SwapProvider};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse fixture: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid fixture: {0}")]
    Invalid(String),
}

/// One priced pair in a snapshot
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureRate {
    /// Sell token contract
    pub from: String,
    /// Buy token contract
    pub to: String,
    pub exchange: String,
    /// Output units per input unit, as a decimal string
    pub rate: String,
}

/// Snapshot file layout
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSnapshot {
    pub id: String,
    /// Supported networks; empty means all
    #[serde(default)]
    pub networks: Vec<Chain>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub rates: Vec<FixtureRate>,
    #[serde(default)]
    pub limits: Option<MinMaxAmount>,
}

#[derive(Debug, Clone)]
pub struct FixtureProvider {
    snapshot: FixtureSnapshot,
}

impl FixtureProvider {
    pub fn new(snapshot: FixtureSnapshot) -> Result<Self, FixtureError> {
        if snapshot.id.is_empty() {
            return Err(FixtureError::Invalid("provider id cannot be empty".to_string()));
        }
        for rate in &snapshot.rates {
            Decimal::from_str(&rate.rate).map_err(|e| {
                FixtureError::Invalid(format!(
                    "rate {} for {} -> {}: {}",
                    rate.rate, rate.from, rate.to, e
                ))
            })?;
        }
        Ok(Self { snapshot })
    }

    /// Load a snapshot from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Self::new(serde_json::from_str(json)?)
    }

    fn unsupported(&self, operation: &str) -> ProviderError {
        ProviderError::Unsupported {
            operation: operation.to_string(),
            provider: self.snapshot.id.clone(),
        }
    }
}

/// `0x` followed by 40 hex digits
fn is_evm_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[async_trait]
impl SwapProvider for FixtureProvider {
    fn id(&self) -> &str {
        &self.snapshot.id
    }

    fn is_supported_network(&self, chain: &Chain) -> bool {
        self.snapshot.networks.is_empty() || self.snapshot.networks.contains(chain)
    }

    async fn get_supported_tokens(&self) -> Result<Vec<Token>, ProviderError> {
        Ok(self.snapshot.tokens.clone())
    }

    async fn get_quote(&self, request: &QuoteRequest) -> Result<Vec<Quote>, ProviderError> {
        let from_amount = Decimal::from_str(request.from_amount.trim()).map_err(|e| {
            ProviderError::Api(format!("invalid amount {}: {}", request.from_amount, e))
        })?;

        let quotes = self
            .snapshot
            .rates
            .iter()
            .filter(|r| {
                r.from.eq_ignore_ascii_case(&request.from_token.contract)
                    && r.to.eq_ignore_ascii_case(&request.to_token.contract)
            })
            .filter_map(|r| {
                let rate = Decimal::from_str(&r.rate).ok()?;
                let amount = from_amount.checked_mul(rate)?.normalize();
                Some(Quote::new(self.snapshot.id.clone(), amount.to_string(), r.exchange.clone()))
            })
            .collect();

        Ok(quotes)
    }

    async fn get_trade(&self, trade: &TradeInfo) -> Result<TradeResult, ProviderError> {
        Ok(json!({
            "provider": self.snapshot.id,
            "dryRun": true,
            "fromToken": trade.from_label(),
            "toToken": trade.to_label(),
            "fromAmount": trade.from_amount,
            "transactions": [],
        }))
    }

    async fn execute_trade(
        &self,
        _trade: &TradeInfo,
        _confirm: &ConfirmInfo,
    ) -> Result<ExecutionResult, ProviderError> {
        Err(self.unsupported("executeTrade"))
    }

    async fn is_valid_to_address(&self, address: &AddressInfo) -> Result<bool, ProviderError> {
        Ok(is_evm_address(&address.address))
    }

    async fn get_min_max_amount(&self, _trade: &TradeInfo) -> Result<MinMaxAmount, ProviderError> {
        self.snapshot
            .limits
            .clone()
            .ok_or_else(|| self.unsupported("getMinMaxAmount"))
    }

    async fn get_status(&self, _status: &StatusRequest) -> Result<StatusResult, ProviderError> {
        Err(self.unsupported("getStatus"))
    }
}

/// Ordered set of fixture providers, in configured order
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    providers: Vec<FixtureProvider>,
}

impl FixtureSet {
    pub fn new(providers: Vec<FixtureProvider>) -> Self {
        Self { providers }
    }

    /// Load every snapshot; the first unreadable file fails the whole set
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self, FixtureError> {
        let providers = paths
            .iter()
            .map(|path| -> Result<FixtureProvider, FixtureError> {
                let provider = FixtureProvider::load(path)?;
                tracing::debug!(
                    provider = provider.id(),
                    path = %path.as_ref().display(),
                    "Loaded provider fixture"
                );
                Ok(provider)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { providers })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderFactory for FixtureSet {
    /// Every fixture in order. Network eligibility stays with the aggregator
    /// so that base-provider indices keep their configured positions.
    fn build(&self, _chain: &Chain) -> Vec<Arc<dyn SwapProvider>> {
        self.providers
            .iter()
            .cloned()
            .map(|p| Arc::new(p) as Arc<dyn SwapProvider>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
    const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

    fn snapshot_json() -> String {
        format!(
            r#"{{
                "id": "paraswap",
                "networks": ["ETH", "POL"],
                "tokens": [
                    {{ "contract": "{WETH}", "symbol": "WETH", "name": "Wrapped Ether", "decimals": 18 }},
                    {{ "contract": "{DAI}", "symbol": "DAI", "name": "Dai Stablecoin", "decimals": 18 }}
                ],
                "rates": [
                    {{ "from": "{WETH}", "to": "{DAI}", "exchange": "uniswap", "rate": "3150.25" }},
                    {{ "from": "{WETH}", "to": "{DAI}", "exchange": "curve", "rate": "3149.9" }}
                ],
                "limits": {{ "min": "0.001", "max": "250" }}
            }}"#
        )
    }

    fn request(from: &str, to: &str, amount: &str) -> QuoteRequest {
        QuoteRequest::new(
            Token::new(from, "A", "A", 18),
            Token::new(to, "B", "B", 18),
            amount,
        )
    }

    #[test]
    fn test_load_snapshot_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(snapshot_json().as_bytes()).unwrap();

        let provider = FixtureProvider::load(file.path()).unwrap();
        assert_eq!(provider.id(), "paraswap");
        assert!(provider.is_supported_network(&Chain::Polygon));
        assert!(!provider.is_supported_network(&Chain::BinanceSmartChain));
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let json = r#"{ "id": "x", "rates": [{ "from": "0x1", "to": "0x2", "exchange": "e", "rate": "abc" }] }"#;
        let result = FixtureProvider::from_json(json);
        assert!(matches!(result, Err(FixtureError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_quotes_scale_with_amount() {
        let provider = FixtureProvider::from_json(&snapshot_json()).unwrap();

        let quotes = provider
            .get_quote(&request(&WETH.to_lowercase(), DAI, "2"))
            .await
            .unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].amount, "6300.5");
        assert_eq!(quotes[0].provider, "paraswap");
        assert_eq!(quotes[1].exchange, "curve");
    }

    #[tokio::test]
    async fn test_unknown_pair_returns_no_quotes() {
        let provider = FixtureProvider::from_json(&snapshot_json()).unwrap();
        let quotes = provider.get_quote(&request(DAI, WETH, "1")).await.unwrap();
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_execution_is_unsupported() {
        let provider = FixtureProvider::from_json(&snapshot_json()).unwrap();
        let result = provider
            .execute_trade(&TradeInfo::new("paraswap"), &ConfirmInfo::default())
            .await;

        assert!(matches!(result, Err(ProviderError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn test_address_validation_and_limits() {
        let provider = FixtureProvider::from_json(&snapshot_json()).unwrap();

        let valid = AddressInfo::new("paraswap", DAI);
        let invalid = AddressInfo::new("paraswap", "0x1234");
        assert!(provider.is_valid_to_address(&valid).await.unwrap());
        assert!(!provider.is_valid_to_address(&invalid).await.unwrap());

        let limits = provider.get_min_max_amount(&TradeInfo::new("paraswap")).await.unwrap();
        assert_eq!(limits.max, "250");
    }

    #[test]
    fn test_fixture_set_keeps_order() {
        let mut first = NamedTempFile::new().unwrap();
        first.write_all(snapshot_json().as_bytes()).unwrap();
        let mut second = NamedTempFile::new().unwrap();
        second.write_all(br#"{ "id": "changelly" }"#).unwrap();

        let set = FixtureSet::load_all(&[first.path(), second.path()]).unwrap();
        let providers = set.build(&Chain::Ethereum);

        assert_eq!(set.len(), 2);
        let ids: Vec<&str> = providers.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["paraswap", "changelly"]);
    }

    #[test]
    fn test_fixture_set_missing_file() {
        let result = FixtureSet::load_all(&["/nonexistent/fixture.json"]);
        assert!(matches!(result, Err(FixtureError::IoError(_))));
    }
}
