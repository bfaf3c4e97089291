//! Dispatch payloads
//!
//! Follow-up calls (trade build, execution, limits, address checks, status)
//! carry the tag of the provider that quoted them. The aggregator reads only
//! that tag; every other field is forwarded untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::token::Token;

/// Anything routed to a single provider by its tag
pub trait Dispatchable {
    fn provider(&self) -> &str;
}

/// Trade selected from a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInfo {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_token: Option<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_token: Option<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_amount: Option<String>,
    /// Expected output amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TradeInfo {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            from_token: None,
            to_token: None,
            from_amount: None,
            amount: None,
            extra: HashMap::new(),
        }
    }

    pub fn from_label(&self) -> Option<&str> {
        self.from_token.as_ref().map(Token::label)
    }

    pub fn to_label(&self) -> Option<&str> {
        self.to_token.as_ref().map(Token::label)
    }
}

impl Dispatchable for TradeInfo {
    fn provider(&self) -> &str {
        &self.provider
    }
}

/// User confirmation data handed to `execute_trade` alongside the trade
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfirmInfo {
    #[serde(flatten)]
    pub fields: HashMap<String, serde_json::Value>,
}

/// Destination address check request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    pub provider: String,
    pub address: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl AddressInfo {
    pub fn new(provider: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            address: address.into(),
            extra: HashMap::new(),
        }
    }
}

impl Dispatchable for AddressInfo {
    fn provider(&self) -> &str {
        &self.provider
    }
}

/// Order status poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl StatusRequest {
    pub fn new(provider: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            order_id: Some(order_id.into()),
            id: None,
            extra: HashMap::new(),
        }
    }

    /// Order reference for telemetry: `orderId`, else `id`
    pub fn reference(&self) -> Option<&str> {
        self.order_id.as_deref().or(self.id.as_deref())
    }
}

impl Dispatchable for StatusRequest {
    fn provider(&self) -> &str {
        &self.provider
    }
}

/// Provider-built trade (transactions to sign, deposit address, ...). Opaque.
pub type TradeResult = serde_json::Value;

/// Result of a provider executing a trade
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ExecutionResult {
    /// Transaction hash, else provider order id
    pub fn reference(&self) -> Option<&str> {
        self.tx_hash.as_deref().or(self.id.as_deref())
    }
}

/// Status reported by a provider for a submitted order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl StatusResult {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.status.as_deref().or(self.state.as_deref())
    }
}

/// Provider limits for a trade, as decimal strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMaxAmount {
    pub min: String,
    pub max: String,
}
