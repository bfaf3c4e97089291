//! Session Trace Emitter
//!
//! HTTP client for a trace collector. One trace and one long-lived span are
//! opened per wallet session; every lifecycle event becomes a span event.
//!
//! # Endpoints Used
//! - `POST {endpoint}/traces` - open the session trace
//! - `POST {endpoint}/traces/{trace}/spans` - start the session span
//! - `POST {endpoint}/traces/{trace}/spans/{span}/events` - add an event
//! - `POST {endpoint}/traces/{trace}/spans/{span}/finish` - close the span

use std::time::Duration;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::ports::{EventEmitter, TelemetryError, TelemetryEvent};

/// Session trace collector configuration
#[derive(Debug, Clone)]
pub struct SessionTraceConfig {
    /// Collector base URL
    pub endpoint: String,
    /// Optional API key sent as `x-api-key`
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for SessionTraceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:4318/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Identifiers of the open session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIds {
    pub trace_id: String,
    pub span_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTraceResponse {
    trace_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartSpanResponse {
    span_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpanEventBody<'a> {
    event_name: &'a str,
    attributes: Map<String, Value>,
}

/// Emitter bound to one wallet session
#[derive(Debug)]
pub struct SessionTraceEmitter {
    config: SessionTraceConfig,
    http: Client,
    session: RwLock<Option<SessionIds>>,
}

impl SessionTraceEmitter {
    pub fn new(config: SessionTraceConfig) -> Result<Self, TelemetryError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config,
            http,
            session: RwLock::new(None),
        })
    }

    /// Current session ids, if initialized
    pub async fn session(&self) -> Option<SessionIds> {
        self.session.read().await.clone()
    }

    /// Open the session trace and span for a connected wallet.
    ///
    /// Calling it again while a session is open returns the existing ids.
    pub async fn initialize(
        &self,
        wallet_address: &str,
        network: &str,
    ) -> Result<SessionIds, TelemetryError> {
        if let Some(ids) = self.session().await {
            tracing::warn!("Telemetry session already initialized");
            return Ok(ids);
        }

        let trace: CreateTraceResponse = self
            .post(
                "traces",
                &json!({
                    "name": "WalletSession",
                    "attributes": {
                        "walletAddress": wallet_address,
                        "network": network,
                        "sessionStart": Utc::now().to_rfc3339(),
                    },
                    "tags": ["session", "wallet", network],
                }),
            )
            .await?
            .json()
            .await?;

        let span: StartSpanResponse = self
            .post(
                &format!("traces/{}/spans", trace.trace_id),
                &json!({
                    "name": "UserSession",
                    "attributes": {
                        "walletAddress": wallet_address,
                        "network": network,
                        "type": "session",
                    },
                }),
            )
            .await?
            .json()
            .await?;

        let ids = SessionIds {
            trace_id: trace.trace_id,
            span_id: span.span_id,
        };
        *self.session.write().await = Some(ids.clone());
        tracing::info!(trace_id = %ids.trace_id, span_id = %ids.span_id, "Telemetry session started");

        self.emit_logged(
            TelemetryEvent::new("wallet_connected")
                .attr("walletAddress", json!(wallet_address))
                .attr("network", json!(network)),
        )
        .await;

        Ok(ids)
    }

    /// Record a blockchain transaction on the session span
    pub async fn track_transaction(&self, transaction: Map<String, Value>) {
        self.emit_logged(TelemetryEvent {
            name: "blockchain_transaction",
            attributes: transaction,
        })
        .await;
    }

    /// Record the wallet moving from one network to another
    pub async fn track_network_switch(
        &self,
        from_network: &str,
        to_network: &str,
        details: Map<String, Value>,
    ) {
        let event = TelemetryEvent {
            name: "network_switch",
            attributes: details,
        }
        .attr("fromNetwork", json!(from_network))
        .attr("toNetwork", json!(to_network));
        self.emit_logged(event).await;
    }

    /// Close the session span. No-op when no session is open.
    ///
    /// A lost `wallet_disconnected` event does not keep the span open.
    pub async fn finish(&self) -> Result<(), TelemetryError> {
        let Some(ids) = self.session().await else {
            tracing::warn!("Telemetry session not initialized, nothing to finish");
            return Ok(());
        };

        self.emit_logged(TelemetryEvent::new("wallet_disconnected")).await;
        self.post(
            &format!("traces/{}/spans/{}/finish", ids.trace_id, ids.span_id),
            &json!({ "attributes": { "sessionEnd": Utc::now().to_rfc3339() } }),
        )
        .await?;

        *self.session.write().await = None;
        tracing::info!(trace_id = %ids.trace_id, "Telemetry session finished");
        Ok(())
    }

    async fn emit_logged(&self, event: TelemetryEvent) {
        let name = event.name;
        if let Err(e) = self.emit(event).await {
            tracing::warn!(event = name, "Failed to record session event: {}", e);
        }
    }

    /// Event body with the emission timestamp added
    fn event_body(event: &TelemetryEvent) -> SpanEventBody<'_> {
        let mut attributes = event.attributes.clone();
        attributes.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
        SpanEventBody {
            event_name: event.name,
            attributes,
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, TelemetryError> {
        let url = format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path);
        let mut request = self.http.post(&url).json(body);
        if let Some(ref api_key) = self.config.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(TelemetryError::Rejected {
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl EventEmitter for SessionTraceEmitter {
    async fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        let Some(ids) = self.session().await else {
            tracing::warn!(event = event.name, "Telemetry session not initialized, dropping event");
            return Ok(());
        };

        self.post(
            &format!("traces/{}/spans/{}/events", ids.trace_id, ids.span_id),
            &Self::event_body(&event),
        )
        .await?;
        Ok(())
    }
}
