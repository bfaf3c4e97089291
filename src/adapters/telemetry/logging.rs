use async_trait::async_trait;

use crate::ports::{EventEmitter, TelemetryError, TelemetryEvent};

/// Emitter that turns lifecycle events into `info` log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEmitter;

#[async_trait]
impl EventEmitter for TracingEmitter {
    async fn emit(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        let attributes = serde_json::Value::Object(event.attributes);
        tracing::info!(target: "swap_aggregator::telemetry", event = event.name, %attributes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_tracing_emitter_never_fails() {
        let event = TelemetryEvent::new("swap_status_check").attr("provider", json!("changelly"));
        tokio_test::assert_ok!(TracingEmitter.emit(event).await);
    }
}
