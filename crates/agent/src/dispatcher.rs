//! Tool-call dispatch.
//!
//! Turns the model's tool-call requests into [`ToolCallRecord`]s. Every
//! request yields exactly one record, in request order, whether the call
//! succeeded or not. Failures are folded into the record and never abort
//! the batch.

use futures::future::join_all;
use souschef_core::error::ToolError;
use souschef_core::message::MessageToolCall;
use souschef_core::tool::{ToolCall, ToolRegistry};
use souschef_core::turn::ToolCallRecord;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct ToolDispatcher {
    concurrent: bool,
}

impl ToolDispatcher {
    pub fn new(concurrent: bool) -> Self {
        Self { concurrent }
    }

    pub fn sequential() -> Self {
        Self::new(false)
    }

    pub fn concurrent() -> Self {
        Self::new(true)
    }

    pub fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    /// Run every request against `registry`.
    pub async fn execute(
        &self,
        requests: &[MessageToolCall],
        registry: &ToolRegistry,
    ) -> Vec<ToolCallRecord> {
        debug!(
            tool_count = requests.len(),
            concurrent = self.concurrent,
            "Executing tool calls"
        );

        if self.concurrent {
            // join_all yields outputs in input order.
            join_all(requests.iter().map(|r| dispatch_one(r, registry))).await
        } else {
            let mut records = Vec::with_capacity(requests.len());
            for request in requests {
                records.push(dispatch_one(request, registry).await);
            }
            records
        }
    }
}

async fn dispatch_one(request: &MessageToolCall, registry: &ToolRegistry) -> ToolCallRecord {
    if registry.get(&request.name).is_none() {
        let error = ToolError::NotFound(request.name.clone());
        warn!(tool = %request.name, "Model requested an unknown tool");
        return ToolCallRecord::failure(
            &request.id,
            &request.name,
            parse_arguments(&request.arguments).unwrap_or_else(|_| raw(request)),
            error.to_string(),
        );
    }

    let arguments = match parse_arguments(&request.arguments) {
        Ok(args) => args,
        Err(e) => {
            let error = ToolError::InvalidArguments(e.to_string());
            warn!(tool = %request.name, error = %error, "Tool arguments were not valid JSON");
            return ToolCallRecord::failure(&request.id, &request.name, raw(request), error.to_string());
        }
    };

    let call = ToolCall {
        id: request.id.clone(),
        name: request.name.clone(),
        arguments: arguments.clone(),
    };

    let start = std::time::Instant::now();
    let result = registry.execute(&call).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(value) => {
            debug!(tool = %request.name, duration_ms, "Tool executed");
            ToolCallRecord::success(&request.id, &request.name, arguments, value)
        }
        Err(e) => {
            warn!(tool = %request.name, duration_ms, error = %e, "Tool execution failed");
            ToolCallRecord::failure(&request.id, &request.name, arguments, e.to_string())
        }
    }
}

/// An empty payload means "no arguments".
fn parse_arguments(raw: &str) -> Result<serde_json::Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(raw)
}

fn raw(request: &MessageToolCall) -> serde_json::Value {
    serde_json::Value::String(request.arguments.clone())
}
