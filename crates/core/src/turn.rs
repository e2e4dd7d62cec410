//! Turn results: what one pass through the orchestrator produces.
//!
//! A [`TurnResult`] is created exactly once per user message, whether the
//! model answered directly, used tools, or failed. Its records are never
//! mutated after the dispatcher creates them.

use serde::{Deserialize, Serialize};

/// Rationale for a turn answered without tools.
pub const DIRECT_RESPONSE_RATIONALE: &str = "direct response, no tool use";

/// Response shown to the user when a turn fails.
pub const APOLOGY_RESPONSE: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// Outcome of a single tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// The tool returned a structured result.
    Success(serde_json::Value),
    /// The call failed (unknown tool, bad arguments, or execution error).
    Error(String),
}

/// One dispatched tool call and what came of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// The model's id for this call; tool-result messages are tagged with it.
    pub call_id: String,

    pub tool_name: String,

    /// Parsed arguments, or the raw payload as a string if it was not JSON.
    pub arguments: serde_json::Value,

    pub outcome: ToolOutcome,
}

impl ToolCallRecord {
    pub fn success(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: serde_json::Value,
        result: serde_json::Value,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments,
            outcome: ToolOutcome::Success(result),
        }
    }

    pub fn failure(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: serde_json::Value,
        error: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments,
            outcome: ToolOutcome::Error(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success(_))
    }

    /// The JSON payload sent back to the model as the tool-result content.
    ///
    /// Failures become `{"error": "..."}` so the model can explain them.
    pub fn content(&self) -> String {
        match &self.outcome {
            ToolOutcome::Success(value) => value.to_string(),
            ToolOutcome::Error(message) => serde_json::json!({ "error": message }).to_string(),
        }
    }
}

/// The single result of processing one user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    /// Final text shown to the user.
    pub response: String,

    /// Tool calls in the order the model requested them.
    pub tool_calls: Vec<ToolCallRecord>,

    /// Why the response took this shape.
    pub rationale: String,
}

impl TurnResult {
    /// A turn answered straight from the first pass.
    pub fn direct(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            tool_calls: Vec::new(),
            rationale: DIRECT_RESPONSE_RATIONALE.into(),
        }
    }

    /// A turn that ran tools before the final answer.
    pub fn with_tools(response: impl Into<String>, tool_calls: Vec<ToolCallRecord>) -> Self {
        let names: Vec<&str> = tool_calls
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.tool_name.as_str())
            .collect();
        let rationale = format!("used tools: {}", names.join(", "));
        Self {
            response: response.into(),
            tool_calls,
            rationale,
        }
    }

    /// A turn that failed somewhere in the protocol.
    pub fn failed(cause: impl std::fmt::Display) -> Self {
        Self {
            response: APOLOGY_RESPONSE.into(),
            tool_calls: Vec::new(),
            rationale: format!("error: {cause}"),
        }
    }

    /// Names of tools that ran successfully, in call order.
    pub fn successful_tools(&self) -> Vec<&str> {
        self.tool_calls
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.tool_name.as_str())
            .collect()
    }

    pub fn is_error(&self) -> bool {
        self.rationale.starts_with("error:")
    }
}

/// The part of a turn stored alongside the assistant entry in history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnMetadata {
    pub rationale: String,

    /// Tools that ran successfully during the turn.
    #[serde(default)]
    pub tools: Vec<String>,
}

impl TurnMetadata {
    /// Render as a message metadata map.
    pub fn to_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert("rationale".into(), self.rationale.clone().into());
        map.insert(
            "tools".into(),
            serde_json::Value::Array(self.tools.iter().cloned().map(Into::into).collect()),
        );
        map
    }
}

impl From<&TurnResult> for TurnMetadata {
    fn from(turn: &TurnResult) -> Self {
        Self {
            rationale: turn.rationale.clone(),
            tools: turn.successful_tools().into_iter().map(String::from).collect(),
        }
    }
}
