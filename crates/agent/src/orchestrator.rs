//! Turn orchestration: the two-pass tool protocol.
//!
//! 1. **Pass 1**: system prompt, optional user context, history and the new
//!    user message go to the model together with the tool schemas.
//! 2. If the model answers with text, that is the response.
//! 3. Otherwise every requested tool is dispatched, the tool-call message
//!    and one tool result per call are appended, and **Pass 2** asks for
//!    the final answer with no tools on offer.
//!
//! Any failure along the way becomes an apology turn; `process` always
//! returns exactly one [`TurnResult`].

use std::sync::Arc;
use souschef_config::AppConfig;
use souschef_core::error::{Error, Result};
use souschef_core::message::Message;
use souschef_core::provider::{Provider, ProviderRequest, ToolDefinition};
use souschef_core::tool::ToolRegistry;
use souschef_core::turn::TurnResult;
use tracing::{debug, error, info};

use crate::dispatcher::ToolDispatcher;

/// Prefix of the second system message carrying the preference summary.
pub const USER_CONTEXT_PREFIX: &str = "User context: ";

/// Model and prompt settings for one orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub system_prompt: String,
    pub parallel_tool_calls: bool,
}

impl OrchestratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
            system_prompt: config.agent.system_prompt().to_string(),
            parallel_tool_calls: config.agent.parallel_tool_calls,
        }
    }
}

/// The available orchestrators.
pub enum Orchestrator {
    Managed(ManagedOrchestrator),
}

impl Orchestrator {
    /// Build the orchestrator named by `agent.orchestrator`.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Result<Self> {
        match config.agent.orchestrator.as_str() {
            "managed" => Ok(Self::Managed(ManagedOrchestrator::new(
                provider,
                OrchestratorSettings::from_config(config),
            ))),
            other => Err(Error::UnknownOrchestrator(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Managed(_) => "managed",
        }
    }

    pub async fn process(
        &self,
        user_message: &str,
        history: &[Message],
        registry: &ToolRegistry,
        memory_context: &str,
    ) -> TurnResult {
        match self {
            Self::Managed(o) => o.process(user_message, history, registry, memory_context).await,
        }
    }
}

/// Talks to an OpenAI-style chat model through a [`Provider`].
pub struct ManagedOrchestrator {
    provider: Arc<dyn Provider>,
    settings: OrchestratorSettings,
    dispatcher: ToolDispatcher,
}

impl ManagedOrchestrator {
    pub fn new(provider: Arc<dyn Provider>, settings: OrchestratorSettings) -> Self {
        let dispatcher = ToolDispatcher::new(settings.parallel_tool_calls);
        Self {
            provider,
            settings,
            dispatcher,
        }
    }

    /// Process one user message.
    pub async fn process(
        &self,
        user_message: &str,
        history: &[Message],
        registry: &ToolRegistry,
        memory_context: &str,
    ) -> TurnResult {
        info!(
            provider = %self.provider.name(),
            history = history.len(),
            tools = registry.len(),
            "Processing user message"
        );

        match self.run(user_message, history, registry, memory_context).await {
            Ok(turn) => turn,
            Err(e) => {
                error!(error = %e, "Turn failed");
                TurnResult::failed(e)
            }
        }
    }

    /// Build the Pass 1 message sequence.
    fn build_messages(&self, user_message: &str, history: &[Message], memory_context: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(Message::system(&self.settings.system_prompt));
        if !memory_context.is_empty() {
            messages.push(Message::system(format!("{USER_CONTEXT_PREFIX}{memory_context}")));
        }
        messages.extend(history.iter().cloned());
        messages.push(Message::user(user_message));
        messages
    }

    fn request(&self, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> ProviderRequest {
        ProviderRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            tools,
        }
    }

    async fn run(
        &self,
        user_message: &str,
        history: &[Message],
        registry: &ToolRegistry,
        memory_context: &str,
    ) -> Result<TurnResult> {
        let mut messages = self.build_messages(user_message, history, memory_context);

        // Pass 1
        let first = self
            .provider
            .complete(self.request(messages.clone(), registry.definitions()))
            .await?;

        if !first.message.has_tool_calls() {
            debug!("Direct response, no tool use");
            return Ok(TurnResult::direct(first.message.content));
        }

        let requests = first.message.tool_calls.clone();
        info!(
            tools = ?requests.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "Model requested tools"
        );

        let records = self.dispatcher.execute(&requests, registry).await;

        messages.push(first.message);
        for record in &records {
            messages.push(Message::tool_result(&record.call_id, record.content()));
        }

        // Pass 2
        let second = self.provider.complete(self.request(messages, Vec::new())).await?;

        Ok(TurnResult::with_tools(second.message.content, records))
    }
}
