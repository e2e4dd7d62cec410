//! The session driver: one orchestrator, one memory, one tool registry.
//!
//! `handle` takes `&mut self`, so turns in a session run strictly one at a
//! time and each turn's memory update happens in a single call.

use std::sync::Arc;
use souschef_config::AppConfig;
use souschef_core::error::Result;
use souschef_core::provider::Provider;
use souschef_core::session::{PreferenceUpdate, SessionMetadata, UserPreferences};
use souschef_core::tool::ToolRegistry;
use souschef_core::turn::{ToolOutcome, TurnMetadata, TurnResult};
use souschef_memory::MemoryStore;
use tracing::info;

use crate::orchestrator::Orchestrator;

const INPUT_PREVIEW_CHARS: usize = 100;
const RESULT_PREVIEW_CHARS: usize = 200;

pub struct ChefSession {
    orchestrator: Orchestrator,
    memory: MemoryStore,
    registry: ToolRegistry,
    detailed_logging: bool,
}

impl ChefSession {
    pub fn new(orchestrator: Orchestrator, memory: MemoryStore, registry: ToolRegistry) -> Self {
        Self {
            orchestrator,
            memory,
            registry,
            detailed_logging: false,
        }
    }

    /// Assemble a session from configuration.
    ///
    /// Fails on an unknown orchestrator or memory backend.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Result<Self> {
        let orchestrator = Orchestrator::from_config(config, provider.clone())?;
        let memory = MemoryStore::from_config(&config.memory, config.agent.max_history_turns)?;
        let registry =
            souschef_tools::default_registry(&config.tools, Some((provider, config.model.clone())));

        info!(
            orchestrator = orchestrator.kind(),
            memory = memory.backend_name(),
            tools = ?registry.names(),
            "Session ready"
        );

        Ok(Self::new(orchestrator, memory, registry)
            .with_detailed_logging(config.logging.detailed_interactions))
    }

    pub fn with_detailed_logging(mut self, enabled: bool) -> Self {
        self.detailed_logging = enabled;
        self
    }

    /// Run one turn and record it.
    pub async fn handle(&mut self, user_message: &str) -> TurnResult {
        let history = self.memory.history_for_model();
        let context = self.memory.context_summary();

        let turn = self
            .orchestrator
            .process(user_message, &history, &self.registry, &context)
            .await;

        self.memory
            .record_turn(user_message, &turn.response, TurnMetadata::from(&turn));

        if self.detailed_logging {
            log_interaction(user_message, &turn);
        }

        turn
    }

    pub fn preferences(&self) -> UserPreferences {
        self.memory.preferences()
    }

    pub fn update_preferences(&mut self, update: PreferenceUpdate) {
        self.memory.update_preferences(update);
    }

    pub fn metadata(&self) -> SessionMetadata {
        self.memory.metadata()
    }

    pub fn clear(&mut self) {
        self.memory.clear();
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

fn log_interaction(user_message: &str, turn: &TurnResult) {
    info!(
        target: "souschef::interaction",
        user_input = %preview(user_message, INPUT_PREVIEW_CHARS),
        tools_called = ?turn.tool_calls.iter().map(|r| r.tool_name.as_str()).collect::<Vec<_>>(),
        rationale = %turn.rationale,
        response_length = turn.response.len(),
        "Interaction"
    );

    for record in &turn.tool_calls {
        let (status, result) = match &record.outcome {
            ToolOutcome::Success(value) => ("success", value.to_string()),
            ToolOutcome::Error(message) => ("error", message.clone()),
        };
        info!(
            target: "souschef::interaction",
            tool = %record.tool_name,
            call_id = %record.call_id,
            arguments = %record.arguments,
            status,
            result = %preview(&result, RESULT_PREVIEW_CHARS),
            "Tool call"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{ManagedOrchestrator, OrchestratorSettings};
    use crate::test_helpers::*;
    use serde_json::json;
    use souschef_config::MemoryConfig;
    use souschef_core::error::ProviderError;

    fn session(provider: Arc<ScriptedProvider>) -> ChefSession {
        let settings = OrchestratorSettings {
            model: "gpt-4".into(),
            temperature: 0.7,
            max_tokens: None,
            system_prompt: "You are SousChef.".into(),
            parallel_tool_calls: false,
        };
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(SleepyEchoTool));
        ChefSession::new(
            Orchestrator::Managed(ManagedOrchestrator::new(provider, settings)),
            MemoryStore::from_config(&MemoryConfig::default(), 10).unwrap(),
            registry,
        )
        .with_detailed_logging(true)
    }

    #[tokio::test]
    async fn turn_is_recorded_with_metadata() {
        let provider = Arc::new(ScriptedProvider::tool_then_answer(
            vec![make_tool_call("echo", json!({"text": "eggs"}))],
            "Make an omelette.",
        ));
        let mut session = session(provider);

        let turn = session.handle("I have 3 eggs and want something vegan under 20 min").await;
        assert_eq!(turn.rationale, "used tools: echo");

        let metadata = session.metadata();
        assert_eq!(metadata.interaction_count, 1);
        assert_eq!(metadata.history_turns, 1);
        assert!(metadata.tools_used.contains("echo"));

        let prefs = session.preferences();
        assert!(prefs.dietary_restrictions.contains("vegan"));
        assert_eq!(prefs.time_constraint_minutes, Some(20));
    }

    #[tokio::test]
    async fn second_turn_sees_history_and_context() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(make_text_response("Noted, vegetarian.")),
            Ok(make_text_response("Try a frittata.")),
        ]));
        let mut session = session(provider.clone());

        session.handle("I'm vegetarian").await;
        session.handle("What's for dinner?").await;

        let second = &provider.requests()[1];
        assert!(second.messages[1].content.starts_with("User context: Dietary restrictions: vegetarian"));
        assert_eq!(second.messages[2].content, "I'm vegetarian");
        assert_eq!(second.messages[3].content, "Noted, vegetarian.");
        assert_eq!(second.messages.len(), 5);
    }

    #[tokio::test]
    async fn failed_turn_is_still_recorded() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::AuthenticationFailed(
            "bad key".into(),
        ))]));
        let mut session = session(provider);

        let turn = session.handle("no nuts please").await;
        assert!(turn.is_error());
        assert_eq!(session.metadata().interaction_count, 1);
        assert_eq!(session.memory().history_for_model().len(), 2);
        assert!(session.preferences().dietary_restrictions.contains("nut-free"));
        assert!(session.metadata().tools_used.is_empty());
    }

    #[tokio::test]
    async fn clear_keeps_count() {
        let provider = Arc::new(ScriptedProvider::single_text("ciao"));
        let mut session = session(provider);
        session.handle("italian please").await;
        session.clear();
        assert!(session.preferences().is_default());
        assert_eq!(session.metadata().interaction_count, 1);
    }

    #[test]
    fn explicit_preference_update() {
        let mut session = session(Arc::new(ScriptedProvider::new(vec![])));
        session.update_preferences(PreferenceUpdate {
            cooking_skill_level: Some("advanced".into()),
            ..Default::default()
        });
        assert_eq!(session.preferences().cooking_skill_level, "advanced");
    }

    #[test]
    fn from_config_assembles_everything() {
        let dir = std::env::temp_dir();
        let mut config = AppConfig::default();
        config.tools.recipe_data_path = dir.join("souschef-missing-recipes.json");
        let session =
            ChefSession::from_config(&config, Arc::new(ScriptedProvider::new(vec![]))).unwrap();
        assert_eq!(session.orchestrator().kind(), "managed");
        assert_eq!(session.registry().len(), 2);
    }

    #[test]
    fn from_config_rejects_unknown_memory() {
        let mut config = AppConfig::default();
        config.memory.backend = "cosmos_db".into();
        let result = ChefSession::from_config(&config, Arc::new(ScriptedProvider::new(vec![])));
        assert!(result.is_err());
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 100), "short");
        let long = "é".repeat(150);
        let cut = preview(&long, 100);
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.ends_with("..."));
    }
}
