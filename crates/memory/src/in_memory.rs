//! In-memory session store: ephemeral, single-user, gone at process exit.

use souschef_core::message::{Message, Role};
use souschef_core::session::{PreferenceUpdate, SessionMetadata, UserPreferences};
use souschef_core::turn::TurnMetadata;
use tracing::{debug, info};

use crate::preferences;

/// Conversation history, preferences and session bookkeeping for one
/// session.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    history: Vec<Message>,
    preferences: UserPreferences,
    metadata: SessionMetadata,
    max_history_turns: usize,
}

impl InMemoryStore {
    pub fn new(max_history_turns: usize) -> Self {
        info!(max_history_turns, "InMemoryStore initialized");
        Self {
            history: Vec::new(),
            preferences: UserPreferences::default(),
            metadata: SessionMetadata::new(),
            max_history_turns: max_history_turns.max(1),
        }
    }

    /// Record one completed turn.
    pub fn record_turn(&mut self, user_message: &str, assistant_response: &str, turn: TurnMetadata) {
        self.history.push(Message::user(user_message));

        self.metadata.interaction_count += 1;
        preferences::infer(user_message, &mut self.preferences);
        self.metadata.tools_used.extend(turn.tools.iter().cloned());

        self.history
            .push(Message::assistant(assistant_response).with_metadata(turn.to_map()));

        let max_messages = self.max_history_turns * 2;
        if self.history.len() > max_messages {
            let excess = self.history.len() - max_messages;
            self.history.drain(..excess);
        }

        debug!(history_len = self.history.len(), "Interaction recorded");
    }

    /// Preference summary for the model, empty when all defaults.
    pub fn context_summary(&self) -> String {
        preferences::summarize(&self.preferences)
    }

    pub fn preferences(&self) -> UserPreferences {
        self.preferences.clone()
    }

    pub fn update_preferences(&mut self, update: PreferenceUpdate) {
        if update.is_empty() {
            return;
        }
        info!(?update, "Updating preferences");
        preferences::apply_update(&mut self.preferences, update);
    }

    /// History reduced to role and content, oldest first.
    pub fn history_for_model(&self) -> Vec<Message> {
        self.history
            .iter()
            .map(|m| Message::new(m.role, m.content.clone()))
            .collect()
    }

    /// Full history entries, including per-turn metadata.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Reset history, preferences and tools used. `session_start` and
    /// `interaction_count` are kept.
    pub fn clear(&mut self) {
        self.history.clear();
        self.preferences = UserPreferences::default();
        self.metadata.tools_used.clear();
        info!("Memory cleared");
    }

    pub fn metadata(&self) -> SessionMetadata {
        SessionMetadata {
            history_turns: self
                .history
                .iter()
                .filter(|m| m.role == Role::User)
                .count(),
            ..self.metadata.clone()
        }
    }
}
