//! Session memory for SousChef.
//!
//! A [`MemoryStore`] owns the conversation history, user preferences and
//! session bookkeeping for one session. Backends form a closed set chosen
//! by `memory.backend`.

pub mod in_memory;
pub mod preferences;

pub use in_memory::InMemoryStore;

use souschef_config::MemoryConfig;
use souschef_core::error::{Error, Result};
use souschef_core::message::Message;
use souschef_core::session::{PreferenceUpdate, SessionMetadata, UserPreferences};
use souschef_core::turn::TurnMetadata;

/// The available memory backends.
#[derive(Debug, Clone)]
pub enum MemoryStore {
    InMemory(InMemoryStore),
}

impl MemoryStore {
    /// Build the backend named in `config`.
    pub fn from_config(config: &MemoryConfig, max_history_turns: usize) -> Result<Self> {
        match config.backend.as_str() {
            "in_memory" => Ok(Self::InMemory(InMemoryStore::new(max_history_turns))),
            other => Err(Error::UnknownMemoryBackend(other.to_string())),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "in_memory",
        }
    }

    pub fn record_turn(&mut self, user_message: &str, assistant_response: &str, turn: TurnMetadata) {
        match self {
            Self::InMemory(store) => store.record_turn(user_message, assistant_response, turn),
        }
    }

    pub fn context_summary(&self) -> String {
        match self {
            Self::InMemory(store) => store.context_summary(),
        }
    }

    pub fn preferences(&self) -> UserPreferences {
        match self {
            Self::InMemory(store) => store.preferences(),
        }
    }

    pub fn update_preferences(&mut self, update: PreferenceUpdate) {
        match self {
            Self::InMemory(store) => store.update_preferences(update),
        }
    }

    pub fn history_for_model(&self) -> Vec<Message> {
        match self {
            Self::InMemory(store) => store.history_for_model(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::InMemory(store) => store.clear(),
        }
    }

    pub fn metadata(&self) -> SessionMetadata {
        match self {
            Self::InMemory(store) => store.metadata(),
        }
    }
}
