//! Session state types: user preferences and session bookkeeping.
//!
//! These are plain data; the rules that mutate them live with the memory
//! backends in `souschef-memory`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_SKILL_LEVEL: &str = "intermediate";
pub const DEFAULT_SERVINGS: u32 = 4;

/// Durable, session-scoped facts about the user's cooking needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub dietary_restrictions: BTreeSet<String>,

    #[serde(default)]
    pub favorite_cuisines: BTreeSet<String>,

    #[serde(default)]
    pub disliked_ingredients: BTreeSet<String>,

    /// Maximum cooking time; last write wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_constraint_minutes: Option<u32>,

    #[serde(default = "default_skill_level")]
    pub cooking_skill_level: String,

    #[serde(default = "default_servings")]
    pub servings_preference: u32,
}

fn default_skill_level() -> String {
    DEFAULT_SKILL_LEVEL.into()
}

fn default_servings() -> u32 {
    DEFAULT_SERVINGS
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            dietary_restrictions: BTreeSet::new(),
            favorite_cuisines: BTreeSet::new(),
            disliked_ingredients: BTreeSet::new(),
            time_constraint_minutes: None,
            cooking_skill_level: default_skill_level(),
            servings_preference: default_servings(),
        }
    }
}

impl UserPreferences {
    /// True when nothing has been set beyond the defaults.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A partial overwrite of [`UserPreferences`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceUpdate {
    pub dietary_restrictions: Option<BTreeSet<String>>,
    pub favorite_cuisines: Option<BTreeSet<String>>,
    pub disliked_ingredients: Option<BTreeSet<String>>,
    /// `Some(None)` clears the constraint.
    pub time_constraint_minutes: Option<Option<u32>>,
    pub cooking_skill_level: Option<String>,
    pub servings_preference: Option<u32>,
}

impl PreferenceUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Session bookkeeping reported at session end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Set once when the session is created; survives `clear`.
    pub session_start: DateTime<Utc>,

    /// Turns recorded so far; never decreases.
    pub interaction_count: u64,

    /// Every tool that ran successfully in this session.
    pub tools_used: BTreeSet<String>,

    /// Current history length in turns (user/assistant pairs).
    #[serde(default)]
    pub history_turns: usize,
}

impl SessionMetadata {
    pub fn new() -> Self {
        Self {
            session_start: Utc::now(),
            interaction_count: 0,
            tools_used: BTreeSet::new(),
            history_turns: 0,
        }
    }
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self::new()
    }
}
