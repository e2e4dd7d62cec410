//! # SousChef Core
//!
//! Domain types, traits, and error definitions for the SousChef cooking agent.
//! This crate has **no framework dependencies**: it defines the domain model
//! that all other crates implement against.
//!
//! Every external capability (LLM backend, tools) is a trait here;
//! implementations live in their respective crates.

pub mod error;
pub mod message;
pub mod provider;
pub mod session;
pub mod tool;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use session::{PreferenceUpdate, SessionMetadata, UserPreferences};
pub use tool::{Tool, ToolCall, ToolRegistry};
pub use turn::{ToolCallRecord, ToolOutcome, TurnMetadata, TurnResult};
