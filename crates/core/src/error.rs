//! Error types for the SousChef domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! wraps them for the few places where failures cross a context boundary.
//!
//! Propagation rules:
//! - [`ToolError`] never escapes a turn; the dispatcher folds it into the
//!   tool-result payload sent back to the model.
//! - [`ProviderError`] never escapes a session; the orchestrator turns it
//!   into an apology response.
//! - Construction errors ([`Error::UnknownOrchestrator`],
//!   [`Error::UnknownMemoryBackend`]) and `souschef-config`'s
//!   `ConfigError` are the only ones allowed to stop the process.

use thiserror::Error;

/// The top-level error type for all SousChef operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Construction errors ---
    #[error("Unknown orchestrator type: {0} (valid options: managed)")]
    UnknownOrchestrator(String),

    #[error("Unknown memory backend: {0} (valid options: in_memory)")]
    UnknownMemoryBackend(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
