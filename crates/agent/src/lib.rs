//! Turn handling for SousChef.
//!
//! A turn follows a fixed **two-pass** protocol:
//!
//! 1. **Ask** the model, offering the registered tools
//! 2. **If tool calls**: dispatch them, append the results
//! 3. **Ask again** without tools for the final answer
//!
//! [`ChefSession`] ties an orchestrator to the session's memory and tool
//! registry and records every turn.

pub mod dispatcher;
pub mod orchestrator;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use dispatcher::ToolDispatcher;
pub use orchestrator::{ManagedOrchestrator, Orchestrator, OrchestratorSettings};
pub use session::ChefSession;
