//! LLM Provider implementations for SousChef.
//!
//! All providers implement the `souschef_core::Provider` trait.
//! The router builds the configured provider at startup.

pub mod openai_compat;
pub mod router;

pub use openai_compat::{Auth, OpenAiCompatProvider};
pub use router::build_from_config;
