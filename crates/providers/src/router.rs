//! Provider selection: builds the configured LLM provider.
//!
//! Called once at startup; the returned provider is shared by the
//! orchestrator and any tool that needs a model (extraction fallback).

use std::sync::Arc;
use souschef_config::AppConfig;
use souschef_core::error::ProviderError;
use souschef_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Build the provider described by `config`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider = build_provider(config)?;

    tracing::debug!(
        provider = %config.provider,
        base_url = %provider.base_url(),
        model = %config.model,
        "Provider configured"
    );

    Ok(Arc::new(provider))
}

/// Azure needs an endpoint. `openai`, `openrouter` and `ollama` have
/// well-known base URLs; any other name needs an explicit `api_url`.
fn build_provider(config: &AppConfig) -> Result<OpenAiCompatProvider, ProviderError> {
    let api_key = config.api_key.clone().unwrap_or_default();
    let api_url = config.api_url.as_deref();

    let provider = match (config.provider.as_str(), api_url) {
        ("azure", Some(endpoint)) => {
            OpenAiCompatProvider::azure(endpoint, &config.model, api_key, &config.api_version)
        }
        ("azure", None) => {
            return Err(ProviderError::NotConfigured(
                "azure provider requires api_url (AZURE_OPENAI_ENDPOINT)".into(),
            ));
        }
        ("ollama", url) => OpenAiCompatProvider::ollama(url),
        (name, Some(url)) => OpenAiCompatProvider::new(name, url, api_key),
        ("openai", None) => OpenAiCompatProvider::openai(api_key),
        ("openrouter", None) => OpenAiCompatProvider::new("openrouter", OPENROUTER_BASE_URL, api_key),
        (other, None) => {
            return Err(ProviderError::NotConfigured(format!(
                "unknown provider '{other}' (use azure, openai, openrouter, ollama, or set api_url)"
            )));
        }
    };

    Ok(provider)
}
