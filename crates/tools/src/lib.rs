//! Cooking tools for SousChef.
//!
//! - `ingredient_extractor`: parse ingredients and dietary constraints
//!   from free text
//! - `recipe_search`: filter the local recipe dataset

pub mod ingredient_extractor;
pub mod recipe_search;

use souschef_config::ToolsConfig;
use souschef_core::provider::Provider;
use souschef_core::tool::ToolRegistry;
use std::sync::Arc;

pub use ingredient_extractor::IngredientExtractorTool;
pub use recipe_search::RecipeSearchTool;

/// Build the registry for the tools enabled in `config`.
///
/// `fallback` is the provider and model used by the extractor when its
/// patterns find nothing; ignored unless `config.llm_fallback` is set.
pub fn default_registry(
    config: &ToolsConfig,
    fallback: Option<(Arc<dyn Provider>, String)>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    if config.ingredient_extractor {
        let tool = match fallback.filter(|_| config.llm_fallback) {
            Some((provider, model)) => IngredientExtractorTool::with_llm_fallback(provider, model),
            None => IngredientExtractorTool::new(),
        };
        registry.register(Box::new(tool));
    }

    if config.recipe_search {
        registry.register(Box::new(RecipeSearchTool::from_path(
            &config.recipe_data_path,
            config.max_recipe_results,
        )));
    }

    tracing::debug!(tools = ?registry.names(), "Tool registry built");
    registry
}
