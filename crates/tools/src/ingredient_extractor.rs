//! Ingredient extractor: pulls ingredients, quantities and dietary
//! constraints out of free text.
//!
//! Pattern matching runs first. When it finds nothing and a model is
//! attached, the model is asked for a JSON list instead.

use async_trait::async_trait;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use souschef_core::error::ToolError;
use souschef_core::message::Message;
use souschef_core::provider::{Provider, ProviderRequest};
use souschef_core::tool::Tool;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

const UNITS: &[&str] = &[
    "cup", "cups", "tablespoon", "tablespoons", "tbsp", "teaspoon", "teaspoons", "tsp",
    "ounce", "ounces", "oz", "pound", "pounds", "lb", "lbs", "gram", "grams", "g",
    "kilogram", "kilograms", "kg", "milliliter", "milliliters", "ml", "liter", "liters", "l",
    "pinch", "dash", "handful", "slice", "slices", "piece", "pieces", "clove", "cloves",
];

const DIETARY_KEYWORDS: &[(&str, &[&str])] = &[
    ("vegetarian", &["vegetarian", "veggie"]),
    ("vegan", &["vegan", "plant-based", "plant based"]),
    ("gluten-free", &["gluten-free", "gluten free", "no gluten", "celiac"]),
    ("dairy-free", &["dairy-free", "dairy free", "lactose-free", "no dairy", "no milk"]),
    ("nut-free", &["nut-free", "nut free", "no nuts"]),
    ("low-carb", &["low-carb", "low carb", "keto", "ketogenic"]),
    ("paleo", &["paleo", "paleolithic"]),
    ("halal", &["halal"]),
    ("kosher", &["kosher"]),
];

const SEPARATORS: &[&str] = &[",", ";", "\n", " and ", " or "];

/// `quantity [unit] name`, e.g. "2 cups flour", "1/2 tsp salt", "3 eggs".
static QUANTITY_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    let units = UNITS.join("|");
    Regex::new(&format!(
        r"(?i)(\d+(?:[./]\d+)?)\s*(?:({units})\b)?\s+([a-zA-Z\s,]+)"
    ))
    .ok()
});

const FALLBACK_SYSTEM_PROMPT: &str =
    "You are a precise ingredient extraction assistant. Respond only with valid JSON.";

/// One parsed ingredient. Quantity and unit are empty when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
}

impl Ingredient {
    fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: String::new(),
            unit: String::new(),
        }
    }
}

/// The structured result returned to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub ingredients: Vec<Ingredient>,
    pub dietary_constraints: Vec<String>,
    pub raw_text: String,
    pub count: usize,
}

pub struct IngredientExtractorTool {
    fallback: Option<(Arc<dyn Provider>, String)>,
}

impl IngredientExtractorTool {
    /// Pattern matching only.
    pub fn new() -> Self {
        Self { fallback: None }
    }

    /// Ask `model` on `provider` when the patterns find nothing.
    pub fn with_llm_fallback(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            fallback: Some((provider, model.into())),
        }
    }

    pub async fn extract(&self, text: &str) -> Extraction {
        let preview: String = text.chars().take(100).collect();
        info!(text = %preview, "Extracting ingredients");

        let dietary_constraints = dietary_constraints(text);
        let mut ingredients = pattern_extract(text);

        if ingredients.is_empty() {
            if let Some((provider, model)) = &self.fallback {
                debug!("Pattern extraction found nothing, asking the model");
                ingredients = llm_extract(provider.as_ref(), model, text).await;
            }
        }

        info!(
            ingredients = ingredients.len(),
            constraints = dietary_constraints.len(),
            "Extraction complete"
        );

        Extraction {
            count: ingredients.len(),
            ingredients,
            dietary_constraints,
            raw_text: text.to_string(),
        }
    }
}

impl Default for IngredientExtractorTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Quantity phrases first, then short digit-free list items.
pub fn pattern_extract(text: &str) -> Vec<Ingredient> {
    let mut ingredients: Vec<Ingredient> = Vec::new();

    if let Some(re) = QUANTITY_PATTERN.as_ref() {
        for caps in re.captures_iter(text) {
            let Some(name) = caps.get(3).map(|m| clean_name(m.as_str())) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            ingredients.push(Ingredient {
                name,
                quantity: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
                unit: caps
                    .get(2)
                    .map(|m| m.as_str().to_lowercase())
                    .unwrap_or_default(),
            });
        }
    }

    let lower = text.to_lowercase();
    for separator in SEPARATORS {
        if !lower.contains(separator) {
            continue;
        }
        for part in lower.split(separator) {
            let part = strip_connective(part.trim());
            if part.is_empty()
                || part.split_whitespace().count() > 3
                || part.chars().any(|c| c.is_ascii_digit())
                || ingredients.iter().any(|i| i.name == part)
            {
                continue;
            }
            ingredients.push(Ingredient::plain(part));
        }
    }

    ingredients
}

/// The name group runs on past list punctuation; keep the first item.
fn clean_name(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let first = lower.split(',').next().unwrap_or_default();
    let first = first.split(" and ").next().unwrap_or_default();
    let first = first.split(" or ").next().unwrap_or_default();
    first.trim().to_string()
}

fn strip_connective(part: &str) -> &str {
    part.strip_prefix("and ")
        .or_else(|| part.strip_prefix("or "))
        .unwrap_or(part)
        .trim()
}

/// Constraints in table order, each at most once.
pub fn dietary_constraints(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    DIETARY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(constraint, _)| (*constraint).to_string())
        .collect()
}

/// Model-based extraction. Every failure yields an empty list.
async fn llm_extract(provider: &dyn Provider, model: &str, text: &str) -> Vec<Ingredient> {
    let prompt = format!(
        "Extract all ingredients from the following text. For each ingredient, identify:\n\
         - name: the ingredient name\n\
         - quantity: the amount (if specified)\n\
         - unit: the measurement unit (if specified)\n\n\
         Return the result as a JSON list. If no ingredients are found, return an empty list.\n\n\
         Text: {text}\n\n\
         Respond with ONLY a JSON list, no other text."
    );

    let request = ProviderRequest {
        model: model.to_string(),
        messages: vec![Message::system(FALLBACK_SYSTEM_PROMPT), Message::user(prompt)],
        temperature: 0.3,
        max_tokens: Some(500),
        tools: Vec::new(),
    };

    match provider.complete(request).await {
        Ok(response) => parse_llm_list(&response.message.content),
        Err(e) => {
            warn!(error = %e, "LLM ingredient extraction failed");
            Vec::new()
        }
    }
}

/// Accepts a list of objects or of bare names, optionally inside a code fence.
fn parse_llm_list(content: &str) -> Vec<Ingredient> {
    let body = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let items: Vec<serde_json::Value> = match serde_json::from_str(body) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "LLM ingredient list was not valid JSON");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(name) => Some(Ingredient::plain(name.to_lowercase())),
            serde_json::Value::Object(map) => {
                let field = |key: &str| match map.get(key) {
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(serde_json::Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                };
                let name = field("name");
                (!name.is_empty()).then(|| Ingredient {
                    name: name.to_lowercase(),
                    quantity: field("quantity"),
                    unit: field("unit"),
                })
            }
            _ => None,
        })
        .collect()
}

#[async_trait]
impl Tool for IngredientExtractorTool {
    fn name(&self) -> &str {
        "ingredient_extractor"
    }

    fn description(&self) -> &str {
        "Extract ingredients, quantities, and dietary constraints from user text. Use when the user mentions ingredients they have or provides recipe text to parse."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The text containing ingredients to extract"
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let text = arguments["text"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'text' argument".into()))?;

        let extraction = self.extract(text).await;
        serde_json::to_value(&extraction).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use souschef_core::error::ProviderError;
    use souschef_core::provider::ProviderResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedProvider {
        reply: Result<String, ProviderError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Provider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(request.tools.is_empty());
            let content = self.reply.clone()?;
            Ok(ProviderResponse {
                message: Message::assistant(content),
                usage: None,
                model: request.model,
            })
        }
    }

    fn names(ingredients: &[Ingredient]) -> Vec<&str> {
        ingredients.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn quantities_and_units() {
        let found = pattern_extract("I have 2 cups flour, 3 eggs, 1/2 cup sugar, and butter");
        assert_eq!(names(&found), vec!["flour", "eggs", "sugar", "butter"]);
        assert_eq!(found[0].quantity, "2");
        assert_eq!(found[0].unit, "cups");
        assert_eq!(found[1].unit, "");
        assert_eq!(found[2].quantity, "1/2");
        assert_eq!(found[2].unit, "cup");
        assert_eq!(found[3].quantity, "");
    }

    #[test]
    fn unit_needs_word_boundary() {
        let found = pattern_extract("2 garlic bulbs");
        assert_eq!(found[0].name, "garlic bulbs");
        assert_eq!(found[0].unit, "");
    }

    #[test]
    fn plain_comma_list() {
        let found = pattern_extract("tomatoes, basil, mozzarella cheese, olive oil");
        assert_eq!(
            names(&found),
            vec!["tomatoes", "basil", "mozzarella cheese", "olive oil"]
        );
    }

    #[test]
    fn long_clauses_are_not_ingredients() {
        let found = pattern_extract("Find me a vegan gluten-free recipe with chickpeas and spinach");
        assert_eq!(names(&found), vec!["spinach"]);
    }

    #[test]
    fn extended_dietary_table() {
        let constraints =
            dietary_constraints("Plant-based, no gluten, and it has to be halal or kosher");
        assert_eq!(constraints, vec!["vegan", "gluten-free", "halal", "kosher"]);
    }

    #[test]
    fn llm_list_parsing() {
        let parsed = parse_llm_list(
            "```json\n[{\"name\": \"Salmon\", \"quantity\": 2, \"unit\": \"fillets\"}, \"Lemon\", 7]\n```",
        );
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "salmon");
        assert_eq!(parsed[0].quantity, "2");
        assert_eq!(parsed[1], Ingredient::plain("lemon"));
        assert!(parse_llm_list("sorry, I can't").is_empty());
        assert!(parse_llm_list("{\"name\": \"x\"}").is_empty());
    }

    #[tokio::test]
    async fn execute_returns_structured_result() {
        let tool = IngredientExtractorTool::new();
        let result = tool
            .execute(serde_json::json!({"text": "1 lb chicken; rice; dairy free please"}))
            .await
            .unwrap();
        assert_eq!(result["ingredients"][0]["name"], "chicken");
        assert_eq!(result["ingredients"][0]["unit"], "lb");
        assert_eq!(result["dietary_constraints"], serde_json::json!(["dairy-free"]));
        assert_eq!(result["raw_text"], "1 lb chicken; rice; dairy free please");
        assert_eq!(result["count"], result["ingredients"].as_array().unwrap().len());
    }

    #[tokio::test]
    async fn missing_text_is_invalid() {
        let tool = IngredientExtractorTool::new();
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn fallback_used_only_when_patterns_find_nothing() {
        let provider = Arc::new(CannedProvider {
            reply: Ok(r#"[{"name": "leftover risotto"}]"#.into()),
            calls: AtomicUsize::new(0),
        });
        let tool = IngredientExtractorTool::with_llm_fallback(provider.clone(), "gpt-4");

        let extraction = tool.extract("what can I make with what's in my fridge").await;
        assert_eq!(names(&extraction.ingredients), vec!["leftover risotto"]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let extraction = tool.extract("3 eggs").await;
        assert_eq!(names(&extraction.ingredients), vec!["eggs"]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fallback_failure_yields_empty_list() {
        let provider = Arc::new(CannedProvider {
            reply: Err(ProviderError::Network("connection reset".into())),
            calls: AtomicUsize::new(0),
        });
        let tool = IngredientExtractorTool::with_llm_fallback(provider, "gpt-4");
        let extraction = tool.extract("surprise me").await;
        assert!(extraction.ingredients.is_empty());
        assert_eq!(extraction.count, 0);
    }
}
