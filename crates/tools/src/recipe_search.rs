//! Recipe search: filters a local JSON recipe dataset.
//!
//! The dataset is read once when the tool is built. A missing or malformed
//! file leaves the tool with no recipes rather than failing startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use souschef_core::error::ToolError;
use souschef_core::tool::Tool;
use std::path::Path;
use tracing::{error, info, warn};

/// A recipe as stored in the dataset. Every field is optional on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub time_minutes: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub dietary_info: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub servings: Option<u32>,
}

impl Recipe {
    /// Any search ingredient is a substring of a recipe ingredient, or the
    /// other way round.
    fn matches_ingredients(&self, wanted: &[String]) -> bool {
        let have: Vec<String> = self.ingredients.iter().map(|i| i.to_lowercase()).collect();
        wanted.iter().any(|w| {
            let w = w.to_lowercase();
            have.iter().any(|h| h.contains(&w) || w.contains(h.as_str()))
        })
    }

    fn matches_dietary(&self, restriction: &str) -> bool {
        self.dietary_info
            .iter()
            .any(|d| d.eq_ignore_ascii_case(restriction))
    }

    fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            title: self.title.clone().unwrap_or_else(|| "Untitled".into()),
            description: self.description.clone().unwrap_or_default(),
            cuisine: self.cuisine.clone().unwrap_or_else(|| "Unknown".into()),
            time_minutes: self.time_minutes.unwrap_or(0),
            difficulty: self.difficulty.clone().unwrap_or_else(|| "medium".into()),
            dietary_info: self.dietary_info.clone(),
            main_ingredients: self.ingredients.iter().take(5).cloned().collect(),
            servings: self.servings.unwrap_or(4),
        }
    }
}

/// What the model sees for each hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub title: String,
    pub description: String,
    pub cuisine: String,
    pub time_minutes: u32,
    pub difficulty: String,
    pub dietary_info: Vec<String>,
    pub main_ingredients: Vec<String>,
    pub servings: u32,
}

/// Search filters. Empty values are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub max_time_minutes: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub recipes: Vec<RecipeSummary>,
    /// Total matches before truncation.
    pub count: usize,
    pub returned: usize,
    pub filters_applied: Vec<String>,
}

pub struct RecipeSearchTool {
    recipes: Vec<Recipe>,
    max_results: usize,
}

impl RecipeSearchTool {
    pub fn new(recipes: Vec<Recipe>, max_results: usize) -> Self {
        Self {
            recipes,
            max_results,
        }
    }

    /// Load the dataset at `path`.
    pub fn from_path(path: &Path, max_results: usize) -> Self {
        let recipes = load_recipes(path);
        info!(recipes = recipes.len(), path = %path.display(), "RecipeSearch initialized");
        Self::new(recipes, max_results)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn search(&self, filters: &SearchFilters) -> SearchResults {
        info!(?filters, "Searching recipes");

        let mut matches: Vec<&Recipe> = self.recipes.iter().collect();
        let mut applied = Vec::new();

        let ingredients: Vec<String> = non_empty(&filters.ingredients);
        if !ingredients.is_empty() {
            matches.retain(|r| r.matches_ingredients(&ingredients));
            applied.push(format!("ingredients: {}", ingredients.join(", ")));
        }

        let dietary: Vec<String> = non_empty(&filters.dietary_restrictions);
        if !dietary.is_empty() {
            matches.retain(|r| dietary.iter().all(|d| r.matches_dietary(d)));
            applied.push(format!("dietary: {}", dietary.join(", ")));
        }

        if let Some(cuisine) = filters.cuisine.as_deref().filter(|c| !c.is_empty()) {
            matches.retain(|r| {
                r.cuisine
                    .as_deref()
                    .is_some_and(|rc| rc.eq_ignore_ascii_case(cuisine))
            });
            applied.push(format!("cuisine: {cuisine}"));
        }

        if let Some(max) = filters.max_time_minutes.filter(|m| *m > 0) {
            // Recipes without a time never fit a time limit.
            matches.retain(|r| r.time_minutes.unwrap_or(999) <= max);
            applied.push(format!("max time: {max} minutes"));
        }

        if let Some(difficulty) = filters.difficulty.as_deref().filter(|d| !d.is_empty()) {
            matches.retain(|r| {
                r.difficulty
                    .as_deref()
                    .is_some_and(|rd| rd.eq_ignore_ascii_case(difficulty))
            });
            applied.push(format!("difficulty: {difficulty}"));
        }

        if applied.is_empty() {
            applied.push("none".into());
        }

        let recipes: Vec<RecipeSummary> = matches
            .iter()
            .take(self.max_results)
            .map(|r| r.summary())
            .collect();

        info!(returned = recipes.len(), matched = matches.len(), "Search complete");

        SearchResults {
            count: matches.len(),
            returned: recipes.len(),
            recipes,
            filters_applied: applied,
        }
    }
}

fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

fn load_recipes(path: &Path) -> Vec<Recipe> {
    if !path.exists() {
        warn!(path = %path.display(), "Recipe data file not found");
        return Vec::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error reading recipes");
            return Vec::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(recipes) => recipes,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error parsing recipes");
            Vec::new()
        }
    }
}

#[async_trait]
impl Tool for RecipeSearchTool {
    fn name(&self) -> &str {
        "recipe_search"
    }

    fn description(&self) -> &str {
        "Search for recipes based on ingredients, dietary restrictions, cuisine, cooking time, and difficulty level. Returns matching recipes with details."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "ingredients": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "List of ingredients to search for (optional)"
                },
                "dietary_restrictions": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Dietary constraints like 'vegetarian', 'vegan', 'gluten-free', 'dairy-free' (optional)"
                },
                "cuisine": {
                    "type": "string",
                    "description": "Cuisine type like 'Italian', 'Mexican', 'Asian', 'Mediterranean' (optional)"
                },
                "max_time_minutes": {
                    "type": "integer",
                    "description": "Maximum cooking time in minutes (optional)"
                },
                "difficulty": {
                    "type": "string",
                    "enum": ["easy", "medium", "hard"],
                    "description": "Recipe difficulty level (optional)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let filters: SearchFilters = if arguments.is_null() {
            SearchFilters::default()
        } else {
            serde_json::from_value(arguments)
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?
        };

        let results = self.search(&filters);
        serde_json::to_value(&results).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(
        title: &str,
        cuisine: &str,
        time: u32,
        difficulty: &str,
        diets: &[&str],
        ingredients: &[&str],
    ) -> Recipe {
        Recipe {
            title: Some(title.into()),
            description: Some(format!("{title} description")),
            cuisine: Some(cuisine.into()),
            time_minutes: Some(time),
            difficulty: Some(difficulty.into()),
            dietary_info: diets.iter().map(|d| d.to_string()).collect(),
            ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
            servings: Some(4),
        }
    }

    fn tool() -> RecipeSearchTool {
        RecipeSearchTool::new(
            vec![
                recipe(
                    "Margherita Pasta",
                    "Italian",
                    25,
                    "easy",
                    &["vegetarian"],
                    &["spaghetti", "tomatoes", "basil", "mozzarella", "olive oil", "garlic"],
                ),
                recipe(
                    "Chickpea Curry",
                    "Indian",
                    35,
                    "medium",
                    &["vegetarian", "vegan", "gluten-free"],
                    &["chickpeas", "coconut milk", "onion"],
                ),
                recipe(
                    "Chicken Tacos",
                    "Mexican",
                    20,
                    "easy",
                    &["dairy-free"],
                    &["chicken thighs", "tortillas", "lime"],
                ),
                Recipe {
                    title: Some("Mystery Stew".into()),
                    ingredients: vec!["potatoes".into()],
                    ..Recipe::default()
                },
            ],
            5,
        )
    }

    #[test]
    fn no_filters_returns_everything() {
        let results = tool().search(&SearchFilters::default());
        assert_eq!(results.count, 4);
        assert_eq!(results.returned, 4);
        assert_eq!(results.filters_applied, vec!["none"]);
    }

    #[test]
    fn ingredient_match_is_bidirectional_substring() {
        let t = tool();
        let results = t.search(&SearchFilters {
            ingredients: vec!["Chicken".into()],
            ..Default::default()
        });
        assert_eq!(results.count, 1);
        assert_eq!(results.recipes[0].title, "Chicken Tacos");

        // "fresh basil leaves" contains the recipe ingredient "basil"
        let results = t.search(&SearchFilters {
            ingredients: vec!["fresh basil leaves".into()],
            ..Default::default()
        });
        assert_eq!(results.recipes[0].title, "Margherita Pasta");
    }

    #[test]
    fn every_dietary_restriction_must_hold() {
        let results = tool().search(&SearchFilters {
            dietary_restrictions: vec!["Vegetarian".into(), "vegan".into()],
            ..Default::default()
        });
        assert_eq!(results.count, 1);
        assert_eq!(results.recipes[0].title, "Chickpea Curry");
        assert_eq!(results.filters_applied, vec!["dietary: Vegetarian, vegan"]);
    }

    #[test]
    fn cuisine_time_and_difficulty() {
        let t = tool();
        let results = t.search(&SearchFilters {
            cuisine: Some("italian".into()),
            ..Default::default()
        });
        assert_eq!(results.count, 1);

        let results = t.search(&SearchFilters {
            max_time_minutes: Some(25),
            difficulty: Some("EASY".into()),
            ..Default::default()
        });
        assert_eq!(results.count, 2);
        assert_eq!(
            results.filters_applied,
            vec!["max time: 25 minutes", "difficulty: EASY"]
        );
    }

    #[test]
    fn missing_time_never_fits_a_limit() {
        let results = tool().search(&SearchFilters {
            max_time_minutes: Some(500),
            ..Default::default()
        });
        assert_eq!(results.count, 3);
    }

    #[test]
    fn results_truncated_but_count_is_total() {
        let mut t = tool();
        t.max_results = 2;
        let results = t.search(&SearchFilters::default());
        assert_eq!(results.count, 4);
        assert_eq!(results.returned, 2);
        assert_eq!(results.recipes.len(), 2);
    }

    #[test]
    fn summary_defaults_and_first_five_ingredients() {
        let results = tool().search(&SearchFilters::default());
        let pasta = &results.recipes[0];
        assert_eq!(pasta.main_ingredients.len(), 5);
        let stew = &results.recipes[3];
        assert_eq!(stew.cuisine, "Unknown");
        assert_eq!(stew.difficulty, "medium");
        assert_eq!(stew.time_minutes, 0);
        assert_eq!(stew.servings, 4);
    }

    #[test]
    fn loads_dataset_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(
            &path,
            r#"[{"title": "Toast", "ingredients": ["bread", "butter"], "time_minutes": 5}]"#,
        )
        .unwrap();
        let t = RecipeSearchTool::from_path(&path, 5);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn missing_or_invalid_dataset_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RecipeSearchTool::from_path(&dir.path().join("nope.json"), 5).is_empty());

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(RecipeSearchTool::from_path(&path, 5).is_empty());
    }

    #[tokio::test]
    async fn execute_parses_arguments() {
        let result = tool()
            .execute(serde_json::json!({"cuisine": "Mexican", "ingredients": []}))
            .await
            .unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["recipes"][0]["title"], "Chicken Tacos");
        assert_eq!(result["filters_applied"], serde_json::json!(["cuisine: Mexican"]));
    }

    #[tokio::test]
    async fn execute_rejects_wrong_types() {
        let err = tool()
            .execute(serde_json::json!({"max_time_minutes": "soon"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
