//! Preference rules: inference from free text, explicit updates, and the
//! one-line context summary handed to the model.
//!
//! Inference is an ordered rule table. It only ever adds set members or
//! overwrites the time constraint, so applying it twice to the same text
//! leaves the preferences unchanged.

use regex_lite::Regex;
use souschef_core::session::{PreferenceUpdate, UserPreferences};
use std::sync::LazyLock;
use tracing::info;

/// Dietary restriction ← keywords that imply it.
const DIETARY_RULES: &[(&str, &[&str])] = &[
    ("vegetarian", &["vegetarian", "veggie"]),
    ("vegan", &["vegan"]),
    ("gluten-free", &["gluten-free", "gluten free", "celiac"]),
    ("dairy-free", &["dairy-free", "dairy free", "lactose"]),
    ("nut-free", &["nut-free", "no nuts"]),
    ("low-carb", &["low-carb", "keto"]),
];

const CUISINES: &[&str] = &[
    "italian",
    "mexican",
    "asian",
    "mediterranean",
    "american",
    "indian",
    "thai",
];

/// Time phrasing in priority order; the first pattern that matches wins.
static TIME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"under (\d+) min",
        r"less than (\d+) min",
        r"(\d+) min or less",
        r"quick.*?(\d+)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Run the rule table over raw user text.
pub fn infer(text: &str, prefs: &mut UserPreferences) {
    let lower = text.to_lowercase();

    for (restriction, keywords) in DIETARY_RULES {
        if keywords.iter().any(|kw| lower.contains(kw))
            && prefs.dietary_restrictions.insert((*restriction).to_string())
        {
            info!(restriction, "Auto-detected dietary restriction");
        }
    }

    for cuisine in CUISINES {
        if lower.contains(cuisine) && prefs.favorite_cuisines.insert((*cuisine).to_string()) {
            info!(cuisine, "Auto-detected cuisine preference");
        }
    }

    if let Some(minutes) = time_constraint(&lower) {
        prefs.time_constraint_minutes = Some(minutes);
        info!(minutes, "Auto-detected time constraint");
    }
}

/// Minutes from the first matching time pattern. A number too large for
/// `u32` is ignored.
fn time_constraint(lower: &str) -> Option<u32> {
    let caps = TIME_PATTERNS.iter().find_map(|re| re.captures(lower))?;
    caps.get(1)?.as_str().parse().ok()
}

/// Overwrite every field present in `update`.
pub fn apply_update(prefs: &mut UserPreferences, update: PreferenceUpdate) {
    if let Some(v) = update.dietary_restrictions {
        prefs.dietary_restrictions = v;
    }
    if let Some(v) = update.favorite_cuisines {
        prefs.favorite_cuisines = v;
    }
    if let Some(v) = update.disliked_ingredients {
        prefs.disliked_ingredients = v;
    }
    if let Some(v) = update.time_constraint_minutes {
        prefs.time_constraint_minutes = v;
    }
    if let Some(v) = update.cooking_skill_level {
        prefs.cooking_skill_level = v;
    }
    if let Some(v) = update.servings_preference {
        prefs.servings_preference = v;
    }
}

/// `"; "`-joined summary, or empty when nothing differs from the defaults.
pub fn summarize(prefs: &UserPreferences) -> String {
    if prefs.is_default() {
        return String::new();
    }

    let join = |set: &std::collections::BTreeSet<String>| {
        set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };

    let mut parts = Vec::new();
    if !prefs.dietary_restrictions.is_empty() {
        parts.push(format!("Dietary restrictions: {}", join(&prefs.dietary_restrictions)));
    }
    if !prefs.favorite_cuisines.is_empty() {
        parts.push(format!("Favorite cuisines: {}", join(&prefs.favorite_cuisines)));
    }
    if !prefs.disliked_ingredients.is_empty() {
        parts.push(format!("Dislikes: {}", join(&prefs.disliked_ingredients)));
    }
    if let Some(minutes) = prefs.time_constraint_minutes.filter(|m| *m > 0) {
        parts.push(format!("Time constraint: {minutes} minutes max"));
    }
    parts.push(format!("Cooking skill: {}", prefs.cooking_skill_level));
    parts.push(format!("Typical servings: {}", prefs.servings_preference));

    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn inferred(text: &str) -> UserPreferences {
        let mut prefs = UserPreferences::default();
        infer(text, &mut prefs);
        prefs
    }

    #[test]
    fn detects_dietary_groups() {
        let prefs = inferred("I'm celiac and lactose intolerant, trying keto");
        let expected: BTreeSet<String> = ["gluten-free", "dairy-free", "low-carb"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(prefs.dietary_restrictions, expected);
    }

    #[test]
    fn single_keyword_adds_single_restriction() {
        let prefs = inferred("Something VEGAN please");
        assert_eq!(prefs.dietary_restrictions.len(), 1);
        assert!(prefs.dietary_restrictions.contains("vegan"));
    }

    #[test]
    fn detects_cuisines_by_substring() {
        let prefs = inferred("I love Thai food and Italian pasta");
        assert!(prefs.favorite_cuisines.contains("thai"));
        assert!(prefs.favorite_cuisines.contains("italian"));
        assert_eq!(prefs.favorite_cuisines.len(), 2);
    }

    #[test]
    fn inference_is_idempotent() {
        let text = "vegetarian italian dinner under 30 minutes";
        let mut prefs = UserPreferences::default();
        infer(text, &mut prefs);
        let once = prefs.clone();
        infer(text, &mut prefs);
        assert_eq!(prefs, once);
    }

    #[test]
    fn time_patterns_in_priority_order() {
        assert_eq!(inferred("dinner under 20 min").time_constraint_minutes, Some(20));
        assert_eq!(inferred("less than 45 minutes").time_constraint_minutes, Some(45));
        assert_eq!(inferred("15 min or less").time_constraint_minutes, Some(15));
        assert_eq!(inferred("something quick, maybe 10").time_constraint_minutes, Some(10));
        // "under" outranks "quick"
        assert_eq!(
            inferred("quick meal 5 people, under 25 min").time_constraint_minutes,
            Some(25)
        );
        assert_eq!(inferred("a slow braise").time_constraint_minutes, None);
    }

    #[test]
    fn time_constraint_last_write_wins() {
        let mut prefs = UserPreferences::default();
        infer("under 30 min", &mut prefs);
        infer("actually less than 15 min", &mut prefs);
        assert_eq!(prefs.time_constraint_minutes, Some(15));
        infer("no time mentioned", &mut prefs);
        assert_eq!(prefs.time_constraint_minutes, Some(15));
    }

    #[test]
    fn oversized_minutes_are_ignored() {
        let prefs = inferred("under 99999999999 min");
        assert_eq!(prefs.time_constraint_minutes, None);
    }

    #[test]
    fn update_overwrites_present_fields_only() {
        let mut prefs = inferred("vegan thai");
        apply_update(
            &mut prefs,
            PreferenceUpdate {
                servings_preference: Some(2),
                cooking_skill_level: Some("beginner".into()),
                ..Default::default()
            },
        );
        assert_eq!(prefs.servings_preference, 2);
        assert_eq!(prefs.cooking_skill_level, "beginner");
        assert!(prefs.dietary_restrictions.contains("vegan"));

        apply_update(
            &mut prefs,
            PreferenceUpdate {
                dietary_restrictions: Some(BTreeSet::new()),
                ..Default::default()
            },
        );
        assert!(prefs.dietary_restrictions.is_empty());
    }

    #[test]
    fn summary_empty_for_defaults() {
        assert_eq!(summarize(&UserPreferences::default()), "");
    }

    #[test]
    fn summary_field_order() {
        let mut prefs = inferred("vegan mexican under 20 min");
        prefs.disliked_ingredients.insert("cilantro".into());
        assert_eq!(
            summarize(&prefs),
            "Dietary restrictions: vegan; Favorite cuisines: mexican; Dislikes: cilantro; \
             Time constraint: 20 minutes max; Cooking skill: intermediate; Typical servings: 4"
        );
    }

    #[test]
    fn summary_includes_skill_when_only_servings_changed() {
        let mut prefs = UserPreferences::default();
        prefs.servings_preference = 6;
        assert_eq!(summarize(&prefs), "Cooking skill: intermediate; Typical servings: 6");
    }
}
