//! `souschef chat`: Interactive or single-message chat mode.

use std::collections::BTreeSet;
use std::io::Write;

use souschef_agent::ChefSession;
use souschef_config::AppConfig;
use souschef_core::session::{PreferenceUpdate, SessionMetadata, UserPreferences};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::info;

const HELP: &str = "\
  Commands:
    help, ?                 Show this help
    preferences             Show what SousChef remembers about you
    set <field> <value>     Set a preference explicitly
                              skill    beginner | intermediate | advanced
                              servings <number>
                              time     <minutes> | none
                              diet     <comma separated list>
                              cuisine  <comma separated list>
                              dislike  <comma separated list>
    clear                   Forget history and preferences
    exit, quit, bye         End the session

  Anything else is sent to SousChef.";

const PREFERENCE_FIELDS: &[&str] = &["skill", "servings", "time", "diet", "cuisine", "dislike"];

const SET_USAGE: &str = "Usage: set <field> <value> (type 'help' for fields)";

/// One line of interactive input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Exit,
    Clear,
    Preferences,
    Help,
    Set(PreferenceUpdate),
    Message(String),
}

impl Input {
    /// Classify a raw input line.
    ///
    /// `set` followed by a known field is a preference command; a malformed
    /// one yields `Err` with a usage hint. Any other line is a message.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }

        match line.to_lowercase().as_str() {
            "exit" | "quit" | "bye" | "goodbye" => return Ok(Self::Exit),
            "clear" => return Ok(Self::Clear),
            "preferences" | "prefs" => return Ok(Self::Preferences),
            "help" | "?" => return Ok(Self::Help),
            _ => {}
        }

        let mut words = line.split_whitespace();
        if words.next().is_some_and(|w| w.eq_ignore_ascii_case("set")) {
            match words.next() {
                None => return Err(SET_USAGE.into()),
                Some(field) if PREFERENCE_FIELDS.contains(&field.to_lowercase().as_str()) => {
                    let value = words.collect::<Vec<_>>().join(" ");
                    return parse_set(field, &value).map(Self::Set);
                }
                // "Set me up with..." is a request, not a command.
                Some(_) => {}
            }
        }

        Ok(Self::Message(line.to_string()))
    }
}

fn parse_set(field: &str, value: &str) -> Result<PreferenceUpdate, String> {
    if value.is_empty() {
        return Err(SET_USAGE.into());
    }

    let mut update = PreferenceUpdate::default();
    match field.to_lowercase().as_str() {
        "skill" => {
            let level = value.to_lowercase();
            if !matches!(level.as_str(), "beginner" | "intermediate" | "advanced") {
                return Err(format!(
                    "Unknown skill level '{value}' (beginner, intermediate or advanced)"
                ));
            }
            update.cooking_skill_level = Some(level);
        }
        "servings" => {
            let servings: u32 = value
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("Servings must be a positive number, got '{value}'"))?;
            update.servings_preference = Some(servings);
        }
        "time" => {
            let minutes = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                let lower = value.to_lowercase();
                let number = ["minutes", "mins", "min"]
                    .iter()
                    .find_map(|unit| lower.strip_suffix(*unit))
                    .unwrap_or(lower.as_str());
                Some(
                    number
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| format!("Time must be minutes or 'none', got '{value}'"))?,
                )
            };
            update.time_constraint_minutes = Some(minutes);
        }
        "diet" => update.dietary_restrictions = Some(list(value)),
        "cuisine" => update.favorite_cuisines = Some(list(value)),
        "dislike" => update.disliked_ingredients = Some(list(value)),
        other => {
            return Err(format!(
                "Unknown preference '{other}' (skill, servings, time, diet, cuisine, dislike)"
            ));
        }
    }
    Ok(update)
}

fn list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn format_preferences(prefs: &UserPreferences) -> String {
    fn join(set: &BTreeSet<String>) -> String {
        if set.is_empty() {
            "-".into()
        } else {
            set.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    }

    let time = prefs
        .time_constraint_minutes
        .map(|m| format!("{m} minutes"))
        .unwrap_or_else(|| "-".into());

    format!(
        "  Dietary restrictions: {}\n  Favorite cuisines:    {}\n  Disliked ingredients: {}\n  Time constraint:      {}\n  Skill level:          {}\n  Servings:             {}",
        join(&prefs.dietary_restrictions),
        join(&prefs.favorite_cuisines),
        join(&prefs.disliked_ingredients),
        time,
        prefs.cooking_skill_level,
        prefs.servings_preference,
    )
}

pub fn format_summary(metadata: &SessionMetadata) -> String {
    let elapsed = chrono::Utc::now() - metadata.session_start;
    let tools = if metadata.tools_used.is_empty() {
        "none".to_string()
    } else {
        metadata.tools_used.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    format!(
        "  Interactions: {}\n  Tools used:   {}\n  Duration:     {}m {}s",
        metadata.interaction_count,
        tools,
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60,
    )
}

pub async fn run(config: AppConfig, message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = config.validate_credentials() {
        eprintln!();
        eprintln!("  ERROR: {e}");
        eprintln!();
        eprintln!("  For Azure OpenAI set:");
        eprintln!("    AZURE_OPENAI_API_KEY, AZURE_OPENAI_ENDPOINT, MODEL_DEPLOYMENT_NAME");
        eprintln!("  For OpenAI set:");
        eprintln!("    SOUSCHEF_PROVIDER=openai and OPENAI_API_KEY");
        eprintln!();
        eprintln!("  Or add them to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err(e.into());
    }

    let provider = souschef_providers::build_from_config(&config)?;
    info!(provider = %config.provider, model = %config.model, "Starting chat session");
    let mut session = ChefSession::from_config(&config, provider)?;

    if let Some(msg) = message {
        let msg = msg.trim();
        if msg.is_empty() {
            return Err("Message is empty".into());
        }
        eprint!("  Thinking...");
        let turn = session.handle(msg).await;
        eprint!("\r              \r");
        println!("{}", turn.response);
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         SousChef — Interactive Kitchen       ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.provider);
    println!("  Model:     {}", config.model);
    println!("  Tools:     {}", session.registry().names().join(", "));
    println!();
    println!("  Tell me what's in your fridge, or type 'help'.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Input::parse(&line) {
            Ok(Input::Empty) => println!("  Please type a message (or 'help')."),
            Ok(Input::Exit) => break,
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Clear) => {
                session.clear();
                println!("  History and preferences cleared.");
            }
            Ok(Input::Preferences) => println!("{}", format_preferences(&session.preferences())),
            Ok(Input::Set(update)) => {
                session.update_preferences(update);
                println!("  Preference updated.");
            }
            Ok(Input::Message(text)) => {
                eprint!("  ...");
                let turn = session.handle(&text).await;
                eprint!("\r     \r");
                println!();
                for line in turn.response.lines() {
                    println!("  SousChef > {line}");
                }
                if turn.is_error() {
                    eprintln!("  [{}]", turn.rationale);
                }
            }
            Err(usage) => println!("  {usage}"),
        }
        println!();
    }

    println!();
    println!("  Session summary:");
    println!("{}", format_summary(&session.metadata()));
    println!();
    println!("  Happy cooking! 👋");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words_end_the_session() {
        for word in ["exit", "quit", "bye", "Goodbye", "  QUIT  "] {
            assert_eq!(Input::parse(word).unwrap(), Input::Exit, "{word}");
        }
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(Input::parse("   ").unwrap(), Input::Empty);
    }

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            Input::parse(" I have eggs ").unwrap(),
            Input::Message("I have eggs".into())
        );
        // "settle" is not a set command
        assert!(matches!(Input::parse("settle the dough").unwrap(), Input::Message(_)));
    }

    #[test]
    fn set_without_known_field_is_a_message() {
        assert_eq!(
            Input::parse("Set me up with a quick vegan dinner").unwrap(),
            Input::Message("Set me up with a quick vegan dinner".into())
        );
        assert!(matches!(
            Input::parse("set the table for four").unwrap(),
            Input::Message(_)
        ));
        assert!(matches!(Input::parse("SET DIET vegan").unwrap(), Input::Set(_)));
    }

    #[test]
    fn set_skill_and_servings() {
        let Input::Set(update) = Input::parse("set skill Beginner").unwrap() else {
            panic!("expected set");
        };
        assert_eq!(update.cooking_skill_level.as_deref(), Some("beginner"));

        let Input::Set(update) = Input::parse("set servings 2").unwrap() else {
            panic!("expected set");
        };
        assert_eq!(update.servings_preference, Some(2));
        assert!(Input::parse("set servings zero").is_err());
        assert!(Input::parse("set skill chef").is_err());
    }

    #[test]
    fn set_time_and_clear_time() {
        let Input::Set(update) = Input::parse("set time 30").unwrap() else {
            panic!("expected set");
        };
        assert_eq!(update.time_constraint_minutes, Some(Some(30)));

        let Input::Set(update) = Input::parse("set time none").unwrap() else {
            panic!("expected set");
        };
        assert_eq!(update.time_constraint_minutes, Some(None));
    }

    #[test]
    fn set_time_accepts_unit_suffixes() {
        for line in ["set time 30 minutes", "set time 30 mins", "set time 30min", "set time 30 Minutes"] {
            let Input::Set(update) = Input::parse(line).unwrap() else {
                panic!("expected set for {line}");
            };
            assert_eq!(update.time_constraint_minutes, Some(Some(30)), "{line}");
        }
        assert!(Input::parse("set time half an hour").is_err());
    }

    #[test]
    fn set_lists_are_split_on_commas() {
        let Input::Set(update) = Input::parse("set diet Vegan, gluten-free,").unwrap() else {
            panic!("expected set");
        };
        let diet = update.dietary_restrictions.unwrap();
        assert_eq!(diet.len(), 2);
        assert!(diet.contains("vegan"));
        assert!(diet.contains("gluten-free"));
    }

    #[test]
    fn malformed_set_gives_usage() {
        assert!(Input::parse("set").is_err());
        assert!(Input::parse("set diet").is_err());
        assert!(Input::parse("set servings").unwrap_err().starts_with("Usage"));
    }

    #[test]
    fn preferences_render_dashes_when_unset() {
        let text = format_preferences(&UserPreferences::default());
        assert!(text.contains("Dietary restrictions: -"));
        assert!(text.contains("Skill level:          intermediate"));
        assert!(text.contains("Servings:             4"));
    }

    #[test]
    fn summary_lists_tools() {
        let mut metadata = SessionMetadata::new();
        metadata.interaction_count = 3;
        metadata.tools_used.insert("recipe_search".into());
        let text = format_summary(&metadata);
        assert!(text.contains("Interactions: 3"));
        assert!(text.contains("recipe_search"));
    }
}
