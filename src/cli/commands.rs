//! Command dispatch for `habit_core_cli`.

use std::path::PathBuf;
use std::str::FromStr;

use strsim::levenshtein;
use tracing::debug;

use crate::cli::output::{self, OutputPreferences};
use crate::cli::prompter::TerminalPrompter;
use crate::cli::ui::menu_renderer::MenuUIItem;
use crate::cli::ui::prompts::{choice_menu, ChoicePromptResult};
use crate::config::ConfigManager;
use crate::errors::{CliError, HabitError};
use crate::habit::{Habit, HabitKind, Schema};
use crate::storage::{JsonSchemaStore, SchemaStore};
use crate::utils::build_info;
use crate::wizard::{WizardOutcome, WizardSession};

const COMMANDS: [(&str, &str, &str); 6] = [
    ("add", "add [simple|elastic|informational|checklist]", "Create a habit with the wizard"),
    ("edit", "edit <id>", "Change an existing habit with the wizard"),
    ("list", "list", "Show every stored habit"),
    ("validate", "validate", "Check the schema file strictly"),
    ("version", "version", "Print build information"),
    ("help", "help", "Show this overview"),
];

pub const CANCELLED_MESSAGE: &str = "Habit creation cancelled.";

struct Invocation {
    schema: Option<PathBuf>,
    plain: bool,
    command: Option<String>,
    args: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation, CliError> {
    let mut invocation = Invocation {
        schema: None,
        plain: false,
        command: None,
        args: Vec::new(),
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" if invocation.command.is_none() => {
                let path = args
                    .next()
                    .ok_or_else(|| CliError::Usage("`--schema` needs a path".into()))?;
                invocation.schema = Some(PathBuf::from(path));
            }
            "--plain" if invocation.command.is_none() => invocation.plain = true,
            _ if invocation.command.is_none() => invocation.command = Some(arg.to_lowercase()),
            _ => invocation.args.push(arg),
        }
    }
    Ok(invocation)
}

/// Runs one command. `args` excludes the program name.
pub fn run_cli(args: impl IntoIterator<Item = String>) -> Result<(), CliError> {
    let invocation = parse_args(args)?;
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    output::set_preferences(OutputPreferences {
        plain_mode: invocation.plain || config.plain_output(),
        ..OutputPreferences::default()
    });
    let schema_path = manager.schema_path(&config, invocation.schema.as_deref());
    debug!(path = %schema_path.display(), "resolved schema path");

    let context = CommandContext {
        store: JsonSchemaStore::new(),
        schema_path,
    };
    let command = invocation.command.as_deref().unwrap_or("help");
    match command {
        "add" => context.add(invocation.args.first().map(String::as_str)),
        "edit" => match invocation.args.first() {
            Some(id) => context.edit(id),
            None => Err(CliError::Usage("usage: edit <id>".into())),
        },
        "list" => context.list(),
        "validate" => context.validate(),
        "version" => {
            println!("{}", build_info::current().summary());
            Ok(())
        }
        "help" => {
            print_help();
            Ok(())
        }
        other => {
            let mut message = format!("Unknown command `{other}`.");
            if let Some(best) = suggest_command(other) {
                message.push_str(&format!(" Did you mean `{best}`?"));
            }
            Err(CliError::Usage(message))
        }
    }
}

/// Closest known command within a small edit distance.
pub fn suggest_command(input: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .map(|(name, _, _)| (levenshtein(name, input), *name))
        .filter(|(distance, _)| *distance <= 3)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, name)| name)
}

fn print_help() {
    output::section("habit_core_cli");
    println!("Usage: habit_core_cli [--schema <path>] [--plain] <command>");
    println!();
    let width = COMMANDS
        .iter()
        .map(|(_, usage, _)| usage.len())
        .max()
        .unwrap_or(0);
    for (_, usage, description) in COMMANDS {
        println!("  {usage:<width$}  {description}");
    }
}

struct CommandContext {
    store: JsonSchemaStore,
    schema_path: PathBuf,
}

impl CommandContext {
    fn load(&self) -> Result<Schema, CliError> {
        Ok(self.store.load_or_default(&self.schema_path)?)
    }

    fn add(&self, kind: Option<&str>) -> Result<(), CliError> {
        let kind = match kind {
            Some(raw) => HabitKind::from_str(raw).map_err(CliError::Usage)?,
            None => match choose_kind()? {
                Some(kind) => kind,
                None => {
                    output::info(CANCELLED_MESSAGE);
                    return Ok(());
                }
            },
        };
        let schema = self.load()?;
        self.run_wizard(WizardSession::new(kind), schema)
    }

    fn edit(&self, id: &str) -> Result<(), CliError> {
        let schema = self.load()?;
        let habit = schema
            .find(id)
            .ok_or_else(|| HabitError::HabitNotFound(id.to_string()))?;
        let session = WizardSession::edit(habit);
        self.run_wizard(session, schema)
    }

    fn run_wizard(&self, session: WizardSession, mut schema: Schema) -> Result<(), CliError> {
        let mut prompter = TerminalPrompter::new();
        match session.run(&mut prompter)? {
            WizardOutcome::Cancelled => {
                output::info(CANCELLED_MESSAGE);
                Ok(())
            }
            WizardOutcome::Completed(habit) => {
                let saved: Habit = schema.upsert(habit).clone();
                self.store.save_schema(&schema, &self.schema_path)?;
                output::success(format!("Saved habit `{}` ({}).", saved.title, saved.id));
                Ok(())
            }
        }
    }

    fn list(&self) -> Result<(), CliError> {
        let schema = self.load()?;
        if schema.habits.is_empty() {
            output::info("No habits yet. Use `add` to create one.");
            return Ok(());
        }
        let width = schema
            .habits
            .iter()
            .map(|habit| habit.id.len())
            .max()
            .unwrap_or(0);
        for habit in &schema.habits {
            println!(
                "{:<width$}  {:<13}  {}",
                habit.id,
                habit.habit_type.label(),
                habit.title
            );
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), CliError> {
        let schema = self.store.load_schema(&self.schema_path)?;
        match schema.validate() {
            Ok(()) => {
                output::success(format!(
                    "{} is valid ({} habits).",
                    self.schema_path.display(),
                    schema.habits.len()
                ));
                Ok(())
            }
            Err(problems) => Err(HabitError::InvalidSchema(problems).into()),
        }
    }
}

fn choose_kind() -> Result<Option<HabitKind>, CliError> {
    let items = HabitKind::ALL
        .into_iter()
        .map(|kind| MenuUIItem::new(kind.label(), kind.label(), kind.summary()))
        .collect();
    let chosen = choice_menu("What kind of habit?", &[], items, None, false, false)?;
    Ok(match chosen {
        ChoicePromptResult::Value(key) => HabitKind::from_str(&key).ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn options_precede_the_command() {
        let invocation = parse_args(args(&["--schema", "h.json", "--plain", "ADD", "elastic"]))
            .expect("parse");
        assert_eq!(invocation.schema, Some(PathBuf::from("h.json")));
        assert!(invocation.plain);
        assert_eq!(invocation.command.as_deref(), Some("add"));
        assert_eq!(invocation.args, vec!["elastic".to_string()]);
    }

    #[test]
    fn schema_flag_requires_a_value() {
        assert!(matches!(
            parse_args(args(&["--schema"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn close_typos_get_a_suggestion() {
        assert_eq!(suggest_command("lst"), Some("list"));
        assert_eq!(suggest_command("valdate"), Some("validate"));
        assert_eq!(suggest_command("completely-unrelated"), None);
    }
}
