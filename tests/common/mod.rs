#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use habit_core::errors::WizardError;
use habit_core::wizard::{Prompter, StepEvent, StepKind, StepView};
use tempfile::TempDir;

/// Answers wizard prompts from a fixed script and records what was shown.
pub struct ScriptedPrompter {
    events: VecDeque<StepEvent>,
    pub seen: Vec<(StepKind, String)>,
    pub headings: Vec<String>,
    pub feedback: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(events: Vec<StepEvent>) -> Self {
        Self {
            events: events.into(),
            seen: Vec::new(),
            headings: Vec::new(),
            feedback: Vec::new(),
        }
    }

    /// Every entry is an answer; `<KEEP>`, `<BACK>` and `<CANCEL>` map to the
    /// corresponding events.
    pub fn answers<S: AsRef<str>>(raw: &[S]) -> Self {
        Self::new(raw.iter().map(|answer| event(answer.as_ref())).collect())
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

pub fn event(raw: &str) -> StepEvent {
    match raw {
        "<KEEP>" => StepEvent::Keep,
        "<BACK>" => StepEvent::Back,
        "<NEXT>" => StepEvent::Forward,
        "<CANCEL>" => StepEvent::Cancel,
        "<HELP>" => StepEvent::Help,
        other => StepEvent::Answer(other.to_string()),
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, view: &StepView) -> Result<StepEvent, WizardError> {
        self.seen.push((view.step, view.question.key.to_string()));
        self.headings.push(view.heading());
        self.feedback.extend(view.feedback.iter().cloned());
        self.events.pop_front().ok_or_else(|| {
            WizardError::Prompt(format!(
                "script exhausted at {} / {}",
                view.step, view.question.key
            ))
        })
    }
}

/// Answers for an elastic numeric habit with automatic scoring up to (not
/// including) the tier check.
pub fn elastic_minutes(title: &str, tiers: [&str; 3]) -> Vec<String> {
    let [mini, midi, maxi] = tiers;
    [
        title, "", "", // basic info
        "numeric", "unsigned_int", "minutes", "", "", // field
        "automatic", "higher_better", // scoring
        "gte", mini, "<KEEP>", midi, "<KEEP>", maxi, // tiers
    ]
    .iter()
    .map(|answer| answer.to_string())
    .collect()
}

pub struct CliHarness {
    home: TempDir,
}

pub struct CliOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CliHarness {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    pub fn schema_path(&self) -> PathBuf {
        self.home().join("habits.json")
    }

    pub fn run(&self, args: &[&str], text_inputs: &[&str], menu_events: &[&str]) -> CliOutput {
        let mut cmd = Command::cargo_bin("habit_core_cli").expect("binary exists");
        cmd.env("HABIT_CORE_HOME", self.home())
            .env_remove("RUST_LOG")
            .env("HABIT_CORE_TEST_TEXT_INPUTS", text_inputs.join("|"))
            .env("HABIT_CORE_TEST_MENU_EVENTS", menu_events.join("|"))
            .args(["--plain"])
            .args(args);
        let output = cmd.output().expect("run CLI");
        CliOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
