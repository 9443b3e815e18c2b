use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::tiers::check_tiers;
use super::{
    unique_slug, Condition, FieldKind, FieldType, Habit, HabitKind, ScoringMode, MAX_TITLE_LEN,
};

pub const SCHEMA_VERSION: &str = "1.0.0";

/// The full collection of habits stored in one schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub version: String,
    pub created_date: NaiveDate,
    #[serde(default)]
    pub habits: Vec<Habit>,
}

impl Schema {
    pub fn new(created_date: NaiveDate) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            created_date,
            habits: Vec::new(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn ids(&self) -> HashSet<String> {
        self.habits
            .iter()
            .filter(|habit| !habit.id.is_empty())
            .map(|habit| habit.id.clone())
            .collect()
    }

    /// Replaces the habit sharing `habit.id`, or appends it. Habits without an
    /// identifier receive a fresh slug first.
    pub fn upsert(&mut self, mut habit: Habit) -> &Habit {
        if habit.id.is_empty() {
            habit.id = unique_slug(&habit.title, &self.ids());
        }
        match self.habits.iter().position(|existing| existing.id == habit.id) {
            Some(index) => {
                self.habits[index] = habit;
                &self.habits[index]
            }
            None => {
                self.habits.push(habit);
                let last = self.habits.len() - 1;
                &self.habits[last]
            }
        }
    }

    /// Assigns slug identifiers to habits missing one. Returns how many were
    /// generated.
    pub fn ensure_ids(&mut self) -> usize {
        let mut taken = self.ids();
        let mut generated = 0;
        for habit in self.habits.iter_mut().filter(|habit| habit.id.is_empty()) {
            let id = unique_slug(&habit.title, &taken);
            taken.insert(id.clone());
            habit.id = id;
            generated += 1;
        }
        generated
    }

    /// Strict validation applied before anything is written to disk. Every
    /// problem is reported, each prefixed with the habit it belongs to.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();

        for (index, habit) in self.habits.iter().enumerate() {
            let label = if habit.id.is_empty() {
                format!("habit #{}", index + 1)
            } else {
                format!("habit `{}`", habit.id)
            };

            if habit.id.is_empty() {
                problems.push(format!("{label}: identifier is missing"));
            } else {
                if !is_valid_id(&habit.id) {
                    problems.push(format!(
                        "{label}: identifier must contain only lowercase letters, digits and underscores"
                    ));
                }
                if !seen.insert(habit.id.as_str()) {
                    problems.push(format!("{label}: duplicate identifier"));
                }
            }

            problems.extend(
                validate_habit(habit)
                    .into_iter()
                    .map(|problem| format!("{label}: {problem}")),
            );
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

fn is_valid_id(id: &str) -> bool {
    id.chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}

/// Checks a single habit against the strict persistence rules.
pub fn validate_habit(habit: &Habit) -> Vec<String> {
    let mut problems = Vec::new();

    let title = habit.title.trim();
    if title.is_empty() {
        problems.push("title is required".to_string());
    } else if title.chars().count() > MAX_TITLE_LEN {
        problems.push(format!("title cannot exceed {MAX_TITLE_LEN} characters"));
    }

    let field_kind = habit.field_type.kind();
    match (habit.habit_type, field_kind) {
        (HabitKind::Simple, kind) if kind != FieldKind::Boolean => {
            problems.push("simple habits must use a boolean field".into());
        }
        (HabitKind::Elastic, FieldKind::Boolean) => {
            problems.push("elastic habits cannot use a boolean field".into());
        }
        (HabitKind::Checklist, kind) if kind != FieldKind::Checklist => {
            problems.push("checklist habits must use a checklist field".into());
        }
        (kind, FieldKind::Checklist) if kind != HabitKind::Checklist => {
            problems.push("checklist fields are only valid on checklist habits".into());
        }
        _ => {}
    }

    match &habit.field_type {
        FieldType::Numeric {
            subkind,
            min,
            max,
            ..
        } => {
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    problems.push(format!("field minimum ({min}) exceeds maximum ({max})"));
                }
            }
            if !subkind.allows_negative() {
                if min.map(|min| min < 0.0).unwrap_or(false) {
                    problems.push("unsigned fields cannot have a negative minimum".into());
                }
                if max.map(|max| max < 0.0).unwrap_or(false) {
                    problems.push("unsigned fields cannot have a negative maximum".into());
                }
                let named = [
                    ("criteria", &habit.criteria),
                    ("mini criteria", &habit.mini_criteria),
                    ("midi criteria", &habit.midi_criteria),
                    ("maxi criteria", &habit.maxi_criteria),
                ];
                for (name, criteria) in named {
                    if let Some(criteria) = criteria {
                        if has_negative_threshold(&criteria.condition) {
                            problems.push(format!(
                                "{name} cannot use a negative threshold on an unsigned field"
                            ));
                        }
                    }
                }
            }
        }
        FieldType::Checklist { checklist_id } if checklist_id.trim().is_empty() => {
            problems.push("checklist id is required".into());
        }
        _ => {}
    }

    match habit.scoring_type {
        ScoringMode::Manual => {
            if habit.criteria.is_some() || habit.has_any_tier() {
                problems.push("manually scored habits cannot carry criteria".into());
            }
        }
        ScoringMode::Automatic => validate_automatic(habit, &mut problems),
    }

    problems
}

fn has_negative_threshold(condition: &Condition) -> bool {
    match condition {
        Condition::GreaterThan(value)
        | Condition::GreaterThanOrEqual(value)
        | Condition::LessThan(value)
        | Condition::LessThanOrEqual(value) => *value < 0.0,
        Condition::Range(range) => range.min < 0.0 || range.max < 0.0,
        _ => false,
    }
}

fn validate_automatic(habit: &Habit, problems: &mut Vec<String>) {
    let field_kind = habit.field_type.kind();
    match habit.habit_type {
        HabitKind::Informational => {
            problems.push("informational habits are always scored manually".into());
        }
        HabitKind::Elastic => {
            if field_kind == FieldKind::Text {
                problems.push("automatic scoring is not available for text fields".into());
                return;
            }
            if habit.criteria.is_some() {
                problems.push("elastic habits use mini/midi/maxi criteria, not criteria".into());
            }
            let Some(tiers) = habit.tiers() else {
                problems.push("automatic elastic habits need mini, midi and maxi criteria".into());
                return;
            };
            let mut fits = true;
            for (name, criteria) in ["mini", "midi", "maxi"].iter().zip(tiers) {
                if !criteria.condition.fits(&habit.field_type) {
                    problems.push(format!(
                        "{name} criteria condition does not apply to {} fields",
                        field_kind.label().to_lowercase()
                    ));
                    fits = false;
                }
            }
            if fits {
                let report = check_tiers(tiers.map(|criteria| &criteria.condition), field_kind);
                problems.extend(report.messages());
            }
        }
        HabitKind::Simple | HabitKind::Checklist => {
            if habit.has_any_tier() {
                problems.push("only elastic habits can carry tier criteria".into());
            }
            match &habit.criteria {
                Some(criteria) if !criteria.condition.fits(&habit.field_type) => {
                    problems.push(format!(
                        "criteria condition does not apply to {} fields",
                        field_kind.label().to_lowercase()
                    ));
                }
                Some(_) => {}
                None => problems.push("automatically scored habits need criteria".into()),
            }
        }
    }
}
