//! Habit records: the structured goals the wizard authors and the schema
//! store persists.

pub mod condition;
pub mod schema;
mod slug;
pub mod tiers;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use condition::{
    format_clock, parse_clock, Condition, DurationCondition, RangeCondition, Span, SpanParseError,
};
pub use schema::Schema;
pub use slug::{slugify, unique_slug};
pub use tiers::{check_tiers, Tier, TierReport};

pub const MAX_TITLE_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitKind {
    Simple,
    Elastic,
    Informational,
    Checklist,
}

impl HabitKind {
    pub const ALL: [HabitKind; 4] = [
        HabitKind::Simple,
        HabitKind::Elastic,
        HabitKind::Informational,
        HabitKind::Checklist,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HabitKind::Simple => "Simple",
            HabitKind::Elastic => "Elastic",
            HabitKind::Informational => "Informational",
            HabitKind::Checklist => "Checklist",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            HabitKind::Simple => "Pass/fail goal checked off once per day",
            HabitKind::Elastic => "Goal with mini, midi and maxi achievement tiers",
            HabitKind::Informational => "Data collection without pass/fail scoring",
            HabitKind::Checklist => "Goal backed by a list of items to complete",
        }
    }
}

impl fmt::Display for HabitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HabitKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        HabitKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| {
                format!("unknown habit kind `{raw}` (simple, elastic, informational, checklist)")
            })
    }
}

/// Discriminant of [`FieldType`], used wherever only the data shape matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Boolean,
    Text,
    Numeric,
    Time,
    Duration,
    Checklist,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Boolean,
        FieldKind::Text,
        FieldKind::Numeric,
        FieldKind::Time,
        FieldKind::Duration,
        FieldKind::Checklist,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Text => "text",
            FieldKind::Numeric => "numeric",
            FieldKind::Time => "time",
            FieldKind::Duration => "duration",
            FieldKind::Checklist => "checklist",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    /// Kinds with a total order usable for tier thresholds.
    pub fn is_ordered(self) -> bool {
        matches!(self, FieldKind::Numeric | FieldKind::Time | FieldKind::Duration)
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Boolean => "Boolean",
            FieldKind::Text => "Text",
            FieldKind::Numeric => "Numeric",
            FieldKind::Time => "Time",
            FieldKind::Duration => "Duration",
            FieldKind::Checklist => "Checklist",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericSubkind {
    UnsignedInt,
    UnsignedDecimal,
    Decimal,
}

impl NumericSubkind {
    pub const ALL: [NumericSubkind; 3] = [
        NumericSubkind::UnsignedInt,
        NumericSubkind::UnsignedDecimal,
        NumericSubkind::Decimal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NumericSubkind::UnsignedInt => "Whole number (0, 1, 2 ...)",
            NumericSubkind::UnsignedDecimal => "Positive decimal (0.5, 2.25 ...)",
            NumericSubkind::Decimal => "Any decimal (-3.5, 0, 12 ...)",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            NumericSubkind::UnsignedInt => "unsigned_int",
            NumericSubkind::UnsignedDecimal => "unsigned_decimal",
            NumericSubkind::Decimal => "decimal",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|subkind| subkind.key() == key)
    }

    pub fn allows_negative(self) -> bool {
        matches!(self, NumericSubkind::Decimal)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, NumericSubkind::UnsignedInt)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    Text {
        #[serde(default)]
        multiline: bool,
    },
    Numeric {
        subkind: NumericSubkind,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        unit: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Time,
    Duration,
    Checklist {
        checklist_id: String,
    },
}

impl FieldType {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldType::Boolean => FieldKind::Boolean,
            FieldType::Text { .. } => FieldKind::Text,
            FieldType::Numeric { .. } => FieldKind::Numeric,
            FieldType::Time => FieldKind::Time,
            FieldType::Duration => FieldKind::Duration,
            FieldType::Checklist { .. } => FieldKind::Checklist,
        }
    }

    /// Unit label embedded in criteria descriptions, when the field has one.
    pub fn unit(&self) -> Option<&str> {
        match self {
            FieldType::Numeric { unit, .. } if !unit.is_empty() => Some(unit),
            FieldType::Checklist { .. } => Some("items"),
            _ => None,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            FieldType::Boolean => "Boolean".into(),
            FieldType::Text { multiline } => {
                if *multiline {
                    "Text (multi-line)".into()
                } else {
                    "Text".into()
                }
            }
            FieldType::Numeric {
                subkind,
                unit,
                min,
                max,
            } => {
                let mut parts = vec![subkind.label().to_string()];
                if !unit.is_empty() {
                    parts.push(format!("unit: {unit}"));
                }
                match (min, max) {
                    (Some(min), Some(max)) => parts.push(format!("{min}..{max}")),
                    (Some(min), None) => parts.push(format!(">= {min}")),
                    (None, Some(max)) => parts.push(format!("<= {max}")),
                    (None, None) => {}
                }
                format!("Numeric ({})", parts.join(", "))
            }
            FieldType::Time => "Time of day (HH:MM)".into(),
            FieldType::Duration => "Duration (e.g. 1h30m)".into(),
            FieldType::Checklist { checklist_id } => format!("Checklist ({checklist_id})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    Manual,
    Automatic,
}

impl ScoringMode {
    pub fn label(self) -> &'static str {
        match self {
            ScoringMode::Manual => "Manual",
            ScoringMode::Automatic => "Automatic",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ScoringMode::Manual => "manual",
            ScoringMode::Automatic => "automatic",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        [ScoringMode::Manual, ScoringMode::Automatic]
            .into_iter()
            .find(|mode| mode.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherBetter,
    LowerBetter,
    #[default]
    Neutral,
}

impl Direction {
    pub const ALL: [Direction; 3] = [
        Direction::HigherBetter,
        Direction::LowerBetter,
        Direction::Neutral,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Direction::HigherBetter => "Higher is better",
            Direction::LowerBetter => "Lower is better",
            Direction::Neutral => "Neutral",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Direction::HigherBetter => "higher_better",
            Direction::LowerBetter => "lower_better",
            Direction::Neutral => "neutral",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|direction| direction.key() == key)
    }
}

/// A condition together with the description shown to people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    pub description: String,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub habit_type: HabitKind,
    pub field_type: FieldType,
    pub scoring_type: ScoringMode,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Criteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_criteria: Option<Criteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midi_criteria: Option<Criteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxi_criteria: Option<Criteria>,
}

impl Habit {
    /// Mini, midi and maxi criteria when all three are present.
    pub fn tiers(&self) -> Option<[&Criteria; 3]> {
        match (&self.mini_criteria, &self.midi_criteria, &self.maxi_criteria) {
            (Some(mini), Some(midi), Some(maxi)) => Some([mini, midi, maxi]),
            _ => None,
        }
    }

    pub fn has_any_tier(&self) -> bool {
        self.mini_criteria.is_some() || self.midi_criteria.is_some() || self.maxi_criteria.is_some()
    }
}

/// Check-in prompt used when none was entered.
pub fn default_prompt(kind: HabitKind, title: &str) -> String {
    match kind {
        HabitKind::Simple | HabitKind::Checklist => format!("Did you complete {title} today?"),
        HabitKind::Elastic | HabitKind::Informational => format!("Record {title} for today"),
    }
}
