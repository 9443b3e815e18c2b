//! Cross-tier ordering checks for elastic habits.
//!
//! The mini, midi and maxi thresholds must grow in difficulty. For rules that
//! set a floor (`>=`, `after`, at-least or exact durations) harder means
//! larger, so the values must be non-decreasing; for rules that set a ceiling
//! (`<=`, `before`, shorter-than durations) harder means smaller, so the
//! values must be non-increasing.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{format_clock, Condition, DurationCondition, FieldKind, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Mini,
    Midi,
    Maxi,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Mini, Tier::Midi, Tier::Maxi];

    pub fn key(self) -> &'static str {
        match self {
            Tier::Mini => "mini",
            Tier::Midi => "midi",
            Tier::Maxi => "maxi",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Mini => "Mini",
            Tier::Midi => "Midi",
            Tier::Maxi => "Maxi",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Tier::Mini => "The easiest level: what counts on a bad day.",
            Tier::Midi => "A solid, typical day.",
            Tier::Maxi => "Your best effort.",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Floor,
    Ceiling,
}

impl Bound {
    fn describe(self) -> &'static str {
        match self {
            Bound::Floor => "a minimum",
            Bound::Ceiling => "a maximum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Threshold {
    Number(f64),
    Clock(NaiveTime),
    Length(Span),
}

impl Threshold {
    fn key(&self) -> f64 {
        match self {
            Threshold::Number(value) => *value,
            Threshold::Clock(time) => f64::from(time.num_seconds_from_midnight()),
            Threshold::Length(span) => span.as_seconds() as f64,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Number(value) => write!(f, "{value:.1}"),
            Threshold::Clock(time) => f.write_str(&format_clock(time)),
            Threshold::Length(span) => write!(f, "{span}"),
        }
    }
}

/// The single representative value of a tier, with the way it bounds entries.
fn threshold(condition: &Condition) -> Option<(Bound, Threshold)> {
    let extracted = match condition {
        Condition::Equals(_) => return None,
        Condition::GreaterThan(value) | Condition::GreaterThanOrEqual(value) => {
            (Bound::Floor, Threshold::Number(*value))
        }
        Condition::LessThan(value) | Condition::LessThanOrEqual(value) => {
            (Bound::Ceiling, Threshold::Number(*value))
        }
        Condition::Range(range) => (Bound::Floor, Threshold::Number(range.min)),
        Condition::After(time) => (Bound::Floor, Threshold::Clock(*time)),
        Condition::Before(time) => (Bound::Ceiling, Threshold::Clock(*time)),
        Condition::Duration(duration) => match duration {
            // An exact length ranks like a minimum: a longer target is harder.
            DurationCondition::AtLeast(span) | DurationCondition::Exactly(span) => {
                (Bound::Floor, Threshold::Length(*span))
            }
            DurationCondition::Between { min, .. } => (Bound::Floor, Threshold::Length(*min)),
            DurationCondition::LessThan(span) => (Bound::Ceiling, Threshold::Length(*span)),
        },
    };
    Some(extracted)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierViolation {
    pub easier: Tier,
    pub harder: Tier,
    pub message: String,
}

impl fmt::Display for TierViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of [`check_tiers`]: empty when the tiers are consistently ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierReport {
    violations: Vec<TierViolation>,
}

impl TierReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[TierViolation] {
        &self.violations
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|violation| violation.message.clone())
            .collect()
    }

    /// The easier tier of the first violation, where fixing usually starts.
    pub fn first_offender(&self) -> Option<Tier> {
        self.violations.first().map(|violation| violation.easier)
    }
}

/// Compares adjacent tiers (mini/midi, midi/maxi) and lists every violation.
/// Fields without a total order (text, boolean) always pass.
pub fn check_tiers(conditions: [&Condition; 3], field: FieldKind) -> TierReport {
    if !field.is_ordered() {
        return TierReport::default();
    }

    let extracted = conditions.map(threshold);
    let mut violations = Vec::new();

    for index in 0..2 {
        let (easier, harder) = (Tier::ALL[index], Tier::ALL[index + 1]);
        let (Some((easier_bound, easier_value)), Some((harder_bound, harder_value))) =
            (extracted[index], extracted[index + 1])
        else {
            continue;
        };

        if easier_bound != harder_bound {
            violations.push(TierViolation {
                easier,
                harder,
                message: format!(
                    "{easier} criteria sets {} but {harder} criteria sets {}; tiers must compare in the same direction",
                    easier_bound.describe(),
                    harder_bound.describe()
                ),
            });
            continue;
        }

        let message = match easier_bound {
            Bound::Floor if easier_value.key() > harder_value.key() => Some(format!(
                "{easier} criteria value ({easier_value}) must be ≤ {harder} criteria value ({harder_value})"
            )),
            Bound::Ceiling if easier_value.key() < harder_value.key() => Some(format!(
                "{easier} criteria value ({easier_value}) must be ≥ {harder} criteria value ({harder_value})"
            )),
            _ => None,
        };
        if let Some(message) = message {
            violations.push(TierViolation {
                easier,
                harder,
                message,
            });
        }
    }

    TierReport { violations }
}
