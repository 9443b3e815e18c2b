//! Turns raw comparison answers into typed [`Condition`]s plus the
//! description stored alongside them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tiers::Tier;
use crate::habit::{
    format_clock, parse_clock, Condition, Criteria, DurationCondition, FieldKind, FieldType,
    NumericSubkind, RangeCondition, Span, SpanParseError,
};

/// The comparison a person picks when defining criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equal,
    Range { inclusive: bool },
    Before,
    After,
}

impl Comparison {
    /// Comparisons offered for a field kind. Empty for boolean fields (the rule
    /// is fixed) and text fields (automatic scoring is not offered).
    pub fn offered_for(kind: FieldKind) -> Vec<Comparison> {
        match kind {
            FieldKind::Boolean | FieldKind::Text => Vec::new(),
            FieldKind::Numeric => vec![
                Comparison::GreaterThanOrEqual,
                Comparison::GreaterThan,
                Comparison::LessThanOrEqual,
                Comparison::LessThan,
                Comparison::Range { inclusive: true },
                Comparison::Range { inclusive: false },
            ],
            FieldKind::Time => vec![Comparison::Before, Comparison::After],
            FieldKind::Duration => vec![
                Comparison::GreaterThanOrEqual,
                Comparison::LessThan,
                Comparison::Equal,
                Comparison::Range { inclusive: true },
            ],
            FieldKind::Checklist => vec![Comparison::GreaterThanOrEqual],
        }
    }

    pub fn label(self, kind: FieldKind) -> &'static str {
        match (self, kind) {
            (Comparison::GreaterThanOrEqual, FieldKind::Checklist) => "At least N items",
            (Comparison::GreaterThanOrEqual, _) => "At least (>=)",
            (Comparison::GreaterThan, _) => "More than (>)",
            (Comparison::LessThanOrEqual, _) => "At most (<=)",
            (Comparison::LessThan, FieldKind::Duration) => "Shorter than (<)",
            (Comparison::LessThan, _) => "Less than (<)",
            (Comparison::Equal, _) => "Exactly (=)",
            (Comparison::Range { inclusive: true }, _) => "Between, inclusive",
            (Comparison::Range { inclusive: false }, _) => "Between, exclusive",
            (Comparison::Before, _) => "Before (earlier is better)",
            (Comparison::After, _) => "After (later is better)",
        }
    }

    /// Stable identifier used when the comparison is stored as an answer.
    pub fn key(self) -> &'static str {
        match self {
            Comparison::GreaterThan => "gt",
            Comparison::GreaterThanOrEqual => "gte",
            Comparison::LessThan => "lt",
            Comparison::LessThanOrEqual => "lte",
            Comparison::Equal => "eq",
            Comparison::Range { inclusive: true } => "range",
            Comparison::Range { inclusive: false } => "range_exclusive",
            Comparison::Before => "before",
            Comparison::After => "after",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let comparison = match key {
            "gt" => Comparison::GreaterThan,
            "gte" => Comparison::GreaterThanOrEqual,
            "lt" => Comparison::LessThan,
            "lte" => Comparison::LessThanOrEqual,
            "eq" => Comparison::Equal,
            "range" => Comparison::Range { inclusive: true },
            "range_exclusive" => Comparison::Range { inclusive: false },
            "before" => Comparison::Before,
            "after" => Comparison::After,
            _ => return None,
        };
        Some(comparison)
    }

    pub fn needs_upper_value(self) -> bool {
        matches!(self, Comparison::Range { .. })
    }

    /// Recovers the comparison that produced `condition`.
    pub fn of(condition: &Condition) -> Option<Comparison> {
        let comparison = match condition {
            Condition::Equals(_) => return None,
            Condition::GreaterThan(_) => Comparison::GreaterThan,
            Condition::GreaterThanOrEqual(_) => Comparison::GreaterThanOrEqual,
            Condition::LessThan(_) => Comparison::LessThan,
            Condition::LessThanOrEqual(_) => Comparison::LessThanOrEqual,
            Condition::Range(range) => Comparison::Range {
                inclusive: range.min_inclusive && range.max_inclusive,
            },
            Condition::Before(_) => Comparison::Before,
            Condition::After(_) => Comparison::After,
            Condition::Duration(duration) => match duration {
                DurationCondition::AtLeast(_) => Comparison::GreaterThanOrEqual,
                DurationCondition::LessThan(_) => Comparison::LessThan,
                DurationCondition::Exactly(_) => Comparison::Equal,
                DurationCondition::Between { .. } => Comparison::Range { inclusive: true },
            },
        };
        Some(comparison)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Comparison::GreaterThan => ">",
            Comparison::GreaterThanOrEqual => ">=",
            Comparison::LessThan => "<",
            Comparison::LessThanOrEqual => "<=",
            Comparison::Equal => "=",
            Comparison::Range { inclusive: true } => "range",
            Comparison::Range { inclusive: false } => "range (exclusive)",
            Comparison::Before => "before",
            Comparison::After => "after",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    #[error("`{raw}` is not a number")]
    NotANumber { raw: String },
    #[error("`{raw}` must be a whole number")]
    NotWholeNumber { raw: String },
    #[error("`{raw}` cannot be negative for this field")]
    Negative { raw: String },
    #[error("{value} is outside the field's allowed range ({bounds})")]
    OutOfBounds { value: String, bounds: String },
    #[error("`{raw}` is not a valid time; use 24-hour HH:MM (e.g. 07:30)")]
    InvalidTime { raw: String },
    #[error(transparent)]
    InvalidDuration(#[from] SpanParseError),
    #[error("range minimum ({min}) must not exceed maximum ({max})")]
    InvertedRange { min: String, max: String },
    #[error("a range needs an upper value")]
    MissingUpperValue,
    #[error("{comparison} comparisons do not apply to {field} fields")]
    UnsupportedComparison {
        comparison: Comparison,
        field: &'static str,
    },
    #[error("automatic scoring is not available for text fields")]
    TextNotScorable,
}

/// Raw answers collected for one criteria slot.
#[derive(Debug, Clone, Copy)]
pub struct CriteriaInput<'a> {
    pub field: &'a FieldType,
    pub tier: Option<Tier>,
    pub comparison: Option<Comparison>,
    pub value: &'a str,
    pub upper: Option<&'a str>,
}

/// Builds the condition and its description in one pass. The description
/// embeds the tier label and unit, neither of which the condition keeps.
pub fn build_criteria(input: CriteriaInput<'_>) -> Result<Criteria, CriteriaError> {
    let kind = input.field.kind();
    let (condition, phrase) = match kind {
        FieldKind::Boolean => (Condition::Equals(true), "completed".to_string()),
        FieldKind::Text => return Err(CriteriaError::TextNotScorable),
        FieldKind::Numeric => build_numeric(input, chosen(kind, input.comparison)?)?,
        FieldKind::Time => build_time(input, chosen(kind, input.comparison)?)?,
        FieldKind::Duration => build_duration(input, chosen(kind, input.comparison)?)?,
        FieldKind::Checklist => {
            chosen(kind, input.comparison)?;
            build_checklist(input)?
        }
    };

    Ok(Criteria {
        description: describe(input.tier, phrase),
        condition,
    })
}

/// The picked comparison, defaulting to `>=`, checked against what the field
/// kind offers.
fn chosen(kind: FieldKind, comparison: Option<Comparison>) -> Result<Comparison, CriteriaError> {
    let comparison = comparison.unwrap_or(Comparison::GreaterThanOrEqual);
    if Comparison::offered_for(kind).contains(&comparison) {
        Ok(comparison)
    } else {
        Err(CriteriaError::UnsupportedComparison {
            comparison,
            field: kind.label(),
        })
    }
}

fn describe(tier: Option<Tier>, phrase: String) -> String {
    match tier {
        Some(tier) => format!("{} tier: {phrase}", tier.label()),
        None => {
            let mut chars = phrase.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => phrase,
            }
        }
    }
}

fn with_unit(value: String, field: &FieldType) -> String {
    match field.unit() {
        Some(unit) => format!("{value} {unit}"),
        None => value,
    }
}

/// Parses a numeric threshold for `field`, honouring its subkind and bounds.
pub fn parse_number(raw: &str, field: &FieldType) -> Result<f64, CriteriaError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .ok()
        .filter(|value: &f64| value.is_finite())
        .ok_or_else(|| CriteriaError::NotANumber {
            raw: trimmed.to_string(),
        })?;

    if let FieldType::Numeric {
        subkind, min, max, ..
    } = field
    {
        if !subkind.allows_negative() && value < 0.0 {
            return Err(CriteriaError::Negative {
                raw: trimmed.to_string(),
            });
        }
        if *subkind == NumericSubkind::UnsignedInt && value.fract() != 0.0 {
            return Err(CriteriaError::NotWholeNumber {
                raw: trimmed.to_string(),
            });
        }
        let below = min.map(|min| value < min).unwrap_or(false);
        let above = max.map(|max| value > max).unwrap_or(false);
        if below || above {
            return Err(CriteriaError::OutOfBounds {
                value: format!("{value:.1}"),
                bounds: format!(
                    "{}..{}",
                    min.map(|v| v.to_string()).unwrap_or_default(),
                    max.map(|v| v.to_string()).unwrap_or_default()
                ),
            });
        }
    }
    Ok(value)
}

/// Parses a strict `HH:MM` answer.
pub fn parse_time(raw: &str) -> Result<chrono::NaiveTime, CriteriaError> {
    parse_clock(raw).ok_or_else(|| CriteriaError::InvalidTime {
        raw: raw.trim().to_string(),
    })
}

/// The answers that would rebuild `condition`: the main value and, for
/// ranges, the upper value.
pub fn raw_values(condition: &Condition) -> (String, Option<String>) {
    match condition {
        Condition::Equals(value) => (value.to_string(), None),
        Condition::GreaterThan(value)
        | Condition::GreaterThanOrEqual(value)
        | Condition::LessThan(value)
        | Condition::LessThanOrEqual(value) => (value.to_string(), None),
        Condition::Range(range) => (range.min.to_string(), Some(range.max.to_string())),
        Condition::Before(time) | Condition::After(time) => (format_clock(time), None),
        Condition::Duration(duration) => match duration {
            DurationCondition::AtLeast(span)
            | DurationCondition::LessThan(span)
            | DurationCondition::Exactly(span) => (span.to_string(), None),
            DurationCondition::Between { min, max } => (min.to_string(), Some(max.to_string())),
        },
    }
}

fn build_numeric(
    input: CriteriaInput<'_>,
    comparison: Comparison,
) -> Result<(Condition, String), CriteriaError> {
    let value = parse_number(input.value, input.field)?;
    let shown = |value: f64| with_unit(format!("{value:.1}"), input.field);
    let built = match comparison {
        Comparison::GreaterThan => (Condition::GreaterThan(value), format!("more than {}", shown(value))),
        Comparison::GreaterThanOrEqual => (
            Condition::GreaterThanOrEqual(value),
            format!("at least {}", shown(value)),
        ),
        Comparison::LessThan => (Condition::LessThan(value), format!("less than {}", shown(value))),
        Comparison::LessThanOrEqual => (
            Condition::LessThanOrEqual(value),
            format!("at most {}", shown(value)),
        ),
        Comparison::Range { inclusive } => {
            let upper = input.upper.ok_or(CriteriaError::MissingUpperValue)?;
            let max = parse_number(upper, input.field)?;
            if value > max {
                return Err(CriteriaError::InvertedRange {
                    min: format!("{value:.1}"),
                    max: format!("{max:.1}"),
                });
            }
            let condition = Condition::Range(RangeCondition {
                min: value,
                max,
                min_inclusive: inclusive,
                max_inclusive: inclusive,
            });
            let phrase = format!(
                "between {value:.1} and {} ({})",
                shown(max),
                if inclusive { "inclusive" } else { "exclusive" }
            );
            (condition, phrase)
        }
        other => {
            return Err(CriteriaError::UnsupportedComparison {
                comparison: other,
                field: FieldKind::Numeric.label(),
            })
        }
    };
    Ok(built)
}

fn build_time(
    input: CriteriaInput<'_>,
    comparison: Comparison,
) -> Result<(Condition, String), CriteriaError> {
    let time = parse_time(input.value)?;
    match comparison {
        Comparison::Before => Ok((
            Condition::Before(time),
            format!("before {}", format_clock(&time)),
        )),
        Comparison::After => Ok((
            Condition::After(time),
            format!("after {}", format_clock(&time)),
        )),
        other => Err(CriteriaError::UnsupportedComparison {
            comparison: other,
            field: FieldKind::Time.label(),
        }),
    }
}

fn build_duration(
    input: CriteriaInput<'_>,
    comparison: Comparison,
) -> Result<(Condition, String), CriteriaError> {
    let span: Span = input.value.trim().parse()?;
    let built = match comparison {
        Comparison::GreaterThanOrEqual => (
            DurationCondition::AtLeast(span),
            format!("at least {span}"),
        ),
        Comparison::LessThan => (DurationCondition::LessThan(span), format!("less than {span}")),
        Comparison::Equal => (DurationCondition::Exactly(span), format!("exactly {span}")),
        Comparison::Range { .. } => {
            let upper = input.upper.ok_or(CriteriaError::MissingUpperValue)?;
            let max: Span = upper.trim().parse()?;
            if span > max {
                return Err(CriteriaError::InvertedRange {
                    min: span.to_string(),
                    max: max.to_string(),
                });
            }
            (
                DurationCondition::Between { min: span, max },
                format!("between {span} and {max}"),
            )
        }
        other => {
            return Err(CriteriaError::UnsupportedComparison {
                comparison: other,
                field: FieldKind::Duration.label(),
            })
        }
    };
    Ok((Condition::Duration(built.0), built.1))
}

fn build_checklist(input: CriteriaInput<'_>) -> Result<(Condition, String), CriteriaError> {
    let trimmed = input.value.trim();
    let count: f64 = trimmed.parse().map_err(|_| CriteriaError::NotANumber {
        raw: trimmed.to_string(),
    })?;
    if count < 0.0 {
        return Err(CriteriaError::Negative {
            raw: trimmed.to_string(),
        });
    }
    if count.fract() != 0.0 {
        return Err(CriteriaError::NotWholeNumber {
            raw: trimmed.to_string(),
        });
    }
    Ok((
        Condition::GreaterThanOrEqual(count),
        format!("at least {count:.0} items completed"),
    ))
}
