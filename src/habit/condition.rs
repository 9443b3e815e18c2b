use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{FieldKind, FieldType};

/// Parses a strict 24-hour `HH:MM` clock literal.
///
/// Exactly two colon-separated fields are accepted: a one or two digit hour in
/// `0..=23` and a two digit minute in `0..=59`.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let mut parts = raw.trim().split(':');
    let (Some(hour), Some(minute), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    if !hour.chars().chain(minute.chars()).all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Canonical `HH:MM` rendering used in descriptions and on disk.
pub fn format_clock(time: &NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

pub(crate) mod clock_format {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_clock(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_clock(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid HH:MM time `{raw}`")))
    }
}

/// Length of time expressed with explicit unit suffixes (`1h30m`, `45m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    seconds: u64,
}

impl Span {
    pub fn from_seconds(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            seconds: minutes * 60,
        }
    }

    pub fn as_seconds(&self) -> u64 {
        self.seconds
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanParseError {
    pub input: String,
    pub reason: &'static str,
}

impl fmt::Display for SpanParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid duration: {}", self.input, self.reason)
    }
}

impl std::error::Error for SpanParseError {}

impl FromStr for Span {
    type Err = SpanParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let fail = |reason| SpanParseError {
            input: raw.to_string(),
            reason,
        };
        let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(fail("value is empty"));
        }

        let mut total = 0.0_f64;
        let mut number = String::new();
        let mut groups = 0;
        for ch in compact.chars() {
            if ch.is_ascii_digit() || ch == '.' {
                number.push(ch);
                continue;
            }
            let factor = match ch.to_ascii_lowercase() {
                'h' => 3600.0,
                'm' => 60.0,
                's' => 1.0,
                _ => return Err(fail("use h, m or s unit suffixes (e.g. 1h30m)")),
            };
            if number.is_empty() {
                return Err(fail("each unit needs a leading number"));
            }
            let value: f64 = number.parse().map_err(|_| fail("malformed number"))?;
            total += value * factor;
            number.clear();
            groups += 1;
        }
        if !number.is_empty() {
            if groups == 0 {
                return Err(fail("missing a unit suffix (h, m or s)"));
            }
            return Err(fail("trailing number without a unit suffix"));
        }
        Ok(Span::from_seconds(total.round() as u64))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        if hours == 0 && minutes == 0 && seconds == 0 {
            return write!(f, "0m");
        }
        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        if seconds > 0 {
            write!(f, "{seconds}s")?;
        }
        Ok(())
    }
}

impl Serialize for Span {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Span {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeCondition {
    pub min: f64,
    pub max: f64,
    pub min_inclusive: bool,
    pub max_inclusive: bool,
}

/// Duration comparisons kept separate from clock comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationCondition {
    AtLeast(Span),
    LessThan(Span),
    Exactly(Span),
    Between { min: Span, max: Span },
}

/// A typed comparison rule evaluated against one recorded field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Equals(bool),
    GreaterThan(f64),
    GreaterThanOrEqual(f64),
    LessThan(f64),
    LessThanOrEqual(f64),
    Range(RangeCondition),
    Before(#[serde(with = "clock_format")] NaiveTime),
    After(#[serde(with = "clock_format")] NaiveTime),
    Duration(DurationCondition),
}

impl Condition {
    /// Whether this rule can be evaluated against values of `field`.
    pub fn fits(&self, field: &FieldType) -> bool {
        match (self, field.kind()) {
            (Condition::Equals(_), FieldKind::Boolean) => true,
            (
                Condition::GreaterThan(_)
                | Condition::GreaterThanOrEqual(_)
                | Condition::LessThan(_)
                | Condition::LessThanOrEqual(_)
                | Condition::Range(_),
                FieldKind::Numeric,
            ) => true,
            (Condition::GreaterThanOrEqual(count), FieldKind::Checklist) => {
                *count >= 0.0 && count.fract() == 0.0
            }
            (Condition::Before(_) | Condition::After(_), FieldKind::Time) => true,
            (Condition::Duration(_), FieldKind::Duration) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_requires_two_fields_in_range() {
        assert_eq!(parse_clock("07:30"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_clock("7:05"), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_clock("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert!(parse_clock("24:00").is_none());
        assert!(parse_clock("12:60").is_none());
        assert!(parse_clock("12").is_none());
        assert!(parse_clock("12:30:00").is_none());
        assert!(parse_clock("ab:cd").is_none());
        assert!(parse_clock("12:5").is_none());
    }

    #[test]
    fn span_parses_unit_groups() {
        assert_eq!("45m".parse::<Span>().unwrap(), Span::from_minutes(45));
        assert_eq!("1h30m".parse::<Span>().unwrap(), Span::from_minutes(90));
        assert_eq!("1.5h".parse::<Span>().unwrap(), Span::from_minutes(90));
        assert_eq!("2h 15m".parse::<Span>().unwrap(), Span::from_minutes(135));
        assert_eq!("90s".parse::<Span>().unwrap(), Span::from_seconds(90));
    }

    #[test]
    fn span_rejects_missing_suffix() {
        assert!("30".parse::<Span>().is_err());
        assert!("1h30".parse::<Span>().is_err());
        assert!("".parse::<Span>().is_err());
        assert!("10 days".parse::<Span>().is_err());
        assert!("h".parse::<Span>().is_err());
    }

    #[test]
    fn span_renders_canonically() {
        assert_eq!(Span::from_minutes(90).to_string(), "1h30m");
        assert_eq!(Span::from_minutes(45).to_string(), "45m");
        assert_eq!(Span::from_minutes(120).to_string(), "2h");
        assert_eq!(Span::from_seconds(0).to_string(), "0m");
    }

    #[test]
    fn conditions_serialize_with_clock_and_span_literals() {
        let before = Condition::Before(NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        assert_eq!(
            serde_json::to_string(&before).unwrap(),
            r#"{"before":"06:30"}"#
        );
        let duration = Condition::Duration(DurationCondition::AtLeast(Span::from_minutes(90)));
        assert_eq!(
            serde_json::to_string(&duration).unwrap(),
            r#"{"duration":{"at_least":"1h30m"}}"#
        );
        let parsed: Condition = serde_json::from_str(r#"{"after":"21:00"}"#).unwrap();
        assert_eq!(
            parsed,
            Condition::After(NaiveTime::from_hms_opt(21, 0, 0).unwrap())
        );
    }
}
