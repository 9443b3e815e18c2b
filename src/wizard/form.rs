//! Question descriptors and answer validation shared by every step handler.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::state::StepKind;

/// Field-level validation failure reported back to the person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub step: StepKind,
    pub field: Option<&'static str>,
    pub message: String,
}

impl ValidationError {
    pub fn new(step: StepKind, message: impl Into<String>) -> Self {
        Self {
            step,
            field: None,
            message: message.into(),
        }
    }

    pub fn at(step: StepKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            step,
            field: Some(field),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// One option of a single-select question. `value` is what gets stored;
/// `label` and `detail` are display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub detail: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            detail: String::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// Resolves free-form input against choices. Accepts the stored value, the
/// label, or the 1-based position, all case-insensitively.
pub fn resolve_choice<'a>(choices: &'a [Choice], input: &str) -> Option<&'a Choice> {
    let key = input.trim();
    if let Ok(position) = key.parse::<usize>() {
        if let Some(choice) = position.checked_sub(1).and_then(|index| choices.get(index)) {
            return Some(choice);
        }
    }
    choices.iter().find(|choice| {
        choice.value.eq_ignore_ascii_case(key) || choice.label.eq_ignore_ascii_case(key)
    })
}

/// How a question is presented by the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Multiline,
    Select(Vec<Choice>),
    Confirm,
    /// Read-only information acknowledged by the person.
    Note,
}

type ValidatorCallback = dyn Fn(&str) -> Result<String, String> + Send + Sync;

/// Built-in validation helpers. Each returns the normalised answer to store.
#[derive(Clone)]
pub enum Validator {
    None,
    NonEmpty,
    MaxLength(usize),
    OptionalDecimal,
    Custom(Arc<ValidatorCallback>),
}

impl Validator {
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    {
        Validator::Custom(Arc::new(check))
    }

    fn validate(&self, input: &str) -> Result<String, String> {
        match self {
            Validator::None => Ok(input.trim().to_string()),
            Validator::NonEmpty => {
                if input.trim().is_empty() {
                    Err("Value cannot be empty".into())
                } else {
                    Ok(input.trim().to_string())
                }
            }
            Validator::MaxLength(limit) => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    Err("Value cannot be empty".into())
                } else if trimmed.chars().count() > *limit {
                    Err(format!("Keep it under {limit} characters"))
                } else {
                    Ok(trimmed.to_string())
                }
            }
            Validator::OptionalDecimal => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return Ok(String::new());
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(|_| trimmed.to_string())
                    .ok_or_else(|| format!("`{trimmed}` is not a number"))
            }
            Validator::Custom(check) => check(input),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::None => f.write_str("None"),
            Validator::NonEmpty => f.write_str("NonEmpty"),
            Validator::MaxLength(limit) => write!(f, "MaxLength({limit})"),
            Validator::OptionalDecimal => f.write_str("OptionalDecimal"),
            Validator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Declarative description of one prompt inside a step.
#[derive(Debug, Clone)]
pub struct Question {
    pub key: &'static str,
    pub label: String,
    pub input: InputKind,
    pub required: bool,
    pub help: Option<String>,
    pub default: Option<String>,
    pub validator: Validator,
}

impl Question {
    pub fn text(key: &'static str, label: impl Into<String>, validator: Validator) -> Self {
        Self {
            key,
            label: label.into(),
            input: InputKind::Text,
            required: true,
            help: None,
            default: None,
            validator,
        }
    }

    pub fn multiline(key: &'static str, label: impl Into<String>) -> Self {
        Self {
            input: InputKind::Multiline,
            ..Self::text(key, label, Validator::None)
        }
    }

    pub fn select(key: &'static str, label: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            input: InputKind::Select(choices),
            ..Self::text(key, label, Validator::None)
        }
    }

    pub fn confirm(key: &'static str, label: impl Into<String>) -> Self {
        Self {
            input: InputKind::Confirm,
            ..Self::text(key, label, Validator::None)
        }
    }

    pub fn note(key: &'static str, label: impl Into<String>) -> Self {
        Self {
            input: InputKind::Note,
            required: false,
            default: Some("ok".into()),
            ..Self::text(key, label, Validator::None)
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn choices(&self) -> &[Choice] {
        match &self.input {
            InputKind::Select(choices) => choices,
            _ => &[],
        }
    }

    /// Validates a raw answer and returns the value to store.
    pub fn accept(&self, raw: &str) -> Result<String, String> {
        match &self.input {
            InputKind::Note => Ok("ok".into()),
            InputKind::Select(choices) => resolve_choice(choices, raw)
                .map(|choice| choice.value.clone())
                .ok_or_else(|| {
                    let labels: Vec<&str> =
                        choices.iter().map(|choice| choice.value.as_str()).collect();
                    format!("Choose one of: {}", labels.join(", "))
                }),
            InputKind::Confirm => match raw.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Ok("true".into()),
                "n" | "no" | "false" | "0" => Ok("false".into()),
                _ => Err("Answer yes or no".into()),
            },
            InputKind::Text | InputKind::Multiline => {
                if !self.required && raw.trim().is_empty() {
                    return Ok(String::new());
                }
                self.validator.validate(raw)
            }
        }
    }
}

/// Answers gathered for the step currently on screen, plus which question is
/// being asked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    answers: BTreeMap<&'static str, String>,
    cursor: usize,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    /// Answer for `key`, treating blank answers as absent.
    pub fn filled(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        self.answers.insert(key, value.into());
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds() -> Vec<Choice> {
        vec![
            Choice::new("numeric", "Numeric"),
            Choice::new("time", "Time of day"),
        ]
    }

    #[test]
    fn choices_resolve_by_value_label_or_position() {
        let choices = kinds();
        assert_eq!(resolve_choice(&choices, "2").unwrap().value, "time");
        assert_eq!(resolve_choice(&choices, "NUMERIC").unwrap().value, "numeric");
        assert_eq!(resolve_choice(&choices, "time of day").unwrap().value, "time");
        assert!(resolve_choice(&choices, "3").is_none());
        assert!(resolve_choice(&choices, "duration").is_none());
    }

    #[test]
    fn optional_text_accepts_blank() {
        let question = Question::text("prompt", "Prompt", Validator::NonEmpty).optional();
        assert_eq!(question.accept("  "), Ok(String::new()));
        let required = Question::text("title", "Title", Validator::NonEmpty);
        assert!(required.accept("  ").is_err());
    }

    #[test]
    fn max_length_counts_characters() {
        let question = Question::text("title", "Title", Validator::MaxLength(3));
        assert_eq!(question.accept(" abc "), Ok("abc".into()));
        assert!(question.accept("abcd").is_err());
    }

    #[test]
    fn confirm_normalises_answers() {
        let question = Question::confirm("multiline", "Multi-line?");
        assert_eq!(question.accept("Y"), Ok("true".into()));
        assert_eq!(question.accept("no"), Ok("false".into()));
        assert!(question.accept("maybe").is_err());
    }

    #[test]
    fn custom_validators_normalise() {
        let question = Question::text(
            "value",
            "Value",
            Validator::custom(|raw| Ok(raw.trim().to_uppercase())),
        );
        assert_eq!(question.accept(" ab "), Ok("AB".into()));
    }
}
