use super::{missing, StepHandler};
use crate::habit::{format_clock, Direction, FieldKind, FieldType, ScoringMode, Span};
use crate::wizard::criteria::{
    build_criteria, parse_number, parse_time, Comparison, CriteriaError, CriteriaInput,
};
use crate::wizard::form::{Choice, Draft, Question, ValidationError, Validator};
use crate::wizard::state::{CriteriaAnswer, StepData, StepKind, WizardState};
use crate::wizard::tiers::Tier;

const ACKNOWLEDGE: &str = "acknowledge";
const COMPARISON: &str = "comparison";
const VALUE: &str = "value";
const UPPER: &str = "upper";

/// Collects one criteria: the single criteria of simple and checklist
/// habits, or one tier of an elastic habit.
pub struct CriteriaStep {
    tier: Option<Tier>,
}

impl CriteriaStep {
    pub fn single() -> Self {
        Self { tier: None }
    }

    pub fn tier(tier: Tier) -> Self {
        Self { tier: Some(tier) }
    }

    fn previous_tier(&self) -> Option<Tier> {
        match self.tier? {
            Tier::Mini => None,
            Tier::Midi => Some(Tier::Mini),
            Tier::Maxi => Some(Tier::Midi),
        }
    }

    /// Comparison pre-selected for this slot: whatever the previous tier
    /// used, otherwise derived from the habit's direction.
    fn default_comparison(&self, state: &WizardState, kind: FieldKind) -> Comparison {
        let offered = Comparison::offered_for(kind);
        let inherited = self
            .previous_tier()
            .and_then(|tier| state.criteria(StepKind::TierCriteria(tier)))
            .and_then(|answer| answer.comparison)
            .filter(|comparison| offered.contains(comparison));
        if let Some(comparison) = inherited {
            return comparison;
        }

        let direction = state
            .scoring()
            .and_then(|choice| choice.direction)
            .unwrap_or_default();
        match (kind, direction) {
            (FieldKind::Time, Direction::HigherBetter) => Comparison::After,
            (FieldKind::Time, _) => Comparison::Before,
            (FieldKind::Numeric, Direction::LowerBetter) => Comparison::LessThanOrEqual,
            (FieldKind::Duration, Direction::LowerBetter) => Comparison::LessThan,
            _ => Comparison::GreaterThanOrEqual,
        }
    }

    fn comparison(&self, state: &WizardState, draft: &Draft, kind: FieldKind) -> Comparison {
        draft
            .get(COMPARISON)
            .and_then(Comparison::from_key)
            .unwrap_or_else(|| self.default_comparison(state, kind))
    }

    fn check(&self, state: &WizardState, answer: &CriteriaAnswer) -> Vec<ValidationError> {
        let kind = self.kind();
        let Some(field) = state.field_type() else {
            return missing(StepKind::FieldConfig);
        };
        let mut errors = Vec::new();
        if answer.tier != self.tier {
            errors.push(ValidationError::new(kind, "Criteria belongs to a different tier"));
        }
        if !answer.criteria.condition.fits(field) {
            errors.push(ValidationError::at(
                kind,
                VALUE,
                format!(
                    "Criteria no longer matches the {} field; enter it again",
                    field.kind().label().to_lowercase()
                ),
            ));
        }
        errors
    }
}

fn value_validator(field: &FieldType) -> Validator {
    let field = field.clone();
    Validator::custom(move |raw| match field.kind() {
        FieldKind::Numeric => parse_number(raw, &field)
            .map(|_| raw.trim().to_string())
            .map_err(|error| error.to_string()),
        FieldKind::Time => parse_time(raw)
            .map(|time| format_clock(&time))
            .map_err(|error| error.to_string()),
        FieldKind::Duration => raw
            .trim()
            .parse::<Span>()
            .map(|span| span.to_string())
            .map_err(|error| error.to_string()),
        FieldKind::Checklist => raw
            .trim()
            .parse::<u32>()
            .map(|count| count.to_string())
            .map_err(|_| format!("`{}` must be a whole number of items", raw.trim())),
        FieldKind::Boolean | FieldKind::Text => Ok(raw.trim().to_string()),
    })
}

fn value_label(kind: FieldKind, comparison: Comparison, field: &FieldType) -> String {
    let noun = match kind {
        FieldKind::Time => "Time (HH:MM)".to_string(),
        FieldKind::Duration => "Duration (e.g. 30m, 1h30m)".to_string(),
        FieldKind::Checklist => "Number of items".to_string(),
        _ => match field.unit() {
            Some(unit) => format!("Value in {unit}"),
            None => "Value".to_string(),
        },
    };
    if comparison.needs_upper_value() {
        format!("Lower bound: {noun}")
    } else {
        noun
    }
}

fn error_field(error: &CriteriaError) -> &'static str {
    match error {
        CriteriaError::InvertedRange { .. } | CriteriaError::MissingUpperValue => UPPER,
        CriteriaError::UnsupportedComparison { .. } => COMPARISON,
        _ => VALUE,
    }
}

impl StepHandler for CriteriaStep {
    fn kind(&self) -> StepKind {
        self.tier
            .map(StepKind::TierCriteria)
            .unwrap_or(StepKind::Criteria)
    }

    fn can_enter(&self, state: &WizardState) -> bool {
        let automatic = state
            .scoring()
            .map(|choice| choice.mode == ScoringMode::Automatic)
            .unwrap_or(false);
        let previous_done = self
            .previous_tier()
            .map(|tier| state.is_completed(StepKind::TierCriteria(tier)))
            .unwrap_or(true);
        automatic && state.is_completed(StepKind::ScoringMode) && previous_done
    }

    fn context(&self, state: &WizardState) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(field) = state.field_type() {
            lines.push(format!("Field: {}", field.summary()));
        }
        if let Some(tier) = self.tier {
            lines.push(format!("{} tier. {}", tier.label(), tier.hint()));
            for earlier in Tier::ALL.into_iter().filter(|earlier| *earlier < tier) {
                if let Some(answer) = state.criteria(StepKind::TierCriteria(earlier)) {
                    lines.push(answer.criteria.description.clone());
                }
            }
        }
        lines
    }

    fn questions(&self, state: &WizardState, draft: &Draft) -> Vec<Question> {
        let Some(field) = state.field_type() else {
            return vec![Question::note(ACKNOWLEDGE, "Configure the field first.")];
        };
        let kind = field.kind();
        match kind {
            FieldKind::Boolean => {
                return vec![Question::note(
                    ACKNOWLEDGE,
                    "This habit counts as met when you check it off; no threshold is needed.",
                )]
            }
            FieldKind::Text => {
                return vec![Question::note(
                    ACKNOWLEDGE,
                    "Text fields are scored manually.",
                )]
            }
            _ => {}
        }

        let offered = Comparison::offered_for(kind);
        let mut questions = Vec::new();
        if offered.len() > 1 {
            let choices = offered
                .iter()
                .map(|comparison| Choice::new(comparison.key(), comparison.label(kind)))
                .collect();
            questions.push(
                Question::select(COMPARISON, "How should values be compared?", choices)
                    .with_default(self.default_comparison(state, kind).key()),
            );
        }

        let comparison = self.comparison(state, draft, kind);
        questions.push(
            Question::text(VALUE, value_label(kind, comparison, field), value_validator(field))
                .with_help(match kind {
                    FieldKind::Time => "Use the 24-hour clock, e.g. 06:30 or 22:00.",
                    FieldKind::Duration => "Combine h, m and s suffixes, e.g. 45m or 1h30m.",
                    _ => "Enter a number.",
                }),
        );
        if comparison.needs_upper_value() {
            questions.push(Question::text(UPPER, "Upper bound", value_validator(field)));
        }
        questions
    }

    fn seed(&self, state: &WizardState) -> Draft {
        let Some(answer) = state.criteria(self.kind()) else {
            return Draft::new();
        };
        let mut draft = Draft::new().with(VALUE, answer.value.clone());
        if let Some(comparison) = answer.comparison {
            draft.set(COMPARISON, comparison.key());
        }
        if let Some(upper) = &answer.upper {
            draft.set(UPPER, upper.clone());
        }
        draft
    }

    fn finish(
        &self,
        state: &WizardState,
        draft: &Draft,
    ) -> Result<Option<StepData>, Vec<ValidationError>> {
        let step = self.kind();
        let field = state.field_type().ok_or_else(|| missing(StepKind::FieldConfig))?;
        let kind = field.kind();

        let (comparison, value, upper) = match kind {
            FieldKind::Boolean => (None, "true".to_string(), None),
            _ => {
                let comparison = self.comparison(state, draft, kind);
                let upper = comparison
                    .needs_upper_value()
                    .then(|| draft.get(UPPER).unwrap_or_default().to_string());
                (
                    Some(comparison),
                    draft.get(VALUE).unwrap_or_default().to_string(),
                    upper,
                )
            }
        };

        let criteria = build_criteria(CriteriaInput {
            field,
            tier: self.tier,
            comparison,
            value: &value,
            upper: upper.as_deref(),
        })
        .map_err(|error| {
            vec![ValidationError::at(
                step,
                error_field(&error),
                error.to_string(),
            )]
        })?;

        Ok(Some(StepData::Criteria(CriteriaAnswer {
            tier: self.tier,
            comparison,
            value,
            upper,
            criteria,
        })))
    }

    fn validate(&self, state: &WizardState) -> Vec<ValidationError> {
        match state.criteria(self.kind()) {
            Some(answer) => self.check(state, answer),
            None => missing(self.kind()),
        }
    }
}
