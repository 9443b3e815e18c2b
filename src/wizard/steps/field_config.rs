use super::{missing, StepHandler};
use crate::habit::{slugify, Direction, FieldKind, FieldType, HabitKind, NumericSubkind};
use crate::wizard::form::{Choice, Draft, Question, ValidationError, Validator};
use crate::wizard::state::{FieldConfig, StepData, StepKind, WizardState};

const FIELD_KIND: &str = "field_kind";
const SUBKIND: &str = "subkind";
const UNIT: &str = "unit";
const MIN: &str = "min";
const MAX: &str = "max";
const MULTILINE: &str = "multiline";
const DIRECTION: &str = "direction";
const CHECKLIST_ID: &str = "checklist_id";

/// Field kinds a habit kind may record. Boolean is meaningless on a
/// three-tier scale, so elastic habits never offer it.
fn offered_kinds(habit: HabitKind) -> &'static [FieldKind] {
    match habit {
        HabitKind::Simple => &[FieldKind::Boolean],
        HabitKind::Elastic => &[
            FieldKind::Numeric,
            FieldKind::Duration,
            FieldKind::Time,
            FieldKind::Text,
        ],
        HabitKind::Informational => &[
            FieldKind::Boolean,
            FieldKind::Numeric,
            FieldKind::Duration,
            FieldKind::Time,
            FieldKind::Text,
        ],
        HabitKind::Checklist => &[FieldKind::Checklist],
    }
}

fn kind_choice(kind: FieldKind) -> Choice {
    let detail = match kind {
        FieldKind::Boolean => "Yes or no",
        FieldKind::Text => "Free-form notes",
        FieldKind::Numeric => "A number, optionally with a unit",
        FieldKind::Time => "A time of day such as 06:30",
        FieldKind::Duration => "A length of time such as 45m or 1h30m",
        FieldKind::Checklist => "Items ticked off a checklist",
    };
    Choice::new(kind.key(), kind.label()).with_detail(detail)
}

fn direction_choices() -> Vec<Choice> {
    Direction::ALL
        .into_iter()
        .map(|direction| Choice::new(direction.key(), direction.label()))
        .collect()
}

fn checklist_id_validator() -> Validator {
    Validator::custom(|raw| {
        if raw.trim().is_empty() {
            Err("Checklist id cannot be empty".into())
        } else {
            Ok(slugify(raw))
        }
    })
}

fn parse_bound(draft: &Draft, key: &str) -> Option<f64> {
    draft.filled(key).and_then(|raw| raw.trim().parse().ok())
}

fn format_bound(bound: Option<f64>) -> String {
    bound.map(|value| value.to_string()).unwrap_or_default()
}

fn check(habit: HabitKind, config: &FieldConfig) -> Vec<ValidationError> {
    let step = StepKind::FieldConfig;
    let mut errors = Vec::new();
    let kind = config.field_type.kind();

    if !offered_kinds(habit).contains(&kind) {
        errors.push(ValidationError::at(
            step,
            FIELD_KIND,
            format!(
                "{} fields are not available for {} habits",
                kind.label(),
                habit.label().to_lowercase()
            ),
        ));
    }

    match &config.field_type {
        FieldType::Numeric {
            subkind, min, max, ..
        } => {
            if !subkind.allows_negative() {
                if min.map(|min| min < 0.0).unwrap_or(false) {
                    errors.push(ValidationError::at(
                        step,
                        MIN,
                        "Minimum cannot be negative for an unsigned field",
                    ));
                }
                if max.map(|max| max < 0.0).unwrap_or(false) {
                    errors.push(ValidationError::at(
                        step,
                        MAX,
                        "Maximum cannot be negative for an unsigned field",
                    ));
                }
            }
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    errors.push(ValidationError::at(
                        step,
                        MAX,
                        format!("Maximum ({max}) must not be below minimum ({min})"),
                    ));
                }
            }
        }
        FieldType::Checklist { checklist_id } if checklist_id.trim().is_empty() => {
            errors.push(ValidationError::at(
                step,
                CHECKLIST_ID,
                "Checklist id is required",
            ));
        }
        _ => {}
    }
    errors
}

pub struct FieldConfigStep;

impl FieldConfigStep {
    fn build(&self, habit: HabitKind, draft: &Draft) -> Result<FieldType, ValidationError> {
        if habit == HabitKind::Checklist {
            return Ok(FieldType::Checklist {
                checklist_id: draft.get(CHECKLIST_ID).unwrap_or_default().to_string(),
            });
        }

        let kind = draft
            .get(FIELD_KIND)
            .and_then(FieldKind::from_key)
            .ok_or_else(|| {
                ValidationError::at(StepKind::FieldConfig, FIELD_KIND, "Choose a field kind")
            })?;
        let field = match kind {
            FieldKind::Boolean => FieldType::Boolean,
            FieldKind::Time => FieldType::Time,
            FieldKind::Duration => FieldType::Duration,
            FieldKind::Text => FieldType::Text {
                multiline: draft.get(MULTILINE) == Some("true"),
            },
            FieldKind::Numeric => FieldType::Numeric {
                subkind: draft
                    .get(SUBKIND)
                    .and_then(NumericSubkind::from_key)
                    .unwrap_or(NumericSubkind::UnsignedInt),
                unit: draft.get(UNIT).unwrap_or_default().trim().to_string(),
                min: parse_bound(draft, MIN),
                max: parse_bound(draft, MAX),
            },
            FieldKind::Checklist => {
                return Err(ValidationError::at(
                    StepKind::FieldConfig,
                    FIELD_KIND,
                    "Checklist fields belong to checklist habits",
                ))
            }
        };
        Ok(field)
    }
}

impl StepHandler for FieldConfigStep {
    fn kind(&self) -> StepKind {
        StepKind::FieldConfig
    }

    fn can_enter(&self, state: &WizardState) -> bool {
        state.habit_kind() != HabitKind::Simple && state.is_completed(StepKind::BasicInfo)
    }

    fn context(&self, state: &WizardState) -> Vec<String> {
        match state.habit_kind() {
            HabitKind::Elastic => {
                vec!["Elastic habits compare the recorded value against three tiers.".into()]
            }
            HabitKind::Informational => {
                vec!["Informational habits only collect data; they are never scored.".into()]
            }
            _ => Vec::new(),
        }
    }

    fn questions(&self, state: &WizardState, draft: &Draft) -> Vec<Question> {
        let habit = state.habit_kind();
        if habit == HabitKind::Checklist {
            return vec![Question::text(CHECKLIST_ID, "Checklist id", checklist_id_validator())
                .with_help("Identifier of the checklist whose items are ticked off, e.g. morning_routine.")];
        }

        let choices = offered_kinds(habit).iter().copied().map(kind_choice).collect();
        let mut questions = vec![Question::select(
            FIELD_KIND,
            "What kind of value will you record?",
            choices,
        )];

        match draft.get(FIELD_KIND).and_then(FieldKind::from_key) {
            Some(FieldKind::Numeric) => {
                let subkinds = NumericSubkind::ALL
                    .into_iter()
                    .map(|subkind| Choice::new(subkind.key(), subkind.label()))
                    .collect();
                questions.push(
                    Question::select(SUBKIND, "Which numbers are allowed?", subkinds)
                        .with_default(NumericSubkind::UnsignedInt.key()),
                );
                questions.push(
                    Question::text(UNIT, "Unit", Validator::None)
                        .optional()
                        .with_help("Shown next to values, e.g. minutes, pages, glasses."),
                );
                questions.push(
                    Question::text(MIN, "Minimum value", Validator::OptionalDecimal)
                        .optional()
                        .with_help("Leave blank for no lower bound."),
                );
                questions.push(
                    Question::text(MAX, "Maximum value", Validator::OptionalDecimal)
                        .optional()
                        .with_help("Leave blank for no upper bound."),
                );
            }
            Some(FieldKind::Text) => {
                questions.push(
                    Question::confirm(MULTILINE, "Allow multiple lines?").with_default("false"),
                );
            }
            _ => {}
        }

        if habit == HabitKind::Informational {
            questions.push(
                Question::select(DIRECTION, "Which direction is better?", direction_choices())
                    .optional()
                    .with_default(Direction::Neutral.key())
                    .with_help("Used for trends only; informational habits are not scored."),
            );
        }
        questions
    }

    fn seed(&self, state: &WizardState) -> Draft {
        let Some(config) = state.field_config() else {
            return Draft::new();
        };
        let mut draft = Draft::new().with(FIELD_KIND, config.field_type.kind().key());
        match &config.field_type {
            FieldType::Numeric {
                subkind,
                unit,
                min,
                max,
            } => {
                draft.set(SUBKIND, subkind.key());
                draft.set(UNIT, unit.clone());
                draft.set(MIN, format_bound(*min));
                draft.set(MAX, format_bound(*max));
            }
            FieldType::Text { multiline } => draft.set(MULTILINE, multiline.to_string()),
            FieldType::Checklist { checklist_id } => draft.set(CHECKLIST_ID, checklist_id.clone()),
            _ => {}
        }
        if let Some(direction) = config.direction {
            draft.set(DIRECTION, direction.key());
        }
        draft
    }

    fn finish(
        &self,
        state: &WizardState,
        draft: &Draft,
    ) -> Result<Option<StepData>, Vec<ValidationError>> {
        let habit = state.habit_kind();
        let field_type = self.build(habit, draft).map_err(|error| vec![error])?;
        let direction = (habit == HabitKind::Informational).then(|| {
            draft
                .get(DIRECTION)
                .and_then(Direction::from_key)
                .unwrap_or_default()
        });
        let config = FieldConfig {
            field_type,
            direction,
        };
        let errors = check(habit, &config);
        if errors.is_empty() {
            Ok(Some(StepData::FieldConfig(config)))
        } else {
            Err(errors)
        }
    }

    fn validate(&self, state: &WizardState) -> Vec<ValidationError> {
        match state.field_config() {
            Some(config) => check(state.habit_kind(), config),
            None => missing(self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::steps::{StepEvent, Transition};

    fn drive(state: &WizardState, answers: &[&str]) -> Transition {
        let mut draft = FieldConfigStep.seed(state);
        let mut outcome = None;
        for answer in answers {
            let event = if *answer == "<keep>" {
                StepEvent::Keep
            } else {
                StepEvent::Answer(answer.to_string())
            };
            let transition = FieldConfigStep.ingest(event, state, draft.clone());
            if let Transition::Active { draft: next, .. } = &transition {
                draft = next.clone();
            }
            outcome = Some(transition);
        }
        outcome.expect("at least one answer")
    }

    #[test]
    fn numeric_asks_for_subkind_unit_and_bounds() {
        let state = WizardState::new(HabitKind::Elastic);
        let transition = drive(&state, &["numeric", "<keep>", "minutes", "", ""]);
        let Transition::Completed(Some(StepData::FieldConfig(config))) = transition else {
            panic!("expected completion, got {transition:?}");
        };
        assert_eq!(
            config.field_type,
            FieldType::Numeric {
                subkind: NumericSubkind::UnsignedInt,
                unit: "minutes".into(),
                min: None,
                max: None,
            }
        );
        assert_eq!(config.direction, None);
    }

    #[test]
    fn time_needs_no_detail_questions() {
        let state = WizardState::new(HabitKind::Elastic);
        let transition = drive(&state, &["time"]);
        assert!(matches!(
            transition,
            Transition::Completed(Some(StepData::FieldConfig(FieldConfig {
                field_type: FieldType::Time,
                ..
            })))
        ));
    }

    #[test]
    fn elastic_does_not_offer_boolean() {
        let state = WizardState::new(HabitKind::Elastic);
        let Transition::Active { feedback, draft } = drive(&state, &["boolean"]) else {
            panic!("boolean must be rejected");
        };
        assert_eq!(draft.cursor(), 0);
        assert!(feedback[0].starts_with("Choose one of"));
    }

    #[test]
    fn inverted_bounds_send_cursor_to_maximum() {
        let state = WizardState::new(HabitKind::Elastic);
        let Transition::Active { feedback, draft } =
            drive(&state, &["numeric", "decimal", "", "10", "5"])
        else {
            panic!("expected rejection");
        };
        assert_eq!(feedback, vec!["Maximum (5) must not be below minimum (10)"]);
        let questions = FieldConfigStep.questions(&state, &draft);
        assert_eq!(questions[draft.cursor()].key, MAX);
    }

    #[test]
    fn informational_collects_direction_with_neutral_default() {
        let state = WizardState::new(HabitKind::Informational);
        let transition = drive(&state, &["time", "<keep>"]);
        let Transition::Completed(Some(StepData::FieldConfig(config))) = transition else {
            panic!("expected completion");
        };
        assert_eq!(config.direction, Some(Direction::Neutral));
    }

    #[test]
    fn checklist_id_is_slugified() {
        let state = WizardState::new(HabitKind::Checklist);
        let transition = drive(&state, &["Morning Routine"]);
        let Transition::Completed(Some(StepData::FieldConfig(config))) = transition else {
            panic!("expected completion");
        };
        assert_eq!(
            config.field_type,
            FieldType::Checklist {
                checklist_id: "morning_routine".into()
            }
        );
    }
}
