use super::{missing, StepHandler};
use crate::habit::{Direction, FieldKind, HabitKind, ScoringMode};
use crate::wizard::form::{Choice, Draft, Question, ValidationError};
use crate::wizard::state::{ScoringChoice, StepData, StepKind, WizardState};

const MODE: &str = "mode";
const DIRECTION: &str = "direction";

pub struct ScoringStep;

fn field_kind(state: &WizardState) -> Option<FieldKind> {
    state.field_type().map(|field| field.kind())
}

fn asks_direction(state: &WizardState, mode: Option<ScoringMode>) -> bool {
    state.habit_kind() == HabitKind::Elastic
        && mode == Some(ScoringMode::Automatic)
        && field_kind(state).map(FieldKind::is_ordered).unwrap_or(false)
}

fn automatic_detail(habit: HabitKind) -> &'static str {
    match habit {
        HabitKind::Elastic => "Compared against mini, midi and maxi criteria.",
        HabitKind::Checklist => "Met once enough checklist items are done.",
        _ => "Met as soon as you check it off.",
    }
}

fn check(state: &WizardState, choice: &ScoringChoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if state.habit_kind() == HabitKind::Informational {
        errors.push(ValidationError::new(
            StepKind::ScoringMode,
            "Informational habits are always scored manually",
        ));
    }
    if choice.mode == ScoringMode::Automatic && field_kind(state) == Some(FieldKind::Text) {
        errors.push(ValidationError::at(
            StepKind::ScoringMode,
            MODE,
            "Automatic scoring is not available for text fields",
        ));
    }
    errors
}

impl StepHandler for ScoringStep {
    fn kind(&self) -> StepKind {
        StepKind::ScoringMode
    }

    fn can_enter(&self, state: &WizardState) -> bool {
        match state.habit_kind() {
            HabitKind::Informational => false,
            HabitKind::Simple => state.is_completed(StepKind::BasicInfo),
            _ => {
                state.is_completed(StepKind::BasicInfo)
                    && state.is_completed(StepKind::FieldConfig)
            }
        }
    }

    fn context(&self, state: &WizardState) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(field) = state.field_type() {
            lines.push(format!("Field: {}", field.summary()));
        }
        if field_kind(state) == Some(FieldKind::Text) {
            lines.push("Text fields can only be scored manually.".into());
        }
        lines
    }

    fn questions(&self, state: &WizardState, draft: &Draft) -> Vec<Question> {
        let mut choices = vec![Choice::new(ScoringMode::Manual.key(), "Manual")
            .with_detail("You decide each day whether the habit was met.")];
        if field_kind(state) != Some(FieldKind::Text) {
            choices.push(
                Choice::new(ScoringMode::Automatic.key(), "Automatic")
                    .with_detail(automatic_detail(state.habit_kind())),
            );
        }

        let mut questions = vec![Question::select(
            MODE,
            "How should this habit be scored?",
            choices,
        )
        .with_default(ScoringMode::Manual.key())];

        let mode = draft.get(MODE).and_then(ScoringMode::from_key);
        if asks_direction(state, mode) {
            let directions = [Direction::HigherBetter, Direction::LowerBetter]
                .into_iter()
                .map(|direction| Choice::new(direction.key(), direction.label()))
                .collect();
            questions.push(
                Question::select(DIRECTION, "Which direction is better?", directions)
                    .with_default(Direction::HigherBetter.key())
                    .with_help("Sets the comparison offered first for each tier."),
            );
        }
        questions
    }

    fn seed(&self, state: &WizardState) -> Draft {
        let Some(choice) = state.scoring() else {
            return Draft::new();
        };
        let mut draft = Draft::new().with(MODE, choice.mode.key());
        if let Some(direction) = choice.direction {
            draft.set(DIRECTION, direction.key());
        }
        draft
    }

    fn finish(
        &self,
        state: &WizardState,
        draft: &Draft,
    ) -> Result<Option<StepData>, Vec<ValidationError>> {
        let mode = draft
            .get(MODE)
            .and_then(ScoringMode::from_key)
            .unwrap_or(ScoringMode::Manual);
        let direction = match state.habit_kind() {
            HabitKind::Elastic => draft
                .get(DIRECTION)
                .and_then(Direction::from_key)
                .or_else(|| asks_direction(state, Some(mode)).then_some(Direction::HigherBetter)),
            _ => None,
        };
        let choice = ScoringChoice { mode, direction };
        let errors = check(state, &choice);
        if errors.is_empty() {
            Ok(Some(StepData::ScoringMode(choice)))
        } else {
            Err(errors)
        }
    }

    fn validate(&self, state: &WizardState) -> Vec<ValidationError> {
        match state.scoring() {
            Some(choice) => check(state, choice),
            None => missing(self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::FieldType;
    use crate::wizard::state::FieldConfig;
    use crate::wizard::steps::{StepEvent, Transition};

    fn elastic_with(field_type: FieldType) -> WizardState {
        let mut state = WizardState::new(HabitKind::Elastic);
        state.set_step(
            StepKind::FieldConfig,
            StepData::FieldConfig(FieldConfig {
                field_type,
                direction: None,
            }),
        );
        state
    }

    #[test]
    fn text_fields_only_offer_manual() {
        let state = elastic_with(FieldType::Text { multiline: false });
        let questions = ScoringStep.questions(&state, &Draft::new());
        let values: Vec<&str> = questions[0]
            .choices()
            .iter()
            .map(|choice| choice.value.as_str())
            .collect();
        assert_eq!(values, vec!["manual"]);
    }

    #[test]
    fn automatic_elastic_asks_direction() {
        let state = elastic_with(FieldType::Time);
        let Transition::Active { draft, .. } =
            ScoringStep.ingest(StepEvent::Answer("automatic".into()), &state, Draft::new())
        else {
            panic!("direction question expected");
        };
        let done = ScoringStep.ingest(StepEvent::Answer("2".into()), &state, draft);
        assert_eq!(
            done,
            Transition::Completed(Some(StepData::ScoringMode(ScoringChoice {
                mode: ScoringMode::Automatic,
                direction: Some(Direction::LowerBetter),
            })))
        );
    }

    #[test]
    fn simple_habits_finish_after_mode() {
        let state = WizardState::new(HabitKind::Simple);
        let done = ScoringStep.ingest(StepEvent::Keep, &state, Draft::new());
        assert_eq!(
            done,
            Transition::Completed(Some(StepData::ScoringMode(ScoringChoice {
                mode: ScoringMode::Manual,
                direction: None,
            })))
        );
    }
}
