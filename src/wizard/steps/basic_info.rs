use super::{missing, StepHandler};
use crate::habit::{default_prompt, HabitKind, MAX_TITLE_LEN};
use crate::wizard::form::{Draft, Question, ValidationError, Validator};
use crate::wizard::state::{BasicInfo, StepData, StepKind, WizardState};

const TITLE: &str = "title";
const DESCRIPTION: &str = "description";
const PROMPT: &str = "prompt";

pub struct BasicInfoStep;

fn check(info: &BasicInfo, expected_kind: HabitKind) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let title = info.title.trim();
    if title.is_empty() {
        errors.push(ValidationError::at(StepKind::BasicInfo, TITLE, "Title is required"));
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(ValidationError::at(
            StepKind::BasicInfo,
            TITLE,
            format!("Title cannot exceed {MAX_TITLE_LEN} characters"),
        ));
    }
    if info.habit_kind != expected_kind {
        errors.push(ValidationError::new(
            StepKind::BasicInfo,
            format!(
                "Habit kind is fixed to {} for this wizard",
                expected_kind.label()
            ),
        ));
    }
    errors
}

impl StepHandler for BasicInfoStep {
    fn kind(&self) -> StepKind {
        StepKind::BasicInfo
    }

    fn can_enter(&self, _state: &WizardState) -> bool {
        true
    }

    fn context(&self, state: &WizardState) -> Vec<String> {
        let kind = state.habit_kind();
        vec![format!("Habit kind: {} ({})", kind.label(), kind.summary())]
    }

    fn questions(&self, state: &WizardState, draft: &Draft) -> Vec<Question> {
        let title = draft.filled(TITLE).unwrap_or("<title>");
        vec![
            Question::text(TITLE, "Title", Validator::MaxLength(MAX_TITLE_LEN))
                .with_help("A short name shown in lists, e.g. \"Morning Exercise\"."),
            Question::multiline(DESCRIPTION, "Description")
                .optional()
                .with_help("Optional notes about why this habit matters."),
            Question::text(PROMPT, "Check-in prompt", Validator::None)
                .optional()
                .with_help(format!(
                    "Question asked when recording. Leave blank for \"{}\".",
                    default_prompt(state.habit_kind(), title)
                )),
        ]
    }

    fn seed(&self, state: &WizardState) -> Draft {
        match state.basic_info() {
            Some(info) => Draft::new()
                .with(TITLE, info.title.clone())
                .with(DESCRIPTION, info.description.clone())
                .with(PROMPT, info.prompt.clone()),
            None => Draft::new(),
        }
    }

    fn finish(
        &self,
        state: &WizardState,
        draft: &Draft,
    ) -> Result<Option<StepData>, Vec<ValidationError>> {
        let info = BasicInfo {
            title: draft.get(TITLE).unwrap_or_default().trim().to_string(),
            description: draft.get(DESCRIPTION).unwrap_or_default().trim().to_string(),
            prompt: draft.get(PROMPT).unwrap_or_default().trim().to_string(),
            habit_kind: state.habit_kind(),
        };
        let errors = check(&info, state.habit_kind());
        if errors.is_empty() {
            Ok(Some(StepData::BasicInfo(info)))
        } else {
            Err(errors)
        }
    }

    fn validate(&self, state: &WizardState) -> Vec<ValidationError> {
        match state.basic_info() {
            Some(info) => check(info, state.habit_kind()),
            None => missing(self.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::steps::{StepEvent, Transition};

    #[test]
    fn three_answers_complete_the_step() {
        let state = WizardState::new(HabitKind::Elastic);
        let handler = BasicInfoStep;
        let mut draft = handler.seed(&state);
        for event in [
            StepEvent::Answer("  Exercise Duration ".into()),
            StepEvent::Answer(String::new()),
        ] {
            match handler.ingest(event, &state, draft) {
                Transition::Active { draft: next, .. } => draft = next,
                other => panic!("unexpected {other:?}"),
            }
        }
        let done = handler.ingest(StepEvent::Keep, &state, draft);
        let Transition::Completed(Some(StepData::BasicInfo(info))) = done else {
            panic!("expected completion, got {done:?}");
        };
        assert_eq!(info.title, "Exercise Duration");
        assert_eq!(info.prompt, "");
        assert_eq!(info.habit_kind, HabitKind::Elastic);
    }

    #[test]
    fn over_long_title_is_rejected_inline() {
        let state = WizardState::new(HabitKind::Simple);
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        let transition = BasicInfoStep.ingest(StepEvent::Answer(long), &state, Draft::new());
        let Transition::Active { draft, feedback } = transition else {
            panic!("expected rejection");
        };
        assert_eq!(draft.cursor(), 0);
        assert_eq!(feedback.len(), 1);
    }

    #[test]
    fn validate_flags_missing_data() {
        let state = WizardState::new(HabitKind::Simple);
        assert_eq!(BasicInfoStep.validate(&state).len(), 1);
    }
}
