use super::{missing, StepHandler, Transition};
use crate::wizard::flow::FlowPlan;
use crate::wizard::form::{Choice, Draft, Question, ValidationError};
use crate::wizard::materialize::{materialize, summary};
use crate::wizard::navigation::Navigator;
use crate::wizard::state::{StepData, StepKind, WizardState};

const DECISION: &str = "decision";
const SAVE: &str = "save";
const BACK: &str = "back";
const CANCEL: &str = "cancel";

/// Final review. Records nothing; completing it asks the session to build
/// the habit.
pub struct ConfirmationStep;

impl StepHandler for ConfirmationStep {
    fn kind(&self) -> StepKind {
        StepKind::Confirmation
    }

    fn can_enter(&self, state: &WizardState) -> bool {
        self.validate(state).is_empty()
    }

    fn context(&self, state: &WizardState) -> Vec<String> {
        let plan = FlowPlan::for_state(state);
        let mut lines = match materialize(state, &plan) {
            Ok(habit) => summary(&habit)
                .into_iter()
                .map(|(label, value)| format!("{label:<12} {value}"))
                .collect(),
            Err(error) => vec![error.to_string()],
        };
        if let Some(outcome) = state.validation() {
            if outcome.overridden {
                lines.push(String::new());
                lines.push("Warning: tiers are out of order; saving will be refused.".into());
                lines.extend(outcome.violations.iter().map(|message| format!("  - {message}")));
            }
        }
        lines
    }

    fn questions(&self, _state: &WizardState, _draft: &Draft) -> Vec<Question> {
        vec![Question::select(
            DECISION,
            "Save this habit?",
            vec![
                Choice::new(SAVE, "Save habit"),
                Choice::new(BACK, "Go back").with_detail("Revisit the previous step."),
                Choice::new(CANCEL, "Cancel").with_detail("Discard everything entered."),
            ],
        )
        .with_default(SAVE)]
    }

    fn seed(&self, _state: &WizardState) -> Draft {
        Draft::new()
    }

    fn intercept(&self, key: &str, value: &str, _state: &WizardState) -> Option<Transition> {
        match (key, value) {
            (DECISION, BACK) => Some(Transition::Back),
            (DECISION, CANCEL) => Some(Transition::Cancelled),
            _ => None,
        }
    }

    fn finish(
        &self,
        _state: &WizardState,
        _draft: &Draft,
    ) -> Result<Option<StepData>, Vec<ValidationError>> {
        Ok(None)
    }

    fn validate(&self, state: &WizardState) -> Vec<ValidationError> {
        let plan = FlowPlan::for_state(state);
        let navigator = Navigator::new(&plan, state);
        match navigator.first_unsettled() {
            StepKind::Confirmation => Vec::new(),
            step => missing(step),
        }
    }
}
