use super::{missing, StepHandler, Transition};
use crate::wizard::form::{Choice, Draft, Question, ValidationError};
use crate::wizard::state::{StepData, StepKind, ValidationOutcome, WizardState};
use crate::wizard::tiers::{check_tiers, Tier, TierReport};

const ACKNOWLEDGE: &str = "acknowledge";
const RESOLUTION: &str = "resolution";
const PROCEED: &str = "proceed";
const FIX: &str = "fix";
const CANCEL: &str = "cancel";

/// Advisory ordering check over the three tier criteria.
pub struct TierCheckStep;

fn report(state: &WizardState) -> Option<TierReport> {
    let field = state.field_type()?.kind();
    let [mini, midi, maxi] = Tier::ALL.map(|tier| state.criteria(StepKind::TierCriteria(tier)));
    let conditions = [
        &mini?.criteria.condition,
        &midi?.criteria.condition,
        &maxi?.criteria.condition,
    ];
    Some(check_tiers(conditions, field))
}

impl StepHandler for TierCheckStep {
    fn kind(&self) -> StepKind {
        StepKind::TierValidation
    }

    fn can_enter(&self, state: &WizardState) -> bool {
        Tier::ALL
            .into_iter()
            .all(|tier| state.is_completed(StepKind::TierCriteria(tier)))
    }

    fn context(&self, state: &WizardState) -> Vec<String> {
        match report(state) {
            Some(report) if !report.is_ok() => {
                let mut lines = vec!["The tiers are not ordered from easiest to hardest:".into()];
                lines.extend(report.messages().into_iter().map(|message| format!("  - {message}")));
                lines
            }
            Some(_) => Vec::new(),
            None => vec!["Enter all three tiers before checking them.".into()],
        }
    }

    fn questions(&self, state: &WizardState, _draft: &Draft) -> Vec<Question> {
        match report(state) {
            Some(report) if !report.is_ok() => vec![Question::select(
                RESOLUTION,
                "How do you want to continue?",
                vec![
                    Choice::new(FIX, "Go back and fix").with_detail("Jump to the first tier involved."),
                    Choice::new(PROCEED, "Proceed anyway")
                        .with_detail("Saving still rejects tiers that are out of order."),
                    Choice::new(CANCEL, "Cancel").with_detail("Discard this habit."),
                ],
            )
            .with_default(FIX)],
            _ => vec![Question::note(
                ACKNOWLEDGE,
                "Mini, midi and maxi criteria are ordered from easiest to hardest.",
            )],
        }
    }

    fn seed(&self, _state: &WizardState) -> Draft {
        Draft::new()
    }

    fn intercept(&self, key: &str, value: &str, state: &WizardState) -> Option<Transition> {
        if key != RESOLUTION {
            return None;
        }
        match value {
            FIX => {
                let tier = report(state)
                    .and_then(|report| report.first_offender())
                    .unwrap_or(Tier::Mini);
                Some(Transition::Revisit(StepKind::TierCriteria(tier)))
            }
            CANCEL => Some(Transition::Cancelled),
            _ => None,
        }
    }

    fn finish(
        &self,
        state: &WizardState,
        _draft: &Draft,
    ) -> Result<Option<StepData>, Vec<ValidationError>> {
        let report = report(state).ok_or_else(|| missing(StepKind::TierCriteria(Tier::Mini)))?;
        Ok(Some(StepData::Validation(ValidationOutcome {
            ok: report.is_ok(),
            violations: report.messages(),
            overridden: !report.is_ok(),
        })))
    }

    fn validate(&self, state: &WizardState) -> Vec<ValidationError> {
        let Some(outcome) = state.validation() else {
            return missing(self.kind());
        };
        match report(state) {
            Some(report) if report.messages() == outcome.violations => Vec::new(),
            _ => vec![ValidationError::new(
                self.kind(),
                "Tier criteria changed since they were last checked",
            )],
        }
    }
}
