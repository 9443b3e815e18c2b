//! Step handlers: one concrete type per step kind.
//!
//! Handlers are stateless. Everything a step has typed so far lives in a
//! [`Draft`] owned by the session and threaded through [`StepHandler::ingest`],
//! which turns one input event into a [`Transition`].

mod basic_info;
mod confirmation;
mod criteria;
mod field_config;
mod scoring;
mod tier_check;

pub use basic_info::BasicInfoStep;
pub use confirmation::ConfirmationStep;
pub use criteria::CriteriaStep;
pub use field_config::FieldConfigStep;
pub use scoring::ScoringStep;
pub use tier_check::TierCheckStep;

use super::form::{Draft, Question, ValidationError};
use super::state::{StepData, StepKind, WizardState};

/// Input events produced by the terminal for the step on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    Answer(String),
    /// Accept the pre-filled answer.
    Keep,
    Back,
    /// Skip ahead over an already completed step.
    Forward,
    Cancel,
    /// Terminal size changed; re-render only.
    Resize,
    Help,
}

/// Result of feeding one event to a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Active {
        draft: Draft,
        feedback: Vec<String>,
    },
    /// All questions answered. `None` for steps that record nothing.
    Completed(Option<StepData>),
    Back,
    Forward,
    Revisit(StepKind),
    Cancelled,
}

impl Transition {
    fn active(draft: Draft) -> Self {
        Transition::Active {
            draft,
            feedback: Vec::new(),
        }
    }

    fn rejected(draft: Draft, message: impl Into<String>) -> Self {
        Transition::Active {
            draft,
            feedback: vec![message.into()],
        }
    }
}

/// What the terminal needs to render the current question of a step.
#[derive(Debug, Clone)]
pub struct StepPrompt {
    pub context: Vec<String>,
    pub question: Question,
    pub current: Option<String>,
    pub index: usize,
    pub count: usize,
}

pub trait StepHandler {
    fn kind(&self) -> StepKind;

    /// Whether the prerequisites of this step are satisfied.
    fn can_enter(&self, state: &WizardState) -> bool;

    /// Questions for the current draft. Earlier answers may add or remove
    /// later questions.
    fn questions(&self, state: &WizardState, draft: &Draft) -> Vec<Question>;

    /// Draft pre-filled from whatever the state already holds for this step.
    fn seed(&self, state: &WizardState) -> Draft;

    fn finish(
        &self,
        state: &WizardState,
        draft: &Draft,
    ) -> Result<Option<StepData>, Vec<ValidationError>>;

    /// Checks the data stored for this step. Empty means the step is settled.
    fn validate(&self, state: &WizardState) -> Vec<ValidationError>;

    fn context(&self, _state: &WizardState) -> Vec<String> {
        Vec::new()
    }

    /// Lets a handler turn a specific answer into navigation instead of data.
    fn intercept(&self, _key: &str, _value: &str, _state: &WizardState) -> Option<Transition> {
        None
    }

    fn render(&self, state: &WizardState, draft: &Draft) -> Option<StepPrompt> {
        let questions = self.questions(state, draft);
        let count = questions.len();
        let index = draft.cursor();
        let question = questions.into_iter().nth(index)?;
        let current = draft
            .get(question.key)
            .map(str::to_string)
            .or_else(|| question.default.clone());
        Some(StepPrompt {
            context: self.context(state),
            question,
            current,
            index,
            count,
        })
    }

    fn ingest(&self, event: StepEvent, state: &WizardState, mut draft: Draft) -> Transition {
        let questions = self.questions(state, &draft);
        let cursor = draft.cursor().min(questions.len());
        draft.set_cursor(cursor);
        let Some(question) = questions.get(cursor) else {
            // Every question is answered; only navigation is still meaningful.
            return match event {
                StepEvent::Cancel => Transition::Cancelled,
                StepEvent::Forward => Transition::Forward,
                StepEvent::Back if cursor == 0 => Transition::Back,
                StepEvent::Back => {
                    draft.set_cursor(cursor - 1);
                    Transition::active(draft)
                }
                _ => advance(self, state, draft),
            };
        };

        match event {
            StepEvent::Cancel => Transition::Cancelled,
            StepEvent::Forward => Transition::Forward,
            StepEvent::Resize => Transition::active(draft),
            StepEvent::Help => {
                let help = question.help.clone().unwrap_or_else(|| {
                    "No additional information available for this question.".into()
                });
                Transition::rejected(draft, help)
            }
            StepEvent::Back => {
                if cursor == 0 {
                    Transition::Back
                } else {
                    draft.set_cursor(cursor - 1);
                    Transition::active(draft)
                }
            }
            StepEvent::Keep => {
                let kept = draft
                    .get(question.key)
                    .map(str::to_string)
                    .or_else(|| question.default.clone());
                match kept {
                    Some(value) => record(self, question, &value, state, draft),
                    None if !question.required => record(self, question, "", state, draft),
                    None => Transition::rejected(draft, "This field is required."),
                }
            }
            StepEvent::Answer(raw) => record(self, question, &raw, state, draft),
        }
    }
}

fn record<H: StepHandler + ?Sized>(
    handler: &H,
    question: &Question,
    raw: &str,
    state: &WizardState,
    mut draft: Draft,
) -> Transition {
    let value = match question.accept(raw) {
        Ok(value) => value,
        Err(message) => return Transition::rejected(draft, message),
    };
    if let Some(transition) = handler.intercept(question.key, &value, state) {
        return transition;
    }
    draft.set(question.key, value);
    draft.set_cursor(draft.cursor() + 1);
    advance(handler, state, draft)
}

fn advance<H: StepHandler + ?Sized>(handler: &H, state: &WizardState, mut draft: Draft) -> Transition {
    let questions = handler.questions(state, &draft);
    if draft.cursor() < questions.len() {
        return Transition::active(draft);
    }

    match handler.finish(state, &draft) {
        Ok(data) => Transition::Completed(data),
        Err(errors) => {
            let cursor = errors
                .iter()
                .filter_map(|error| error.field)
                .find_map(|field| questions.iter().position(|question| question.key == field))
                .unwrap_or(0);
            draft.set_cursor(cursor);
            Transition::Active {
                draft,
                feedback: errors.into_iter().map(|error| error.message).collect(),
            }
        }
    }
}

pub(crate) fn missing(kind: StepKind) -> Vec<ValidationError> {
    vec![ValidationError::new(
        kind,
        format!("{} has not been answered yet", kind.label()),
    )]
}

pub fn handler_for(kind: StepKind) -> Box<dyn StepHandler> {
    match kind {
        StepKind::BasicInfo => Box::new(BasicInfoStep),
        StepKind::FieldConfig => Box::new(FieldConfigStep),
        StepKind::ScoringMode => Box::new(ScoringStep),
        StepKind::Criteria => Box::new(CriteriaStep::single()),
        StepKind::TierCriteria(tier) => Box::new(CriteriaStep::tier(tier)),
        StepKind::TierValidation => Box::new(TierCheckStep),
        StepKind::Confirmation => Box::new(ConfirmationStep),
    }
}
