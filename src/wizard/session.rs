//! The wizard orchestrator: owns the state for one run and feeds input events
//! to whichever step handler is active.

use tracing::debug;

use super::flow::FlowPlan;
use super::form::{Draft, Question};
use super::materialize::{materialize, seed_from_habit};
use super::navigation::Navigator;
use super::state::{StepData, StepKind, WizardState};
use super::steps::{handler_for, StepEvent, Transition};
use super::WizardOutcome;
use crate::errors::WizardError;
use crate::habit::{Habit, HabitKind};

/// Everything a terminal needs to show the current question.
#[derive(Debug, Clone)]
pub struct StepView {
    pub step: StepKind,
    /// 1-based position among data-entry steps; `None` on the review screen.
    pub position: Option<usize>,
    pub total: usize,
    pub context: Vec<String>,
    pub question: Question,
    pub current: Option<String>,
    pub question_index: usize,
    pub question_count: usize,
    pub feedback: Vec<String>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

impl StepView {
    pub fn heading(&self) -> String {
        match self.position {
            Some(position) => format!("Step {position} of {}: {}", self.total, self.step.label()),
            None => self.step.label().to_string(),
        }
    }
}

/// Request/response boundary to whatever collects answers.
pub trait Prompter {
    fn prompt(&mut self, view: &StepView) -> Result<StepEvent, WizardError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    Continue,
    Finished(Habit),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct WizardSession {
    state: WizardState,
    plan: FlowPlan,
    draft: Draft,
    feedback: Vec<String>,
}

impl WizardSession {
    pub fn new(kind: HabitKind) -> Self {
        Self::from_state(WizardState::new(kind))
    }

    /// Starts an edit of `habit` with every answer pre-filled.
    pub fn edit(habit: &Habit) -> Self {
        Self::from_state(seed_from_habit(habit))
    }

    pub fn from_state(state: WizardState) -> Self {
        let plan = FlowPlan::for_state(&state);
        let start = state.current_step(&plan);
        let mut session = Self {
            state,
            plan,
            draft: Draft::new(),
            feedback: Vec::new(),
        };
        session.enter(start);
        session
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn plan(&self) -> &FlowPlan {
        &self.plan
    }

    pub fn current_step(&self) -> StepKind {
        self.state.current_step(&self.plan)
    }

    pub fn feedback(&self) -> &[String] {
        &self.feedback
    }

    pub fn view(&self) -> Option<StepView> {
        let step = self.current_step();
        let prompt = handler_for(step).render(&self.state, &self.draft)?;
        let navigator = Navigator::new(&self.plan, &self.state);
        let position = if step.requires_data() {
            self.plan.position(step).map(|index| index + 1)
        } else {
            None
        };
        Some(StepView {
            step,
            position,
            total: self.plan.step_count(),
            context: prompt.context,
            question: prompt.question,
            current: prompt.current,
            question_index: prompt.index,
            question_count: prompt.count,
            feedback: self.feedback.clone(),
            can_go_back: prompt.index > 0 || navigator.can_go_back(),
            can_go_forward: navigator.can_go_forward(),
        })
    }

    /// Feeds one event to the active step.
    pub fn apply(&mut self, event: StepEvent) -> Result<SessionEffect, WizardError> {
        let current = self.current_step();
        let handler = handler_for(current);
        self.feedback.clear();

        match handler.ingest(event, &self.state, self.draft.clone()) {
            Transition::Active { draft, feedback } => {
                self.draft = draft;
                self.feedback = feedback;
            }
            Transition::Cancelled => {
                debug!(step = ?current, "wizard cancelled");
                return Ok(SessionEffect::Cancelled);
            }
            Transition::Back => {
                let navigator = Navigator::new(&self.plan, &self.state);
                match navigator.previous().filter(|_| navigator.can_go_back()) {
                    Some(previous) => self.enter(previous),
                    None => self.feedback.push("Already at the first step.".into()),
                }
            }
            Transition::Forward => {
                let navigator = Navigator::new(&self.plan, &self.state);
                match navigator.next().filter(|_| navigator.can_go_forward()) {
                    Some(next) => self.enter(next),
                    None => self
                        .feedback
                        .push("Finish this step before moving on.".into()),
                }
            }
            Transition::Revisit(target) => {
                if Navigator::new(&self.plan, &self.state).can_jump_to(target) {
                    self.enter(target);
                } else {
                    self.feedback
                        .push(format!("{} cannot be opened yet.", target.label()));
                }
            }
            Transition::Completed(data) => return self.complete(current, data),
        }
        Ok(SessionEffect::Continue)
    }

    /// Drives the session to its end through `prompter`.
    pub fn run<P: Prompter + ?Sized>(
        mut self,
        prompter: &mut P,
    ) -> Result<WizardOutcome, WizardError> {
        loop {
            let event = match self.view() {
                Some(view) => prompter.prompt(&view)?,
                None => StepEvent::Keep,
            };
            match self.apply(event)? {
                SessionEffect::Continue => {}
                SessionEffect::Finished(habit) => return Ok(WizardOutcome::Completed(habit)),
                SessionEffect::Cancelled => return Ok(WizardOutcome::Cancelled),
            }
        }
    }

    fn complete(
        &mut self,
        step: StepKind,
        data: Option<StepData>,
    ) -> Result<SessionEffect, WizardError> {
        if step == StepKind::Confirmation {
            let habit = materialize(&self.state, &self.plan)?;
            debug!(title = %habit.title, "wizard finished");
            return Ok(SessionEffect::Finished(habit));
        }

        if let Some(data) = data {
            let was_completed = self.state.is_completed(step);
            let previous = self.state.set_step(step, data);
            let errors = handler_for(step).validate(&self.state);
            if !errors.is_empty() {
                // A rejected answer never replaces the last accepted one.
                match previous {
                    Some(previous) => {
                        self.state.set_step(step, previous);
                    }
                    None => {
                        self.state.clear_step(step);
                    }
                }
                if was_completed {
                    self.state.mark_completed(step);
                }
                debug!(?step, "answer rejected; previous answer kept");
                self.feedback = errors.into_iter().map(|error| error.message).collect();
                return Ok(SessionEffect::Continue);
            }
            self.state.mark_completed(step);
            if let Some(previous) = previous {
                if self.state.get_step(step) != Some(&previous) {
                    self.invalidate_after(step, &previous);
                }
            }
        } else {
            self.state.mark_completed(step);
        }

        self.replan();
        match self.plan.successor(step) {
            Some(next) => self.enter(next),
            None => {
                let fallback = Navigator::new(&self.plan, &self.state).first_unsettled();
                self.enter(fallback);
            }
        }
        Ok(SessionEffect::Continue)
    }

    /// A changed answer makes later answers suspect: they stay as pre-fill
    /// but must be confirmed again. Criteria built for another field kind
    /// cannot be reused at all.
    fn invalidate_after(&mut self, step: StepKind, previous: &StepData) {
        let downstream: Vec<StepKind> = match step {
            StepKind::FieldConfig | StepKind::ScoringMode => self
                .state
                .completed_steps()
                .filter(|completed| *completed > step)
                .collect(),
            StepKind::TierCriteria(_) => vec![StepKind::TierValidation],
            _ => Vec::new(),
        };
        for later in downstream {
            self.state.unmark_completed(later);
        }

        if let StepData::FieldConfig(old) = previous {
            let new_kind = self.state.field_type().map(|field| field.kind());
            if new_kind != Some(old.field_type.kind()) {
                debug!(?new_kind, "field kind changed; dropping criteria");
                for stale in [
                    StepKind::Criteria,
                    StepKind::TierCriteria(super::Tier::Mini),
                    StepKind::TierCriteria(super::Tier::Midi),
                    StepKind::TierCriteria(super::Tier::Maxi),
                    StepKind::TierValidation,
                ] {
                    self.state.clear_step(stale);
                }
            }
        }
    }

    fn replan(&mut self) {
        let plan = FlowPlan::for_state(&self.state);
        if plan != self.plan {
            debug!(steps = ?plan.steps(), "flow re-planned");
            self.plan = plan;
            self.state.clamp_to(&self.plan);
        }
    }

    fn enter(&mut self, step: StepKind) {
        let target = if handler_for(step).can_enter(&self.state) {
            step
        } else {
            let fallback = Navigator::new(&self.plan, &self.state).first_unsettled();
            debug!(requested = ?step, ?fallback, "step not enterable yet");
            fallback
        };
        self.state.set_current_step(target, &self.plan);
        self.draft = handler_for(target).seed(&self.state);
        debug!(step = ?target, "entered step");
    }
}
