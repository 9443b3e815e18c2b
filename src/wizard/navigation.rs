use super::flow::FlowPlan;
use super::state::{StepKind, WizardState};
use super::steps::handler_for;

/// Read-only view answering which moves are legal from the current step.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    plan: &'a FlowPlan,
    state: &'a WizardState,
}

impl<'a> Navigator<'a> {
    pub fn new(plan: &'a FlowPlan, state: &'a WizardState) -> Self {
        Self { plan, state }
    }

    pub fn current(&self) -> StepKind {
        self.state.current_step(self.plan)
    }

    pub fn can_go_back(&self) -> bool {
        self.plan
            .position(self.current())
            .map(|index| index > 0)
            .unwrap_or(false)
    }

    /// Forward means skipping over a step that is already settled.
    pub fn can_go_forward(&self) -> bool {
        let current = self.current();
        current != self.plan.terminal() && self.is_settled(current)
    }

    pub fn can_jump_to(&self, target: StepKind) -> bool {
        let Some(target_index) = self.plan.position(target) else {
            return false;
        };
        if self.state.is_completed(target) {
            return true;
        }
        self.plan.successor(self.current()) == Some(target)
            && self.plan.steps()[..target_index]
                .iter()
                .all(|step| self.is_settled(*step))
    }

    pub fn previous(&self) -> Option<StepKind> {
        self.plan.predecessor(self.current())
    }

    pub fn next(&self) -> Option<StepKind> {
        self.plan.successor(self.current())
    }

    /// First planned step still missing valid data; the confirmation step
    /// once everything is in place.
    pub fn first_unsettled(&self) -> StepKind {
        self.plan
            .steps()
            .iter()
            .copied()
            .find(|step| step.requires_data() && !self.is_settled(*step))
            .unwrap_or_else(|| self.plan.terminal())
    }

    fn is_settled(&self, step: StepKind) -> bool {
        self.state.is_completed(step) && handler_for(step).validate(self.state).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{HabitKind, ScoringMode};
    use crate::wizard::state::{BasicInfo, ScoringChoice, StepData};

    fn basic(kind: HabitKind) -> StepData {
        StepData::BasicInfo(BasicInfo {
            title: "Stretch".into(),
            description: String::new(),
            prompt: String::new(),
            habit_kind: kind,
        })
    }

    #[test]
    fn first_step_cannot_go_back() {
        let state = WizardState::new(HabitKind::Simple);
        let plan = FlowPlan::for_state(&state);
        let nav = Navigator::new(&plan, &state);
        assert!(!nav.can_go_back());
        assert!(!nav.can_go_forward());
        assert_eq!(nav.first_unsettled(), StepKind::BasicInfo);
    }

    #[test]
    fn forward_requires_completed_step() {
        let mut state = WizardState::new(HabitKind::Simple);
        state.set_step(StepKind::BasicInfo, basic(HabitKind::Simple));
        let plan = FlowPlan::for_state(&state);
        assert!(!Navigator::new(&plan, &state).can_go_forward());

        state.mark_completed(StepKind::BasicInfo);
        let nav = Navigator::new(&plan, &state);
        assert!(nav.can_go_forward());
        assert!(nav.can_jump_to(StepKind::ScoringMode));
        assert!(!nav.can_jump_to(StepKind::Confirmation));
    }

    #[test]
    fn completed_steps_are_always_reachable() {
        let mut state = WizardState::new(HabitKind::Simple);
        state.set_step(StepKind::BasicInfo, basic(HabitKind::Simple));
        state.mark_completed(StepKind::BasicInfo);
        state.set_step(
            StepKind::ScoringMode,
            StepData::ScoringMode(ScoringChoice {
                mode: ScoringMode::Manual,
                direction: None,
            }),
        );
        state.mark_completed(StepKind::ScoringMode);
        let plan = FlowPlan::for_state(&state);
        state.set_current_step(StepKind::Confirmation, &plan);

        let nav = Navigator::new(&plan, &state);
        assert!(nav.can_go_back());
        assert!(!nav.can_go_forward());
        assert!(nav.can_jump_to(StepKind::BasicInfo));
        assert!(!nav.can_jump_to(StepKind::Criteria));
        assert_eq!(nav.previous(), Some(StepKind::ScoringMode));
        assert_eq!(nav.first_unsettled(), StepKind::Confirmation);
    }

    #[test]
    fn invalid_stored_data_blocks_forward() {
        let mut state = WizardState::new(HabitKind::Simple);
        state.set_step(
            StepKind::BasicInfo,
            StepData::BasicInfo(BasicInfo {
                title: "   ".into(),
                description: String::new(),
                prompt: String::new(),
                habit_kind: HabitKind::Simple,
            }),
        );
        state.mark_completed(StepKind::BasicInfo);
        let plan = FlowPlan::for_state(&state);
        assert!(!Navigator::new(&plan, &state).can_go_forward());
    }
}
