use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::criteria::Comparison;
use super::flow::FlowPlan;
use super::tiers::Tier;
use crate::habit::{Criteria, Direction, FieldType, HabitKind, ScoringMode};

static BOOLEAN_FIELD: FieldType = FieldType::Boolean;

/// Stable identifier of a wizard step. Stored answers are keyed by this, never
/// by position, so the flow can grow and shrink underneath them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
    BasicInfo,
    FieldConfig,
    ScoringMode,
    Criteria,
    TierCriteria(Tier),
    TierValidation,
    Confirmation,
}

impl StepKind {
    pub fn label(self) -> &'static str {
        match self {
            StepKind::BasicInfo => "Basic information",
            StepKind::FieldConfig => "Field type",
            StepKind::ScoringMode => "Scoring",
            StepKind::Criteria => "Criteria",
            StepKind::TierCriteria(Tier::Mini) => "Mini criteria",
            StepKind::TierCriteria(Tier::Midi) => "Midi criteria",
            StepKind::TierCriteria(Tier::Maxi) => "Maxi criteria",
            StepKind::TierValidation => "Tier check",
            StepKind::Confirmation => "Review",
        }
    }

    /// Every step except the final review must leave data behind.
    pub fn requires_data(self) -> bool {
        !matches!(self, StepKind::Confirmation)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicInfo {
    pub title: String,
    pub description: String,
    pub prompt: String,
    pub habit_kind: HabitKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub field_type: FieldType,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringChoice {
    pub mode: ScoringMode,
    pub direction: Option<Direction>,
}

/// Answers for one criteria slot plus the criteria built from them. The raw
/// values are kept so revisiting the step pre-fills what was typed.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaAnswer {
    pub tier: Option<Tier>,
    pub comparison: Option<Comparison>,
    pub value: String,
    pub upper: Option<String>,
    pub criteria: Criteria,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub violations: Vec<String>,
    /// Set when the person chose to continue despite violations.
    pub overridden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepData {
    BasicInfo(BasicInfo),
    FieldConfig(FieldConfig),
    ScoringMode(ScoringChoice),
    Criteria(CriteriaAnswer),
    Validation(ValidationOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit { id: String },
}

/// Everything collected during one wizard run. Holds no business rules.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    habit_kind: HabitKind,
    mode: WizardMode,
    current_index: usize,
    step_data: BTreeMap<StepKind, StepData>,
    completed: BTreeSet<StepKind>,
}

impl WizardState {
    pub fn new(habit_kind: HabitKind) -> Self {
        Self {
            habit_kind,
            mode: WizardMode::Create,
            current_index: 0,
            step_data: BTreeMap::new(),
            completed: BTreeSet::new(),
        }
    }

    pub fn for_edit(habit_kind: HabitKind, id: impl Into<String>) -> Self {
        Self {
            mode: WizardMode::Edit { id: id.into() },
            ..Self::new(habit_kind)
        }
    }

    pub fn habit_kind(&self) -> HabitKind {
        self.habit_kind
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn get_step(&self, kind: StepKind) -> Option<&StepData> {
        self.step_data.get(&kind)
    }

    /// Stores `data` for `kind`, returning what was there before.
    pub fn set_step(&mut self, kind: StepKind, data: StepData) -> Option<StepData> {
        self.step_data.insert(kind, data)
    }

    pub fn clear_step(&mut self, kind: StepKind) -> Option<StepData> {
        self.completed.remove(&kind);
        self.step_data.remove(&kind)
    }

    pub fn mark_completed(&mut self, kind: StepKind) {
        self.completed.insert(kind);
    }

    pub fn unmark_completed(&mut self, kind: StepKind) {
        self.completed.remove(&kind);
    }

    pub fn is_completed(&self, kind: StepKind) -> bool {
        self.completed.contains(&kind)
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = StepKind> + '_ {
        self.completed.iter().copied()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_step(&self, plan: &FlowPlan) -> StepKind {
        plan.step_at(self.current_index)
    }

    pub fn set_current_step(&mut self, kind: StepKind, plan: &FlowPlan) {
        self.current_index = plan.nearest_index(kind);
    }

    /// Pulls the cursor back inside `plan` after the plan shrank.
    pub fn clamp_to(&mut self, plan: &FlowPlan) {
        self.current_index = plan.clamp_index(self.current_index);
    }

    pub fn basic_info(&self) -> Option<&BasicInfo> {
        match self.get_step(StepKind::BasicInfo) {
            Some(StepData::BasicInfo(info)) => Some(info),
            _ => None,
        }
    }

    pub fn field_config(&self) -> Option<&FieldConfig> {
        match self.get_step(StepKind::FieldConfig) {
            Some(StepData::FieldConfig(config)) => Some(config),
            _ => None,
        }
    }

    pub fn scoring(&self) -> Option<&ScoringChoice> {
        match self.get_step(StepKind::ScoringMode) {
            Some(StepData::ScoringMode(choice)) => Some(choice),
            _ => None,
        }
    }

    pub fn criteria(&self, kind: StepKind) -> Option<&CriteriaAnswer> {
        match self.get_step(kind) {
            Some(StepData::Criteria(answer)) => Some(answer),
            _ => None,
        }
    }

    pub fn validation(&self) -> Option<&ValidationOutcome> {
        match self.get_step(StepKind::TierValidation) {
            Some(StepData::Validation(outcome)) => Some(outcome),
            _ => None,
        }
    }

    /// The field values will be recorded in: always boolean for simple
    /// habits, otherwise whatever the field step chose.
    pub fn field_type(&self) -> Option<&FieldType> {
        match self.habit_kind {
            HabitKind::Simple => Some(&BOOLEAN_FIELD),
            _ => self.field_config().map(|config| &config.field_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{FieldKind, ScoringMode};
    use crate::wizard::flow::plan_flow;

    #[test]
    fn store_keys_by_step_kind() {
        let mut state = WizardState::new(HabitKind::Elastic);
        assert!(state.get_step(StepKind::ScoringMode).is_none());
        let choice = StepData::ScoringMode(ScoringChoice {
            mode: ScoringMode::Manual,
            direction: None,
        });
        assert!(state.set_step(StepKind::ScoringMode, choice.clone()).is_none());
        assert_eq!(state.get_step(StepKind::ScoringMode), Some(&choice));
        assert!(!state.is_completed(StepKind::ScoringMode));
        state.mark_completed(StepKind::ScoringMode);
        assert!(state.is_completed(StepKind::ScoringMode));
        state.clear_step(StepKind::ScoringMode);
        assert!(!state.is_completed(StepKind::ScoringMode));
        assert!(state.scoring().is_none());
    }

    #[test]
    fn simple_habits_always_record_booleans() {
        let state = WizardState::new(HabitKind::Simple);
        assert_eq!(state.field_type(), Some(&FieldType::Boolean));
        let elastic = WizardState::new(HabitKind::Elastic);
        assert_eq!(elastic.field_type(), None);
    }

    #[test]
    fn cursor_clamps_when_plan_shrinks() {
        let long = plan_flow(
            HabitKind::Elastic,
            Some(FieldKind::Numeric),
            Some(ScoringMode::Automatic),
        );
        let short = plan_flow(
            HabitKind::Elastic,
            Some(FieldKind::Numeric),
            Some(ScoringMode::Manual),
        );
        let mut state = WizardState::new(HabitKind::Elastic);
        state.set_current_step(StepKind::TierCriteria(Tier::Maxi), &long);
        assert_eq!(state.current_step(&long), StepKind::TierCriteria(Tier::Maxi));

        state.clamp_to(&short);
        assert_eq!(state.current_step(&short), StepKind::Confirmation);

        state.set_current_step(StepKind::TierCriteria(Tier::Midi), &short);
        assert_eq!(state.current_step(&short), StepKind::ScoringMode);
    }
}
