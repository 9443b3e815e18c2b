//! Step flow planning.
//!
//! The plan is a pure function of the habit kind and, once answered, the field
//! kind and scoring mode. The session re-plans after every completed step so
//! navigation always works against the current shape of the flow.

use super::state::{StepKind, WizardState};
use super::tiers::Tier;
use crate::habit::{FieldKind, HabitKind, ScoringMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowPlan {
    habit_kind: HabitKind,
    steps: Vec<StepKind>,
}

/// Plans the step sequence. Unknown answers are planned conservatively: no
/// scoring answer means manual, so the criteria block appears only once
/// automatic scoring has been chosen.
pub fn plan_flow(
    habit_kind: HabitKind,
    field_kind: Option<FieldKind>,
    scoring: Option<ScoringMode>,
) -> FlowPlan {
    let automatic = scoring == Some(ScoringMode::Automatic);
    let mut steps = vec![StepKind::BasicInfo];

    match habit_kind {
        HabitKind::Simple => {
            steps.push(StepKind::ScoringMode);
            if automatic {
                steps.push(StepKind::Criteria);
            }
        }
        HabitKind::Checklist => {
            steps.extend([StepKind::FieldConfig, StepKind::ScoringMode]);
            if automatic {
                steps.push(StepKind::Criteria);
            }
        }
        HabitKind::Elastic => {
            steps.extend([StepKind::FieldConfig, StepKind::ScoringMode]);
            // Text fields have nothing to compare against.
            if automatic && field_kind != Some(FieldKind::Text) {
                steps.extend(Tier::ALL.map(StepKind::TierCriteria));
                steps.push(StepKind::TierValidation);
            }
        }
        HabitKind::Informational => steps.push(StepKind::FieldConfig),
    }

    steps.push(StepKind::Confirmation);
    FlowPlan { habit_kind, steps }
}

impl FlowPlan {
    /// Plans from whatever the state has recorded so far.
    pub fn for_state(state: &WizardState) -> Self {
        plan_flow(
            state.habit_kind(),
            state.field_type().map(|field| field.kind()),
            state.scoring().map(|choice| choice.mode),
        )
    }

    pub fn habit_kind(&self) -> HabitKind {
        self.habit_kind
    }

    /// Every planned step, ending with the confirmation screen.
    pub fn steps(&self) -> &[StepKind] {
        &self.steps
    }

    /// Number of data-entry steps, i.e. the `N` in "Step i of N". The
    /// confirmation screen is not counted.
    pub fn step_count(&self) -> usize {
        self.steps.iter().filter(|step| step.requires_data()).count()
    }

    pub fn contains(&self, kind: StepKind) -> bool {
        self.steps.contains(&kind)
    }

    pub fn position(&self, kind: StepKind) -> Option<usize> {
        self.steps.iter().position(|step| *step == kind)
    }

    pub fn first(&self) -> StepKind {
        self.steps[0]
    }

    pub fn terminal(&self) -> StepKind {
        self.steps[self.steps.len() - 1]
    }

    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.steps.len() - 1)
    }

    pub fn step_at(&self, index: usize) -> StepKind {
        self.steps[self.clamp_index(index)]
    }

    /// Index of `kind`, or of the last planned step that precedes it in flow
    /// order when `kind` is not part of this plan.
    pub fn nearest_index(&self, kind: StepKind) -> usize {
        self.position(kind).unwrap_or_else(|| {
            self.steps
                .iter()
                .rposition(|step| *step < kind)
                .unwrap_or(0)
        })
    }

    pub fn successor(&self, kind: StepKind) -> Option<StepKind> {
        let index = self.position(kind)?;
        self.steps.get(index + 1).copied()
    }

    pub fn predecessor(&self, kind: StepKind) -> Option<StepKind> {
        let index = self.position(kind)?;
        index.checked_sub(1).map(|previous| self.steps[previous])
    }

    /// Steps that must carry data before the habit can be materialized.
    pub fn required_steps(&self) -> impl Iterator<Item = StepKind> + '_ {
        self.steps.iter().copied().filter(|step| step.requires_data())
    }
}
