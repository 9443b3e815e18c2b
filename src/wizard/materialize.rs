//! Conversion between a finished [`WizardState`] and a [`Habit`].

use super::criteria::{raw_values, Comparison};
use super::flow::FlowPlan;
use super::state::{
    BasicInfo, CriteriaAnswer, FieldConfig, ScoringChoice, StepData, StepKind,
    ValidationOutcome, WizardMode, WizardState,
};
use super::tiers::{check_tiers, Tier};
use crate::errors::WizardError;
use crate::habit::{default_prompt, Criteria, Direction, Habit, HabitKind, ScoringMode};

/// Assembles the habit described by `state`. Every step `plan` requires must
/// carry data; a gap means the flow was navigated incorrectly.
pub fn materialize(state: &WizardState, plan: &FlowPlan) -> Result<Habit, WizardError> {
    if let Some(step) = plan
        .required_steps()
        .find(|step| state.get_step(*step).is_none())
    {
        return Err(WizardError::MissingStepData(step));
    }

    let kind = state.habit_kind();
    let basic = state
        .basic_info()
        .ok_or(WizardError::MissingStepData(StepKind::BasicInfo))?;
    let field_type = state
        .field_type()
        .cloned()
        .ok_or(WizardError::MissingStepData(StepKind::FieldConfig))?;

    let scoring_type = match kind {
        HabitKind::Informational => ScoringMode::Manual,
        _ => {
            state
                .scoring()
                .ok_or(WizardError::MissingStepData(StepKind::ScoringMode))?
                .mode
        }
    };
    let direction = state
        .field_config()
        .and_then(|config| config.direction)
        .or_else(|| state.scoring().and_then(|choice| choice.direction))
        .unwrap_or_default();

    let criteria_at = |step: StepKind| -> Result<Criteria, WizardError> {
        state
            .criteria(step)
            .map(|answer| answer.criteria.clone())
            .ok_or(WizardError::MissingStepData(step))
    };

    let mut habit = Habit {
        id: match state.mode() {
            WizardMode::Edit { id } => id.clone(),
            WizardMode::Create => String::new(),
        },
        title: basic.title.trim().to_string(),
        description: basic.description.clone(),
        habit_type: kind,
        field_type,
        scoring_type,
        direction,
        prompt: if basic.prompt.trim().is_empty() {
            default_prompt(kind, basic.title.trim())
        } else {
            basic.prompt.clone()
        },
        criteria: None,
        mini_criteria: None,
        midi_criteria: None,
        maxi_criteria: None,
    };

    if scoring_type == ScoringMode::Automatic {
        match kind {
            HabitKind::Elastic => {
                habit.mini_criteria = Some(criteria_at(StepKind::TierCriteria(Tier::Mini))?);
                habit.midi_criteria = Some(criteria_at(StepKind::TierCriteria(Tier::Midi))?);
                habit.maxi_criteria = Some(criteria_at(StepKind::TierCriteria(Tier::Maxi))?);
            }
            HabitKind::Simple | HabitKind::Checklist => {
                habit.criteria = Some(criteria_at(StepKind::Criteria)?);
            }
            HabitKind::Informational => {}
        }
    }

    Ok(habit)
}

fn answer_for(tier: Option<Tier>, criteria: &Criteria) -> CriteriaAnswer {
    let (value, upper) = raw_values(&criteria.condition);
    CriteriaAnswer {
        tier,
        comparison: Comparison::of(&criteria.condition),
        value,
        upper,
        criteria: criteria.clone(),
    }
}

/// Reverse mapping used by edit mode: every field of `habit` lands in the
/// step that would have produced it, and those steps start out completed.
pub fn seed_from_habit(habit: &Habit) -> WizardState {
    let kind = habit.habit_type;
    let mut state = WizardState::for_edit(kind, habit.id.clone());
    let mut record = |step: StepKind, data: StepData| {
        state.set_step(step, data);
        state.mark_completed(step);
    };

    record(
        StepKind::BasicInfo,
        StepData::BasicInfo(BasicInfo {
            title: habit.title.clone(),
            description: habit.description.clone(),
            prompt: habit.prompt.clone(),
            habit_kind: kind,
        }),
    );

    if kind != HabitKind::Simple {
        record(
            StepKind::FieldConfig,
            StepData::FieldConfig(FieldConfig {
                field_type: habit.field_type.clone(),
                direction: (kind == HabitKind::Informational).then_some(habit.direction),
            }),
        );
    }

    if kind != HabitKind::Informational {
        let direction = (kind == HabitKind::Elastic && habit.direction != Direction::Neutral)
            .then_some(habit.direction);
        record(
            StepKind::ScoringMode,
            StepData::ScoringMode(ScoringChoice {
                mode: habit.scoring_type,
                direction,
            }),
        );
    }

    if habit.scoring_type == ScoringMode::Automatic {
        if let Some(criteria) = &habit.criteria {
            record(
                StepKind::Criteria,
                StepData::Criteria(answer_for(None, criteria)),
            );
        }
        if let Some(tiers) = habit.tiers() {
            for (tier, criteria) in Tier::ALL.into_iter().zip(tiers) {
                record(
                    StepKind::TierCriteria(tier),
                    StepData::Criteria(answer_for(Some(tier), criteria)),
                );
            }
            let report = check_tiers(
                tiers.map(|criteria| &criteria.condition),
                habit.field_type.kind(),
            );
            record(
                StepKind::TierValidation,
                StepData::Validation(ValidationOutcome {
                    ok: report.is_ok(),
                    violations: report.messages(),
                    overridden: !report.is_ok(),
                }),
            );
        }
    }

    state
}

/// Label/value pairs shown on the review screen.
pub fn summary(habit: &Habit) -> Vec<(&'static str, String)> {
    let mut entries = vec![
        ("Title", habit.title.clone()),
        ("Kind", habit.habit_type.label().to_string()),
        ("Field", habit.field_type.summary()),
        ("Scoring", habit.scoring_type.label().to_string()),
        ("Direction", habit.direction.label().to_string()),
        ("Prompt", habit.prompt.clone()),
    ];
    if !habit.description.is_empty() {
        entries.insert(1, ("Description", habit.description.clone()));
    }
    if let Some(criteria) = &habit.criteria {
        entries.push(("Criteria", criteria.description.clone()));
    }
    for (label, criteria) in [
        ("Mini", &habit.mini_criteria),
        ("Midi", &habit.midi_criteria),
        ("Maxi", &habit.maxi_criteria),
    ] {
        if let Some(criteria) = criteria {
            entries.push((label, criteria.description.clone()));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{Condition, FieldType};

    fn basic(kind: HabitKind, title: &str) -> StepData {
        StepData::BasicInfo(BasicInfo {
            title: title.into(),
            description: String::new(),
            prompt: String::new(),
            habit_kind: kind,
        })
    }

    #[test]
    fn missing_required_step_is_reported() {
        let mut state = WizardState::new(HabitKind::Simple);
        state.set_step(StepKind::BasicInfo, basic(HabitKind::Simple, "Floss"));
        let plan = FlowPlan::for_state(&state);
        assert_eq!(
            materialize(&state, &plan),
            Err(WizardError::MissingStepData(StepKind::ScoringMode))
        );
    }

    #[test]
    fn simple_manual_habit_gets_default_prompt() {
        let mut state = WizardState::new(HabitKind::Simple);
        state.set_step(StepKind::BasicInfo, basic(HabitKind::Simple, "Floss"));
        state.set_step(
            StepKind::ScoringMode,
            StepData::ScoringMode(ScoringChoice {
                mode: ScoringMode::Manual,
                direction: None,
            }),
        );
        let plan = FlowPlan::for_state(&state);
        let habit = materialize(&state, &plan).unwrap();
        assert_eq!(habit.field_type, FieldType::Boolean);
        assert_eq!(habit.prompt, "Did you complete Floss today?");
        assert_eq!(habit.direction, Direction::Neutral);
        assert!(habit.criteria.is_none());
        assert!(habit.id.is_empty());
    }

    #[test]
    fn seeding_and_materializing_reproduces_the_habit() {
        let habit = Habit {
            id: "floss".into(),
            title: "Floss".into(),
            description: "Every evening".into(),
            habit_type: HabitKind::Simple,
            field_type: FieldType::Boolean,
            scoring_type: ScoringMode::Automatic,
            direction: Direction::Neutral,
            prompt: "Flossed?".into(),
            criteria: Some(Criteria {
                description: "Completed".into(),
                condition: Condition::Equals(true),
            }),
            mini_criteria: None,
            midi_criteria: None,
            maxi_criteria: None,
        };
        let state = seed_from_habit(&habit);
        let plan = FlowPlan::for_state(&state);
        assert!(plan.required_steps().all(|step| state.is_completed(step)));
        assert_eq!(materialize(&state, &plan).unwrap(), habit);
    }

    #[test]
    fn summary_lists_tiers_in_order() {
        let tier = |value: f64| {
            Some(Criteria {
                description: format!("at least {value:.1}"),
                condition: Condition::GreaterThanOrEqual(value),
            })
        };
        let habit = Habit {
            id: String::new(),
            title: "Run".into(),
            description: String::new(),
            habit_type: HabitKind::Elastic,
            field_type: FieldType::Duration,
            scoring_type: ScoringMode::Automatic,
            direction: Direction::HigherBetter,
            prompt: "Record Run for today".into(),
            criteria: None,
            mini_criteria: tier(1.0),
            midi_criteria: tier(2.0),
            maxi_criteria: tier(3.0),
        };
        let labels: Vec<&str> = summary(&habit).into_iter().map(|(label, _)| label).collect();
        assert_eq!(
            labels,
            vec!["Title", "Kind", "Field", "Scoring", "Direction", "Prompt", "Mini", "Midi", "Maxi"]
        );
    }
}
