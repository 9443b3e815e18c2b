//! Step-by-step habit authoring.
//!
//! A [`WizardSession`] walks a [`FlowPlan`] whose shape depends on the
//! answers given so far, keeps every answer in a [`WizardState`] keyed by
//! [`StepKind`], and finally materializes a [`Habit`]. Terminal I/O stays
//! behind the [`Prompter`] trait so the whole flow can be driven from tests.

pub mod criteria;
pub mod flow;
pub mod form;
pub mod materialize;
pub mod navigation;
pub mod session;
pub mod state;
pub mod steps;

use crate::habit::Habit;

pub use crate::habit::tiers;

pub use criteria::{build_criteria, Comparison, CriteriaError, CriteriaInput};
pub use flow::{plan_flow, FlowPlan};
pub use form::{Choice, InputKind, Question, ValidationError};
pub use materialize::{materialize, seed_from_habit, summary};
pub use navigation::Navigator;
pub use session::{Prompter, SessionEffect, StepView, WizardSession};
pub use state::{StepData, StepKind, WizardMode, WizardState};
pub use steps::{handler_for, StepEvent, StepHandler, Transition};
pub use tiers::{check_tiers, Tier, TierReport};

/// How a wizard run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    Completed(Habit),
    Cancelled,
}
