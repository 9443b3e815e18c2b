use std::result::Result as StdResult;

use thiserror::Error;

use crate::wizard::StepKind;

/// Failures of the habit store and schema layer.
#[derive(Debug, Error)]
pub enum HabitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid schema: {}", .0.join("; "))]
    InvalidSchema(Vec<String>),
    #[error("Habit not found: {0}")]
    HabitNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, HabitError>;

/// Failures that end a wizard run without producing a habit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("{0} has no data; the wizard cannot build the habit")]
    MissingStepData(StepKind),
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl From<std::io::Error> for WizardError {
    fn from(err: std::io::Error) -> Self {
        WizardError::Prompt(err.to_string())
    }
}

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Habit(#[from] HabitError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Usage(String),
}
