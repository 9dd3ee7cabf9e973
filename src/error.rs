//! Errors for invalid forecast requests
//!
//! Sparse or irregular data is never an error; it degrades confidence and is
//! reported through `InputWarning`. These variants cover call patterns the
//! engine cannot interpret at all.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("No scenarios supplied")]
    NoScenarios,

    #[error("Scenario '{scenario}' has invalid horizon {horizon} (must be 1-{max} months)")]
    InvalidHorizon {
        scenario: String,
        horizon: u32,
        max: u32,
    },

    #[error("Scenario id '{0}' is defined more than once")]
    DuplicateScenario(String),

    #[error("Scenario '{scenario}' is invalid: {reason}")]
    InvalidScenario { scenario: String, reason: String },

    #[error("Base scenario '{0}' is not among the supplied scenarios")]
    UnknownBaseScenario(String),

    #[error("Invalid core fleet baseline: {0}")]
    InvalidBaseline(String),

    #[error("Input too large: {requested} {unit} exceeds budget of {limit}")]
    InputTooLarge {
        requested: usize,
        limit: usize,
        unit: &'static str,
    },

    #[error("No start month given and no history to infer one from")]
    MissingStartMonth,
}
