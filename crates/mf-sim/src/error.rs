//! Error types for group evaluation and stepping.

use thiserror::Error;

/// Fatal errors of the evaluation engine.
///
/// A request for a smaller outer step is not an error; it is reported as
/// [`mf_core::Outcome::RECOVERABLE`].
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid solver parameters: {what}")]
    Parameters { what: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] mf_graph::GraphError),

    #[error("Model {model} aborted the evaluation")]
    ModelAborted { model: String },

    #[error("Step failed at t = {t} s: {what}")]
    StepFailed { t: f64, what: String },

    #[error("Component error: {0}")]
    Component(#[from] mf_components::ComponentError),

    #[error("Core error: {0}")]
    Core(#[from] mf_core::CoreError),

    #[error("Solver error: {0}")]
    Solver(#[from] mf_solver::SolverError),

    #[error("Parameter file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
