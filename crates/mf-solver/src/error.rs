//! Error types for nonlinear solving.

use mf_core::Outcome;
use thiserror::Error;

/// Errors that can occur during a Newton solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    /// A residual evaluation asked for a smaller outer step.
    #[error("Evaluation requested a smaller step: {what}")]
    Recoverable { what: String },

    /// A residual evaluation reported a fatal model error.
    #[error("Evaluation aborted: {what}")]
    Aborted { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// Failures a smaller outer step may cure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SolverError::ConvergenceFailed { .. }
                | SolverError::Recoverable { .. }
                | SolverError::Numeric { .. }
        )
    }

    /// Map onto the tri-state model outcome.
    pub fn outcome(&self) -> Outcome {
        if self.is_recoverable() {
            Outcome::RECOVERABLE
        } else {
            Outcome::ABORT
        }
    }

    /// Failures that another attempt from the last iterate may fix.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            SolverError::ConvergenceFailed { .. } | SolverError::Numeric { .. }
        )
    }
}
