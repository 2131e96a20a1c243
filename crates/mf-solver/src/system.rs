//! The nonlinear system seen by the Newton solver.

use mf_core::Outcome;
use nalgebra::DVector;

use crate::error::{SolverError, SolverResult};

/// A square system `F(y) = 0` whose evaluation may fail softly or fatally.
pub trait NonlinearSystem {
    fn dim(&self) -> usize;

    /// Evaluate `F(y)` into `f`.
    ///
    /// A non-success outcome stops the solve; `f` is then unspecified.
    fn residual(&mut self, y: &DVector<f64>, f: &mut DVector<f64>) -> Outcome;
}

/// Closure-backed system, mostly for tests and small problems.
pub struct FnSystem<F> {
    dim: usize,
    f: F,
}

impl<F> FnSystem<F>
where
    F: FnMut(&DVector<f64>, &mut DVector<f64>) -> Outcome,
{
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<F> NonlinearSystem for FnSystem<F>
where
    F: FnMut(&DVector<f64>, &mut DVector<f64>) -> Outcome,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn residual(&mut self, y: &DVector<f64>, f: &mut DVector<f64>) -> Outcome {
        (self.f)(y, f)
    }
}

/// Evaluate and turn a non-success outcome into an error.
pub(crate) fn evaluate<S: NonlinearSystem + ?Sized>(
    system: &mut S,
    y: &DVector<f64>,
    f: &mut DVector<f64>,
) -> SolverResult<()> {
    let outcome = system.residual(y, f);
    if outcome.is_abort() {
        Err(SolverError::Aborted {
            what: "residual evaluation".to_string(),
        })
    } else if outcome.is_recoverable() {
        Err(SolverError::Recoverable {
            what: "residual evaluation".to_string(),
        })
    } else if f.iter().any(|v| !v.is_finite()) {
        Err(SolverError::Numeric {
            what: "non-finite residual".to_string(),
        })
    } else {
        Ok(())
    }
}
