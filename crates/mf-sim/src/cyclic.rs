//! Fixed-point residual of a cyclic group.
//!
//! One evaluation:
//! 1. write `y + offset` into every unknown's slot
//! 2. update members in order, stopping at the first non-success
//! 3. `F_i = y_i + offset_i - value_i (+ penalty for a soft ceiling)`
//! 4. write `y + offset` back so the next evaluation starts from the candidate

use mf_components::ModelComponent;
use mf_core::numeric::safe_exp;
use mf_core::{Outcome, Real, SlotStore};
use mf_graph::Unknown;
use mf_solver::NonlinearSystem;
use nalgebra::DVector;

/// Smooth repulsion `alpha·exp(beta·(v - max)/|max|)` above a soft ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    pub alpha: Real,
    pub beta: Real,
}

impl Penalty {
    pub fn value(&self, v: Real, max: Real) -> Real {
        let reference = if max == 0.0 { 1.0 } else { max.abs() };
        self.alpha * safe_exp(self.beta * (v - max) / reference)
    }
}

pub(crate) struct CyclicResidual<'a> {
    pub models: &'a mut [Box<dyn ModelComponent>],
    pub slots: &'a mut SlotStore,
    pub unknowns: &'a [Unknown],
    pub penalty: Penalty,
    /// Member whose update stopped the last evaluation.
    pub failed: Option<usize>,
}

impl CyclicResidual<'_> {
    fn write_candidate(&mut self, y: &DVector<f64>) {
        for (u, &yi) in self.unknowns.iter().zip(y.iter()) {
            self.slots.set(u.slot, u.to_value(yi));
        }
    }
}

impl NonlinearSystem for CyclicResidual<'_> {
    fn dim(&self) -> usize {
        self.unknowns.len()
    }

    fn residual(&mut self, y: &DVector<f64>, f: &mut DVector<f64>) -> Outcome {
        self.write_candidate(y);

        for (k, model) in self.models.iter_mut().enumerate() {
            let outcome = model.update(self.slots);
            if !outcome.is_success() {
                self.failed = Some(k);
                return outcome.dominant();
            }
        }

        for (i, u) in self.unknowns.iter().enumerate() {
            let value = self.slots.value(u.slot);
            let mut r = u.to_value(y[i]) - value;
            if let Some(max) = u.soft_upper {
                r += self.penalty.value(value, max);
            }
            f[i] = r;
        }

        self.write_candidate(y);
        Outcome::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_is_steep_above_ceiling() {
        let p = Penalty {
            alpha: 100.0,
            beta: 200.0,
        };
        assert_eq!(p.value(50.0, 50.0), 100.0);
        assert!(p.value(45.0, 50.0) < 1e-6);
        assert!(p.value(51.0, 50.0) > 1e3);
        assert!(p.value(1e9, 50.0).is_finite());
        assert_eq!(p.value(0.0, 0.0), 100.0);
    }
}
