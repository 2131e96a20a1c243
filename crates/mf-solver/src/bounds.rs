//! Hard bounds on the Newton iterate.

use nalgebra::DVector;

/// Fraction of the distance to a bound a single step may cover.
const TO_BOUNDARY: f64 = 0.99;

/// Optional lower/upper bound per unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    pub lower: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
}

impl Bounds {
    pub fn none(n: usize) -> Self {
        Self {
            lower: vec![None; n],
            upper: vec![None; n],
        }
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.lower.iter().chain(&self.upper).all(Option::is_none)
    }

    /// Move `y` into the feasible box.
    pub fn clamp(&self, y: &mut DVector<f64>) {
        for i in 0..y.len() {
            if let Some(lo) = self.lower[i] {
                y[i] = y[i].max(lo);
            }
            if let Some(hi) = self.upper[i] {
                y[i] = y[i].min(hi);
            }
        }
    }

    /// Zero direction components that push into an active bound.
    ///
    /// Returns the number of components removed.
    pub fn project_direction(&self, y: &DVector<f64>, dy: &mut DVector<f64>) -> usize {
        let mut removed = 0;
        for i in 0..y.len() {
            let at_lower = self.lower[i].is_some_and(|lo| y[i] <= lo && dy[i] < 0.0);
            let at_upper = self.upper[i].is_some_and(|hi| y[i] >= hi && dy[i] > 0.0);
            if at_lower || at_upper {
                dy[i] = 0.0;
                removed += 1;
            }
        }
        removed
    }

    /// Largest step length in `(0, 1]` keeping `y + t·dy` strictly inside.
    pub fn max_step(&self, y: &DVector<f64>, dy: &DVector<f64>) -> f64 {
        let mut t: f64 = 1.0;
        for i in 0..y.len() {
            if dy[i] < 0.0 {
                if let Some(lo) = self.lower[i] {
                    if y[i] + dy[i] < lo {
                        t = t.min(TO_BOUNDARY * (y[i] - lo) / -dy[i]);
                    }
                }
            } else if dy[i] > 0.0 {
                if let Some(hi) = self.upper[i] {
                    if y[i] + dy[i] > hi {
                        t = t.min(TO_BOUNDARY * (hi - y[i]) / dy[i]);
                    }
                }
            }
        }
        t.max(0.0)
    }

    /// Signed finite-difference increment that stays inside the box.
    pub fn increment(&self, i: usize, y: f64, h: f64) -> f64 {
        match self.upper[i] {
            Some(hi) if y + h > hi => -h,
            _ => h,
        }
    }
}
