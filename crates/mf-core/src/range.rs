//! Declared value ranges of result quantities.

use crate::numeric::Real;

/// How a finite upper bound is enforced during simultaneous solving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpperBound {
    /// Penalty term in the residual; the iterate may transiently exceed it.
    #[default]
    Soft,
    /// Hard wall for the Newton iterate.
    Hard,
}

/// Physically admissible range `[min, max]` of a result quantity.
///
/// Infinite limits mean "unbounded" on that side.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRange {
    pub min: Real,
    pub max: Real,
    pub upper: UpperBound,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl ValueRange {
    pub fn unbounded() -> Self {
        Self {
            min: Real::NEG_INFINITY,
            max: Real::INFINITY,
            upper: UpperBound::Soft,
        }
    }

    pub fn at_least(min: Real) -> Self {
        Self {
            min,
            ..Self::unbounded()
        }
    }

    /// Soft ceiling only.
    pub fn at_most(max: Real) -> Self {
        Self {
            max,
            ..Self::unbounded()
        }
    }

    /// Hard lower bound and soft upper bound.
    pub fn between(min: Real, max: Real) -> Self {
        Self {
            min,
            max,
            upper: UpperBound::Soft,
        }
    }

    /// Switch the upper bound to a hard limit.
    pub fn with_hard_upper(mut self) -> Self {
        self.upper = UpperBound::Hard;
        self
    }

    pub fn lower(&self) -> Option<Real> {
        self.min.is_finite().then_some(self.min)
    }

    pub fn upper(&self) -> Option<Real> {
        self.max.is_finite().then_some(self.max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.lower().is_none() && self.upper().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded() {
        let r = ValueRange::default();
        assert!(r.is_unbounded());
        assert_eq!((r.lower(), r.upper()), (None, None));
    }

    #[test]
    fn limits_are_reported_only_when_finite() {
        let r = ValueRange::between(0.0, 5000.0);
        assert_eq!(r.lower(), Some(0.0));
        assert_eq!(r.upper(), Some(5000.0));
        assert_eq!(r.upper, UpperBound::Soft);
        assert_eq!(ValueRange::at_least(-1.0).upper(), None);
        assert_eq!(ValueRange::at_most(2.0).with_hard_upper().upper, UpperBound::Hard);
    }
}
