//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use crate::traits::InputSlot;
use mf_core::numeric::ensure_finite;
use mf_core::{Outcome, Real, SlotStore};

/// Ensure a parameter is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    if value <= 0.0 {
        return Err(ComponentError::NonPhysical { what });
    }
    Ok(value)
}

/// Ensure a parameter is finite.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })
}

/// Read all inputs into `out`.
///
/// Returns `false` if an input is still unresolved.
pub fn read_inputs(inputs: &[InputSlot], slots: &SlotStore, out: &mut Vec<Real>) -> bool {
    out.clear();
    for input in inputs {
        match input.read(slots) {
            Some(v) => out.push(v),
            None => return false,
        }
    }
    true
}

/// Map a freshly computed value to an update outcome.
///
/// Non-finite results ask the caller for a smaller step instead of
/// publishing garbage.
pub fn finite_or_retry(value: Real) -> Outcome {
    if value.is_finite() {
        Outcome::SUCCESS
    } else {
        Outcome::RECOVERABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::ModelId;

    #[test]
    fn positive_check() {
        assert!(check_positive(1.0, "x").is_ok());
        assert!(check_positive(0.0, "x").is_err());
        assert!(check_positive(f64::NAN, "x").is_err());
    }

    #[test]
    fn unresolved_input_stops_reading() {
        let mut slots = SlotStore::new();
        let a = slots.publish(ModelId::from_index(0), "a", 1.0).unwrap();
        let inputs = vec![
            InputSlot::resolved(a),
            InputSlot::to(ModelId::from_index(1), "b"),
        ];
        let mut buf = Vec::new();
        assert!(!read_inputs(&inputs, &slots, &mut buf));
        assert!(read_inputs(&inputs[..1], &slots, &mut buf));
        assert_eq!(buf, vec![1.0]);
    }

    #[test]
    fn nan_requests_retry() {
        assert_eq!(finite_or_retry(f64::NAN), Outcome::RECOVERABLE);
        assert_eq!(finite_or_retry(1.0), Outcome::SUCCESS);
    }
}
