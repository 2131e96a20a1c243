use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Exponential with the argument capped so the result stays finite.
pub fn safe_exp(x: Real) -> Real {
    x.min(700.0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn safe_exp_never_overflows() {
        assert!(safe_exp(1e6).is_finite());
        assert_eq!(safe_exp(0.0), 1.0);
    }
}
