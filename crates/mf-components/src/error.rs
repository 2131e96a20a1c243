//! Error types for component construction.

use mf_core::CoreError;
use thiserror::Error;

/// Errors raised while building or wiring a component.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Slot error: {0}")]
    Slot(#[from] CoreError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::NonPhysical { what: "area" };
        assert!(err.to_string().contains("area"));
    }

    #[test]
    fn core_errors_convert() {
        let err: ComponentError = CoreError::IdOverflow { index: usize::MAX }.into();
        assert!(matches!(err, ComponentError::Slot(_)));
    }
}
