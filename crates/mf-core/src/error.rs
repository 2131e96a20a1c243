use thiserror::Error;

use crate::ids::ModelId;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Slot '{name}' is already published by model {owner}")]
    DuplicateSlot { owner: ModelId, name: String },

    #[error("Index {index} does not fit in a 32-bit id")]
    IdOverflow { index: usize },
}
