//! Graph-specific error types.
//!
//! Every variant is a configuration error: it is raised at setup and is
//! never retried.

use mf_core::{ModelId, SlotId};

/// Grouping and cyclic-structure errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A model reports a result or dependency slot that is not in the store.
    UnpublishedSlot { model: String, slot: SlotId },

    /// An explicit dependency pair names a result slot the model does not own.
    ForeignResult { model: String, slot: SlotId },

    /// An input still has no slot after reference resolution.
    UnresolvedInput { model: String, input: String },

    /// A group lists a model that the system does not know.
    UnknownModel { model: ModelId },

    /// A model is listed in more than one group.
    DuplicateMembership { model: ModelId },

    /// A known model that no group evaluates.
    Ungrouped { model: ModelId },

    /// A group without members.
    EmptyGroup { group: usize },

    /// A cyclic group whose members produce no result slots at all.
    EmptyCyclicGroup { models: Vec<String> },

    /// A group declared cyclic whose dependencies contain no feedback loop.
    NotCyclic { models: Vec<String> },

    /// ID not found in index map.
    IdNotFound { what: &'static str },
}

/// Convenience result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::UnpublishedSlot { model, slot } => {
                write!(f, "{} references unpublished slot {}", model, slot)
            }
            GraphError::ForeignResult { model, slot } => {
                write!(
                    f,
                    "{} declares a dependency of slot {}, which is not one of its results",
                    model, slot
                )
            }
            GraphError::UnresolvedInput { model, input } => {
                write!(f, "Input '{}' of {} is not resolved", input, model)
            }
            GraphError::UnknownModel { model } => {
                write!(f, "Grouping refers to unknown model {}", model)
            }
            GraphError::DuplicateMembership { model } => {
                write!(f, "Model {} is a member of more than one group", model)
            }
            GraphError::Ungrouped { model } => {
                write!(f, "Model {} is not a member of any group", model)
            }
            GraphError::EmptyGroup { group } => {
                write!(f, "Evaluation group #{} has no members", group)
            }
            GraphError::EmptyCyclicGroup { models } => {
                write!(
                    f,
                    "Cyclic group has no unknowns to solve (models: {})",
                    models.join(", ")
                )
            }
            GraphError::NotCyclic { models } => {
                write!(
                    f,
                    "Group declared cyclic contains no cyclic dependency (models: {})",
                    models.join(", ")
                )
            }
            GraphError::IdNotFound { what } => {
                write!(f, "{} not found in index map", what)
            }
        }
    }
}

impl std::error::Error for GraphError {}
