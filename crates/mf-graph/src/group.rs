//! Pre-computed evaluation groups.

use mf_core::ModelId;

use crate::error::GraphResult;
use crate::validate::validate_grouping;

/// Classification of an evaluation group, supplied by the partitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Acyclic chain, evaluated by one ordered pass.
    Sequential,
    /// Mutually dependent models, solved simultaneously.
    Cyclic,
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKind::Sequential => write!(f, "sequential"),
            GroupKind::Cyclic => write!(f, "cyclic"),
        }
    }
}

/// One evaluation group: its kind and members in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDef {
    pub kind: GroupKind,
    pub members: Vec<ModelId>,
}

/// Ordered list of evaluation groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    pub(crate) groups: Vec<GroupDef>,
}

impl Grouping {
    pub fn groups(&self) -> &[GroupDef] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupDef> {
        self.groups.iter()
    }

    /// Re-check against the models of a system.
    pub fn validate(&self, known: &[ModelId]) -> GraphResult<()> {
        validate_grouping(&self.groups, known)
    }

    /// Group index a model belongs to.
    pub fn group_of(&self, model: ModelId) -> Option<usize> {
        self.groups
            .iter()
            .position(|g| g.members.contains(&model))
    }
}
