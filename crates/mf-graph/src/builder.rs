//! Incremental grouping builder with validation.

use mf_core::ModelId;

use crate::error::GraphResult;
use crate::group::{GroupKind, GroupDef, Grouping};
use crate::validate::validate_grouping;

/// Collects evaluation groups in evaluation order.
#[derive(Debug, Default)]
pub struct GroupingBuilder {
    groups: Vec<GroupDef>,
}

impl GroupingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group and return its index.
    pub fn push(&mut self, kind: GroupKind, members: impl IntoIterator<Item = ModelId>) -> usize {
        self.groups.push(GroupDef {
            kind,
            members: members.into_iter().collect(),
        });
        self.groups.len() - 1
    }

    pub fn sequential(&mut self, members: impl IntoIterator<Item = ModelId>) -> usize {
        self.push(GroupKind::Sequential, members)
    }

    pub fn cyclic(&mut self, members: impl IntoIterator<Item = ModelId>) -> usize {
        self.push(GroupKind::Cyclic, members)
    }

    /// Validate against the set of known models and finish.
    pub fn build(self, known: &[ModelId]) -> GraphResult<Grouping> {
        validate_grouping(&self.groups, known)?;
        Ok(Grouping {
            groups: self.groups,
        })
    }
}
