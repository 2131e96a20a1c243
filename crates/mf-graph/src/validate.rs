//! Grouping validation logic.

use std::collections::HashSet;

use mf_core::ModelId;

use crate::error::{GraphError, GraphResult};
use crate::group::GroupDef;

/// Every group is non-empty and lists only known models. Each known model
/// belongs to exactly one group.
pub(crate) fn validate_grouping(groups: &[GroupDef], known: &[ModelId]) -> GraphResult<()> {
    let known_set: HashSet<ModelId> = known.iter().copied().collect();
    let mut seen = HashSet::new();

    for (i, group) in groups.iter().enumerate() {
        if group.members.is_empty() {
            return Err(GraphError::EmptyGroup { group: i });
        }
        for &model in &group.members {
            if !known_set.contains(&model) {
                return Err(GraphError::UnknownModel { model });
            }
            if !seen.insert(model) {
                return Err(GraphError::DuplicateMembership { model });
            }
        }
    }
    if let Some(&model) = known.iter().find(|m| !seen.contains(*m)) {
        return Err(GraphError::Ungrouped { model });
    }
    Ok(())
}
