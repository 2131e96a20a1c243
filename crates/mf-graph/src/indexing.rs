//! Stable indexing for the orchestrator.
//!
//! Bidirectional mapping between `ModelId`s and contiguous storage indices.

use std::collections::HashMap;

use mf_core::ModelId;

use crate::error::{GraphError, GraphResult};

/// O(1) lookup between model IDs and their position in the model arena.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    /// Contiguous list of model IDs (index -> ModelId).
    ids: Vec<ModelId>,

    /// Reverse lookup. Ids may be sparse anywhere in the `u32` range.
    to_idx: HashMap<ModelId, usize>,
}

impl IndexMap {
    pub fn from_ids(ids: &[ModelId]) -> Self {
        let to_idx = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        Self {
            ids: ids.to_vec(),
            to_idx,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Contiguous index of a model ID.
    pub fn idx(&self, id: ModelId) -> GraphResult<usize> {
        self.to_idx
            .get(&id)
            .copied()
            .ok_or(GraphError::IdNotFound { what: "ModelId" })
    }

    /// Model ID at a contiguous index (panics if out of bounds).
    pub fn id(&self, i: usize) -> ModelId {
        self.ids[i]
    }

    pub fn ids(&self) -> &[ModelId] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_sparse_ids() {
        let ids = [ModelId::from_index(4), ModelId::from_index(1)];
        let map = IndexMap::from_ids(&ids);

        assert_eq!(map.len(), 2);
        assert_eq!(map.idx(ids[0]).unwrap(), 0);
        assert_eq!(map.id(1), ids[1]);
        assert_eq!(
            map.idx(ModelId::from_index(2)),
            Err(GraphError::IdNotFound { what: "ModelId" })
        );
        assert!(map.idx(ModelId::from_index(99)).is_err());
    }

    #[test]
    fn far_apart_ids_stay_cheap() {
        let far = ModelId::try_from_index(u32::MAX as usize - 1).unwrap();
        let map = IndexMap::from_ids(&[ModelId::from_index(0), far]);
        assert_eq!(map.idx(far), Ok(1));
        assert_eq!(map.to_idx.len(), 2);
    }
}
