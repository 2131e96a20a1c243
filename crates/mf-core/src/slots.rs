//! Arena of named scalar value slots.
//!
//! Every result quantity of every model lives in one [`SlotStore`]. A model
//! publishes its slots once during setup and receives [`SlotId`] handles;
//! other models read through those handles. Handles are never invalidated, so
//! the "stable address for the run" guarantee holds without raw pointers.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::ids::{ModelId, SlotId};
use crate::numeric::Real;

/// Bookkeeping for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMeta {
    /// The only model allowed to write this slot.
    pub owner: ModelId,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SlotStore {
    values: Vec<Real>,
    meta: Vec<SlotMeta>,
    by_name: HashMap<(ModelId, String), SlotId>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new slot owned by `owner`.
    ///
    /// Names must be unique per owner.
    pub fn publish(
        &mut self,
        owner: ModelId,
        name: impl Into<String>,
        initial: Real,
    ) -> CoreResult<SlotId> {
        let name = name.into();
        if self.by_name.contains_key(&(owner, name.clone())) {
            return Err(CoreError::DuplicateSlot { owner, name });
        }
        let id = SlotId::try_from_index(self.values.len())?;
        self.values.push(initial);
        self.meta.push(SlotMeta {
            owner,
            name: name.clone(),
        });
        self.by_name.insert((owner, name), id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True if `id` was issued by this store.
    pub fn contains(&self, id: SlotId) -> bool {
        id.slot() < self.values.len()
    }

    pub fn get(&self, id: SlotId) -> Option<Real> {
        self.values.get(id.slot()).copied()
    }

    /// Read a slot value.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this store. Handles are validated
    /// once at setup, so this only fires on integration bugs.
    pub fn value(&self, id: SlotId) -> Real {
        self.values[id.slot()]
    }

    /// Write a slot value.
    ///
    /// # Panics
    /// Same contract as [`SlotStore::value`].
    pub fn set(&mut self, id: SlotId, value: Real) {
        self.values[id.slot()] = value;
    }

    pub fn meta(&self, id: SlotId) -> Option<&SlotMeta> {
        self.meta.get(id.slot())
    }

    pub fn owner(&self, id: SlotId) -> Option<ModelId> {
        self.meta(id).map(|m| m.owner)
    }

    /// Find the slot published by `owner` under `name`.
    pub fn lookup(&self, owner: ModelId, name: &str) -> Option<SlotId> {
        self.by_name.get(&(owner, name.to_string())).copied()
    }

    /// Copy the current values of `ids`.
    pub fn snapshot(&self, ids: &[SlotId]) -> Vec<Real> {
        ids.iter().map(|&id| self.value(id)).collect()
    }

    /// Write back values previously taken with [`SlotStore::snapshot`].
    pub fn restore(&mut self, ids: &[SlotId], values: &[Real]) {
        for (&id, &v) in ids.iter().zip(values) {
            self.set(id, v);
        }
    }

    /// Human readable label `owner:name` for diagnostics.
    pub fn label(&self, id: SlotId) -> String {
        match self.meta(id) {
            Some(m) => format!("{}:{}", m.owner, m.name),
            None => format!("<unpublished slot {}>", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_and_lookup() {
        let mut store = SlotStore::new();
        let owner = ModelId::from_index(0);
        let a = store.publish(owner, "T_air", 20.0).unwrap();
        let b = store.publish(owner, "Q_heat", 0.0).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.lookup(owner, "T_air"), Some(a));
        assert_eq!(store.lookup(owner, "Q_heat"), Some(b));
        assert_eq!(store.owner(a), Some(owner));
        assert_eq!(store.value(a), 20.0);
    }

    #[test]
    fn duplicate_names_per_owner_are_rejected() {
        let mut store = SlotStore::new();
        let m0 = ModelId::from_index(0);
        let m1 = ModelId::from_index(1);
        store.publish(m0, "T", 0.0).unwrap();
        assert!(store.publish(m1, "T", 0.0).is_ok());
        let err = store.publish(m0, "T", 1.0).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateSlot { .. }));
    }

    #[test]
    fn handles_stay_valid_after_growth() {
        let mut store = SlotStore::new();
        let owner = ModelId::from_index(0);
        let first = store.publish(owner, "x0", 1.5).unwrap();
        for i in 1..1000 {
            store.publish(owner, format!("x{i}"), i as f64).unwrap();
        }
        assert_eq!(store.value(first), 1.5);
        store.set(first, 2.5);
        assert_eq!(store.get(first), Some(2.5));
    }

    #[test]
    fn foreign_handles_are_detected() {
        let store = SlotStore::new();
        let stray = SlotId::from_index(3);
        assert!(!store.contains(stray));
        assert_eq!(store.get(stray), None);
        assert_eq!(store.owner(stray), None);
        assert_eq!(store.label(stray), "<unpublished slot 3>");
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut store = SlotStore::new();
        let owner = ModelId::from_index(0);
        let a = store.publish(owner, "a", 1.0).unwrap();
        let b = store.publish(owner, "b", 2.0).unwrap();
        let snap = store.snapshot(&[a, b]);
        store.set(a, 10.0);
        store.set(b, 20.0);
        store.restore(&[a, b], &snap);
        assert_eq!(store.value(a), 1.0);
        assert_eq!(store.value(b), 2.0);
    }
}
