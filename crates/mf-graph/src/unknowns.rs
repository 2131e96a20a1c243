//! Unknown vector entries and their constraints.

use std::collections::{HashMap, HashSet};

use mf_components::{DependencyPair, ModelComponent};
use mf_core::{ModelId, Real, SlotId, UpperBound, ValueRange};

/// One simultaneous unknown of a cyclic group.
///
/// The solver works on `y = value - offset`. A finite declared lower bound
/// becomes the offset, so the hard constraint reads `y >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unknown {
    pub slot: SlotId,
    pub owner: ModelId,
    pub offset: Real,
    /// Hard lower bound on `y`.
    pub lower: Option<Real>,
    /// Hard upper bound on `y`.
    pub upper: Option<Real>,
    /// Soft ceiling on the slot value, enforced by a penalty term.
    pub soft_upper: Option<Real>,
}

impl Unknown {
    pub fn unconstrained(slot: SlotId, owner: ModelId) -> Self {
        Self {
            slot,
            owner,
            offset: 0.0,
            lower: None,
            upper: None,
            soft_upper: None,
        }
    }

    /// Map a declared value range onto the unknown.
    pub fn with_range(slot: SlotId, owner: ModelId, range: &ValueRange) -> Self {
        let offset = range.lower().unwrap_or(0.0);
        let (upper, soft_upper) = match (range.upper(), range.upper) {
            (Some(max), UpperBound::Hard) => (Some(max - offset), None),
            (Some(max), UpperBound::Soft) => (None, Some(max)),
            (None, _) => (None, None),
        };
        Self {
            slot,
            owner,
            offset,
            lower: range.lower().map(|_| 0.0),
            upper,
            soft_upper,
        }
    }

    pub fn to_value(&self, y: Real) -> Real {
        y + self.offset
    }

    pub fn to_unknown(&self, value: Real) -> Real {
        value - self.offset
    }

    pub fn has_hard_bounds(&self) -> bool {
        self.lower.is_some() || self.upper.is_some()
    }
}

/// Distinct result slots in first-seen order, skipping `excluded`.
pub fn collect_result_slots(pairs: &[DependencyPair], excluded: &HashSet<SlotId>) -> Vec<SlotId> {
    let mut seen = HashSet::new();
    pairs
        .iter()
        .map(|p| p.result)
        .filter(|s| !excluded.contains(s) && seen.insert(*s))
        .collect()
}

/// State and derivative slots of embedded ODE balances among `members`.
pub fn ode_slots(members: &[&dyn ModelComponent]) -> HashSet<SlotId> {
    members
        .iter()
        .filter(|m| m.descriptor().capabilities.ode_balance)
        .flat_map(|m| m.ode_slots().iter().copied())
        .collect()
}

/// Declared value ranges of all members, keyed by slot.
pub fn collect_constraints(members: &[&dyn ModelComponent]) -> HashMap<SlotId, ValueRange> {
    members
        .iter()
        .flat_map(|m| m.value_constraints())
        .filter(|(_, r)| !r.is_unbounded())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(i: u16) -> SlotId {
        SlotId::from_index(i)
    }

    #[test]
    fn lower_bound_becomes_offset() {
        let u = Unknown::with_range(slot(0), ModelId::from_index(0), &ValueRange::at_least(-5.0));
        assert_eq!(u.offset, -5.0);
        assert_eq!(u.lower, Some(0.0));
        assert_eq!(u.upper, None);
        assert_eq!(u.to_unknown(-5.0), 0.0);
        assert_eq!(u.to_value(2.0), -3.0);
    }

    #[test]
    fn upper_bound_is_soft_unless_hard() {
        let m = ModelId::from_index(0);
        let soft = Unknown::with_range(slot(0), m, &ValueRange::between(10.0, 50.0));
        assert_eq!(soft.soft_upper, Some(50.0));
        assert_eq!(soft.upper, None);

        let hard =
            Unknown::with_range(slot(0), m, &ValueRange::between(10.0, 50.0).with_hard_upper());
        assert_eq!(hard.soft_upper, None);
        assert_eq!(hard.upper, Some(40.0));
        assert!(hard.has_hard_bounds());
    }

    #[test]
    fn results_in_first_seen_order_without_excluded() {
        let pairs = [
            DependencyPair::new(slot(3), slot(0)),
            DependencyPair::new(slot(1), slot(3)),
            DependencyPair::new(slot(3), slot(1)),
            DependencyPair::new(slot(2), slot(1)),
        ];
        let excluded: HashSet<_> = [slot(2)].into_iter().collect();
        assert_eq!(collect_result_slots(&pairs, &excluded), vec![slot(3), slot(1)]);
    }
}
