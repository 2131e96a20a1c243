//! A complete model system: slots, models and their evaluation groups.

use std::collections::HashSet;

use mf_components::ModelComponent;
use mf_core::{ModelId, Outcome, Real, SlotId, SlotStore};
use mf_graph::{GraphError, Grouping, IndexMap};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::group::{GroupSettings, ModelGroup};
use crate::params::SolverParameters;

/// Owns every model (through its group) and the shared slot store.
#[derive(Debug)]
pub struct System {
    slots: SlotStore,
    groups: Vec<ModelGroup>,
    params: SolverParameters,
    time: Real,
}

impl System {
    /// Resolve input references, check the grouping and distribute the
    /// models into their groups.
    pub fn new(
        slots: SlotStore,
        mut models: Vec<Box<dyn ModelComponent>>,
        grouping: &Grouping,
        params: SolverParameters,
    ) -> SimResult<Self> {
        params.validate()?;

        let ids: Vec<ModelId> = models.iter().map(|m| m.descriptor().id).collect();
        let mut unique = HashSet::new();
        if let Some(&dup) = ids.iter().find(|id| !unique.insert(**id)) {
            return Err(GraphError::DuplicateMembership { model: dup }.into());
        }
        grouping.validate(&ids)?;

        for model in &mut models {
            resolve_inputs(model.as_mut(), &slots)?;
        }

        let index = IndexMap::from_ids(&ids);
        let mut pool: Vec<Option<Box<dyn ModelComponent>>> = models.into_iter().map(Some).collect();
        let settings = GroupSettings::from(&params);
        let mut groups = Vec::with_capacity(grouping.len());
        for def in grouping.iter() {
            let mut members = Vec::with_capacity(def.members.len());
            for &id in &def.members {
                let model = pool[index.idx(id)?]
                    .take()
                    .ok_or(GraphError::DuplicateMembership { model: id })?;
                members.push(model);
            }
            groups.push(ModelGroup::new(def.kind, members, settings.clone()));
        }

        debug!(
            models = ids.len(),
            groups = groups.len(),
            slots = slots.len(),
            "system assembled"
        );
        Ok(Self {
            slots,
            groups,
            params,
            time: 0.0,
        })
    }

    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    pub fn groups(&self) -> &[ModelGroup] {
        &self.groups
    }

    pub fn params(&self) -> &SolverParameters {
        &self.params
    }

    pub fn time(&self) -> Real {
        self.time
    }

    /// Slot of quantity `name` published by `owner`.
    pub fn lookup(&self, owner: ModelId, name: &str) -> Option<SlotId> {
        self.slots.lookup(owner, name)
    }

    pub fn value(&self, slot: SlotId) -> Option<Real> {
        self.slots.get(slot)
    }

    /// Build the structure of every cyclic group now.
    pub fn initialize(&mut self) -> SimResult<()> {
        for group in &mut self.groups {
            group.initialize(&self.slots)?;
        }
        Ok(())
    }

    /// Forward the outer time point to time-dependent models.
    pub fn set_time(&mut self, t: Real) -> SimResult<Outcome> {
        self.time = t;
        let mut combined = Outcome::SUCCESS;
        for group in &mut self.groups {
            for model in group.models_mut() {
                if !model.descriptor().capabilities.time_dependent {
                    continue;
                }
                let outcome = model.set_time(t);
                if outcome.is_abort() {
                    return Err(SimError::ModelAborted {
                        model: model.descriptor().label(),
                    });
                }
                combined |= outcome;
            }
        }
        Ok(combined.dominant())
    }

    /// Evaluate all groups in order.
    ///
    /// Stops at the first group that does not succeed. A fatal member outcome
    /// becomes [`SimError::ModelAborted`].
    pub fn update(&mut self) -> SimResult<Outcome> {
        for group in &mut self.groups {
            let outcome = group.update(&mut self.slots)?;
            if outcome.is_abort() {
                return Err(SimError::ModelAborted {
                    model: group
                        .abort_source()
                        .map(str::to_owned)
                        .unwrap_or_else(|| group.member_labels().join(", ")),
                });
            }
            if outcome.is_recoverable() {
                return Ok(Outcome::RECOVERABLE);
            }
        }
        Ok(Outcome::SUCCESS)
    }
}

/// Resolve the symbolic input references of one model to slots.
fn resolve_inputs(model: &mut dyn ModelComponent, slots: &SlotStore) -> SimResult<()> {
    let label = model.descriptor().label();
    for input in model.inputs_mut() {
        if input.is_resolved() {
            continue;
        }
        let Some(reference) = input.reference() else {
            return Err(GraphError::UnresolvedInput {
                model: label,
                input: "<anonymous>".to_string(),
            }
            .into());
        };
        let Some(slot) = slots.lookup(reference.source, &reference.quantity) else {
            return Err(GraphError::UnresolvedInput {
                model: label,
                input: format!("{}.{}", reference.source, reference.quantity),
            }
            .into());
        };
        input.resolve(slot);
    }
    Ok(())
}
