//! Capability interface of model components.

use mf_core::{ModelId, Outcome, Real, SlotId, SlotStore, ValueRange};

/// Symbolic reference to a result quantity of another model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputReference {
    pub source: ModelId,
    pub quantity: String,
}

/// An input of a model: a reference that is resolved once at setup to the
/// slot of the producing model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSlot {
    reference: Option<InputReference>,
    slot: Option<SlotId>,
}

impl InputSlot {
    /// Unresolved input pointing at `quantity` of model `source`.
    pub fn to(source: ModelId, quantity: impl Into<String>) -> Self {
        Self {
            reference: Some(InputReference {
                source,
                quantity: quantity.into(),
            }),
            slot: None,
        }
    }

    /// Input wired directly to a known slot.
    pub fn resolved(slot: SlotId) -> Self {
        Self {
            reference: None,
            slot: Some(slot),
        }
    }

    pub fn reference(&self) -> Option<&InputReference> {
        self.reference.as_ref()
    }

    pub fn slot(&self) -> Option<SlotId> {
        self.slot
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.is_some()
    }

    pub fn resolve(&mut self, slot: SlotId) {
        self.slot = Some(slot);
    }

    /// Current value of the referenced slot, `None` while unresolved.
    pub fn read(&self, slots: &SlotStore) -> Option<Real> {
        self.slot.and_then(|s| slots.get(s))
    }
}

/// "`result` is computed from `input`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyPair {
    pub result: SlotId,
    pub input: SlotId,
}

impl DependencyPair {
    pub fn new(result: SlotId, input: SlotId) -> Self {
        Self { result, input }
    }
}

/// How a component reports its direct result/input dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DependencyPolicy {
    /// Every result depends on every input. Never under-reports.
    #[default]
    DenseAll,
    /// The component lists its dependencies precisely.
    Explicit(Vec<DependencyPair>),
}

/// Static capabilities of a component, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Reacts to [`ModelComponent::set_time`].
    pub time_dependent: bool,
    /// Owns ODE state/derivative slots advanced by the outer integrator.
    pub ode_balance: bool,
}

impl Capabilities {
    pub fn steady() -> Self {
        Self::default()
    }

    pub fn time_dependent() -> Self {
        Self {
            time_dependent: true,
            ..Self::default()
        }
    }

    pub fn ode_balance() -> Self {
        Self {
            ode_balance: true,
            ..Self::default()
        }
    }
}

/// Identity of a component, carried alongside its capabilities so that
/// diagnostics never need to recover the concrete type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: ModelId,
    pub class_name: &'static str,
    pub name: String,
    pub capabilities: Capabilities,
}

impl ModelDescriptor {
    pub fn new(id: ModelId, class_name: &'static str, name: impl Into<String>) -> Self {
        Self {
            id,
            class_name,
            name: name.into(),
            capabilities: Capabilities::steady(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// `ClassName[id=N]`, used in error messages.
    pub fn label(&self) -> String {
        format!("{}[id={}]", self.class_name, self.id)
    }
}

/// Capability interface every model component implements.
///
/// Components are single-threaded and deterministic: `update()` reads inputs
/// from the slot store and writes only the component's own result slots.
pub trait ModelComponent {
    fn descriptor(&self) -> &ModelDescriptor;

    /// Slots this component owns and writes.
    fn result_slots(&self) -> &[SlotId];

    /// Inputs in declaration order.
    fn inputs(&self) -> &[InputSlot];

    /// Mutable access used once at setup for resolving references.
    fn inputs_mut(&mut self) -> &mut [InputSlot];

    /// Dependency reporting strategy. Default: dense.
    fn dependency_policy(&self) -> DependencyPolicy {
        DependencyPolicy::DenseAll
    }

    /// Declared value ranges of results. Results not listed are unbounded.
    fn value_constraints(&self) -> Vec<(SlotId, ValueRange)> {
        Vec::new()
    }

    /// State and derivative slots owned by an embedded ODE balance.
    ///
    /// Only consulted when `capabilities.ode_balance` is set.
    fn ode_slots(&self) -> &[SlotId] {
        &[]
    }

    /// Forward the current outer time point.
    fn set_time(&mut self, _t: f64) -> Outcome {
        Outcome::SUCCESS
    }

    /// Recompute results from current inputs.
    fn update(&mut self, slots: &mut SlotStore) -> Outcome;
}
