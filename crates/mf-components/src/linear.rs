//! Affine relation `y = c + Σ aᵢ·xᵢ`.

use crate::common::{check_finite, finite_or_retry, read_inputs};
use crate::error::ComponentResult;
use crate::traits::{DependencyPair, DependencyPolicy, InputSlot, ModelComponent, ModelDescriptor};
use mf_core::{ModelId, Outcome, Real, SlotId, SlotStore, ValueRange};

/// Scalar affine relation with one result slot.
///
/// Reports an explicit dependency pattern: terms with a zero coefficient do
/// not create a dependency.
#[derive(Debug, Clone)]
pub struct LinearRelation {
    descriptor: ModelDescriptor,
    result: [SlotId; 1],
    inputs: Vec<InputSlot>,
    coefficients: Vec<Real>,
    constant: Real,
    range: ValueRange,
    buf: Vec<Real>,
}

impl LinearRelation {
    /// Create a relation and publish its result slot `name` (initialized to
    /// `constant`).
    pub fn new(
        id: ModelId,
        name: &str,
        slots: &mut SlotStore,
        constant: Real,
        terms: Vec<(InputSlot, Real)>,
    ) -> ComponentResult<Self> {
        check_finite(constant, "constant term")?;
        let (inputs, coefficients): (Vec<_>, Vec<_>) = terms.into_iter().unzip();
        for &a in &coefficients {
            check_finite(a, "coefficient")?;
        }
        let result = slots.publish(id, name, constant)?;
        Ok(Self {
            descriptor: ModelDescriptor::new(id, "LinearRelation", name),
            result: [result],
            buf: Vec::with_capacity(inputs.len()),
            inputs,
            coefficients,
            constant,
            range: ValueRange::unbounded(),
        })
    }

    /// Declare a value range for the result.
    pub fn with_range(mut self, range: ValueRange) -> Self {
        self.range = range;
        self
    }

    pub fn result(&self) -> SlotId {
        self.result[0]
    }
}

impl ModelComponent for LinearRelation {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn result_slots(&self) -> &[SlotId] {
        &self.result
    }

    fn inputs(&self) -> &[InputSlot] {
        &self.inputs
    }

    fn inputs_mut(&mut self) -> &mut [InputSlot] {
        &mut self.inputs
    }

    fn dependency_policy(&self) -> DependencyPolicy {
        let pairs = self
            .inputs
            .iter()
            .zip(&self.coefficients)
            .filter(|(_, a)| **a != 0.0)
            .filter_map(|(input, _)| input.slot())
            .map(|input| DependencyPair::new(self.result[0], input))
            .collect();
        DependencyPolicy::Explicit(pairs)
    }

    fn value_constraints(&self) -> Vec<(SlotId, ValueRange)> {
        if self.range.is_unbounded() {
            Vec::new()
        } else {
            vec![(self.result[0], self.range)]
        }
    }

    fn update(&mut self, slots: &mut SlotStore) -> Outcome {
        if !read_inputs(&self.inputs, slots, &mut self.buf) {
            return Outcome::ABORT;
        }
        let y = self.constant
            + self
                .buf
                .iter()
                .zip(&self.coefficients)
                .map(|(x, a)| a * x)
                .sum::<Real>();
        let outcome = finite_or_retry(y);
        if outcome.is_success() {
            slots.set(self.result[0], y);
        }
        outcome
    }
}
