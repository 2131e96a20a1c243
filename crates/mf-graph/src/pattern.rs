//! Dependency pattern extraction.

use mf_components::{DependencyPair, DependencyPolicy, ModelComponent};
use mf_core::{SlotId, SlotStore};

use crate::error::{GraphError, GraphResult};

/// Direct `(result, input)` dependencies of one model.
///
/// Checks that every result and input slot is published and every input is
/// resolved. `DenseAll` yields the full results × inputs cross product.
pub fn model_dependencies(
    model: &dyn ModelComponent,
    slots: &SlotStore,
) -> GraphResult<Vec<DependencyPair>> {
    let label = || model.descriptor().label();
    let published = |slot: SlotId| -> GraphResult<SlotId> {
        if slots.contains(slot) {
            Ok(slot)
        } else {
            Err(GraphError::UnpublishedSlot {
                model: label(),
                slot,
            })
        }
    };

    let results = model
        .result_slots()
        .iter()
        .map(|&s| published(s))
        .collect::<GraphResult<Vec<_>>>()?;

    let mut inputs = Vec::with_capacity(model.inputs().len());
    for (i, input) in model.inputs().iter().enumerate() {
        let Some(slot) = input.slot() else {
            let input = input
                .reference()
                .map(|r| format!("{}.{}", r.source, r.quantity))
                .unwrap_or_else(|| format!("#{i}"));
            return Err(GraphError::UnresolvedInput {
                model: label(),
                input,
            });
        };
        inputs.push(published(slot)?);
    }

    match model.dependency_policy() {
        DependencyPolicy::DenseAll => Ok(results
            .iter()
            .flat_map(|&r| inputs.iter().map(move |&i| DependencyPair::new(r, i)))
            .collect()),
        DependencyPolicy::Explicit(pairs) => {
            for pair in &pairs {
                published(pair.result)?;
                published(pair.input)?;
                if !results.contains(&pair.result) {
                    return Err(GraphError::ForeignResult {
                        model: label(),
                        slot: pair.result,
                    });
                }
            }
            Ok(pairs)
        }
    }
}

/// Concatenated dependencies of all `members`, in member order.
pub fn extract_pattern(
    members: &[&dyn ModelComponent],
    slots: &SlotStore,
) -> GraphResult<Vec<DependencyPair>> {
    let mut pairs = Vec::new();
    for model in members {
        pairs.extend(model_dependencies(*model, slots)?);
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_components::{InputSlot, ModelDescriptor};
    use mf_core::{ModelId, Outcome};

    struct Stub {
        descriptor: ModelDescriptor,
        results: Vec<SlotId>,
        inputs: Vec<InputSlot>,
        pairs: Option<Vec<DependencyPair>>,
    }

    impl ModelComponent for Stub {
        fn descriptor(&self) -> &ModelDescriptor {
            &self.descriptor
        }
        fn result_slots(&self) -> &[SlotId] {
            &self.results
        }
        fn inputs(&self) -> &[InputSlot] {
            &self.inputs
        }
        fn inputs_mut(&mut self) -> &mut [InputSlot] {
            &mut self.inputs
        }
        fn update(&mut self, _slots: &mut SlotStore) -> Outcome {
            Outcome::SUCCESS
        }
        fn dependency_policy(&self) -> DependencyPolicy {
            match &self.pairs {
                Some(pairs) => DependencyPolicy::Explicit(pairs.clone()),
                None => DependencyPolicy::DenseAll,
            }
        }
    }

    #[test]
    fn dense_default_is_cross_product() {
        let mut slots = SlotStore::new();
        let id = ModelId::from_index(0);
        let r1 = slots.publish(id, "r1", 0.0).unwrap();
        let r2 = slots.publish(id, "r2", 0.0).unwrap();
        let x = slots.publish(ModelId::from_index(1), "x", 0.0).unwrap();
        let y = slots.publish(ModelId::from_index(1), "y", 0.0).unwrap();

        let stub = Stub {
            descriptor: ModelDescriptor::new(id, "Stub", "p"),
            results: vec![r1, r2],
            inputs: vec![InputSlot::resolved(x), InputSlot::resolved(y)],
            pairs: None,
        };
        let pairs = model_dependencies(&stub, &slots).unwrap();
        assert_eq!(
            pairs,
            vec![
                DependencyPair::new(r1, x),
                DependencyPair::new(r1, y),
                DependencyPair::new(r2, x),
                DependencyPair::new(r2, y),
            ]
        );
    }

    #[test]
    fn unresolved_input_is_configuration_error() {
        let mut slots = SlotStore::new();
        let id = ModelId::from_index(2);
        let r = slots.publish(id, "r", 0.0).unwrap();
        let stub = Stub {
            descriptor: ModelDescriptor::new(id, "Stub", "p"),
            results: vec![r],
            inputs: vec![InputSlot::to(ModelId::from_index(7), "T")],
            pairs: None,
        };
        assert_eq!(
            model_dependencies(&stub, &slots),
            Err(GraphError::UnresolvedInput {
                model: "Stub[id=2]".into(),
                input: "7.T".into(),
            })
        );
    }

    #[test]
    fn unpublished_result_is_configuration_error() {
        let slots = SlotStore::new();
        let id = ModelId::from_index(0);
        let stub = Stub {
            descriptor: ModelDescriptor::new(id, "Stub", "p"),
            results: vec![SlotId::from_index(3)],
            inputs: Vec::new(),
            pairs: None,
        };
        let members: [&dyn ModelComponent; 1] = [&stub];
        assert!(matches!(
            extract_pattern(&members, &slots),
            Err(GraphError::UnpublishedSlot { .. })
        ));
    }

    #[test]
    fn explicit_pair_must_name_own_result() {
        let mut slots = SlotStore::new();
        let id = ModelId::from_index(4);
        let own = slots.publish(id, "own", 0.0).unwrap();
        let other = slots.publish(ModelId::from_index(5), "other", 0.0).unwrap();
        let x = slots.publish(ModelId::from_index(6), "x", 0.0).unwrap();

        let mut stub = Stub {
            descriptor: ModelDescriptor::new(id, "Stub", "p"),
            results: vec![own],
            inputs: vec![InputSlot::resolved(x)],
            pairs: Some(vec![DependencyPair::new(own, x)]),
        };
        assert_eq!(
            model_dependencies(&stub, &slots),
            Ok(vec![DependencyPair::new(own, x)])
        );

        stub.pairs = Some(vec![DependencyPair::new(own, x), DependencyPair::new(other, x)]);
        let err = model_dependencies(&stub, &slots).unwrap_err();
        assert_eq!(
            err,
            GraphError::ForeignResult {
                model: "Stub[id=4]".into(),
                slot: other,
            }
        );
        assert!(err.to_string().starts_with("Stub[id=4] declares"));
    }
}
