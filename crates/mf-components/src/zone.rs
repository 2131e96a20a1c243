//! Steady zone air balance.

use crate::common::{check_finite, check_positive, finite_or_retry, read_inputs};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{InputSlot, ModelComponent, ModelDescriptor};
use mf_core::units::{Power, Temperature, to_celsius};
use mf_core::{ModelId, Outcome, Real, SlotId, SlotStore};

/// Zone air node in steady state with its enclosing surfaces.
///
/// ```text
/// T_a = (Σ hAᵢ·T_sᵢ + Q_heat + Q_int) / Σ hAᵢ
/// ```
///
/// Inputs are the surface temperatures in order, followed by the heating
/// power when one is connected. Uses the default dense dependency pattern.
#[derive(Debug, Clone)]
pub struct ZoneAirBalance {
    descriptor: ModelDescriptor,
    result: [SlotId; 1],
    inputs: Vec<InputSlot>,
    conductances: Vec<Real>,
    has_heating: bool,
    internal_gains: Real,
    buf: Vec<Real>,
}

impl ZoneAirBalance {
    /// `surfaces` pairs each surface temperature input with its film
    /// conductance `h·A` in W/K.
    pub fn new(
        id: ModelId,
        name: &str,
        slots: &mut SlotStore,
        initial: Temperature,
        surfaces: Vec<(InputSlot, Real)>,
        heating: Option<InputSlot>,
        internal_gains: Power,
    ) -> ComponentResult<Self> {
        if surfaces.is_empty() {
            return Err(ComponentError::InvalidArg {
                what: "zone needs at least one enclosing surface",
            });
        }
        let internal_gains = check_finite(internal_gains.value, "internal gains")?;
        let (mut inputs, conductances): (Vec<_>, Vec<_>) = surfaces.into_iter().unzip();
        for &ha in &conductances {
            check_positive(ha, "surface conductance")?;
        }
        let has_heating = heating.is_some();
        inputs.extend(heating);

        let air = slots.publish(id, "air_temperature", to_celsius(initial))?;
        Ok(Self {
            descriptor: ModelDescriptor::new(id, "ZoneAirBalance", name),
            result: [air],
            buf: Vec::with_capacity(inputs.len()),
            inputs,
            conductances,
            has_heating,
            internal_gains,
        })
    }

    pub fn air_temperature(&self) -> SlotId {
        self.result[0]
    }

    /// Total film conductance in W/K.
    pub fn total_conductance(&self) -> Real {
        self.conductances.iter().sum()
    }
}

impl ModelComponent for ZoneAirBalance {
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

    fn update(&mut self, slots: &mut SlotStore) -> Outcome {
        if !read_inputs(&self.inputs, slots, &mut self.buf) {
            return Outcome::ABORT;
        }
        let n = self.conductances.len();
        let weighted: Real = self.buf[..n]
            .iter()
            .zip(&self.conductances)
            .map(|(t, ha)| ha * t)
            .sum();
        let heating = if self.has_heating { self.buf[n] } else { 0.0 };
        let t_a = (weighted + heating + self.internal_gains) / self.total_conductance();

        let outcome = finite_or_retry(t_a);
        if outcome.is_success() {
            slots.set(self.result[0], t_a);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::units::{celsius, watts};

    #[test]
    fn weighted_mean_plus_gains() {
        let mut slots = SlotStore::new();
        let src = ModelId::from_index(5);
        let s1 = slots.publish(src, "s1", 10.0).unwrap();
        let s2 = slots.publish(src, "s2", 20.0).unwrap();
        let q = slots.publish(src, "q", 300.0).unwrap();

        let mut zone = ZoneAirBalance::new(
            ModelId::from_index(0),
            "office",
            &mut slots,
            celsius(20.0),
            vec![(InputSlot::resolved(s1), 10.0), (InputSlot::resolved(s2), 30.0)],
            Some(InputSlot::resolved(q)),
            watts(100.0),
        )
        .unwrap();

        assert!((slots.value(zone.air_temperature()) - 20.0).abs() < 1e-9);
        assert_eq!(zone.update(&mut slots), Outcome::SUCCESS);
        // (100 + 600 + 300 + 100) / 40
        assert!((slots.value(zone.air_temperature()) - 27.5).abs() < 1e-12);
    }

    #[test]
    fn requires_surfaces() {
        let mut slots = SlotStore::new();
        let res = ZoneAirBalance::new(
            ModelId::from_index(0),
            "empty",
            &mut slots,
            celsius(20.0),
            Vec::new(),
            None,
            watts(0.0),
        );
        assert!(matches!(res, Err(ComponentError::InvalidArg { .. })));
    }
}
