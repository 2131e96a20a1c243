//! Steady wall surface between outdoor air and zone air.

use crate::common::{check_positive, finite_or_retry, read_inputs};
use crate::error::ComponentResult;
use crate::traits::{DependencyPair, DependencyPolicy, InputSlot, ModelComponent, ModelDescriptor};
use mf_core::units::{Area, HeatTransfer};
use mf_core::{ModelId, Outcome, Real, SlotId, SlotStore};

const OUTDOOR: usize = 0;
const ZONE_AIR: usize = 1;

/// Wall with a lumped outside resistance `1/U` and an inside film `1/h`.
///
/// Inputs (°C): `[outdoor temperature, zone air temperature]`.
/// Results: `surface_temperature` (°C) and `heat_flow` (W, positive into the zone).
///
/// ```text
/// T_s = (U·T_o + h·T_a) / (U + h)
/// Q   = h·A·(T_s - T_a)
/// ```
#[derive(Debug, Clone)]
pub struct WallSurface {
    descriptor: ModelDescriptor,
    results: [SlotId; 2],
    inputs: Vec<InputSlot>,
    area: Real,
    u_value: Real,
    h_inside: Real,
    buf: Vec<Real>,
}

impl WallSurface {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ModelId,
        name: &str,
        slots: &mut SlotStore,
        area: Area,
        u_value: HeatTransfer,
        h_inside: HeatTransfer,
        outdoor: InputSlot,
        zone_air: InputSlot,
    ) -> ComponentResult<Self> {
        let area = check_positive(area.value, "wall area")?;
        let u_value = check_positive(u_value.value, "U-value")?;
        let h_inside = check_positive(h_inside.value, "inside heat transfer coefficient")?;

        let ts = slots.publish(id, "surface_temperature", 20.0)?;
        let q = slots.publish(id, "heat_flow", 0.0)?;

        Ok(Self {
            descriptor: ModelDescriptor::new(id, "WallSurface", name),
            results: [ts, q],
            inputs: vec![outdoor, zone_air],
            area,
            u_value,
            h_inside,
            buf: Vec::with_capacity(2),
        })
    }

    pub fn surface_temperature(&self) -> SlotId {
        self.results[0]
    }

    pub fn heat_flow(&self) -> SlotId {
        self.results[1]
    }

    /// Inside film conductance `h·A` in W/K.
    pub fn conductance(&self) -> Real {
        self.h_inside * self.area
    }
}

impl ModelComponent for WallSurface {
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

    fn dependency_policy(&self) -> DependencyPolicy {
        // Both results depend on both temperatures.
        let mut pairs = Vec::with_capacity(4);
        for &result in &self.results {
            for input in self.inputs.iter().filter_map(InputSlot::slot) {
                pairs.push(DependencyPair::new(result, input));
            }
        }
        DependencyPolicy::Explicit(pairs)
    }

    fn update(&mut self, slots: &mut SlotStore) -> Outcome {
        if !read_inputs(&self.inputs, slots, &mut self.buf) {
            return Outcome::ABORT;
        }
        let (t_o, t_a) = (self.buf[OUTDOOR], self.buf[ZONE_AIR]);
        let t_s = (self.u_value * t_o + self.h_inside * t_a) / (self.u_value + self.h_inside);
        let q = self.conductance() * (t_s - t_a);

        let outcome = finite_or_retry(t_s) | finite_or_retry(q);
        if outcome.is_success() {
            slots.set(self.results[0], t_s);
            slots.set(self.results[1], q);
        }
        outcome
    }
}
