//! Ideal proportional heating with a capacity limit.

use crate::common::{check_finite, check_positive, finite_or_retry, read_inputs};
use crate::error::ComponentResult;
use crate::traits::{InputSlot, ModelComponent, ModelDescriptor};
use mf_core::units::{Power, Temperature, to_celsius};
use mf_core::{ModelId, Outcome, Real, SlotId, SlotStore, ValueRange};

/// `Q = clamp(gain·(T_set - T_a), 0, Q_max)`, in W.
///
/// The declared value range `[0, Q_max]` is what keeps a simultaneous solve
/// from wandering into negative heating.
#[derive(Debug, Clone)]
pub struct IdealHeating {
    descriptor: ModelDescriptor,
    result: [SlotId; 1],
    inputs: Vec<InputSlot>,
    setpoint: Real,
    gain: Real,
    max_power: Real,
    buf: Vec<Real>,
}

impl IdealHeating {
    /// `gain` is in W/K.
    pub fn new(
        id: ModelId,
        name: &str,
        slots: &mut SlotStore,
        setpoint: Temperature,
        gain: Real,
        max_power: Power,
        zone_air: InputSlot,
    ) -> ComponentResult<Self> {
        let setpoint = check_finite(to_celsius(setpoint), "heating setpoint")?;
        let gain = check_positive(gain, "controller gain")?;
        let max_power = check_positive(max_power.value, "heating capacity")?;
        let q = slots.publish(id, "heating_power", 0.0)?;
        Ok(Self {
            descriptor: ModelDescriptor::new(id, "IdealHeating", name),
            result: [q],
            inputs: vec![zone_air],
            setpoint,
            gain,
            max_power,
            buf: Vec::with_capacity(1),
        })
    }

    pub fn heating_power(&self) -> SlotId {
        self.result[0]
    }
}

impl ModelComponent for IdealHeating {
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

    fn value_constraints(&self) -> Vec<(SlotId, ValueRange)> {
        vec![(self.result[0], ValueRange::between(0.0, self.max_power))]
    }

    fn update(&mut self, slots: &mut SlotStore) -> Outcome {
        if !read_inputs(&self.inputs, slots, &mut self.buf) {
            return Outcome::ABORT;
        }
        let demand = self.gain * (self.setpoint - self.buf[0]);
        let outcome = finite_or_retry(demand);
        if outcome.is_success() {
            slots.set(self.result[0], demand.clamp(0.0, self.max_power));
        }
        outcome
    }
}
