//! Time dependent outdoor temperature.

use crate::common::{check_finite, finite_or_retry};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{Capabilities, InputSlot, ModelComponent, ModelDescriptor};
use mf_core::units::{TempInterval, Temperature, Time, to_celsius};
use mf_core::{ModelId, Outcome, Real, SlotId, SlotStore};

const DAY: Real = 86_400.0;

/// Daily cosine profile `T(t) = mean + amplitude·cos(2π(t - t_peak)/day)`.
///
/// Has no inputs; its only result is `temperature` (°C).
#[derive(Debug, Clone)]
pub struct OutdoorClimate {
    descriptor: ModelDescriptor,
    result: [SlotId; 1],
    mean: Real,
    amplitude: Real,
    peak: Real,
    t: Real,
}

impl OutdoorClimate {
    pub fn new(
        id: ModelId,
        name: &str,
        slots: &mut SlotStore,
        mean: Temperature,
        amplitude: TempInterval,
        peak: Time,
    ) -> ComponentResult<Self> {
        let mean = check_finite(to_celsius(mean), "mean outdoor temperature")?;
        let amplitude = check_finite(amplitude.value, "temperature amplitude")?;
        let peak = check_finite(peak.value, "peak time")?;
        if amplitude < 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "temperature amplitude",
            });
        }
        let mut climate = Self {
            descriptor: ModelDescriptor::new(id, "OutdoorClimate", name)
                .with_capabilities(Capabilities::time_dependent()),
            result: [SlotId::from_index(0)],
            mean,
            amplitude,
            peak,
            t: 0.0,
        };
        climate.result[0] = slots.publish(id, "temperature", climate.at(0.0))?;
        Ok(climate)
    }

    pub fn temperature(&self) -> SlotId {
        self.result[0]
    }

    /// Profile value in °C at `t` seconds.
    pub fn at(&self, t: Real) -> Real {
        let phase = 2.0 * std::f64::consts::PI * (t - self.peak) / DAY;
        self.mean + self.amplitude * phase.cos()
    }
}

impl ModelComponent for OutdoorClimate {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn result_slots(&self) -> &[SlotId] {
        &self.result
    }

    fn inputs(&self) -> &[InputSlot] {
        &[]
    }

    fn inputs_mut(&mut self) -> &mut [InputSlot] {
        &mut []
    }

    fn set_time(&mut self, t: f64) -> Outcome {
        if !t.is_finite() {
            return Outcome::ABORT;
        }
        self.t = t;
        Outcome::SUCCESS
    }

    fn update(&mut self, slots: &mut SlotStore) -> Outcome {
        let value = self.at(self.t);
        let outcome = finite_or_retry(value);
        if outcome.is_success() {
            slots.set(self.result[0], value);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::units::{celsius, s};
    use uom::si::f64::TemperatureInterval;
    use uom::si::temperature_interval::kelvin;

    fn climate(slots: &mut SlotStore) -> OutdoorClimate {
        OutdoorClimate::new(
            ModelId::from_index(0),
            "site",
            slots,
            celsius(5.0),
            TemperatureInterval::new::<kelvin>(4.0),
            s(14.0 * 3600.0),
        )
        .unwrap()
    }

    #[test]
    fn peaks_at_configured_hour() {
        let mut slots = SlotStore::new();
        let mut c = climate(&mut slots);
        assert!(c.descriptor().capabilities.time_dependent);

        assert_eq!(c.set_time(14.0 * 3600.0), Outcome::SUCCESS);
        c.update(&mut slots);
        assert!((slots.value(c.temperature()) - 9.0).abs() < 1e-9);

        c.set_time(2.0 * 3600.0);
        c.update(&mut slots);
        assert!((slots.value(c.temperature()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_time_aborts() {
        let mut slots = SlotStore::new();
        let mut c = climate(&mut slots);
        assert!(c.set_time(f64::NAN).is_abort());
    }
}
