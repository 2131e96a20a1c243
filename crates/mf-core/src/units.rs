// mf-core/src/units.rs

use uom::si::f64::{
    Area as UomArea, HeatTransfer as UomHeatTransfer, Power as UomPower,
    TemperatureInterval as UomTemperatureInterval,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type HeatTransfer = UomHeatTransfer;
pub type Power = UomPower;
pub type TempInterval = UomTemperatureInterval;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

/// Heat transfer coefficient in W/(m²·K).
#[inline]
pub fn w_per_m2k(v: f64) -> HeatTransfer {
    use uom::si::heat_transfer::watt_per_square_meter_kelvin;
    HeatTransfer::new::<watt_per_square_meter_kelvin>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

/// Read a temperature in °C (slot values are stored in °C).
#[inline]
pub fn to_celsius(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    t.get::<degree_celsius>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_store_si_values() {
        assert_eq!(k(300.0).value, 300.0);
        assert!((celsius(20.0).value - 293.15).abs() < 1e-12);
        assert!((to_celsius(celsius(21.5)) - 21.5).abs() < 1e-12);
        assert_eq!(m2(12.0).value, 12.0);
        assert_eq!(watts(500.0).value, 500.0);
        assert_eq!(w_per_m2k(7.7).value, 7.7);
        assert_eq!(s(3600.0).value, 3600.0);
    }
}
