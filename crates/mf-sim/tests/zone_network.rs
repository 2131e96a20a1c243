//! Climate, wall, zone and heating solved together over a day.

use std::f64::consts::PI;

use mf_components::{
    Capabilities, IdealHeating, InputSlot, ModelComponent, ModelDescriptor, OutdoorClimate,
    WallSurface, ZoneAirBalance,
};
use mf_core::units::{celsius, m2, s, w_per_m2k, watts};
use mf_core::{ModelId, Outcome, SlotId, SlotStore};
use mf_graph::{GroupKind, GroupingBuilder, JacobianStrategy};
use mf_sim::{GroupState, SimError, SolverParameters, StepOptions, System, run_steps};
use uom::si::f64::TemperatureInterval;
use uom::si::temperature_interval::kelvin;

const AREA: f64 = 20.0;
const U: f64 = 0.5;
const H: f64 = 8.0;
const GAIN: f64 = 50.0;
const SETPOINT: f64 = 20.0;
const PEAK: f64 = 14.0 * 3600.0;

fn outdoor(t: f64) -> f64 {
    5.0 * (2.0 * PI * (t - PEAK) / 86_400.0).cos()
}

/// Steady air temperature: `A·U_eff·(T_a - T_o) = g·(T_set - T_a)`.
fn expected_air(t: f64) -> f64 {
    let loss = AREA * U * H / (U + H);
    (loss * outdoor(t) + GAIN * SETPOINT) / (loss + GAIN)
}

/// Rejects any time point more than `limit` seconds after the last accepted one.
struct StepLimiter {
    descriptor: ModelDescriptor,
    limit: f64,
    last: f64,
}

impl StepLimiter {
    fn new(id: ModelId, limit: f64) -> Self {
        Self {
            descriptor: ModelDescriptor::new(id, "StepLimiter", "limiter")
                .with_capabilities(Capabilities::time_dependent()),
            limit,
            last: 0.0,
        }
    }
}

impl ModelComponent for StepLimiter {
    fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    fn result_slots(&self) -> &[SlotId] {
        &[]
    }

    fn inputs(&self) -> &[InputSlot] {
        &[]
    }

    fn inputs_mut(&mut self) -> &mut [InputSlot] {
        &mut []
    }

    fn set_time(&mut self, t: f64) -> Outcome {
        if t - self.last > self.limit {
            return Outcome::RECOVERABLE;
        }
        self.last = t;
        Outcome::SUCCESS
    }

    fn update(&mut self, _slots: &mut SlotStore) -> Outcome {
        Outcome::SUCCESS
    }
}

struct Network {
    system: System,
    air: SlotId,
    heating: SlotId,
    heat_flow: SlotId,
}

fn network(params: SolverParameters, step_limit: Option<f64>) -> Network {
    let mut slots = SlotStore::new();
    let ids: Vec<ModelId> = (0..5).map(ModelId::from_index).collect();
    let (c_id, w_id, z_id, h_id, l_id) = (ids[0], ids[1], ids[2], ids[3], ids[4]);

    let climate = OutdoorClimate::new(
        c_id,
        "site",
        &mut slots,
        celsius(0.0),
        TemperatureInterval::new::<kelvin>(5.0),
        s(PEAK),
    )
    .unwrap();
    let wall = WallSurface::new(
        w_id,
        "facade",
        &mut slots,
        m2(AREA),
        w_per_m2k(U),
        w_per_m2k(H),
        InputSlot::to(c_id, "temperature"),
        InputSlot::to(z_id, "air_temperature"),
    )
    .unwrap();
    let zone = ZoneAirBalance::new(
        z_id,
        "office",
        &mut slots,
        celsius(15.0),
        vec![(InputSlot::to(w_id, "surface_temperature"), wall.conductance())],
        Some(InputSlot::to(h_id, "heating_power")),
        watts(0.0),
    )
    .unwrap();
    let heating = IdealHeating::new(
        h_id,
        "radiator",
        &mut slots,
        celsius(SETPOINT),
        GAIN,
        watts(5000.0),
        InputSlot::to(z_id, "air_temperature"),
    )
    .unwrap();

    let air = zone.air_temperature();
    let heating_power = heating.heating_power();
    let heat_flow = wall.heat_flow();

    let mut models: Vec<Box<dyn ModelComponent>> = vec![
        Box::new(climate),
        Box::new(wall),
        Box::new(zone),
        Box::new(heating),
    ];
    let mut builder = GroupingBuilder::new();
    match step_limit {
        Some(limit) => {
            models.push(Box::new(StepLimiter::new(l_id, limit)));
            builder.sequential([l_id, c_id]);
        }
        None => {
            builder.sequential([c_id]);
        }
    }
    builder.push(GroupKind::Cyclic, [w_id, z_id, h_id]);
    let known: Vec<ModelId> = models.iter().map(|m| m.descriptor().id).collect();
    let grouping = builder.build(&known).unwrap();

    Network {
        system: System::new(slots, models, &grouping, params).unwrap(),
        air,
        heating: heating_power,
        heat_flow,
    }
}

#[test]
fn loop_is_solved_at_every_step() {
    let mut net = network(SolverParameters::default(), None);
    let opts = StepOptions::default();
    let record = run_steps(&mut net.system, &opts, &[net.air, net.heating]).unwrap();

    assert_eq!(record.t.len(), 25);
    assert_eq!(record.retries, 0);
    assert_eq!(*record.t.last().unwrap(), 86_400.0);
    for (t, row) in record.t.iter().zip(&record.values) {
        let t_a = row[0];
        assert!(
            (t_a - expected_air(*t)).abs() < 1e-6,
            "t = {t}: T_a = {t_a}, expected {}",
            expected_air(*t)
        );
        assert!((row[1] - GAIN * (SETPOINT - t_a)).abs() < 1e-5);
        assert!(row[1] >= 0.0);
    }

    let group = &net.system.groups()[1];
    assert_eq!(group.state(), GroupState::Converged);
    let layout = group.layout().unwrap();
    assert_eq!(layout.dim(), 3);
    assert_eq!(layout.tail, vec![net.heat_flow]);
    assert_eq!(layout.strategy, JacobianStrategy::Dense);
}

#[test]
fn sparse_jacobian_gives_same_answer() {
    let params = SolverParameters {
        dense_size_limit: 0,
        dense_fill_ratio: 1.0,
        ..SolverParameters::default()
    };
    let mut net = network(params, None);
    net.system.set_time(PEAK).unwrap();
    assert_eq!(net.system.update().unwrap(), Outcome::SUCCESS);

    let layout = net.system.groups()[1].layout().unwrap();
    assert_eq!(layout.strategy, JacobianStrategy::Sparse);
    let t_a = net.system.value(net.air).unwrap();
    assert!((t_a - expected_air(PEAK)).abs() < 1e-6);
}

#[test]
fn tail_heat_flow_matches_loss() {
    let mut net = network(SolverParameters::default(), None);
    net.system.set_time(0.0).unwrap();
    assert!(net.system.update().unwrap().is_success());

    let t_a = net.system.value(net.air).unwrap();
    let q = net.system.value(net.heat_flow).unwrap();
    let loss = AREA * U * H / (U + H);
    // Heat flows from the surface into the air, so it is negative when losing.
    assert!((q + loss * (t_a - outdoor(0.0))).abs() < 1e-5);
}

#[test]
fn rejected_steps_are_cut_back_and_retried() {
    let mut net = network(SolverParameters::default(), Some(1800.0));
    let opts = StepOptions::default();
    let record = run_steps(&mut net.system, &opts, &[net.air]).unwrap();

    assert_eq!(record.t.len(), 49);
    assert_eq!(record.retries, 47);
    assert_eq!(*record.t.last().unwrap(), 86_400.0);
    for w in record.t.windows(2) {
        assert!(w[1] - w[0] <= 1800.0 + 1e-9);
    }
    for (t, row) in record.t.iter().zip(&record.values) {
        assert!((row[0] - expected_air(*t)).abs() < 1e-6);
    }
}

#[test]
fn step_fails_below_minimum_dt() {
    let mut net = network(SolverParameters::default(), Some(0.5));
    let opts = StepOptions {
        dt: 60.0,
        min_dt: 1.0,
        ..StepOptions::default()
    };
    let err = run_steps(&mut net.system, &opts, &[]).unwrap_err();
    assert!(matches!(err, SimError::StepFailed { t, .. } if t == 0.0));
}
