//! Scenario files: one zone, its walls, optional heating and an outdoor
//! climate, assembled into a [`System`].

use std::path::Path;

use mf_components::{
    IdealHeating, InputSlot, ModelComponent, OutdoorClimate, WallSurface, ZoneAirBalance,
};
use mf_core::units::{celsius, m2, s, w_per_m2k, watts};
use mf_core::{ModelId, SlotId, SlotStore};
use mf_graph::GroupingBuilder;
use mf_sim::{SolverParameters, StepOptions, System};
use serde::{Deserialize, Serialize};
use uom::si::f64::TemperatureInterval;
use uom::si::temperature_interval::kelvin;

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub climate: ClimateDef,
    pub zone: ZoneDef,
    #[serde(default)]
    pub walls: Vec<WallDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating: Option<HeatingDef>,
    #[serde(default)]
    pub steps: StepsDef,
    #[serde(default)]
    pub solver: SolverParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateDef {
    pub mean_c: f64,
    #[serde(default)]
    pub amplitude_k: f64,
    #[serde(default = "default_peak_hour")]
    pub peak_hour: f64,
}

fn default_peak_hour() -> f64 {
    14.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneDef {
    pub name: String,
    pub initial_c: f64,
    #[serde(default)]
    pub internal_gains_w: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WallDef {
    pub name: String,
    pub area_m2: f64,
    pub u_w_m2k: f64,
    pub h_w_m2k: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatingDef {
    pub name: String,
    pub setpoint_c: f64,
    pub gain_w_per_k: f64,
    pub max_power_w: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StepsDef {
    pub t_start_s: f64,
    pub t_end_s: f64,
    pub dt_s: f64,
    pub min_dt_s: f64,
    pub max_retries: usize,
}

impl Default for StepsDef {
    fn default() -> Self {
        let opts = StepOptions::default();
        Self {
            t_start_s: opts.t_start,
            t_end_s: opts.t_end,
            dt_s: opts.dt,
            min_dt_s: opts.min_dt,
            max_retries: opts.max_retries,
        }
    }
}

impl StepsDef {
    pub fn to_options(&self) -> StepOptions {
        StepOptions {
            t_start: self.t_start_s,
            t_end: self.t_end_s,
            dt: self.dt_s,
            min_dt: self.min_dt_s,
            max_retries: self.max_retries,
            ..StepOptions::default()
        }
    }
}

/// A built scenario and the slots worth reporting.
pub struct Built {
    pub system: System,
    pub air: SlotId,
    pub heating: Option<SlotId>,
    pub steps: StepOptions,
}

pub fn load_scenario(path: &Path) -> CliResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    parse_scenario(&content)
}

pub fn parse_scenario(content: &str) -> CliResult<Scenario> {
    let scenario: Scenario = serde_yaml::from_str(content)?;
    if scenario.walls.is_empty() {
        return Err(CliError::Scenario(format!(
            "scenario '{}' has no walls",
            scenario.name
        )));
    }
    Ok(scenario)
}

/// Model ids: climate 0, walls 1..=n, zone n+1, heating n+2.
///
/// The climate forms a sequential group; walls, zone and heating are one
/// cyclic group.
pub fn build(scenario: &Scenario) -> CliResult<Built> {
    let mut slots = SlotStore::new();
    let n = scenario.walls.len();
    let climate_id = ModelId::from_index(0);
    let zone_id = ModelId::try_from_index(n + 1)?;
    let heating_id = ModelId::try_from_index(n + 2)?;

    let climate = OutdoorClimate::new(
        climate_id,
        "outdoor",
        &mut slots,
        celsius(scenario.climate.mean_c),
        TemperatureInterval::new::<kelvin>(scenario.climate.amplitude_k),
        s(scenario.climate.peak_hour * 3600.0),
    )?;

    let mut walls = Vec::with_capacity(scenario.walls.len());
    let mut surfaces = Vec::with_capacity(scenario.walls.len());
    for (i, def) in scenario.walls.iter().enumerate() {
        let id = ModelId::try_from_index(i + 1)?;
        let wall = WallSurface::new(
            id,
            &def.name,
            &mut slots,
            m2(def.area_m2),
            w_per_m2k(def.u_w_m2k),
            w_per_m2k(def.h_w_m2k),
            InputSlot::to(climate_id, "temperature"),
            InputSlot::to(zone_id, "air_temperature"),
        )?;
        surfaces.push((
            InputSlot::to(id, "surface_temperature"),
            wall.conductance(),
        ));
        walls.push(wall);
    }

    let zone = ZoneAirBalance::new(
        zone_id,
        &scenario.zone.name,
        &mut slots,
        celsius(scenario.zone.initial_c),
        surfaces,
        scenario
            .heating
            .as_ref()
            .map(|_| InputSlot::to(heating_id, "heating_power")),
        watts(scenario.zone.internal_gains_w),
    )?;
    let air = zone.air_temperature();

    let heating = scenario
        .heating
        .as_ref()
        .map(|def| {
            IdealHeating::new(
                heating_id,
                &def.name,
                &mut slots,
                celsius(def.setpoint_c),
                def.gain_w_per_k,
                watts(def.max_power_w),
                InputSlot::to(zone_id, "air_temperature"),
            )
        })
        .transpose()?;
    let heating_slot = heating.as_ref().map(IdealHeating::heating_power);

    let mut models: Vec<Box<dyn ModelComponent>> = vec![Box::new(climate)];
    let mut cyclic = Vec::new();
    for wall in walls {
        cyclic.push(wall.descriptor().id);
        models.push(Box::new(wall));
    }
    cyclic.push(zone_id);
    models.push(Box::new(zone));
    if let Some(heating) = heating {
        cyclic.push(heating_id);
        models.push(Box::new(heating));
    }

    let mut builder = GroupingBuilder::new();
    builder.sequential([climate_id]);
    builder.cyclic(cyclic);
    let known: Vec<ModelId> = models.iter().map(|m| m.descriptor().id).collect();
    let grouping = builder.build(&known).map_err(mf_sim::SimError::from)?;

    let system = System::new(slots, models, &grouping, scenario.solver.clone())?;
    Ok(Built {
        system,
        air,
        heating: heating_slot,
        steps: scenario.steps.to_options(),
    })
}
