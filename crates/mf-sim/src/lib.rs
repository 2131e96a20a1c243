//! Group orchestration for coupled model systems.
//!
//! Provides:
//! - `ModelGroup`: sequential or simultaneous evaluation of one group
//! - `System`: slots, models and groups assembled from a grouping
//! - `SolverParameters`: YAML-loadable numeric tuning
//! - `run_steps`: an outer-step driver that cuts the step on retry requests

pub mod cyclic;
pub mod driver;
pub mod error;
pub mod group;
pub mod params;
pub mod system;

pub use cyclic::Penalty;
pub use driver::{StepOptions, StepRecord, run_steps};
pub use error::{SimError, SimResult};
pub use group::{GroupSettings, GroupState, GroupStats, ModelGroup};
pub use params::SolverParameters;
pub use system::System;
