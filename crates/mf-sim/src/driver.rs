//! Outer-step driver with cut-back.
//!
//! Advances a [`System`] over `[t_start, t_end]`. A recoverable outcome cuts
//! the step and retries from the same time; a fatal outcome ends the run. No
//! ODE states are integrated here: each accepted step is one successful
//! evaluation of all groups at the new time point.

use mf_core::{Real, SlotId};
use tracing::{debug, warn};

use crate::error::{SimError, SimResult};
use crate::system::System;

/// Options for [`run_steps`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepOptions {
    /// Start time (seconds)
    pub t_start: Real,
    /// Final time (seconds)
    pub t_end: Real,
    /// Initial and maximum step (seconds)
    pub dt: Real,
    /// Smallest step before giving up
    pub min_dt: Real,
    /// Consecutive failures allowed per step
    pub max_retries: usize,
    /// Step reduction after a recoverable failure
    pub cutback_factor: Real,
    /// Step growth after a success
    pub grow_factor: Real,
    /// Safety limit on accepted steps
    pub max_steps: usize,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            t_start: 0.0,
            t_end: 86_400.0,
            dt: 3_600.0,
            min_dt: 1.0,
            max_retries: 8,
            cutback_factor: 0.5,
            grow_factor: 2.0,
            max_steps: 100_000,
        }
    }
}

impl StepOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(self.min_dt > 0.0 && self.min_dt <= self.dt) {
            return Err(SimError::InvalidArg {
                what: "min_dt must lie in (0, dt]",
            });
        }
        if self.t_end < self.t_start {
            return Err(SimError::InvalidArg {
                what: "t_end must not precede t_start",
            });
        }
        if !(self.cutback_factor > 0.0 && self.cutback_factor < 1.0) {
            return Err(SimError::InvalidArg {
                what: "cutback_factor must lie in (0, 1)",
            });
        }
        if self.grow_factor < 1.0 {
            return Err(SimError::InvalidArg {
                what: "grow_factor must be at least 1",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }
}

/// Accepted time points and the recorded slot values at each.
#[derive(Clone, Debug, Default)]
pub struct StepRecord {
    pub t: Vec<Real>,
    /// One row per time point, one column per recorded slot.
    pub values: Vec<Vec<Real>>,
    /// Recoverable failures absorbed by cut-back.
    pub retries: usize,
}

fn sample(system: &System, watched: &[SlotId]) -> Vec<Real> {
    watched
        .iter()
        .map(|&s| system.value(s).unwrap_or(Real::NAN))
        .collect()
}

/// Evaluate at `t` once: time hook, then all groups.
fn evaluate_at(system: &mut System, t: Real) -> SimResult<bool> {
    let outcome = system.set_time(t)?;
    if !outcome.is_success() {
        return Ok(false);
    }
    Ok(system.update()?.is_success())
}

/// Run the system from `t_start` to `t_end`, recording `watched`.
pub fn run_steps(
    system: &mut System,
    opts: &StepOptions,
    watched: &[SlotId],
) -> SimResult<StepRecord> {
    opts.validate()?;

    let mut record = StepRecord::default();
    let mut t = opts.t_start;
    if !evaluate_at(system, t)? {
        return Err(SimError::StepFailed {
            t,
            what: "initial evaluation did not converge".to_string(),
        });
    }
    record.t.push(t);
    record.values.push(sample(system, watched));

    let mut dt = opts.dt;
    let mut steps = 0;
    while t < opts.t_end && steps < opts.max_steps {
        let mut retries = 0;
        loop {
            let last = dt >= opts.t_end - t;
            let t_next = if last { opts.t_end } else { t + dt };
            if evaluate_at(system, t_next)? {
                t = t_next;
                break;
            }
            retries += 1;
            record.retries += 1;
            dt *= opts.cutback_factor;
            warn!(t, dt, retries, "step rejected, cutting back");
            if retries > opts.max_retries || dt < opts.min_dt {
                return Err(SimError::StepFailed {
                    t,
                    what: format!("no convergence after {} cut-backs", retries),
                });
            }
        }
        steps += 1;
        record.t.push(t);
        record.values.push(sample(system, watched));
        debug!(t, dt, "step accepted");
        dt = (dt * opts.grow_factor).min(opts.dt);
    }

    Ok(record)
}
