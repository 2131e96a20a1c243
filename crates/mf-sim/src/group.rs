//! Group orchestrator: one `update()` per evaluation group.

use mf_components::ModelComponent;
use mf_core::{Outcome, SlotId, SlotStore};
use mf_graph::{CyclicLayout, GroupKind, LayoutOptions, build_cyclic_layout, extract_pattern};
use mf_solver::{
    Bounds, JacobianMode, NewtonConfig, NewtonProblem, NonlinearSystem, SolverError,
    newton_solve, value_scaling,
};
use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::cyclic::{CyclicResidual, Penalty};
use crate::error::SimResult;
use crate::params::SolverParameters;

/// Lifecycle of a group between outer steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    /// Not evaluated yet.
    Idle,
    /// Inside `update()`.
    Evaluating,
    /// Last update succeeded.
    Converged,
    /// Last update returned a retry or abort.
    Failed,
}

/// Solver settings of a group, fixed at setup.
#[derive(Debug, Clone)]
pub struct GroupSettings {
    pub newton: NewtonConfig,
    pub layout: LayoutOptions,
    pub tolerance_band: f64,
    pub scale_per_value: bool,
    pub penalty: Penalty,
}

impl From<&SolverParameters> for GroupSettings {
    fn from(p: &SolverParameters) -> Self {
        Self {
            newton: p.newton_config(),
            layout: p.layout_options(),
            tolerance_band: p.tolerance_band(),
            scale_per_value: p.scale_per_value,
            penalty: Penalty {
                alpha: p.penalty_alpha,
                beta: p.penalty_beta,
            },
        }
    }
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self::from(&SolverParameters::default())
    }
}

/// Counters over the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub updates: usize,
    pub failures: usize,
    pub newton_iterations: usize,
    pub jacobian_evals: usize,
}

/// Numeric state of a cyclic group, built on the first update.
#[derive(Debug)]
struct CyclicState {
    layout: CyclicLayout,
    mode: JacobianMode,
    bounds: Bounds,
    /// Every result slot of every member, for whole-group restore.
    owned: Vec<SlotId>,
    y: DVector<f64>,
    y_prev: DVector<f64>,
    scale: DVector<f64>,
    last_ok: bool,
}

/// An evaluation group and the models it owns.
pub struct ModelGroup {
    kind: GroupKind,
    models: Vec<Box<dyn ModelComponent>>,
    settings: GroupSettings,
    state: GroupState,
    cyclic: Option<CyclicState>,
    abort_source: Option<String>,
    stats: GroupStats,
}

impl std::fmt::Debug for ModelGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGroup")
            .field("kind", &self.kind)
            .field("members", &self.member_labels())
            .field("state", &self.state)
            .finish()
    }
}

impl ModelGroup {
    pub fn new(
        kind: GroupKind,
        models: Vec<Box<dyn ModelComponent>>,
        settings: GroupSettings,
    ) -> Self {
        Self {
            kind,
            models,
            settings,
            state: GroupState::Idle,
            cyclic: None,
            abort_source: None,
            stats: GroupStats::default(),
        }
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn state(&self) -> GroupState {
        self.state
    }

    pub fn stats(&self) -> GroupStats {
        self.stats
    }

    pub fn models(&self) -> &[Box<dyn ModelComponent>] {
        &self.models
    }

    pub(crate) fn models_mut(&mut self) -> &mut [Box<dyn ModelComponent>] {
        &mut self.models
    }

    pub fn member_labels(&self) -> Vec<String> {
        self.models.iter().map(|m| m.descriptor().label()).collect()
    }

    /// Member that aborted the last update, if any.
    pub fn abort_source(&self) -> Option<&str> {
        self.abort_source.as_deref()
    }

    /// Cyclic structure, once built.
    pub fn layout(&self) -> Option<&CyclicLayout> {
        self.cyclic.as_ref().map(|c| &c.layout)
    }

    /// Last accepted solution of a cyclic group, in unknown space.
    pub fn previous_solution(&self) -> Option<&DVector<f64>> {
        self.cyclic.as_ref().map(|c| &c.y_prev)
    }

    /// Current iterate of a cyclic group, in unknown space.
    pub fn unknown_values(&self) -> Option<&DVector<f64>> {
        self.cyclic.as_ref().map(|c| &c.y)
    }

    /// Build the cyclic structure now instead of on the first update.
    pub fn initialize(&mut self, slots: &SlotStore) -> SimResult<()> {
        if self.kind == GroupKind::Cyclic && self.cyclic.is_none() {
            self.cyclic = Some(self.build_cyclic(slots)?);
        }
        Ok(())
    }

    /// Evaluate the group once.
    ///
    /// Configuration problems found while building a cyclic group are errors;
    /// everything else is reported through the returned outcome.
    pub fn update(&mut self, slots: &mut SlotStore) -> SimResult<Outcome> {
        self.initialize(slots)?;
        self.state = GroupState::Evaluating;
        self.abort_source = None;
        self.stats.updates += 1;

        let outcome = match self.kind {
            GroupKind::Sequential => self.update_sequential(slots),
            GroupKind::Cyclic => self.update_cyclic(slots),
        };

        if outcome.is_success() {
            self.state = GroupState::Converged;
        } else {
            self.state = GroupState::Failed;
            self.stats.failures += 1;
        }
        Ok(outcome)
    }

    fn update_sequential(&mut self, slots: &mut SlotStore) -> Outcome {
        let mut combined = Outcome::SUCCESS;
        for model in &mut self.models {
            let outcome = model.update(slots);
            if outcome.is_abort() && self.abort_source.is_none() {
                self.abort_source = Some(model.descriptor().label());
            }
            combined |= outcome;
        }
        combined
    }

    fn build_cyclic(&self, slots: &SlotStore) -> SimResult<CyclicState> {
        let members: Vec<&dyn ModelComponent> = self.models.iter().map(|m| m.as_ref()).collect();
        let pairs = extract_pattern(&members, slots)?;
        let layout = build_cyclic_layout(&members, &pairs, slots, self.settings.layout)?;

        let n = layout.dim();
        let bounds = Bounds {
            lower: layout.unknowns.iter().map(|u| u.lower).collect(),
            upper: layout.unknowns.iter().map(|u| u.upper).collect(),
        };
        let mode = JacobianMode::from_strategy(layout.strategy, &layout.pattern);
        let owned = self
            .models
            .iter()
            .flat_map(|m| m.result_slots().iter().copied())
            .collect();
        let y_prev = DVector::from_iterator(
            n,
            layout.unknowns.iter().map(|u| u.to_unknown(slots.value(u.slot))),
        );

        info!(
            members = ?self.member_labels(),
            unknowns = n,
            tail = layout.tail.len(),
            nnz = layout.pattern.nnz(),
            strategy = ?layout.strategy,
            "initialized cyclic group"
        );

        Ok(CyclicState {
            layout,
            mode,
            bounds,
            owned,
            y: y_prev.clone(),
            y_prev,
            scale: DVector::from_element(n, 1.0),
            last_ok: true,
        })
    }

    fn update_cyclic(&mut self, slots: &mut SlotStore) -> Outcome {
        let Some(cs) = self.cyclic.as_mut() else {
            return Outcome::ABORT;
        };
        let snapshot = slots.snapshot(&cs.owned);

        if cs.last_ok {
            for (i, u) in cs.layout.unknowns.iter().enumerate() {
                cs.y_prev[i] = u.to_unknown(slots.value(u.slot));
            }
        } else {
            for (i, u) in cs.layout.unknowns.iter().enumerate() {
                slots.set(u.slot, u.to_value(cs.y_prev[i]));
            }
        }
        cs.y.copy_from(&cs.y_prev);

        cs.scale = if self.settings.scale_per_value {
            value_scaling(&cs.y, self.settings.tolerance_band)
        } else {
            DVector::from_element(cs.y.len(), 1.0)
        };

        let mut residual = CyclicResidual {
            models: &mut self.models,
            slots: &mut *slots,
            unknowns: &cs.layout.unknowns,
            penalty: self.settings.penalty,
            failed: None,
        };
        let problem = NewtonProblem {
            scale: &cs.scale,
            bounds: &cs.bounds,
            jacobian: &cs.mode,
        };

        let solved = newton_solve(&mut residual, cs.y.clone(), &problem, &self.settings.newton)
            .and_then(|result| {
                // Leave every member consistent with the converged iterate.
                let mut f = DVector::zeros(result.y.len());
                let outcome = residual.residual(&result.y, &mut f);
                if outcome.is_success() {
                    Ok(result)
                } else if outcome.is_abort() {
                    Err(SolverError::Aborted {
                        what: "final evaluation".to_string(),
                    })
                } else {
                    Err(SolverError::Recoverable {
                        what: "final evaluation".to_string(),
                    })
                }
            });
        let failed = residual.failed;

        match solved {
            Ok(result) => {
                debug!(
                    iterations = result.iterations,
                    attempts = result.attempts,
                    fnorm = result.fnorm,
                    "cyclic group converged"
                );
                self.stats.newton_iterations += result.iterations;
                self.stats.jacobian_evals += result.jacobian_evals;
                cs.y.copy_from(&result.y);
                cs.y_prev.copy_from(&result.y);
                cs.last_ok = true;
                Outcome::SUCCESS
            }
            Err(e) => {
                slots.restore(&cs.owned, &snapshot);
                cs.last_ok = false;
                let outcome = e.outcome();
                if outcome.is_abort() {
                    self.abort_source = Some(match failed {
                        Some(k) => self.models[k].descriptor().label(),
                        None => self.member_labels().join(", "),
                    });
                } else {
                    warn!(
                        members = ?self.member_labels(),
                        error = %e,
                        "Convergence error of cyclic group. Try again with updated Jacobian or reduce time step."
                    );
                }
                outcome
            }
        }
    }
}
