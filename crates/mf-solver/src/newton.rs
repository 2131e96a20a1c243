//! Constrained Newton solver with restarts.
//!
//! Solves `F(y) = 0` in scaled norms:
//! - converged when `max |sc_i·F_i| <= fnorm_tol`, checked on the seed first
//! - modified Newton: a Jacobian is reused until the residual stops falling
//!   by the monitoring factor or it reaches `max_jacobian_age` iterations
//! - strict Newton: fresh Jacobian every iteration, no residual monitoring
//! - optional Armijo backtracking on `0.5·‖sc·F‖²`
//! - hard bounds via direction projection and a fraction-to-boundary step
//! - up to `max_attempts` attempts, each restarting from the last iterate with
//!   a fresh Jacobian

use nalgebra::DVector;
use tracing::{debug, trace};

use crate::bounds::Bounds;
use crate::error::{SolverError, SolverResult};
use crate::jacobian::{Factorization, JacobianMode, assemble_and_factor};
use crate::scaling::{scaled_max_norm, scaled_merit};
use crate::system::{NonlinearSystem, evaluate};

/// Newton solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonConfig {
    /// Maximum iterations per attempt
    pub max_iterations: usize,
    /// Attempts before giving up
    pub max_attempts: usize,
    /// Tolerance on the scaled max-norm of the residual
    pub fnorm_tol: f64,
    /// Scaled steps below this count as stagnation
    pub step_tol: f64,
    /// Armijo backtracking on the scaled residual
    pub line_search: bool,
    /// Jacobian every iteration, residual monitoring off
    pub strict_newton: bool,
    /// Iterations a Jacobian may be reused in modified Newton
    pub max_jacobian_age: usize,
    /// Refresh the Jacobian when `‖F_k‖ > factor·‖F_setup‖`
    pub residual_monitor: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Sufficient decrease constant
    pub armijo: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            max_attempts: 2,
            fnorm_tol: 1e-9,
            step_tol: 1e-13,
            line_search: true,
            strict_newton: false,
            max_jacobian_age: 10,
            residual_monitor: 0.9,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            armijo: 1e-4,
        }
    }
}

/// Per-call problem data: scaling, bounds and Jacobian mode.
#[derive(Debug, Clone, Copy)]
pub struct NewtonProblem<'a> {
    pub scale: &'a DVector<f64>,
    pub bounds: &'a Bounds,
    pub jacobian: &'a JacobianMode,
}

/// Newton iteration result.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonResult {
    /// Solution vector
    pub y: DVector<f64>,
    /// Final scaled residual max-norm
    pub fnorm: f64,
    /// Iterations over all attempts
    pub iterations: usize,
    /// Attempt that converged (0 when the seed already did)
    pub attempts: usize,
    /// Jacobian evaluations
    pub jacobian_evals: usize,
}

struct Iterate {
    y: DVector<f64>,
    f: DVector<f64>,
    fnorm: f64,
    merit: f64,
}

#[derive(Default)]
struct Stats {
    iterations: usize,
    jacobian_evals: usize,
}

/// Solve `F(y) = 0` starting from `y0`.
///
/// Never returns a non-converged iterate: exhausting the budget yields
/// [`SolverError::ConvergenceFailed`].
pub fn newton_solve<S: NonlinearSystem + ?Sized>(
    system: &mut S,
    y0: DVector<f64>,
    problem: &NewtonProblem<'_>,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult> {
    let n = system.dim();
    if n == 0 {
        return Err(SolverError::ProblemSetup {
            what: "empty system".to_string(),
        });
    }
    if y0.len() != n || problem.scale.len() != n || problem.bounds.len() != n {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "dimension mismatch: system {}, seed {}, scale {}, bounds {}",
                n,
                y0.len(),
                problem.scale.len(),
                problem.bounds.len()
            ),
        });
    }

    let mut y = y0;
    problem.bounds.clamp(&mut y);
    let mut f = DVector::zeros(n);
    evaluate(system, &y, &mut f)?;
    let mut it = Iterate {
        fnorm: scaled_max_norm(&f, problem.scale),
        merit: scaled_merit(&f, problem.scale),
        y,
        f,
    };

    let mut stats = Stats::default();
    if it.fnorm <= config.fnorm_tol {
        trace!(fnorm = it.fnorm, "initial guess satisfies tolerance");
        return Ok(finish(it, 0, stats));
    }

    let mut last_err = None;
    for attempt in 1..=config.max_attempts.max(1) {
        match run_attempt(system, &mut it, problem, config, &mut stats) {
            Ok(()) => {
                debug!(
                    attempt,
                    iterations = stats.iterations,
                    jacobians = stats.jacobian_evals,
                    fnorm = it.fnorm,
                    "Newton converged"
                );
                return Ok(finish(it, attempt, stats));
            }
            Err(e) if e.is_retryable() => {
                debug!(attempt, fnorm = it.fnorm, error = %e, "Newton attempt failed");
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| SolverError::ConvergenceFailed {
        what: "no attempts".to_string(),
    }))
}

fn finish(it: Iterate, attempts: usize, stats: Stats) -> NewtonResult {
    NewtonResult {
        y: it.y,
        fnorm: it.fnorm,
        iterations: stats.iterations,
        attempts,
        jacobian_evals: stats.jacobian_evals,
    }
}

fn run_attempt<S: NonlinearSystem + ?Sized>(
    system: &mut S,
    it: &mut Iterate,
    problem: &NewtonProblem<'_>,
    config: &NewtonConfig,
    stats: &mut Stats,
) -> SolverResult<()> {
    let n = it.y.len();
    let mut factor: Option<Factorization> = None;
    let mut age = 0;
    let mut norm_at_setup = f64::INFINITY;
    let mut y_trial = DVector::zeros(n);
    let mut f_trial = DVector::zeros(n);

    for _ in 0..config.max_iterations {
        stats.iterations += 1;

        let lu = match factor.take() {
            Some(lu) if !config.strict_newton && age < config.max_jacobian_age => lu,
            _ => {
                let lu = assemble_and_factor(
                    problem.jacobian,
                    system,
                    &it.y,
                    &it.f,
                    problem.scale,
                    problem.bounds,
                )?;
                stats.jacobian_evals += 1;
                age = 0;
                norm_at_setup = (2.0 * it.merit).sqrt();
                lu
            }
        };
        let fresh = age == 0;

        let mut dy = lu.solve(&(-&it.f)).ok_or_else(|| SolverError::Numeric {
            what: "linear solve failed".to_string(),
        })?;
        problem.bounds.project_direction(&it.y, &mut dy);
        let t = problem.bounds.max_step(&it.y, &dy);
        dy *= t;

        if scaled_max_norm(&dy, problem.scale) <= config.step_tol {
            if !fresh {
                // Stale Jacobian: retry this iterate with a fresh one.
                continue;
            }
            return Err(SolverError::ConvergenceFailed {
                what: format!("scaled step below tolerance, residual = {:e}", it.fnorm),
            });
        }

        let Some(lambda) = line_search(
            system,
            it,
            &dy,
            problem,
            config,
            &mut y_trial,
            &mut f_trial,
        )?
        else {
            if !fresh {
                continue;
            }
            return Err(SolverError::ConvergenceFailed {
                what: format!("line search failed, residual = {:e}", it.fnorm),
            });
        };

        std::mem::swap(&mut it.y, &mut y_trial);
        std::mem::swap(&mut it.f, &mut f_trial);
        it.fnorm = scaled_max_norm(&it.f, problem.scale);
        it.merit = scaled_merit(&it.f, problem.scale);
        age += 1;
        trace!(
            iteration = stats.iterations,
            fnorm = it.fnorm,
            lambda,
            "Newton step"
        );

        if it.fnorm <= config.fnorm_tol {
            return Ok(());
        }

        let monitor_ok =
            config.strict_newton || (2.0 * it.merit).sqrt() <= config.residual_monitor * norm_at_setup;
        if monitor_ok {
            factor = Some(lu);
        }
    }

    Err(SolverError::ConvergenceFailed {
        what: format!(
            "Maximum iterations {} reached, residual = {:e}",
            config.max_iterations, it.fnorm
        ),
    })
}

/// Backtrack along `dy` until sufficient decrease.
///
/// Without line search the full step is taken. `Ok(None)` means no
/// acceptable step length was found.
fn line_search<S: NonlinearSystem + ?Sized>(
    system: &mut S,
    it: &Iterate,
    dy: &DVector<f64>,
    problem: &NewtonProblem<'_>,
    config: &NewtonConfig,
    y_trial: &mut DVector<f64>,
    f_trial: &mut DVector<f64>,
) -> SolverResult<Option<f64>> {
    let tries = if config.line_search {
        config.max_line_search_iters
    } else {
        0
    };
    let mut lambda = 1.0;

    for _ in 0..=tries {
        y_trial.copy_from(&it.y);
        y_trial.axpy(lambda, dy, 1.0);
        problem.bounds.clamp(y_trial);

        match evaluate(system, y_trial, f_trial) {
            Ok(()) => {
                if !config.line_search {
                    return Ok(Some(lambda));
                }
                let merit = scaled_merit(f_trial, problem.scale);
                if merit <= (1.0 - 2.0 * config.armijo * lambda) * it.merit {
                    return Ok(Some(lambda));
                }
            }
            Err(SolverError::Numeric { .. }) if config.line_search => {}
            Err(e) => return Err(e),
        }
        lambda *= config.line_search_beta;
    }
    Ok(None)
}
