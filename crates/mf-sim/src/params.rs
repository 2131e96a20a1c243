//! Global numeric tuning of the cyclic solver.
//!
//! Read once at setup. The defaults match the usual building-simulation
//! settings: a nonlinear tolerance well below the integrator tolerance and
//! two Newton attempts per outer step.

use serde::{Deserialize, Serialize};

use mf_graph::LayoutOptions;
use mf_solver::NewtonConfig;

use crate::error::{SimError, SimResult};

const DEFAULT_TOLERANCE_BAND: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverParameters {
    /// Relative tolerance of the outer time integrator.
    pub integrator_rel_tol: f64,
    pub nonlinear_rel_tol: f64,
    /// Turned into the scaling band `abs/rel` when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonlinear_abs_tol: Option<f64>,
    pub max_newton_iterations: usize,
    pub max_solver_attempts: usize,
    pub line_search: bool,
    pub strict_newton: bool,
    /// Scale unknowns by `1/(|y| + band)`; unit scaling otherwise.
    pub scale_per_value: bool,
    pub penalty_alpha: f64,
    pub penalty_beta: f64,
    pub dense_size_limit: usize,
    pub dense_fill_ratio: f64,
}

impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            integrator_rel_tol: 1e-5,
            nonlinear_rel_tol: 1e-9,
            nonlinear_abs_tol: None,
            max_newton_iterations: 50,
            max_solver_attempts: 2,
            line_search: true,
            strict_newton: false,
            scale_per_value: true,
            penalty_alpha: 100.0,
            penalty_beta: 200.0,
            dense_size_limit: 16,
            dense_fill_ratio: 0.25,
        }
    }
}

impl SolverParameters {
    pub fn from_yaml_str(content: &str) -> SimResult<Self> {
        let params: Self = serde_yaml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: &std::path::Path) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> SimResult<()> {
        let fail = |what: String| Err(SimError::Parameters { what });
        if !(self.integrator_rel_tol > 0.0) {
            return fail(format!(
                "integrator_rel_tol must be positive, got {}",
                self.integrator_rel_tol
            ));
        }
        if !(self.nonlinear_rel_tol > 0.0 && self.nonlinear_rel_tol <= self.integrator_rel_tol) {
            return fail(format!(
                "nonlinear_rel_tol must lie in (0, {}], got {}",
                self.integrator_rel_tol, self.nonlinear_rel_tol
            ));
        }
        if let Some(abs) = self.nonlinear_abs_tol {
            if !(abs >= 0.0) || !abs.is_finite() {
                return fail(format!("nonlinear_abs_tol must be >= 0, got {}", abs));
            }
        }
        if self.max_newton_iterations == 0 || self.max_solver_attempts == 0 {
            return fail("iteration and attempt limits must be at least 1".to_string());
        }
        if !(self.penalty_alpha > 0.0 && self.penalty_beta > 0.0) {
            return fail(format!(
                "penalty constants must be positive, got alpha = {}, beta = {}",
                self.penalty_alpha, self.penalty_beta
            ));
        }
        if !(0.0..=1.0).contains(&self.dense_fill_ratio) {
            return fail(format!(
                "dense_fill_ratio must lie in [0, 1], got {}",
                self.dense_fill_ratio
            ));
        }
        Ok(())
    }

    /// Offset added to `|y|` in the per-value scaling.
    pub fn tolerance_band(&self) -> f64 {
        match self.nonlinear_abs_tol {
            Some(abs) if abs > 0.0 => abs / self.nonlinear_rel_tol,
            _ => DEFAULT_TOLERANCE_BAND,
        }
    }

    pub fn newton_config(&self) -> NewtonConfig {
        NewtonConfig {
            max_iterations: self.max_newton_iterations,
            max_attempts: self.max_solver_attempts,
            fnorm_tol: self.nonlinear_rel_tol,
            line_search: self.line_search,
            strict_newton: self.strict_newton,
            ..NewtonConfig::default()
        }
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            dense_size_limit: self.dense_size_limit,
            dense_fill_ratio: self.dense_fill_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = SolverParameters::default();
        p.validate().unwrap();
        assert_eq!(p.tolerance_band(), 0.1);
        assert_eq!(p.newton_config().max_attempts, 2);
        assert!(p.newton_config().line_search);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let p = SolverParameters::from_yaml_str(
            "nonlinear_rel_tol: 1.0e-7\nnonlinear_abs_tol: 1.0e-6\nstrict_newton: true\n",
        )
        .unwrap();
        assert_eq!(p.max_newton_iterations, 50);
        assert!(p.strict_newton);
        assert!((p.tolerance_band() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn nonlinear_tolerance_must_not_exceed_integrator_tolerance() {
        let p = SolverParameters {
            nonlinear_rel_tol: 1e-3,
            ..SolverParameters::default()
        };
        assert!(matches!(p.validate(), Err(SimError::Parameters { .. })));

        let p = SolverParameters {
            penalty_beta: 0.0,
            ..SolverParameters::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn malformed_values_are_yaml_errors() {
        assert!(matches!(
            SolverParameters::from_yaml_str("max_newton_iterations: -3\n"),
            Err(SimError::Yaml(_))
        ));
    }
}
