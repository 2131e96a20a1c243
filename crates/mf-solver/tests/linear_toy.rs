//! Newton on small fixed-point systems, dense and sparse.

use mf_core::Outcome;
use mf_graph::CsrPattern;
use mf_solver::{
    Bounds, FnSystem, JacobianMode, NewtonConfig, NewtonProblem, newton_solve, value_scaling,
};
use nalgebra::DVector;
use proptest::prelude::*;

/// F(y) = y - f(y) for y1 = a·y2 + c1, y2 = b·y1 + c2.
fn coupled_pair(a: f64, b: f64, c1: f64, c2: f64) -> impl FnMut(&DVector<f64>, &mut DVector<f64>) -> Outcome {
    move |y: &DVector<f64>, f: &mut DVector<f64>| {
        f[0] = y[0] - (a * y[1] + c1);
        f[1] = y[1] - (b * y[0] + c2);
        Outcome::SUCCESS
    }
}

fn closed_form(a: f64, b: f64, c1: f64, c2: f64) -> (f64, f64) {
    let y1 = (a * c2 + c1) / (1.0 - a * b);
    (y1, b * y1 + c2)
}

proptest! {
    #[test]
    fn linear_pair_converges_in_few_iterations(
        a in -0.95f64..0.95,
        b in -0.95f64..0.95,
        c1 in -100.0f64..100.0,
        c2 in -100.0f64..100.0,
        y1 in -1e3f64..1e3,
        y2 in -1e3f64..1e3,
    ) {
        let mut sys = FnSystem::new(2, coupled_pair(a, b, c1, c2));
        let y0 = DVector::from_vec(vec![y1, y2]);
        let scale = DVector::from_element(2, 1.0);
        let bounds = Bounds::none(2);
        let mode = JacobianMode::Dense;
        let problem = NewtonProblem { scale: &scale, bounds: &bounds, jacobian: &mode };
        let config = NewtonConfig { fnorm_tol: 1e-9, ..NewtonConfig::default() };

        let result = newton_solve(&mut sys, y0, &problem, &config).unwrap();
        let (e1, e2) = closed_form(a, b, c1, c2);
        prop_assert!(result.iterations <= 4, "iterations = {}", result.iterations);
        prop_assert!((result.y[0] - e1).abs() <= 1e-6 * (1.0 + e1.abs()));
        prop_assert!((result.y[1] - e2).abs() <= 1e-6 * (1.0 + e2.abs()));
    }
}

#[test]
fn sparse_chain_loop_matches_closed_form() {
    // y_i = 0.5·y_{i-1} + 1 around a ring of 40 unknowns.
    let n = 40;
    let mut adj = vec![vec![false; n]; n];
    for i in 0..n {
        adj[i][(i + n - 1) % n] = true;
    }
    let pattern = CsrPattern::from_adjacency(&adj);
    let mode = JacobianMode::sparse(pattern);
    assert_eq!(mode.evaluations_per_jacobian(n), 2);

    let mut sys = FnSystem::new(n, |y: &DVector<f64>, f: &mut DVector<f64>| {
        let n = y.len();
        for i in 0..n {
            f[i] = y[i] - (0.5 * y[(i + n - 1) % n] + 1.0);
        }
        Outcome::SUCCESS
    });
    let y0 = DVector::zeros(n);
    let scale = value_scaling(&y0, 0.1);
    let bounds = Bounds::none(n);
    let problem = NewtonProblem {
        scale: &scale,
        bounds: &bounds,
        jacobian: &mode,
    };
    let result = newton_solve(&mut sys, y0, &problem, &NewtonConfig::default()).unwrap();

    // Fixed point y = 0.5·y + 1.
    assert!(result.y.iter().all(|v| (v - 2.0).abs() < 1e-8));
    assert_eq!(result.jacobian_evals, 1);
}

#[test]
fn recoverable_evaluation_is_surfaced_not_retried() {
    let mut calls = 0;
    let mut sys = FnSystem::new(1, |y: &DVector<f64>, f: &mut DVector<f64>| {
        calls += 1;
        f[0] = y[0] - 3.0;
        if calls == 3 { Outcome::RECOVERABLE } else { Outcome::SUCCESS }
    });
    let scale = DVector::from_element(1, 1.0);
    let bounds = Bounds::none(1);
    let mode = JacobianMode::Dense;
    let problem = NewtonProblem {
        scale: &scale,
        bounds: &bounds,
        jacobian: &mode,
    };
    let err = newton_solve(&mut sys, DVector::zeros(1), &problem, &NewtonConfig::default())
        .unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(err.outcome(), Outcome::RECOVERABLE);
    drop(sys);
    assert_eq!(calls, 3);
}
