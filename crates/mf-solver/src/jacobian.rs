//! Finite difference Jacobians and their factorization.

use mf_graph::{CsrPattern, JacobianStrategy};
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};

use crate::bounds::Bounds;
use crate::error::{SolverError, SolverResult};
use crate::sparse_lu::{CsrMatrix, SparseLu};
use crate::system::{NonlinearSystem, evaluate};

/// Square root of machine epsilon, the relative forward-difference increment.
const SQRT_EPS: f64 = 1.490_116_119_384_765_6e-8;

/// How the Jacobian is assembled and factored.
#[derive(Debug, Clone)]
pub enum JacobianMode {
    Dense,
    Sparse {
        pattern: CsrPattern,
        /// Structurally orthogonal column groups, perturbed together.
        colors: Vec<Vec<usize>>,
    },
}

impl JacobianMode {
    pub fn sparse(pattern: CsrPattern) -> Self {
        let colors = column_groups(&pattern);
        JacobianMode::Sparse { pattern, colors }
    }

    pub fn from_strategy(strategy: JacobianStrategy, pattern: &CsrPattern) -> Self {
        match strategy {
            JacobianStrategy::Dense => JacobianMode::Dense,
            JacobianStrategy::Sparse => JacobianMode::sparse(pattern.clone()),
        }
    }

    /// Residual evaluations needed per Jacobian.
    pub fn evaluations_per_jacobian(&self, dim: usize) -> usize {
        match self {
            JacobianMode::Dense => dim,
            JacobianMode::Sparse { colors, .. } => colors.len(),
        }
    }
}

/// Greedy coloring: columns sharing a row never share a group.
pub fn column_groups(pattern: &CsrPattern) -> Vec<Vec<usize>> {
    let n = pattern.dim();
    let mut color_of = vec![usize::MAX; n];
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut taken = Vec::new();

    for j in 0..n {
        taken.clear();
        for &i in pattern.column(j) {
            for &k in pattern.row(i) {
                if color_of[k] != usize::MAX {
                    taken.push(color_of[k]);
                }
            }
        }
        let color = (0..).find(|c| !taken.contains(c)).unwrap_or(groups.len());
        if color == groups.len() {
            groups.push(Vec::new());
        }
        groups[color].push(j);
        color_of[j] = color;
    }
    groups
}

fn increment(y: &DVector<f64>, scale: &DVector<f64>, bounds: &Bounds, j: usize) -> f64 {
    let h = SQRT_EPS * y[j].abs().max(1.0 / scale[j]);
    bounds.increment(j, y[j], h)
}

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs y[j] by h and computes (F(y+h) - F(y))/h.
pub fn finite_difference_jacobian<S: NonlinearSystem + ?Sized>(
    system: &mut S,
    y: &DVector<f64>,
    f_y: &DVector<f64>,
    scale: &DVector<f64>,
    bounds: &Bounds,
) -> SolverResult<DMatrix<f64>> {
    let n = y.len();
    let mut jac = DMatrix::zeros(n, n);
    let mut y_perturbed = y.clone();
    let mut f_perturbed = DVector::zeros(n);

    for j in 0..n {
        let h = increment(y, scale, bounds, j);
        y_perturbed[j] = y[j] + h;
        evaluate(system, &y_perturbed, &mut f_perturbed)?;
        y_perturbed[j] = y[j];

        for i in 0..n {
            jac[(i, j)] = (f_perturbed[i] - f_y[i]) / h;
        }
    }

    Ok(jac)
}

/// Forward differences over column groups: one evaluation per color.
pub fn sparse_finite_difference_jacobian<S: NonlinearSystem + ?Sized>(
    system: &mut S,
    y: &DVector<f64>,
    f_y: &DVector<f64>,
    scale: &DVector<f64>,
    bounds: &Bounds,
    pattern: &CsrPattern,
    colors: &[Vec<usize>],
) -> SolverResult<CsrMatrix> {
    let n = y.len();
    let mut jac = CsrMatrix::zeros(pattern.clone());
    let mut y_perturbed = y.clone();
    let mut f_perturbed = DVector::zeros(n);
    let mut steps = vec![0.0; n];

    for group in colors {
        for &j in group {
            steps[j] = increment(y, scale, bounds, j);
            y_perturbed[j] = y[j] + steps[j];
        }
        evaluate(system, &y_perturbed, &mut f_perturbed)?;
        for &j in group {
            y_perturbed[j] = y[j];
            for &i in pattern.column(j) {
                jac.set(i, j, (f_perturbed[i] - f_y[i]) / steps[j]);
            }
        }
    }

    Ok(jac)
}

/// A factored Jacobian, reusable for several Newton iterations.
#[derive(Debug)]
pub enum Factorization {
    Dense(LU<f64, Dyn, Dyn>),
    Sparse(SparseLu),
}

impl Factorization {
    /// Solve `J·x = b`.
    pub fn solve(&self, b: &DVector<f64>) -> Option<DVector<f64>> {
        match self {
            Factorization::Dense(lu) => lu.solve(b),
            Factorization::Sparse(lu) => lu.solve(b),
        }
    }
}

/// Evaluate the Jacobian at `y` and factor it.
pub fn assemble_and_factor<S: NonlinearSystem + ?Sized>(
    mode: &JacobianMode,
    system: &mut S,
    y: &DVector<f64>,
    f_y: &DVector<f64>,
    scale: &DVector<f64>,
    bounds: &Bounds,
) -> SolverResult<Factorization> {
    let singular = || SolverError::Numeric {
        what: "singular Jacobian".to_string(),
    };
    match mode {
        JacobianMode::Dense => {
            let jac = finite_difference_jacobian(system, y, f_y, scale, bounds)?;
            let lu = jac.lu();
            if !lu.is_invertible() {
                return Err(singular());
            }
            Ok(Factorization::Dense(lu))
        }
        JacobianMode::Sparse { pattern, colors } => {
            let jac =
                sparse_finite_difference_jacobian(system, y, f_y, scale, bounds, pattern, colors)?;
            SparseLu::factor(&jac)
                .map(Factorization::Sparse)
                .ok_or_else(singular)
        }
    }
}
