//! Sparse Jacobian values and their LU factorization.
//!
//! Values are stored along a [`CsrPattern`]; factoring hands them to `faer`'s
//! sparse LU with partial pivoting.

use std::fmt;

use faer::Mat;
use faer::prelude::*;
use faer::sparse::SparseColMat;
use faer::sparse::linalg::solvers::Lu;
use mf_graph::CsrPattern;
use nalgebra::DVector;

/// Values laid out along a [`CsrPattern`].
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    pub pattern: CsrPattern,
    /// One value per structural entry, in row-major CSR order.
    pub values: Vec<f64>,
}

impl CsrMatrix {
    pub fn zeros(pattern: CsrPattern) -> Self {
        let values = vec![0.0; pattern.nnz()];
        Self { pattern, values }
    }

    /// Set entry `(i, j)`; ignored if not structurally present.
    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        let start = self.pattern.row_offset(i);
        if let Ok(k) = self.pattern.row(i).binary_search(&j) {
            self.values[start + k] = v;
        }
    }

    /// Structural entries as `(row, column, value)`.
    pub fn triplets(&self) -> Vec<(usize, usize, f64)> {
        let n = self.pattern.dim();
        let mut out = Vec::with_capacity(self.values.len());
        for i in 0..n {
            let start = self.pattern.row_offset(i);
            for (k, &j) in self.pattern.row(i).iter().enumerate() {
                out.push((i, j, self.values[start + k]));
            }
        }
        out
    }

    #[cfg(test)]
    pub fn to_dense(&self) -> nalgebra::DMatrix<f64> {
        let n = self.pattern.dim();
        let mut m = nalgebra::DMatrix::zeros(n, n);
        for (i, j, v) in self.triplets() {
            m[(i, j)] = v;
        }
        m
    }
}

/// A factored sparse Jacobian.
pub struct SparseLu {
    n: usize,
    lu: Lu<usize, f64>,
}

impl fmt::Debug for SparseLu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseLu").field("n", &self.n).finish_non_exhaustive()
    }
}

impl SparseLu {
    /// Factor `a`; `None` if faer rejects it as structurally singular.
    pub fn factor(a: &CsrMatrix) -> Option<Self> {
        let n = a.pattern.dim();
        let mat = SparseColMat::<usize, f64>::try_new_from_triplets(n, n, &a.triplets()).ok()?;
        let lu = mat.as_ref().sp_lu().ok()?;
        Some(Self { n, lu })
    }

    /// Solve `A·x = b`.
    ///
    /// A zero pivot surfaces as a non-finite solution, reported as `None`.
    pub fn solve(&self, b: &DVector<f64>) -> Option<DVector<f64>> {
        let rhs = Mat::<f64>::from_fn(self.n, 1, |i, _| b[i]);
        let x = self.lu.solve(rhs.as_ref());
        let x = DVector::from_fn(self.n, |i, _| x[(i, 0)]);
        x.iter().all(|v| v.is_finite()).then_some(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matrix(n: usize, entries: &[(usize, usize, f64)]) -> CsrMatrix {
        let mut adj = vec![vec![false; n]; n];
        for &(i, j, _) in entries {
            adj[i][j] = true;
        }
        let mut m = CsrMatrix::zeros(CsrPattern::from_adjacency(&adj));
        for &(i, j, v) in entries {
            m.set(i, j, v);
        }
        m
    }

    #[test]
    fn values_follow_pattern_order() {
        let a = matrix(2, &[(0, 1, 1.0), (1, 0, 2.0), (1, 1, 3.0)]);
        assert_eq!(a.values, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(a.to_dense()[(1, 0)], 2.0);
        assert_eq!(a.triplets()[1], (0, 1, 1.0));
    }

    #[test]
    fn solves_with_row_exchange() {
        // [0 1; 2 1] x = [1; 4]  =>  x = [1.5, 1]
        let a = matrix(2, &[(0, 1, 1.0), (1, 0, 2.0), (1, 1, 1.0)]);
        let lu = SparseLu::factor(&a).unwrap();
        let x = lu.solve(&DVector::from_vec(vec![1.0, 4.0])).unwrap();
        assert!((x[0] - 1.5).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn singular_matrix_yields_no_solution() {
        let a = matrix(2, &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 1.0)]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(SparseLu::factor(&a).and_then(|lu| lu.solve(&b)).is_none());
    }

    proptest! {
        #[test]
        fn agrees_with_dense_lu(
            n in 2usize..7,
            off in prop::collection::vec((0usize..7, 0usize..7, -1.0f64..1.0), 0..15),
        ) {
            // Diagonally dominant, so nonsingular.
            let mut entries: Vec<_> = off.into_iter().filter(|&(i, j, _)| i < n && j < n && i != j).collect();
            entries.extend((0..n).map(|i| (i, i, 20.0 + i as f64)));
            let a = matrix(n, &entries);
            let b = DVector::from_fn(n, |i, _| 1.0 + i as f64);

            let sparse = SparseLu::factor(&a).unwrap().solve(&b).unwrap();
            let dense = a.to_dense().lu().solve(&b).unwrap();
            for i in 0..n {
                prop_assert!((sparse[i] - dense[i]).abs() < 1e-10);
            }
        }
    }
}
