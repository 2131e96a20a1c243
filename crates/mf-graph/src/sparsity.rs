//! Sparsity pattern and layout of a cyclic group.
//!
//! Build order:
//! 1. unknowns = distinct result slots of the dependency pairs (minus ODE slots)
//! 2. adjacency over unknowns, then transitive closure
//! 3. drop unknowns without a diagonal after closure (acyclic tail)
//! 4. eliminate the tail from the direct pattern so paths through it become
//!    fill, then CSR over survivors with the diagonal inserted
//! 5. constraints for survivors and the dense/sparse strategy

use mf_components::{DependencyPair, ModelComponent};
use mf_core::{SlotId, SlotStore};
use sprs::{CsMat, TriMat};

use crate::error::{GraphError, GraphResult};
use crate::unknowns::{Unknown, collect_constraints, collect_result_slots, ode_slots};

/// Structural layout of a square Jacobian in compressed sparse row form.
///
/// Every row holds its diagonal entry. Column indices are sorted per row.
/// Stored as a `sprs` matrix of ones, kept in both row and column order.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrPattern {
    csr: CsMat<f64>,
    /// Same entries in compressed column order, for column scans.
    csc: CsMat<f64>,
}

impl CsrPattern {
    /// Build from a boolean adjacency, inserting missing diagonals.
    pub fn from_adjacency(adj: &[Vec<bool>]) -> Self {
        let n = adj.len();
        let mut tri = TriMat::new((n, n));
        for (i, row) in adj.iter().enumerate() {
            for (j, &set) in row.iter().enumerate() {
                if set || i == j {
                    tri.add_triplet(i, j, 1.0);
                }
            }
        }
        let csr: CsMat<f64> = tri.to_csr();
        let csc = csr.to_csc();
        Self { csr, csc }
    }

    pub fn dim(&self) -> usize {
        self.csr.rows()
    }

    pub fn nnz(&self) -> usize {
        self.csr.nnz()
    }

    /// Position of row `i`'s first entry in the value array.
    pub fn row_offset(&self, i: usize) -> usize {
        self.csr.indptr().outer_inds_sz(i).start
    }

    /// Column indices of row `i`.
    pub fn row(&self, i: usize) -> &[usize] {
        &self.csr.indices()[self.csr.indptr().outer_inds_sz(i)]
    }

    /// Row indices holding an entry in column `j`.
    pub fn column(&self, j: usize) -> &[usize] {
        &self.csc.indices()[self.csc.indptr().outer_inds_sz(j)]
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.row(i).binary_search(&j).is_ok()
    }

    pub fn fill_ratio(&self) -> f64 {
        let n = self.dim();
        if n == 0 {
            return 0.0;
        }
        self.nnz() as f64 / (n * n) as f64
    }
}

/// Transitive closure (Warshall) in place.
///
/// A diagonal entry is set afterwards only for nodes on a cycle.
pub fn transitive_closure(adj: &mut [Vec<bool>]) {
    let n = adj.len();
    for k in 0..n {
        for i in 0..n {
            if !adj[i][k] {
                continue;
            }
            for j in 0..n {
                if adj[k][j] {
                    adj[i][j] = true;
                }
            }
        }
    }
}

/// Dependencies among the `keep` nodes with every other node eliminated.
///
/// Row `i` depends on column `j` when `direct` has a path `i -> .. -> j`
/// whose intermediate nodes are all outside `keep`. This is Warshall's
/// update restricted to the eliminated nodes.
pub fn eliminate_nodes(direct: &[Vec<bool>], keep: &[usize]) -> Vec<Vec<bool>> {
    let n = direct.len();
    let mut kept = vec![false; n];
    for &k in keep {
        kept[k] = true;
    }
    let mut adj = direct.to_vec();
    for k in (0..n).filter(|&k| !kept[k]) {
        for i in 0..n {
            if !adj[i][k] {
                continue;
            }
            for j in 0..n {
                if adj[k][j] {
                    adj[i][j] = true;
                }
            }
        }
    }
    keep.iter()
        .map(|&i| keep.iter().map(|&j| adj[i][j]).collect())
        .collect()
}

/// How the Newton backend should assemble and factor the Jacobian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobianStrategy {
    Dense,
    Sparse,
}

/// Thresholds for picking the Jacobian strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Systems up to this size are always dense.
    pub dense_size_limit: usize,
    /// Patterns at least this full are dense.
    pub dense_fill_ratio: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            dense_size_limit: 16,
            dense_fill_ratio: 0.25,
        }
    }
}

impl LayoutOptions {
    pub fn choose(&self, pattern: &CsrPattern) -> JacobianStrategy {
        if pattern.dim() <= self.dense_size_limit || pattern.fill_ratio() >= self.dense_fill_ratio {
            JacobianStrategy::Dense
        } else {
            JacobianStrategy::Sparse
        }
    }
}

/// Everything the Newton backend needs to know about a cyclic group's
/// structure. Built once at group initialization.
#[derive(Debug, Clone)]
pub struct CyclicLayout {
    pub unknowns: Vec<Unknown>,
    /// Result slots outside every feedback loop, recomputed by each evaluation.
    pub tail: Vec<SlotId>,
    pub pattern: CsrPattern,
    pub strategy: JacobianStrategy,
}

impl CyclicLayout {
    pub fn dim(&self) -> usize {
        self.unknowns.len()
    }
}

/// Build the unknown vector, constraints and sparsity of a cyclic group.
///
/// Fails with a configuration error when the members produce no unknowns or
/// when no unknown lies on a feedback loop.
pub fn build_cyclic_layout(
    members: &[&dyn ModelComponent],
    pairs: &[DependencyPair],
    slots: &SlotStore,
    options: LayoutOptions,
) -> GraphResult<CyclicLayout> {
    let labels = || -> Vec<String> { members.iter().map(|m| m.descriptor().label()).collect() };

    let candidates = collect_result_slots(pairs, &ode_slots(members));
    if candidates.is_empty() {
        return Err(GraphError::EmptyCyclicGroup { models: labels() });
    }

    let n = candidates.len();
    let position = |slot: SlotId| candidates.iter().position(|&s| s == slot);
    let mut adj = vec![vec![false; n]; n];
    for pair in pairs {
        if let (Some(i), Some(j)) = (position(pair.result), position(pair.input)) {
            adj[i][j] = true;
        }
    }
    let direct = adj.clone();
    transitive_closure(&mut adj);

    let survivors: Vec<usize> = (0..n).filter(|&i| adj[i][i]).collect();
    if survivors.is_empty() {
        return Err(GraphError::NotCyclic { models: labels() });
    }
    let tail = (0..n)
        .filter(|i| !adj[*i][*i])
        .map(|i| candidates[i])
        .collect();

    let pattern = CsrPattern::from_adjacency(&eliminate_nodes(&direct, &survivors));

    let constraints = collect_constraints(members);
    let mut unknowns = Vec::with_capacity(survivors.len());
    for &i in &survivors {
        let slot = candidates[i];
        let owner = slots.owner(slot).ok_or_else(|| GraphError::UnpublishedSlot {
            model: members
                .first()
                .map(|m| m.descriptor().label())
                .unwrap_or_default(),
            slot,
        })?;
        unknowns.push(match constraints.get(&slot) {
            Some(range) => Unknown::with_range(slot, owner, range),
            None => Unknown::unconstrained(slot, owner),
        });
    }

    let strategy = options.choose(&pattern);
    Ok(CyclicLayout {
        unknowns,
        tail,
        pattern,
        strategy,
    })
}
