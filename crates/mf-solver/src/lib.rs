//! Constrained Newton solver for the simultaneous unknowns of cyclic groups.
//!
//! The backend is independent of models and slots: it sees a
//! [`NonlinearSystem`] whose evaluations may fail softly (retry with a
//! smaller outer step) or fatally, plus per-unknown scaling and hard bounds.
//! Jacobians are formed by finite differences, densely (nalgebra LU) or over
//! a sparse pattern with column coloring (faer sparse LU).

pub mod bounds;
pub mod error;
pub mod jacobian;
pub mod newton;
pub mod scaling;
pub mod sparse_lu;
pub mod system;

pub use bounds::Bounds;
pub use error::{SolverError, SolverResult};
pub use jacobian::{Factorization, JacobianMode};
pub use newton::{NewtonConfig, NewtonProblem, NewtonResult, newton_solve};
pub use scaling::{scaled_max_norm, value_scaling};
pub use sparse_lu::{CsrMatrix, SparseLu};
pub use system::{FnSystem, NonlinearSystem};
