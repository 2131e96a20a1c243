//! mf-graph: evaluation groups and the structure of cyclic systems.
//!
//! Provides:
//! - Pre-computed grouping of models into Sequential/Cyclic evaluation groups
//! - Dependency pattern extraction from model capabilities
//! - Unknown vector, constraint and sparsity construction for cyclic groups
//! - Stable model indexing for the orchestrator
//!
//! # Example
//!
//! ```
//! use mf_core::ModelId;
//! use mf_graph::{GroupKind, GroupingBuilder};
//!
//! let (a, b, c) = (ModelId::from_index(0), ModelId::from_index(1), ModelId::from_index(2));
//! let mut builder = GroupingBuilder::new();
//! builder.sequential([a]);
//! builder.cyclic([b, c]);
//! let grouping = builder.build(&[a, b, c]).unwrap();
//!
//! assert_eq!(grouping.len(), 2);
//! assert_eq!(grouping.groups()[1].kind, GroupKind::Cyclic);
//! ```

pub mod builder;
pub mod error;
pub mod group;
pub mod indexing;
pub mod pattern;
pub mod sparsity;
pub mod unknowns;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::GroupingBuilder;
pub use error::{GraphError, GraphResult};
pub use group::{GroupKind, GroupDef, Grouping};
pub use indexing::IndexMap;
pub use pattern::{extract_pattern, model_dependencies};
pub use sparsity::{CsrPattern, CyclicLayout, JacobianStrategy, LayoutOptions, build_cyclic_layout};
pub use unknowns::Unknown;
