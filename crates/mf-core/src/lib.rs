//! mf-core: stable foundation for modelflow.
//!
//! Contains:
//! - ids (compact handles for models and value slots)
//! - numeric (Real + float helpers)
//! - outcome (tri-state update result, OR-combinable)
//! - slots (arena of named scalar value slots with stable handles)
//! - range (declared value ranges of result quantities)
//! - units (uom SI types + constructors)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod outcome;
pub mod range;
pub mod slots;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use outcome::Outcome;
pub use range::{UpperBound, ValueRange};
pub use slots::{SlotMeta, SlotStore};
