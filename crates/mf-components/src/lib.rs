//! mf-components: the model capability interface and reference models.
//!
//! Every physical sub-model plugged into a [`ModelComponent`] group:
//! - owns result slots published in the shared [`mf_core::SlotStore`]
//! - reads inputs through resolved [`InputSlot`] handles
//! - recomputes its results in `update()` and reports an [`mf_core::Outcome`]
//!
//! The reference models cover a single heated zone:
//! - `OutdoorClimate` (time dependent boundary temperature)
//! - `WallSurface` (steady surface temperature and heat flow)
//! - `ZoneAirBalance` (steady zone air temperature)
//! - `IdealHeating` (bounded proportional heating)
//! - `LinearRelation` (affine relation with an explicit dependency pattern)
//!
//! # Example
//!
//! ```
//! use mf_components::{InputSlot, LinearRelation, ModelComponent};
//! use mf_core::{ModelId, SlotStore};
//!
//! let mut slots = SlotStore::new();
//! let x = slots.publish(ModelId::from_index(9), "x", 2.0).unwrap();
//! let mut rel = LinearRelation::new(
//!     ModelId::from_index(0),
//!     "y",
//!     &mut slots,
//!     1.0,
//!     vec![(InputSlot::resolved(x), 3.0)],
//! )
//! .unwrap();
//!
//! assert!(rel.update(&mut slots).is_success());
//! assert_eq!(slots.value(rel.result_slots()[0]), 7.0);
//! ```

pub mod climate;
pub mod common;
pub mod error;
pub mod heating;
pub mod linear;
pub mod surface;
pub mod traits;
pub mod zone;

// Re-exports
pub use climate::OutdoorClimate;
pub use error::{ComponentError, ComponentResult};
pub use heating::IdealHeating;
pub use linear::LinearRelation;
pub use surface::WallSurface;
pub use traits::{
    Capabilities, DependencyPair, DependencyPolicy, InputReference, InputSlot, ModelComponent,
    ModelDescriptor,
};
pub use zone::ZoneAirBalance;
