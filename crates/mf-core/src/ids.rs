use core::fmt;
use core::num::NonZeroU32;

use crate::error::{CoreError, CoreResult};

/// Compact, stable identifier used for models and value slots.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a small 0-based index by storing index+1.
    ///
    /// A `u16` index always fits, so this cannot fail. Use
    /// [`Id::try_from_index`] for indices derived from collection lengths.
    pub fn from_index(index: u16) -> Self {
        Self(NonZeroU32::MIN.saturating_add(u32::from(index)))
    }

    /// Checked conversion from a 0-based `usize` index.
    pub fn try_from_index(index: usize) -> CoreResult<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(CoreError::IdOverflow { index })
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

macro_rules! typed_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Id);

        impl $name {
            pub fn from_index(index: u16) -> Self {
                Self(Id::from_index(index))
            }

            pub fn try_from_index(index: usize) -> CoreResult<Self> {
                Id::try_from_index(index).map(Self)
            }

            pub fn index(self) -> u32 {
                self.0.index()
            }

            /// Index as `usize`, for addressing contiguous storage.
            pub fn slot(self) -> usize {
                self.0.index() as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.index())
            }
        }
    };
}

typed_id!(
    /// Identifier of a model component, assigned once at system setup.
    ModelId
);

typed_id!(
    /// Handle of a value slot inside a [`crate::SlotStore`].
    ///
    /// Handles are issued by the store and stay valid for the whole run.
    SlotId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u16, 1, 2, 42, 10_000, u16::MAX] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), u32::from(i));
        }
    }

    #[test]
    fn checked_index_rejects_values_past_u32_range() {
        let last = (u32::MAX - 1) as usize;
        assert_eq!(Id::try_from_index(last).map(Id::index), Ok(u32::MAX - 1));
        assert_eq!(
            Id::try_from_index(last + 1),
            Err(CoreError::IdOverflow { index: last + 1 })
        );
        assert!(SlotId::try_from_index(usize::MAX).is_err());
        assert_eq!(ModelId::try_from_index(7), Ok(ModelId::from_index(7)));
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<SlotId>(),
            core::mem::size_of::<Option<SlotId>>()
        );
    }

    #[test]
    fn typed_ids_format_with_kind() {
        let m = ModelId::from_index(3);
        let s = SlotId::from_index(7);
        assert_eq!(format!("{m:?}"), "ModelId(3)");
        assert_eq!(format!("{s}"), "7");
        assert_eq!(s.slot(), 7);
    }
}
