//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Zone and facility ids are dense
//! indices assigned at load time; the external string codes live in the
//! spatial indices.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Widen to `u64`, e.g. for seeding a per-unit RNG stream.
            #[inline(always)]
            pub fn as_u64(self) -> u64 {
                self.0 as u64
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Synthetic-population household.
    pub struct HouseholdId(u32);
}

typed_id! {
    /// Synthetic-population individual.
    pub struct PersonId(u32);
}

typed_id! {
    /// One activity (the trip that ends at it) in a synthetic person's chain.
    pub struct ActivityId(u32);
}

typed_id! {
    /// Dense index of a zone in the `ZoneIndex`.
    pub struct ZoneId(u32);
}

typed_id! {
    /// Dense index of a point facility in the `PoiIndex`.
    pub struct FacilityId(u32);
}

typed_id! {
    /// Travel-diary household.
    pub struct DiaryHouseholdId(u32);
}

typed_id! {
    /// Travel-diary respondent.
    pub struct DiaryPersonId(u32);
}
