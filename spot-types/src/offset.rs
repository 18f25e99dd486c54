//! Offsets to tables

/// A trait for the different offset representations.
pub trait Offset: Copy {
    /// Returns this offset as a `usize`, or `None` if it is `0`.
    fn non_null(self) -> Option<usize>;

    /// Returns `true` if this is the null offset.
    fn is_null(self) -> bool {
        self.non_null().is_none()
    }
}

macro_rules! impl_offset {
    ($name:ident, $bits:literal, $rawty:ty) => {
        #[doc = concat!("A ", stringify!($bits), "-bit offset to a table.")]
        ///
        /// Specific offset fields may or may not permit NULL values; however we
        /// assume that errors are possible, and expect the caller to handle
        /// the `None` case.
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name($rawty);

        impl $name {
            /// Create a new offset.
            pub const fn new(raw: $rawty) -> Self {
                Self(raw)
            }

            /// A null offset.
            pub const fn null() -> Self {
                Self(0)
            }

            /// The raw value of this offset.
            pub const fn to_u32(self) -> u32 {
                self.0 as u32
            }
        }

        impl Offset for $name {
            fn non_null(self) -> Option<usize> {
                match self.0 {
                    0 => None,
                    other => Some(other as usize),
                }
            }
        }

        crate::raw::newtype_scalar!($name, [u8; $bits / 8]);
    };
}

impl_offset!(Offset16, 16, u16);
impl_offset!(Offset32, 32, u32);
