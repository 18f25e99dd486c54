//! Glyph Identifiers
//!
//! Although these are plain u16s in OpenType, we choose to represent them
//! as a distinct type.

use crate::raw::newtype_scalar;

/// A 16-bit glyph identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphId16(u16);

impl GlyphId16 {
    /// The identifier reserved for unknown glyphs
    pub const NOTDEF: GlyphId16 = GlyphId16(0);

    /// Construct a new `GlyphId16`.
    pub const fn new(raw: u16) -> Self {
        GlyphId16(raw)
    }

    /// The identifier as a u16.
    pub const fn to_u16(self) -> u16 {
        self.0
    }

    /// The identifier as a u32.
    pub const fn to_u32(self) -> u32 {
        self.0 as u32
    }

    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Add a signed delta, wrapping modulo 65536.
    ///
    /// This is the arithmetic used by single substitution format 1.
    pub const fn wrapping_add_delta(self, delta: i16) -> Self {
        GlyphId16(self.0.wrapping_add(delta as u16))
    }
}

impl From<u16> for GlyphId16 {
    fn from(value: u16) -> Self {
        GlyphId16(value)
    }
}

impl From<GlyphId16> for u16 {
    fn from(value: GlyphId16) -> Self {
        value.0
    }
}

impl std::fmt::Display for GlyphId16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GID_{}", self.0)
    }
}

newtype_scalar!(GlyphId16, [u8; 2]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_wraps() {
        assert_eq!(
            GlyphId16::new(78).wrapping_add_delta(192),
            GlyphId16::new(270)
        );
        assert_eq!(GlyphId16::new(5).wrapping_add_delta(-6), GlyphId16::new(u16::MAX));
        assert_eq!(GlyphId16::new(u16::MAX).wrapping_add_delta(2), GlyphId16::new(1));
    }

    #[test]
    fn display() {
        assert_eq!(GlyphId16::new(347).to_string(), "GID_347");
    }
}
