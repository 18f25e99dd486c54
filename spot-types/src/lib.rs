//! Common [scalar data types][data types] used by the layout tables.
//!
//! Everything here is a thin, `Copy` wrapper around the raw big-endian
//! representation found on disk. Decoding and encoding go through the
//! [`Scalar`] trait.
//!
//! [data types]: https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod glyph_id;
mod offset;
mod raw;
mod tag;
mod version;

pub use glyph_id::GlyphId16;
pub use offset::{Offset, Offset16, Offset32};
pub use raw::{FixedSize, Scalar};
pub use tag::Tag;
pub use version::MajorMinor;

/// The tag of the glyph substitution table.
pub const GSUB_TAG: Tag = Tag::new(b"GSUB");

/// The tag of the glyph positioning table.
pub const GPOS_TAG: Tag = Tag::new(b"GPOS");
