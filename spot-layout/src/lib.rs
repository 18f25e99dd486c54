//! Reading and querying OpenType layout lookups
//!
//! This crate decodes the [GSUB] and [GPOS] tables into owned trees of
//! lookups and subtables, and answers two questions about them: what a
//! substitution lookup would produce for some glyphs, and how a positioning
//! lookup would adjust a glyph or a pair of glyphs.
//!
//! Malformed fonts are expected input. A subtable in a format we do not
//! understand (or of an unknown lookup type) is left empty and recorded as a
//! [`Diagnostic`], and the rest of the table is still decoded; only data
//! that is truncated or points outside the table fails the whole read.
//!
//! # Example
//!
//! ```no_run
//! use spot_layout::{tables::gsub::Gsub, types::GlyphId16, FontData, FontRead};
//! # let gsub_bytes: &[u8] = &[];
//! let gsub = Gsub::read(FontData::new(gsub_bytes)).expect("failed to read GSUB");
//! for diagnostic in gsub.diagnostics() {
//!     eprintln!("{diagnostic}");
//! }
//! let output = gsub.substitute(0, &[GlyphId16::new(3), GlyphId16::new(7)]);
//! ```
//!
//! [GSUB]: https://learn.microsoft.com/en-us/typography/opentype/spec/gsub
//! [GPOS]: https://learn.microsoft.com/en-us/typography/opentype/spec/gpos

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod diagnostic;
mod font_data;
mod read;
pub mod tables;

/// Public re-export of the spot-types crate.
pub extern crate spot_types as types;

pub use diagnostic::{DecodeContext, Diagnostic};
pub use font_data::FontData;
pub use read::{ComputeSize, FontRead, FontReadWithArgs, Format, ReadArgs, ReadError};
pub use tables::gpos::{Gpos, PositionAdjustment};
pub use tables::gsub::{EvalError, Gsub};
