//! Non-fatal problems found while decoding a layout table.
//!
//! Malformed fonts are expected input. Problems that only affect a single
//! subtable are recorded as a [`Diagnostic`] and decoding carries on with the
//! next sibling, leaving an empty slot so that subtable indices stay stable.

use std::fmt::{Display, Formatter};

use types::Tag;

use crate::tables::layout::MAX_EXTENSION_NESTING;

/// A recoverable problem encountered while decoding or traversing a table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Diagnostic {
    /// A known lookup type used a format we do not implement.
    ///
    /// This is also reported for the nested structures of a subtable
    /// (coverage, class definitions, device tables and anchors).
    UnsupportedFormat {
        lookup_index: Option<u16>,
        lookup_type: u16,
        format: u16,
    },
    /// A lookup (or extension subtable) declared an unknown lookup type.
    UnsupportedLookupType {
        lookup_index: Option<u16>,
        lookup_type: u16,
    },
    /// A lookup contained a null subtable offset.
    NullOffset {
        lookup_index: Option<u16>,
        lookup_type: u16,
    },
    /// Contextual lookups (or extension subtables) were nested more deeply
    /// than we are willing to follow.
    RecursionLimitExceeded { lookup_index: u16, depth: u8 },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnsupportedFormat {
                lookup_index,
                lookup_type,
                format,
            } => {
                write!(f, "unsupported format {format} for lookup type {lookup_type}")?;
                write_lookup_index(f, *lookup_index)
            }
            Diagnostic::UnsupportedLookupType {
                lookup_index,
                lookup_type,
            } => {
                write!(f, "unsupported lookup type {lookup_type}")?;
                write_lookup_index(f, *lookup_index)
            }
            Diagnostic::NullOffset {
                lookup_index,
                lookup_type,
            } => {
                write!(f, "null subtable offset for lookup type {lookup_type}")?;
                write_lookup_index(f, *lookup_index)
            }
            Diagnostic::RecursionLimitExceeded {
                lookup_index,
                depth,
            } => write!(
                f,
                "contextual lookup {lookup_index} nested too deeply (depth {depth})"
            ),
        }
    }
}

fn write_lookup_index(f: &mut Formatter<'_>, lookup_index: Option<u16>) -> std::fmt::Result {
    match lookup_index {
        Some(index) => write!(f, " (lookup {index})"),
        None => Ok(()),
    }
}

/// State threaded through the decoding of a single table.
///
/// This tracks where we are (which table, which lookup, which lookup type)
/// so that problems can be attributed, and collects the problems found.
#[derive(Clone, Debug)]
pub struct DecodeContext {
    table: Tag,
    lookup_index: Option<u16>,
    lookup_type: u16,
    extension_depth: u8,
    diagnostics: Vec<Diagnostic>,
}

impl DecodeContext {
    pub fn new(table: Tag) -> Self {
        DecodeContext {
            table,
            lookup_index: None,
            lookup_type: 0,
            extension_depth: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Begin decoding the lookup at `lookup_index`.
    pub(crate) fn enter_lookup(&mut self, lookup_index: u16, lookup_type: u16) {
        self.lookup_index = Some(lookup_index);
        self.lookup_type = lookup_type;
    }

    /// Set the lookup type being decoded, returning the previous one.
    ///
    /// Used when an extension subtable redirects to a different type.
    pub(crate) fn replace_lookup_type(&mut self, lookup_type: u16) -> u16 {
        std::mem::replace(&mut self.lookup_type, lookup_type)
    }

    /// Begin decoding the subtable wrapped by an extension.
    ///
    /// Returns `false` (and reports a diagnostic) if extensions are already
    /// nested [`MAX_EXTENSION_NESTING`] deep.
    pub(crate) fn enter_extension(&mut self) -> bool {
        if self.extension_depth >= MAX_EXTENSION_NESTING {
            self.report(Diagnostic::RecursionLimitExceeded {
                lookup_index: self.lookup_index.unwrap_or_default(),
                depth: self.extension_depth.saturating_add(1),
            });
            return false;
        }
        self.extension_depth += 1;
        true
    }

    pub(crate) fn exit_extension(&mut self) {
        self.extension_depth = self.extension_depth.saturating_sub(1);
    }

    /// Record a diagnostic, and log it.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}: {}", self.table, diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn unsupported_format(&mut self, format: u16) {
        self.report(Diagnostic::UnsupportedFormat {
            lookup_index: self.lookup_index,
            lookup_type: self.lookup_type,
            format,
        });
    }

    pub(crate) fn unsupported_lookup_type(&mut self, lookup_type: u16) {
        self.report(Diagnostic::UnsupportedLookupType {
            lookup_index: self.lookup_index,
            lookup_type,
        });
    }

    pub(crate) fn null_offset(&mut self) {
        self.report(Diagnostic::NullOffset {
            lookup_index: self.lookup_index,
            lookup_type: self.lookup_type,
        });
    }

    /// The diagnostics collected so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_to_current_lookup() {
        let mut ctx = DecodeContext::new(Tag::new(b"GPOS"));
        ctx.enter_lookup(3, 2);
        ctx.unsupported_format(7);
        let previous = ctx.replace_lookup_type(12);
        assert_eq!(previous, 2);
        ctx.unsupported_lookup_type(12);
        assert_eq!(
            ctx.diagnostics(),
            &[
                Diagnostic::UnsupportedFormat {
                    lookup_index: Some(3),
                    lookup_type: 2,
                    format: 7
                },
                Diagnostic::UnsupportedLookupType {
                    lookup_index: Some(3),
                    lookup_type: 12
                },
            ]
        );
    }

    #[test]
    fn extension_nesting_limit() {
        let mut ctx = DecodeContext::new(Tag::new(b"GSUB"));
        ctx.enter_lookup(1, 7);
        for _ in 0..MAX_EXTENSION_NESTING {
            assert!(ctx.enter_extension());
        }
        assert!(!ctx.enter_extension());
        ctx.exit_extension();
        assert!(ctx.enter_extension());
        assert_eq!(
            ctx.into_diagnostics(),
            vec![Diagnostic::RecursionLimitExceeded {
                lookup_index: 1,
                depth: MAX_EXTENSION_NESTING + 1
            }]
        );
    }

    #[test]
    fn display() {
        let diagnostic = Diagnostic::UnsupportedFormat {
            lookup_index: Some(4),
            lookup_type: 1,
            format: 9,
        };
        assert_eq!(
            diagnostic.to_string(),
            "unsupported format 9 for lookup type 1 (lookup 4)"
        );
    }
}
