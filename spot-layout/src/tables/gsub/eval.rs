//! Answering "what would this lookup substitute for these glyphs?"

use std::fmt::{Display, Formatter};

use types::GlyphId16;

use super::{Gsub, LigatureSubstFormat1, MultipleSubstFormat1, SingleSubst, SubstitutionSubtable};
use crate::tables::layout::LookupSubtable;

/// Why a substitution query could not be answered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalError {
    LookupIndexOutOfRange(u16),
    /// Only lookups with exactly one subtable are evaluated.
    MultipleSubtables { lookup_index: u16, count: usize },
    /// The lookup's only subtable is absent (it could not be decoded).
    MissingSubtable { lookup_index: u16 },
    /// Alternate, contextual and reverse chaining lookups are not evaluated.
    UnsupportedLookupType { lookup_index: u16, lookup_type: u16 },
}

impl Display for EvalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::LookupIndexOutOfRange(index) => {
                write!(f, "lookup index {index} out of range")
            }
            EvalError::MultipleSubtables {
                lookup_index,
                count,
            } => write!(
                f,
                "lookup {lookup_index} has {count} subtables, only single-subtable lookups are evaluated"
            ),
            EvalError::MissingSubtable { lookup_index } => {
                write!(f, "lookup {lookup_index} has no usable subtable")
            }
            EvalError::UnsupportedLookupType {
                lookup_index,
                lookup_type,
            } => write!(
                f,
                "lookup {lookup_index} has type {lookup_type}, which cannot be evaluated"
            ),
        }
    }
}

impl std::error::Error for EvalError {}

impl Gsub {
    /// Evaluate the lookup at `lookup_index` against `input`.
    ///
    /// Returns the substituted glyphs, or an empty vec if the lookup does not
    /// apply to this input. Single and multiple substitutions apply to a
    /// single input glyph; a ligature applies when `input` is exactly its
    /// component sequence. Extensions are looked through.
    pub fn substitute(
        &self,
        lookup_index: u16,
        input: &[GlyphId16],
    ) -> Result<Vec<GlyphId16>, EvalError> {
        let result = self.substitute_impl(lookup_index, input);
        if let Err(e) = &result {
            log::debug!("GSUB: {e}");
        }
        result
    }

    fn substitute_impl(
        &self,
        lookup_index: u16,
        input: &[GlyphId16],
    ) -> Result<Vec<GlyphId16>, EvalError> {
        let lookup = self
            .lookup(lookup_index)
            .ok_or(EvalError::LookupIndexOutOfRange(lookup_index))?;
        let subtable = match lookup.subtables.as_slice() {
            [Some(subtable)] => subtable,
            [] | [None] => return Err(EvalError::MissingSubtable { lookup_index }),
            subtables => {
                return Err(EvalError::MultipleSubtables {
                    lookup_index,
                    count: subtables.len(),
                })
            }
        };
        let subtable = match subtable.as_extension() {
            Some(extension) => extension
                .resolve()
                .ok_or(EvalError::MissingSubtable { lookup_index })?,
            None => subtable,
        };
        match subtable {
            SubstitutionSubtable::Single(table) => Ok(table.substitute(input).into_iter().collect()),
            SubstitutionSubtable::Multiple(table) => Ok(table.substitute(input).unwrap_or_default()),
            SubstitutionSubtable::Ligature(table) => Ok(table.substitute(input).into_iter().collect()),
            other => Err(EvalError::UnsupportedLookupType {
                lookup_index,
                lookup_type: other.lookup_type(),
            }),
        }
    }
}

impl SingleSubst {
    fn substitute(&self, input: &[GlyphId16]) -> Option<GlyphId16> {
        let [glyph] = input else {
            return None;
        };
        match self {
            SingleSubst::Format1(table) => {
                table.coverage.get(*glyph)?;
                Some(glyph.wrapping_add_delta(table.delta_glyph_id))
            }
            SingleSubst::Format2(table) => {
                let coverage_index = table.coverage.get(*glyph)?;
                table
                    .substitute_glyph_ids
                    .get(coverage_index as usize)
                    .copied()
            }
        }
    }
}

impl MultipleSubstFormat1 {
    fn substitute(&self, input: &[GlyphId16]) -> Option<Vec<GlyphId16>> {
        let [glyph] = input else {
            return None;
        };
        let coverage_index = self.coverage.get(*glyph)?;
        self.sequences
            .get(coverage_index as usize)
            .map(|sequence| sequence.substitute_glyph_ids.clone())
    }
}

impl LigatureSubstFormat1 {
    fn substitute(&self, input: &[GlyphId16]) -> Option<GlyphId16> {
        let (first, rest) = input.split_first()?;
        let coverage_index = self.coverage.get(*first)?;
        // each candidate is compared from the second component; the first
        // full match wins
        self.ligature_sets
            .get(coverage_index as usize)?
            .ligatures
            .iter()
            .find(|ligature| ligature.component_glyph_ids.as_slice() == rest)
            .map(|ligature| ligature.ligature_glyph)
    }
}
