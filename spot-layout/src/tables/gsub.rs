//! the [GSUB] table
//!
//! [GSUB]: https://docs.microsoft.com/en-us/typography/opentype/spec/gsub

mod eval;

use types::{GlyphId16, Offset16, Tag, GSUB_TAG};

pub use eval::EvalError;

pub use super::layout::{
    ChainedSequenceContext, ClassDef, CoverageTable, ExtensionSubtable, FeatureList, ScriptList,
    SequenceContext,
};
use super::layout::{read_offsets, LookupSubtable, RuleActions};
use crate::{
    diagnostic::DecodeContext,
    font_data::FontData,
    read::{FontRead, Format},
    ReadError,
};

#[cfg(test)]
#[path = "../tests/test_gsub.rs"]
mod tests;

/// The [GSUB] table
///
/// [GSUB]: https://docs.microsoft.com/en-us/typography/opentype/spec/gsub
pub type Gsub = super::layout::LayoutTable<SubstitutionSubtable>;

/// A GSUB [Lookup](super::layout::Lookup)
pub type SubstitutionLookup = super::layout::Lookup<SubstitutionSubtable>;

/// A typed GSUB [LookupList](super::layout::LookupList)
pub type SubstitutionLookupList = super::layout::LookupList<SubstitutionSubtable>;

/// GSUB lookup types
pub mod lookup_type {
    pub const SINGLE: u16 = 1;
    pub const MULTIPLE: u16 = 2;
    pub const ALTERNATE: u16 = 3;
    pub const LIGATURE: u16 = 4;
    pub const CONTEXT: u16 = 5;
    pub const CHAINED_CONTEXT: u16 = 6;
    pub const EXTENSION: u16 = 7;
    pub const REVERSE_CHAINED_CONTEXT: u16 = 8;
}

/// A decoded GSUB subtable, of any lookup type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubstitutionSubtable {
    Single(SingleSubst),
    Multiple(MultipleSubstFormat1),
    Alternate(AlternateSubstFormat1),
    Ligature(LigatureSubstFormat1),
    Contextual(SequenceContext),
    ChainContextual(ChainedSequenceContext),
    Extension(ExtensionSubtable<SubstitutionSubtable>),
    Reverse(ReverseChainSingleSubstFormat1),
}

/// [Single Substitution](https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#lookuptype-1-single-substitution-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SingleSubst {
    Format1(SingleSubstFormat1),
    Format2(SingleSubstFormat2),
}

/// Substitutes each covered glyph with the glyph `delta_glyph_id` after it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SingleSubstFormat1 {
    pub coverage: CoverageTable,
    /// Added to the input glyph ID, modulo 65536.
    pub delta_glyph_id: i16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SingleSubstFormat2 {
    pub coverage: CoverageTable,
    /// One substitute per covered glyph, in coverage order.
    pub substitute_glyph_ids: Vec<GlyphId16>,
}

/// [Multiple Substitution](https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#lookuptype-2-multiple-substitution-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultipleSubstFormat1 {
    pub coverage: CoverageTable,
    pub sequences: Vec<Sequence>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sequence {
    pub substitute_glyph_ids: Vec<GlyphId16>,
}

/// [Alternate Substitution](https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#lookuptype-3-alternate-substitution-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlternateSubstFormat1 {
    pub coverage: CoverageTable,
    pub alternate_sets: Vec<AlternateSet>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlternateSet {
    /// In arbitrary order.
    pub alternate_glyph_ids: Vec<GlyphId16>,
}

/// [Ligature Substitution](https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#lookuptype-4-ligature-substitution-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LigatureSubstFormat1 {
    /// Covers the first component of each ligature.
    pub coverage: CoverageTable,
    pub ligature_sets: Vec<LigatureSet>,
}

/// The ligatures that start with the same glyph, in order of preference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LigatureSet {
    pub ligatures: Vec<Ligature>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ligature {
    pub ligature_glyph: GlyphId16,
    /// The components after the first, in writing order.
    pub component_glyph_ids: Vec<GlyphId16>,
}

/// [Reverse Chaining Contextual Single Substitution](https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#lookuptype-8-reverse-chaining-contextual-single-substitution-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReverseChainSingleSubstFormat1 {
    pub coverage: CoverageTable,
    pub backtrack_coverages: Vec<CoverageTable>,
    pub lookahead_coverages: Vec<CoverageTable>,
    /// One substitute per covered glyph, in coverage order.
    pub substitute_glyph_ids: Vec<GlyphId16>,
}

impl Format<u16> for SingleSubstFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for SingleSubstFormat2 {
    const FORMAT: u16 = 2;
}

impl Format<u16> for MultipleSubstFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for AlternateSubstFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for LigatureSubstFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for ReverseChainSingleSubstFormat1 {
    const FORMAT: u16 = 1;
}

impl LookupSubtable for SubstitutionSubtable {
    const TABLE_TAG: Tag = GSUB_TAG;
    const EXTENSION_LOOKUP_TYPE: u16 = lookup_type::EXTENSION;

    fn is_known_lookup_type(lookup_type: u16) -> bool {
        matches!(
            lookup_type,
            lookup_type::SINGLE..=lookup_type::CHAINED_CONTEXT
                | lookup_type::REVERSE_CHAINED_CONTEXT
        )
    }

    fn is_context_lookup_type(lookup_type: u16) -> bool {
        matches!(
            lookup_type,
            lookup_type::CONTEXT | lookup_type::CHAINED_CONTEXT
        )
    }

    fn read_subtable(
        data: FontData,
        lookup_type: u16,
        _ctx: &mut DecodeContext,
    ) -> Result<Self, ReadError> {
        match lookup_type {
            lookup_type::SINGLE => SingleSubst::read(data).map(Self::Single),
            lookup_type::MULTIPLE => MultipleSubstFormat1::read(data).map(Self::Multiple),
            lookup_type::ALTERNATE => AlternateSubstFormat1::read(data).map(Self::Alternate),
            lookup_type::LIGATURE => LigatureSubstFormat1::read(data).map(Self::Ligature),
            lookup_type::CONTEXT => SequenceContext::read(data).map(Self::Contextual),
            lookup_type::CHAINED_CONTEXT => {
                ChainedSequenceContext::read(data).map(Self::ChainContextual)
            }
            lookup_type::REVERSE_CHAINED_CONTEXT => {
                ReverseChainSingleSubstFormat1::read(data).map(Self::Reverse)
            }
            _ => Err(ReadError::MalformedData("not a GSUB lookup type")),
        }
    }

    fn from_extension(extension: ExtensionSubtable<Self>) -> Self {
        Self::Extension(extension)
    }

    fn as_extension(&self) -> Option<&ExtensionSubtable<Self>> {
        match self {
            Self::Extension(extension) => Some(extension),
            _ => None,
        }
    }

    fn lookup_type(&self) -> u16 {
        match self {
            Self::Single(_) => lookup_type::SINGLE,
            Self::Multiple(_) => lookup_type::MULTIPLE,
            Self::Alternate(_) => lookup_type::ALTERNATE,
            Self::Ligature(_) => lookup_type::LIGATURE,
            Self::Contextual(_) => lookup_type::CONTEXT,
            Self::ChainContextual(_) => lookup_type::CHAINED_CONTEXT,
            Self::Extension(_) => lookup_type::EXTENSION,
            Self::Reverse(_) => lookup_type::REVERSE_CHAINED_CONTEXT,
        }
    }

    fn context_rules(&self) -> Option<Vec<RuleActions<'_>>> {
        match self {
            Self::Contextual(table) => Some(table.rule_actions()),
            Self::ChainContextual(table) => Some(table.rule_actions()),
            _ => None,
        }
    }
}

impl<'a> FontRead<'a> for SingleSubst {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            SingleSubstFormat1::FORMAT => Ok(Self::Format1(FontRead::read(data)?)),
            SingleSubstFormat2::FORMAT => Ok(Self::Format2(FontRead::read(data)?)),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> FontRead<'a> for SingleSubstFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let delta_glyph_id: i16 = cursor.read()?;
        Ok(SingleSubstFormat1 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            delta_glyph_id,
        })
    }
}

impl<'a> FontRead<'a> for SingleSubstFormat2 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let glyph_count: u16 = cursor.read()?;
        let substitute_glyph_ids = cursor.read_array(glyph_count as usize)?;
        Ok(SingleSubstFormat2 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            substitute_glyph_ids,
        })
    }
}

// format, coverage offset, count, then `count` offsets
fn read_format1_header(data: FontData) -> Result<(Offset16, Vec<Offset16>), ReadError> {
    let mut cursor = data.cursor();
    let format: u16 = cursor.read()?;
    if format != 1 {
        return Err(ReadError::InvalidFormat(format.into()));
    }
    let coverage_offset: Offset16 = cursor.read()?;
    let count: u16 = cursor.read()?;
    let offsets = cursor.read_array(count as usize)?;
    Ok((coverage_offset, offsets))
}

impl<'a> FontRead<'a> for MultipleSubstFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let (coverage_offset, sequence_offsets) = read_format1_header(data)?;
        Ok(MultipleSubstFormat1 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            sequences: read_offsets(data, &sequence_offsets)?,
        })
    }
}

impl<'a> FontRead<'a> for Sequence {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let glyph_count: u16 = cursor.read()?;
        Ok(Sequence {
            substitute_glyph_ids: cursor.read_array(glyph_count as usize)?,
        })
    }
}

impl<'a> FontRead<'a> for AlternateSubstFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let (coverage_offset, alternate_set_offsets) = read_format1_header(data)?;
        Ok(AlternateSubstFormat1 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            alternate_sets: read_offsets(data, &alternate_set_offsets)?,
        })
    }
}

impl<'a> FontRead<'a> for AlternateSet {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let glyph_count: u16 = cursor.read()?;
        Ok(AlternateSet {
            alternate_glyph_ids: cursor.read_array(glyph_count as usize)?,
        })
    }
}

impl<'a> FontRead<'a> for LigatureSubstFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let (coverage_offset, ligature_set_offsets) = read_format1_header(data)?;
        Ok(LigatureSubstFormat1 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            ligature_sets: read_offsets(data, &ligature_set_offsets)?,
        })
    }
}

impl<'a> FontRead<'a> for LigatureSet {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let ligature_count: u16 = cursor.read()?;
        let ligature_offsets: Vec<Offset16> = cursor.read_array(ligature_count as usize)?;
        Ok(LigatureSet {
            ligatures: read_offsets(data, &ligature_offsets)?,
        })
    }
}

impl<'a> FontRead<'a> for Ligature {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let ligature_glyph = cursor.read()?;
        let component_count: u16 = cursor.read()?;
        let component_glyph_ids = cursor.read_array(component_count.saturating_sub(1) as usize)?;
        Ok(Ligature {
            ligature_glyph,
            component_glyph_ids,
        })
    }
}

impl<'a> FontRead<'a> for ReverseChainSingleSubstFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != Self::FORMAT {
            return Err(ReadError::InvalidFormat(format.into()));
        }
        let coverage_offset: Offset16 = cursor.read()?;
        let backtrack_glyph_count: u16 = cursor.read()?;
        let backtrack_offsets: Vec<Offset16> =
            cursor.read_array(backtrack_glyph_count as usize)?;
        let lookahead_glyph_count: u16 = cursor.read()?;
        let lookahead_offsets: Vec<Offset16> =
            cursor.read_array(lookahead_glyph_count as usize)?;
        let glyph_count: u16 = cursor.read()?;
        let substitute_glyph_ids = cursor.read_array(glyph_count as usize)?;
        Ok(ReverseChainSingleSubstFormat1 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            backtrack_coverages: read_offsets(data, &backtrack_offsets)?,
            lookahead_coverages: read_offsets(data, &lookahead_offsets)?,
            substitute_glyph_ids,
        })
    }
}
