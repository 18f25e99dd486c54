//! Sequence context and chained sequence context subtables.
//!
//! These are shared by GSUB (lookup types 5 and 6) and GPOS (lookup types 7
//! and 8). Format 1 rules are keyed by glyph, format 2 rules by class, and
//! format 3 has a single rule described by one coverage table per position.

use types::{GlyphId16, Offset16, Scalar};

use super::{read_nullable_offsets, read_offsets, ClassDef, ClassDefFormat2, CoverageTable};
use crate::{
    font_data::{Cursor, FontData},
    read::{FontRead, Format},
    ReadError,
};

/// A (sequence index, lookup index) pair naming a lookup to apply at a
/// position of the matched input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceLookupRecord {
    /// Index (zero-based) into the input glyph sequence
    pub sequence_index: u16,
    /// Index (zero-based) into the LookupList
    pub lookup_list_index: u16,
}

/// A [Sequence Context](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#sequence-context-format-1-simple-glyph-contexts) subtable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SequenceContext {
    Format1(SequenceContextFormat1),
    Format2(SequenceContextFormat2),
    Format3(SequenceContextFormat3),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceContextFormat1 {
    pub coverage: CoverageTable,
    /// One (possibly absent) rule set per covered glyph, in coverage order.
    pub seq_rule_sets: Vec<Option<SequenceRuleSet<GlyphId16>>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceContextFormat2 {
    pub coverage: CoverageTable,
    pub class_def: ClassDef,
    /// One (possibly absent) rule set per class.
    pub class_seq_rule_sets: Vec<Option<SequenceRuleSet<u16>>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceContextFormat3 {
    pub coverages: Vec<CoverageTable>,
    pub seq_lookup_records: Vec<SequenceLookupRecord>,
}

/// The rules sharing a first glyph (`T = GlyphId16`) or class (`T = u16`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceRuleSet<T> {
    pub seq_rules: Vec<SequenceRule<T>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceRule<T> {
    /// The input sequence, starting with the second position.
    pub input_sequence: Vec<T>,
    pub seq_lookup_records: Vec<SequenceLookupRecord>,
}

/// A [Chained Sequence Context](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#chained-sequence-context-format-1-simple-glyph-contexts) subtable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChainedSequenceContext {
    Format1(ChainedSequenceContextFormat1),
    Format2(ChainedSequenceContextFormat2),
    Format3(ChainedSequenceContextFormat3),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainedSequenceContextFormat1 {
    pub coverage: CoverageTable,
    pub chained_seq_rule_sets: Vec<Option<ChainedSequenceRuleSet<GlyphId16>>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainedSequenceContextFormat2 {
    pub coverage: CoverageTable,
    pub backtrack_class_def: ClassDef,
    pub input_class_def: ClassDef,
    pub lookahead_class_def: ClassDef,
    pub chained_class_seq_rule_sets: Vec<Option<ChainedSequenceRuleSet<u16>>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainedSequenceContextFormat3 {
    pub backtrack_coverages: Vec<CoverageTable>,
    pub input_coverages: Vec<CoverageTable>,
    pub lookahead_coverages: Vec<CoverageTable>,
    pub seq_lookup_records: Vec<SequenceLookupRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainedSequenceRuleSet<T> {
    pub chained_seq_rules: Vec<ChainedSequenceRule<T>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainedSequenceRule<T> {
    /// The backtrack sequence, in logical order.
    pub backtrack_sequence: Vec<T>,
    /// The input sequence, starting with the second position.
    pub input_sequence: Vec<T>,
    pub lookahead_sequence: Vec<T>,
    pub seq_lookup_records: Vec<SequenceLookupRecord>,
}

/// Identifies a rule within a (chained) sequence context subtable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RuleLocation {
    /// A format 1 rule, for the glyph at `coverage_index`.
    Glyph { coverage_index: u16, rule_index: u16 },
    /// A format 2 rule, for input sequences starting with `class`.
    Class { class: u16, rule_index: u16 },
    /// The single rule of a format 3 subtable.
    Coverage,
}

/// The lookup records of one contextual rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleActions<'a> {
    pub location: RuleLocation,
    pub seq_lookup_records: &'a [SequenceLookupRecord],
}

impl Format<u16> for SequenceContextFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for SequenceContextFormat2 {
    const FORMAT: u16 = 2;
}

impl Format<u16> for SequenceContextFormat3 {
    const FORMAT: u16 = 3;
}

impl Format<u16> for ChainedSequenceContextFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for ChainedSequenceContextFormat2 {
    const FORMAT: u16 = 2;
}

impl Format<u16> for ChainedSequenceContextFormat3 {
    const FORMAT: u16 = 3;
}

// glue so that the two kinds of rule sets can share `rule_set_actions`
trait RuleSet {
    fn rule_records(&self) -> Vec<&[SequenceLookupRecord]>;
}

impl<T> RuleSet for SequenceRuleSet<T> {
    fn rule_records(&self) -> Vec<&[SequenceLookupRecord]> {
        self.seq_rules
            .iter()
            .map(|rule| rule.seq_lookup_records.as_slice())
            .collect()
    }
}

impl<T> RuleSet for ChainedSequenceRuleSet<T> {
    fn rule_records(&self) -> Vec<&[SequenceLookupRecord]> {
        self.chained_seq_rules
            .iter()
            .map(|rule| rule.seq_lookup_records.as_slice())
            .collect()
    }
}

fn rule_set_actions<'a, S: RuleSet>(
    sets: &'a [Option<S>],
    location: impl Fn(u16, u16) -> RuleLocation,
) -> Vec<RuleActions<'a>> {
    let mut result = Vec::new();
    for (set_index, set) in sets.iter().enumerate() {
        let Some(set) = set else {
            continue;
        };
        for (rule_index, seq_lookup_records) in set.rule_records().into_iter().enumerate() {
            result.push(RuleActions {
                location: location(set_index as u16, rule_index as u16),
                seq_lookup_records,
            });
        }
    }
    result
}

fn glyph_location(coverage_index: u16, rule_index: u16) -> RuleLocation {
    RuleLocation::Glyph {
        coverage_index,
        rule_index,
    }
}

fn class_location(class: u16, rule_index: u16) -> RuleLocation {
    RuleLocation::Class { class, rule_index }
}

impl SequenceContext {
    /// The lookup records of every rule in this subtable.
    pub fn rule_actions(&self) -> Vec<RuleActions<'_>> {
        match self {
            SequenceContext::Format1(table) => {
                rule_set_actions(&table.seq_rule_sets, glyph_location)
            }
            SequenceContext::Format2(table) => {
                rule_set_actions(&table.class_seq_rule_sets, class_location)
            }
            SequenceContext::Format3(table) => vec![RuleActions {
                location: RuleLocation::Coverage,
                seq_lookup_records: &table.seq_lookup_records,
            }],
        }
    }
}

impl ChainedSequenceContext {
    /// The lookup records of every rule in this subtable.
    pub fn rule_actions(&self) -> Vec<RuleActions<'_>> {
        match self {
            ChainedSequenceContext::Format1(table) => {
                rule_set_actions(&table.chained_seq_rule_sets, glyph_location)
            }
            ChainedSequenceContext::Format2(table) => {
                rule_set_actions(&table.chained_class_seq_rule_sets, class_location)
            }
            ChainedSequenceContext::Format3(table) => vec![RuleActions {
                location: RuleLocation::Coverage,
                seq_lookup_records: &table.seq_lookup_records,
            }],
        }
    }
}

impl SequenceLookupRecord {
    fn read(cursor: &mut Cursor) -> Result<Self, ReadError> {
        Ok(SequenceLookupRecord {
            sequence_index: cursor.read()?,
            lookup_list_index: cursor.read()?,
        })
    }
}

// a null class definition matches every glyph to class 0
fn read_class_def_or_empty(data: FontData, offset: Offset16) -> Result<ClassDef, ReadError> {
    match data.resolve_nullable_offset(offset)? {
        Some(data) => ClassDef::read(data),
        None => Ok(ClassDef::Format2(ClassDefFormat2::default())),
    }
}

impl<'a> FontRead<'a> for SequenceContext {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            SequenceContextFormat1::FORMAT => Ok(Self::Format1(FontRead::read(data)?)),
            SequenceContextFormat2::FORMAT => Ok(Self::Format2(FontRead::read(data)?)),
            SequenceContextFormat3::FORMAT => Ok(Self::Format3(FontRead::read(data)?)),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> FontRead<'a> for SequenceContextFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let seq_rule_set_count: u16 = cursor.read()?;
        let seq_rule_set_offsets: Vec<Offset16> =
            cursor.read_array(seq_rule_set_count as usize)?;
        Ok(SequenceContextFormat1 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            seq_rule_sets: read_nullable_offsets(data, &seq_rule_set_offsets)?,
        })
    }
}

impl<'a> FontRead<'a> for SequenceContextFormat2 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let class_def_offset: Offset16 = cursor.read()?;
        let class_seq_rule_set_count: u16 = cursor.read()?;
        let class_seq_rule_set_offsets: Vec<Offset16> =
            cursor.read_array(class_seq_rule_set_count as usize)?;
        Ok(SequenceContextFormat2 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            class_def: read_class_def_or_empty(data, class_def_offset)?,
            class_seq_rule_sets: read_nullable_offsets(data, &class_seq_rule_set_offsets)?,
        })
    }
}

impl<'a> FontRead<'a> for SequenceContextFormat3 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let glyph_count: u16 = cursor.read()?;
        let seq_lookup_count: u16 = cursor.read()?;
        let coverage_offsets: Vec<Offset16> = cursor.read_array(glyph_count as usize)?;
        let seq_lookup_records =
            cursor.read_records(seq_lookup_count as usize, SequenceLookupRecord::read)?;
        Ok(SequenceContextFormat3 {
            coverages: read_offsets(data, &coverage_offsets)?,
            seq_lookup_records,
        })
    }
}

impl<'a, T: Scalar> FontRead<'a> for SequenceRuleSet<T> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let seq_rule_count: u16 = cursor.read()?;
        let seq_rule_offsets: Vec<Offset16> = cursor.read_array(seq_rule_count as usize)?;
        Ok(SequenceRuleSet {
            seq_rules: read_offsets(data, &seq_rule_offsets)?,
        })
    }
}

impl<'a, T: Scalar> FontRead<'a> for SequenceRule<T> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let glyph_count: u16 = cursor.read()?;
        let seq_lookup_count: u16 = cursor.read()?;
        let input_sequence = cursor.read_array(glyph_count.saturating_sub(1) as usize)?;
        let seq_lookup_records =
            cursor.read_records(seq_lookup_count as usize, SequenceLookupRecord::read)?;
        Ok(SequenceRule {
            input_sequence,
            seq_lookup_records,
        })
    }
}

impl<'a> FontRead<'a> for ChainedSequenceContext {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            ChainedSequenceContextFormat1::FORMAT => Ok(Self::Format1(FontRead::read(data)?)),
            ChainedSequenceContextFormat2::FORMAT => Ok(Self::Format2(FontRead::read(data)?)),
            ChainedSequenceContextFormat3::FORMAT => Ok(Self::Format3(FontRead::read(data)?)),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> FontRead<'a> for ChainedSequenceContextFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let chained_seq_rule_set_count: u16 = cursor.read()?;
        let chained_seq_rule_set_offsets: Vec<Offset16> =
            cursor.read_array(chained_seq_rule_set_count as usize)?;
        Ok(ChainedSequenceContextFormat1 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            chained_seq_rule_sets: read_nullable_offsets(data, &chained_seq_rule_set_offsets)?,
        })
    }
}

impl<'a> FontRead<'a> for ChainedSequenceContextFormat2 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let backtrack_class_def_offset: Offset16 = cursor.read()?;
        let input_class_def_offset: Offset16 = cursor.read()?;
        let lookahead_class_def_offset: Offset16 = cursor.read()?;
        let chained_class_seq_rule_set_count: u16 = cursor.read()?;
        let chained_class_seq_rule_set_offsets: Vec<Offset16> =
            cursor.read_array(chained_class_seq_rule_set_count as usize)?;
        Ok(ChainedSequenceContextFormat2 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            backtrack_class_def: read_class_def_or_empty(data, backtrack_class_def_offset)?,
            input_class_def: read_class_def_or_empty(data, input_class_def_offset)?,
            lookahead_class_def: read_class_def_or_empty(data, lookahead_class_def_offset)?,
            chained_class_seq_rule_sets: read_nullable_offsets(
                data,
                &chained_class_seq_rule_set_offsets,
            )?,
        })
    }
}

impl<'a> FontRead<'a> for ChainedSequenceContextFormat3 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let backtrack_glyph_count: u16 = cursor.read()?;
        let backtrack_offsets: Vec<Offset16> =
            cursor.read_array(backtrack_glyph_count as usize)?;
        let input_glyph_count: u16 = cursor.read()?;
        let input_offsets: Vec<Offset16> = cursor.read_array(input_glyph_count as usize)?;
        let lookahead_glyph_count: u16 = cursor.read()?;
        let lookahead_offsets: Vec<Offset16> =
            cursor.read_array(lookahead_glyph_count as usize)?;
        let seq_lookup_count: u16 = cursor.read()?;
        let seq_lookup_records =
            cursor.read_records(seq_lookup_count as usize, SequenceLookupRecord::read)?;
        Ok(ChainedSequenceContextFormat3 {
            backtrack_coverages: read_offsets(data, &backtrack_offsets)?,
            input_coverages: read_offsets(data, &input_offsets)?,
            lookahead_coverages: read_offsets(data, &lookahead_offsets)?,
            seq_lookup_records,
        })
    }
}

impl<'a, T: Scalar> FontRead<'a> for ChainedSequenceRuleSet<T> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let chained_seq_rule_count: u16 = cursor.read()?;
        let chained_seq_rule_offsets: Vec<Offset16> =
            cursor.read_array(chained_seq_rule_count as usize)?;
        Ok(ChainedSequenceRuleSet {
            chained_seq_rules: read_offsets(data, &chained_seq_rule_offsets)?,
        })
    }
}

impl<'a, T: Scalar> FontRead<'a> for ChainedSequenceRule<T> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let backtrack_glyph_count: u16 = cursor.read()?;
        let backtrack_sequence = cursor.read_array(backtrack_glyph_count as usize)?;
        let input_glyph_count: u16 = cursor.read()?;
        let input_sequence = cursor.read_array(input_glyph_count.saturating_sub(1) as usize)?;
        let lookahead_glyph_count: u16 = cursor.read()?;
        let lookahead_sequence = cursor.read_array(lookahead_glyph_count as usize)?;
        let seq_lookup_count: u16 = cursor.read()?;
        let seq_lookup_records =
            cursor.read_records(seq_lookup_count as usize, SequenceLookupRecord::read)?;
        Ok(ChainedSequenceRule {
            backtrack_sequence,
            input_sequence,
            lookahead_sequence,
            seq_lookup_records,
        })
    }
}
