//! the [GPOS] table
//!
//! [GPOS]: https://docs.microsoft.com/en-us/typography/opentype/spec/gpos

mod anchor;
mod eval;
mod value_record;

use types::{FixedSize, GlyphId16, Offset16, Tag, GPOS_TAG};

pub use anchor::{AnchorFormat1, AnchorFormat2, AnchorFormat3, AnchorTable};
pub use eval::PositionAdjustment;
pub use value_record::{ValueFormat, ValueRecord};

/// reexport stuff from layout that we use
pub use super::layout::{
    ChainedSequenceContext, ClassDef, CoverageTable, DeviceOrVariationIndex, ExtensionSubtable,
    FeatureList, ScriptList, SequenceContext,
};
use super::layout::{LookupSubtable, RuleActions};
use crate::{
    diagnostic::DecodeContext,
    font_data::{Cursor, FontData},
    read::{ComputeSize, FontRead, FontReadWithArgs, Format, ReadArgs},
    ReadError,
};
use anchor::read_anchor;

#[cfg(test)]
#[path = "../tests/test_gpos.rs"]
mod tests;

/// The [GPOS] table
///
/// [GPOS]: https://docs.microsoft.com/en-us/typography/opentype/spec/gpos
pub type Gpos = super::layout::LayoutTable<PositionSubtable>;

/// A GPOS [Lookup](super::layout::Lookup)
pub type PositionLookup = super::layout::Lookup<PositionSubtable>;

/// A typed GPOS [LookupList](super::layout::LookupList)
pub type PositionLookupList = super::layout::LookupList<PositionSubtable>;

/// GPOS lookup types
pub mod lookup_type {
    pub const SINGLE: u16 = 1;
    pub const PAIR: u16 = 2;
    pub const CURSIVE: u16 = 3;
    pub const MARK_TO_BASE: u16 = 4;
    pub const MARK_TO_LIGATURE: u16 = 5;
    pub const MARK_TO_MARK: u16 = 6;
    pub const CONTEXT: u16 = 7;
    pub const CHAINED_CONTEXT: u16 = 8;
    pub const EXTENSION: u16 = 9;
}

/// A decoded GPOS subtable, of any lookup type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionSubtable {
    Single(SinglePos),
    Pair(PairPos),
    Cursive(CursivePosFormat1),
    MarkToBase(MarkBasePosFormat1),
    MarkToLig(MarkLigPosFormat1),
    MarkToMark(MarkMarkPosFormat1),
    Contextual(SequenceContext),
    ChainContextual(ChainedSequenceContext),
    Extension(ExtensionSubtable<PositionSubtable>),
}

/// [Single Adjustment Positioning](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-1-single-adjustment-positioning-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SinglePos {
    Format1(SinglePosFormat1),
    Format2(SinglePosFormat2),
}

/// One value record shared by every covered glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SinglePosFormat1 {
    pub coverage: CoverageTable,
    pub value_format: ValueFormat,
    pub value_record: ValueRecord,
}

/// One value record per covered glyph, in coverage order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SinglePosFormat2 {
    pub coverage: CoverageTable,
    pub value_format: ValueFormat,
    pub value_records: Vec<ValueRecord>,
}

/// [Pair Adjustment Positioning](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-2-pair-adjustment-positioning-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairPos {
    Format1(PairPosFormat1),
    Format2(PairPosFormat2),
}

/// Adjustments for glyph pairs, keyed by the first glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairPosFormat1 {
    pub coverage: CoverageTable,
    pub value_format1: ValueFormat,
    pub value_format2: ValueFormat,
    /// One pair set per covered first glyph.
    pub pair_sets: Vec<PairSet>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairSet {
    /// Ordered by second glyph.
    pub pair_value_records: Vec<PairValueRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairValueRecord {
    pub second_glyph: GlyphId16,
    pub value_record1: ValueRecord,
    pub value_record2: ValueRecord,
}

/// Adjustments for glyph pairs, by class.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairPosFormat2 {
    pub coverage: CoverageTable,
    pub value_format1: ValueFormat,
    pub value_format2: ValueFormat,
    /// Classes for the first glyph of a pair.
    pub class_def1: ClassDef,
    /// Classes for the second glyph of a pair.
    pub class_def2: ClassDef,
    pub class1_count: u16,
    pub class2_count: u16,
    pub class1_records: Vec<Class1Record>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Class1Record {
    pub class2_records: Vec<Class2Record>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Class2Record {
    pub value_record1: ValueRecord,
    pub value_record2: ValueRecord,
}

/// [Cursive Attachment Positioning](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-3-cursive-attachment-positioning-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CursivePosFormat1 {
    pub coverage: CoverageTable,
    pub entry_exit_records: Vec<EntryExitRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryExitRecord {
    pub entry_anchor: Option<AnchorTable>,
    pub exit_anchor: Option<AnchorTable>,
}

/// [Mark-to-Base Attachment Positioning](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-4-mark-to-base-attachment-positioning-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkBasePosFormat1 {
    pub mark_coverage: CoverageTable,
    pub base_coverage: CoverageTable,
    pub mark_class_count: u16,
    pub mark_array: MarkArray,
    pub base_array: BaseArray,
}

/// [Mark Array](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#mark-array-table)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkArray {
    /// One record per covered mark, in coverage order.
    pub mark_records: Vec<MarkRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkRecord {
    pub mark_class: u16,
    pub mark_anchor: Option<AnchorTable>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseArray {
    pub base_records: Vec<BaseRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseRecord {
    /// One (possibly absent) anchor per mark class.
    pub base_anchors: Vec<Option<AnchorTable>>,
}

/// [Mark-to-Ligature Attachment Positioning](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-5-mark-to-ligature-attachment-positioning-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkLigPosFormat1 {
    pub mark_coverage: CoverageTable,
    pub ligature_coverage: CoverageTable,
    pub mark_class_count: u16,
    pub mark_array: MarkArray,
    pub ligature_array: LigatureArray,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LigatureArray {
    pub ligature_attaches: Vec<LigatureAttach>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LigatureAttach {
    /// One record per ligature component, in writing order.
    pub component_records: Vec<ComponentRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentRecord {
    pub ligature_anchors: Vec<Option<AnchorTable>>,
}

/// [Mark-to-Mark Attachment Positioning](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-6-mark-to-mark-attachment-positioning-subtable)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkMarkPosFormat1 {
    /// The attaching marks.
    pub mark1_coverage: CoverageTable,
    /// The base marks.
    pub mark2_coverage: CoverageTable,
    pub mark_class_count: u16,
    pub mark1_array: MarkArray,
    pub mark2_array: Mark2Array,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mark2Array {
    pub mark2_records: Vec<Mark2Record>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mark2Record {
    pub mark2_anchors: Vec<Option<AnchorTable>>,
}

impl Format<u16> for SinglePosFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for SinglePosFormat2 {
    const FORMAT: u16 = 2;
}

impl Format<u16> for PairPosFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for PairPosFormat2 {
    const FORMAT: u16 = 2;
}

impl Format<u16> for CursivePosFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for MarkBasePosFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for MarkLigPosFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for MarkMarkPosFormat1 {
    const FORMAT: u16 = 1;
}

impl LookupSubtable for PositionSubtable {
    const TABLE_TAG: Tag = GPOS_TAG;
    const EXTENSION_LOOKUP_TYPE: u16 = lookup_type::EXTENSION;

    fn is_known_lookup_type(lookup_type: u16) -> bool {
        (lookup_type::SINGLE..=lookup_type::CHAINED_CONTEXT).contains(&lookup_type)
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
        ctx: &mut DecodeContext,
    ) -> Result<Self, ReadError> {
        match lookup_type {
            lookup_type::SINGLE => SinglePos::read(data).map(Self::Single),
            lookup_type::PAIR => PairPos::read(data).map(Self::Pair),
            lookup_type::CURSIVE => CursivePosFormat1::read(data, ctx).map(Self::Cursive),
            lookup_type::MARK_TO_BASE => MarkBasePosFormat1::read(data, ctx).map(Self::MarkToBase),
            lookup_type::MARK_TO_LIGATURE => {
                MarkLigPosFormat1::read(data, ctx).map(Self::MarkToLig)
            }
            lookup_type::MARK_TO_MARK => MarkMarkPosFormat1::read(data, ctx).map(Self::MarkToMark),
            lookup_type::CONTEXT => SequenceContext::read(data).map(Self::Contextual),
            lookup_type::CHAINED_CONTEXT => {
                ChainedSequenceContext::read(data).map(Self::ChainContextual)
            }
            _ => Err(ReadError::MalformedData("not a GPOS lookup type")),
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
            Self::Pair(_) => lookup_type::PAIR,
            Self::Cursive(_) => lookup_type::CURSIVE,
            Self::MarkToBase(_) => lookup_type::MARK_TO_BASE,
            Self::MarkToLig(_) => lookup_type::MARK_TO_LIGATURE,
            Self::MarkToMark(_) => lookup_type::MARK_TO_MARK,
            Self::Contextual(_) => lookup_type::CONTEXT,
            Self::ChainContextual(_) => lookup_type::CHAINED_CONTEXT,
            Self::Extension(_) => lookup_type::EXTENSION,
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

impl<'a> FontRead<'a> for SinglePos {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            SinglePosFormat1::FORMAT => Ok(Self::Format1(FontRead::read(data)?)),
            SinglePosFormat2::FORMAT => Ok(Self::Format2(FontRead::read(data)?)),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> FontRead<'a> for SinglePosFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let value_format: ValueFormat = cursor.read()?;
        let value_record = cursor.read_with_args(&value_format)?;
        Ok(SinglePosFormat1 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            value_format,
            value_record,
        })
    }
}

impl<'a> FontRead<'a> for SinglePosFormat2 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let value_format: ValueFormat = cursor.read()?;
        let value_count: u16 = cursor.read()?;
        let value_records = cursor.read_array_with_args(value_count as usize, &value_format)?;
        Ok(SinglePosFormat2 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            value_format,
            value_records,
        })
    }
}

impl<'a> FontRead<'a> for PairPos {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            PairPosFormat1::FORMAT => Ok(Self::Format1(FontRead::read(data)?)),
            PairPosFormat2::FORMAT => Ok(Self::Format2(FontRead::read(data)?)),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> FontRead<'a> for PairPosFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let value_format1: ValueFormat = cursor.read()?;
        let value_format2: ValueFormat = cursor.read()?;
        let pair_set_count: u16 = cursor.read()?;
        let pair_set_offsets: Vec<Offset16> = cursor.read_array(pair_set_count as usize)?;
        let pair_sets = pair_set_offsets
            .into_iter()
            .map(|offset| {
                PairSet::read_with_args(
                    data.resolve_offset(offset)?,
                    &(value_format1, value_format2),
                )
            })
            .collect::<Result<_, _>>()?;
        Ok(PairPosFormat1 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            value_format1,
            value_format2,
            pair_sets,
        })
    }
}

impl ReadArgs for PairSet {
    type Args = (ValueFormat, ValueFormat);
}

impl<'a> FontReadWithArgs<'a> for PairSet {
    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let pair_value_count: u16 = cursor.read()?;
        let pair_value_records = cursor.read_array_with_args(pair_value_count as usize, args)?;
        Ok(PairSet { pair_value_records })
    }
}

impl ReadArgs for PairValueRecord {
    type Args = (ValueFormat, ValueFormat);
}

impl<'a> FontReadWithArgs<'a> for PairValueRecord {
    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(PairValueRecord {
            second_glyph: cursor.read()?,
            value_record1: cursor.read_with_args(&args.0)?,
            value_record2: cursor.read_with_args(&args.1)?,
        })
    }
}

impl ComputeSize for PairValueRecord {
    fn compute_size(args: &Self::Args) -> Result<usize, ReadError> {
        Ok(GlyphId16::RAW_BYTE_LEN + args.0.record_byte_len() + args.1.record_byte_len())
    }
}

impl<'a> FontRead<'a> for PairPosFormat2 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let coverage_offset: Offset16 = cursor.read()?;
        let value_format1: ValueFormat = cursor.read()?;
        let value_format2: ValueFormat = cursor.read()?;
        let class_def1_offset: Offset16 = cursor.read()?;
        let class_def2_offset: Offset16 = cursor.read()?;
        let class1_count: u16 = cursor.read()?;
        let class2_count: u16 = cursor.read()?;
        let args = (value_format1, value_format2);
        let class1_records = cursor.read_records(class1_count as usize, |cursor| {
            Ok(Class1Record {
                class2_records: cursor.read_array_with_args(class2_count as usize, &args)?,
            })
        })?;
        Ok(PairPosFormat2 {
            coverage: CoverageTable::read(data.resolve_offset(coverage_offset)?)?,
            value_format1,
            value_format2,
            class_def1: ClassDef::read(data.resolve_offset(class_def1_offset)?)?,
            class_def2: ClassDef::read(data.resolve_offset(class_def2_offset)?)?,
            class1_count,
            class2_count,
            class1_records,
        })
    }
}

impl ReadArgs for Class2Record {
    type Args = (ValueFormat, ValueFormat);
}

impl<'a> FontReadWithArgs<'a> for Class2Record {
    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        Ok(Class2Record {
            value_record1: cursor.read_with_args(&args.0)?,
            value_record2: cursor.read_with_args(&args.1)?,
        })
    }
}

impl ComputeSize for Class2Record {
    fn compute_size(args: &Self::Args) -> Result<usize, ReadError> {
        Ok(args.0.record_byte_len() + args.1.record_byte_len())
    }
}

// reads a format field that must be 1, for the single-format subtables
fn check_format_1(cursor: &mut Cursor) -> Result<(), ReadError> {
    let format: u16 = cursor.read()?;
    if format != 1 {
        return Err(ReadError::InvalidFormat(format.into()));
    }
    Ok(())
}

impl CursivePosFormat1 {
    fn read(data: FontData, ctx: &mut DecodeContext) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        check_format_1(&mut cursor)?;
        let coverage_offset: Offset16 = cursor.read()?;
        let entry_exit_count: u16 = cursor.read()?;
        let anchor_offsets = cursor.read_records(entry_exit_count as usize, |cursor| {
            Ok((cursor.read::<Offset16>()?, cursor.read::<Offset16>()?))
        })?;
        let coverage = CoverageTable::read(data.resolve_offset(coverage_offset)?)?;
        let mut entry_exit_records = Vec::with_capacity(anchor_offsets.len());
        for (entry, exit) in anchor_offsets {
            entry_exit_records.push(EntryExitRecord {
                entry_anchor: read_anchor(data, entry, ctx)?,
                exit_anchor: read_anchor(data, exit, ctx)?,
            });
        }
        Ok(CursivePosFormat1 {
            coverage,
            entry_exit_records,
        })
    }
}

impl MarkBasePosFormat1 {
    fn read(data: FontData, ctx: &mut DecodeContext) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        check_format_1(&mut cursor)?;
        let mark_coverage_offset: Offset16 = cursor.read()?;
        let base_coverage_offset: Offset16 = cursor.read()?;
        let mark_class_count: u16 = cursor.read()?;
        let mark_array_offset: Offset16 = cursor.read()?;
        let base_array_offset: Offset16 = cursor.read()?;
        let base_records = read_anchor_rows(
            data.resolve_offset(base_array_offset)?,
            mark_class_count,
            ctx,
        )?
        .into_iter()
        .map(|base_anchors| BaseRecord { base_anchors })
        .collect();
        Ok(MarkBasePosFormat1 {
            mark_coverage: CoverageTable::read(data.resolve_offset(mark_coverage_offset)?)?,
            base_coverage: CoverageTable::read(data.resolve_offset(base_coverage_offset)?)?,
            mark_class_count,
            mark_array: MarkArray::read(data.resolve_offset(mark_array_offset)?, ctx)?,
            base_array: BaseArray { base_records },
        })
    }
}

impl MarkLigPosFormat1 {
    fn read(data: FontData, ctx: &mut DecodeContext) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        check_format_1(&mut cursor)?;
        let mark_coverage_offset: Offset16 = cursor.read()?;
        let ligature_coverage_offset: Offset16 = cursor.read()?;
        let mark_class_count: u16 = cursor.read()?;
        let mark_array_offset: Offset16 = cursor.read()?;
        let ligature_array_offset: Offset16 = cursor.read()?;
        Ok(MarkLigPosFormat1 {
            mark_coverage: CoverageTable::read(data.resolve_offset(mark_coverage_offset)?)?,
            ligature_coverage: CoverageTable::read(
                data.resolve_offset(ligature_coverage_offset)?,
            )?,
            mark_class_count,
            mark_array: MarkArray::read(data.resolve_offset(mark_array_offset)?, ctx)?,
            ligature_array: LigatureArray::read(
                data.resolve_offset(ligature_array_offset)?,
                mark_class_count,
                ctx,
            )?,
        })
    }
}

impl MarkMarkPosFormat1 {
    fn read(data: FontData, ctx: &mut DecodeContext) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        check_format_1(&mut cursor)?;
        let mark1_coverage_offset: Offset16 = cursor.read()?;
        let mark2_coverage_offset: Offset16 = cursor.read()?;
        let mark_class_count: u16 = cursor.read()?;
        let mark1_array_offset: Offset16 = cursor.read()?;
        let mark2_array_offset: Offset16 = cursor.read()?;
        let mark2_records = read_anchor_rows(
            data.resolve_offset(mark2_array_offset)?,
            mark_class_count,
            ctx,
        )?
        .into_iter()
        .map(|mark2_anchors| Mark2Record { mark2_anchors })
        .collect();
        Ok(MarkMarkPosFormat1 {
            mark1_coverage: CoverageTable::read(data.resolve_offset(mark1_coverage_offset)?)?,
            mark2_coverage: CoverageTable::read(data.resolve_offset(mark2_coverage_offset)?)?,
            mark_class_count,
            mark1_array: MarkArray::read(data.resolve_offset(mark1_array_offset)?, ctx)?,
            mark2_array: Mark2Array { mark2_records },
        })
    }
}

impl MarkArray {
    fn read(data: FontData, ctx: &mut DecodeContext) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let mark_count: u16 = cursor.read()?;
        let raw_records = cursor.read_records(mark_count as usize, |cursor| {
            Ok((cursor.read::<u16>()?, cursor.read::<Offset16>()?))
        })?;
        let mut mark_records = Vec::with_capacity(raw_records.len());
        for (mark_class, anchor_offset) in raw_records {
            mark_records.push(MarkRecord {
                mark_class,
                mark_anchor: read_anchor(data, anchor_offset, ctx)?,
            });
        }
        Ok(MarkArray { mark_records })
    }
}

impl LigatureArray {
    fn read(
        data: FontData,
        mark_class_count: u16,
        ctx: &mut DecodeContext,
    ) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let ligature_count: u16 = cursor.read()?;
        let ligature_attach_offsets: Vec<Offset16> = cursor.read_array(ligature_count as usize)?;
        let mut ligature_attaches = Vec::with_capacity(ligature_attach_offsets.len());
        for offset in ligature_attach_offsets {
            let component_records =
                read_anchor_rows(data.resolve_offset(offset)?, mark_class_count, ctx)?
                    .into_iter()
                    .map(|ligature_anchors| ComponentRecord { ligature_anchors })
                    .collect();
            ligature_attaches.push(LigatureAttach { component_records });
        }
        Ok(LigatureArray { ligature_attaches })
    }
}

/// Read a count followed by that many rows of `mark_class_count` anchor
/// offsets, then the anchors.
///
/// This is the layout of BaseArray, Mark2Array and LigatureAttach; the
/// anchor offsets are relative to the start of `data`.
fn read_anchor_rows(
    data: FontData,
    mark_class_count: u16,
    ctx: &mut DecodeContext,
) -> Result<Vec<Vec<Option<AnchorTable>>>, ReadError> {
    let mut cursor = data.cursor();
    let row_count: u16 = cursor.read()?;
    let rows = cursor.read_records(row_count as usize, |cursor| {
        cursor.read_array::<Offset16>(mark_class_count as usize)
    })?;
    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        let mut anchors = Vec::with_capacity(row.len());
        for offset in row {
            anchors.push(read_anchor(data, offset, ctx)?);
        }
        result.push(anchors);
    }
    Ok(result)
}

impl MarkBasePosFormat1 {
    /// The anchors to attach `mark` to `base`, as (mark anchor, base anchor).
    pub fn attachment(
        &self,
        mark: GlyphId16,
        base: GlyphId16,
    ) -> Option<(&AnchorTable, &AnchorTable)> {
        let mark_record = self
            .mark_array
            .mark_records
            .get(self.mark_coverage.get(mark)? as usize)?;
        let base_record = self
            .base_array
            .base_records
            .get(self.base_coverage.get(base)? as usize)?;
        let base_anchor = base_record
            .base_anchors
            .get(mark_record.mark_class as usize)?
            .as_ref()?;
        Some((mark_record.mark_anchor.as_ref()?, base_anchor))
    }
}
