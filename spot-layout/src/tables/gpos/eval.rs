//! Answering "how would this lookup position these glyphs?"

use types::GlyphId16;

use super::{
    Gpos, PairPos, PairPosFormat1, PairPosFormat2, PositionSubtable, SinglePos, ValueFormat,
    ValueRecord,
};
use crate::tables::layout::LookupSubtable;

/// The adjustments a single or pair positioning lookup applies.
///
/// Each record comes with the format of the subtable it was read from, which
/// is needed to encode or compare it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionAdjustment {
    pub first: ValueRecord,
    pub first_format: ValueFormat,
    /// Only present for pair adjustments.
    pub second: Option<ValueRecord>,
    pub second_format: ValueFormat,
}

impl PositionAdjustment {
    fn single(record: ValueRecord, format: ValueFormat) -> Self {
        PositionAdjustment {
            first: record,
            first_format: format,
            second: None,
            second_format: ValueFormat::empty(),
        }
    }

    fn pair(
        first: ValueRecord,
        first_format: ValueFormat,
        second: ValueRecord,
        second_format: ValueFormat,
    ) -> Self {
        PositionAdjustment {
            first,
            first_format,
            second: Some(second),
            second_format,
        }
    }
}

impl Gpos {
    /// Evaluate the lookup at `lookup_index` for `first` (and `second`, for
    /// pair adjustments).
    ///
    /// Subtables are tried in order, looking through extensions, and the
    /// first match wins. Only single and pair adjustment subtables are
    /// evaluated; every other type is "no match", as is an out of range
    /// lookup index.
    pub fn position(
        &self,
        lookup_index: u16,
        first: GlyphId16,
        second: Option<GlyphId16>,
    ) -> Option<PositionAdjustment> {
        let Some(lookup) = self.lookup(lookup_index) else {
            log::debug!("GPOS lookup {lookup_index} does not exist");
            return None;
        };
        lookup
            .subtables_resolved()
            .find_map(|subtable| subtable.position(first, second))
    }
}

impl PositionSubtable {
    fn position(&self, first: GlyphId16, second: Option<GlyphId16>) -> Option<PositionAdjustment> {
        match self {
            PositionSubtable::Single(table) => table.position(first),
            PositionSubtable::Pair(table) => table.position(first, second?),
            PositionSubtable::Extension(extension) => extension.resolve()?.position(first, second),
            other => {
                log::debug!(
                    "GPOS lookup type {} is not evaluated",
                    other.lookup_type()
                );
                None
            }
        }
    }
}

impl SinglePos {
    fn position(&self, glyph: GlyphId16) -> Option<PositionAdjustment> {
        match self {
            SinglePos::Format1(table) => {
                table.coverage.get(glyph)?;
                Some(PositionAdjustment::single(
                    table.value_record,
                    table.value_format,
                ))
            }
            SinglePos::Format2(table) => {
                let coverage_index = table.coverage.get(glyph)?;
                let record = table.value_records.get(coverage_index as usize)?;
                Some(PositionAdjustment::single(*record, table.value_format))
            }
        }
    }
}

impl PairPos {
    fn position(&self, first: GlyphId16, second: GlyphId16) -> Option<PositionAdjustment> {
        match self {
            PairPos::Format1(table) => table.position(first, second),
            PairPos::Format2(table) => table.position(first, second),
        }
    }
}

impl PairPosFormat1 {
    fn position(&self, first: GlyphId16, second: GlyphId16) -> Option<PositionAdjustment> {
        let coverage_index = self.coverage.get(first)?;
        let pair_set = self.pair_sets.get(coverage_index as usize)?;
        let record = pair_set
            .pair_value_records
            .iter()
            .find(|record| record.second_glyph == second)?;
        Some(PositionAdjustment::pair(
            record.value_record1,
            self.value_format1,
            record.value_record2,
            self.value_format2,
        ))
    }
}

impl PairPosFormat2 {
    fn position(&self, first: GlyphId16, second: GlyphId16) -> Option<PositionAdjustment> {
        // the coverage gates the first glyph; its class may still be 0
        self.coverage.get(first)?;
        let class1 = self.class_def1.get(first);
        let class2 = self.class_def2.get(second);
        let record = self
            .class1_records
            .get(class1 as usize)?
            .class2_records
            .get(class2 as usize)?;
        Some(PositionAdjustment::pair(
            record.value_record1,
            self.value_format1,
            record.value_record2,
            self.value_format2,
        ))
    }
}
