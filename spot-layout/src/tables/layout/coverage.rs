//! Coverage tables

use std::cmp::Ordering;

use types::GlyphId16;

use crate::{
    font_data::{Cursor, FontData},
    read::{FontRead, Format},
    ReadError,
};

/// A [Coverage Table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#coverage-table)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoverageTable {
    Format1(CoverageFormat1),
    Format2(CoverageFormat2),
}

/// Coverage format 1: a sorted array of glyphs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageFormat1 {
    pub glyph_array: Vec<GlyphId16>,
}

/// Coverage format 2: sorted, non-overlapping ranges of glyphs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageFormat2 {
    pub range_records: Vec<RangeRecord>,
}

/// A range of consecutive glyphs in a format 2 coverage table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeRecord {
    pub start_glyph_id: GlyphId16,
    pub end_glyph_id: GlyphId16,
    /// The coverage index of `start_glyph_id`.
    pub start_coverage_index: u16,
}

impl Format<u16> for CoverageFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for CoverageFormat2 {
    const FORMAT: u16 = 2;
}

impl CoverageTable {
    /// If this glyph is in the coverage table, returns its index
    pub fn get(&self, glyph: GlyphId16) -> Option<u16> {
        match self {
            CoverageTable::Format1(sub) => sub.get(glyph),
            CoverageTable::Format2(sub) => sub.get(glyph),
        }
    }

    /// Iterate over the covered glyphs, in coverage index order.
    pub fn iter(&self) -> impl Iterator<Item = GlyphId16> + '_ {
        // all one expression so that we have a single return type
        let (iter1, iter2) = match self {
            CoverageTable::Format1(t) => (Some(t.glyph_array.iter().copied()), None),
            CoverageTable::Format2(t) => {
                let iter = t.range_records.iter().flat_map(RangeRecord::iter);
                (None, Some(iter))
            }
        };

        iter1
            .into_iter()
            .flatten()
            .chain(iter2.into_iter().flatten())
    }

    /// The number of glyphs covered.
    pub fn len(&self) -> usize {
        match self {
            CoverageTable::Format1(t) => t.glyph_array.len(),
            CoverageTable::Format2(t) => t.range_records.iter().map(RangeRecord::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CoverageFormat1 {
    pub fn get(&self, glyph: GlyphId16) -> Option<u16> {
        self.glyph_array
            .binary_search(&glyph)
            .ok()
            .map(|idx| idx as u16)
    }
}

impl CoverageFormat2 {
    pub fn get(&self, glyph: GlyphId16) -> Option<u16> {
        self.range_records
            .binary_search_by(|rec| {
                if rec.end_glyph_id < glyph {
                    Ordering::Less
                } else if rec.start_glyph_id > glyph {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .ok()
            .map(|idx| {
                let rec = &self.range_records[idx];
                rec.start_coverage_index
                    .wrapping_add(glyph.to_u16() - rec.start_glyph_id.to_u16())
            })
    }
}

impl RangeRecord {
    fn iter(&self) -> impl Iterator<Item = GlyphId16> {
        (self.start_glyph_id.to_u16()..=self.end_glyph_id.to_u16()).map(GlyphId16::new)
    }

    fn len(&self) -> usize {
        (self.end_glyph_id.to_u16() as usize + 1).saturating_sub(self.start_glyph_id.to_u16() as usize)
    }

    fn read(cursor: &mut Cursor) -> Result<Self, ReadError> {
        Ok(RangeRecord {
            start_glyph_id: cursor.read()?,
            end_glyph_id: cursor.read()?,
            start_coverage_index: cursor.read()?,
        })
    }
}

impl<'a> FontRead<'a> for CoverageTable {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            CoverageFormat1::FORMAT => Ok(Self::Format1(FontRead::read(data)?)),
            CoverageFormat2::FORMAT => Ok(Self::Format2(FontRead::read(data)?)),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> FontRead<'a> for CoverageFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let glyph_count: u16 = cursor.read()?;
        let glyph_array = cursor.read_array(glyph_count as usize)?;
        Ok(CoverageFormat1 { glyph_array })
    }
}

impl<'a> FontRead<'a> for CoverageFormat2 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let range_count: u16 = cursor.read()?;
        let range_records = cursor.read_records(range_count as usize, RangeRecord::read)?;
        Ok(CoverageFormat2 { range_records })
    }
}
