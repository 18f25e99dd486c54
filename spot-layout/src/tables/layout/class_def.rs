//! Class definition tables

use std::cmp::Ordering;

use types::GlyphId16;

use crate::{
    font_data::{Cursor, FontData},
    read::{FontRead, Format},
    ReadError,
};

/// A [Class Definition Table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#class-definition-table)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassDef {
    Format1(ClassDefFormat1),
    Format2(ClassDefFormat2),
}

/// Class definition format 1: classes for a consecutive run of glyphs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDefFormat1 {
    pub start_glyph_id: GlyphId16,
    pub class_value_array: Vec<u16>,
}

/// Class definition format 2: classes for ranges of glyphs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDefFormat2 {
    pub class_range_records: Vec<ClassRangeRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassRangeRecord {
    pub start_glyph_id: GlyphId16,
    pub end_glyph_id: GlyphId16,
    pub class: u16,
}

impl Format<u16> for ClassDefFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for ClassDefFormat2 {
    const FORMAT: u16 = 2;
}

impl ClassDef {
    /// Get the class for this glyph id.
    ///
    /// Glyphs that are not listed belong to class 0.
    pub fn get(&self, glyph: GlyphId16) -> u16 {
        match self {
            ClassDef::Format1(table) => table.get(glyph),
            ClassDef::Format2(table) => table.get(glyph),
        }
    }

    /// Iterate over each glyph and its class.
    ///
    /// Only explicitly listed glyphs are returned.
    pub fn iter(&self) -> impl Iterator<Item = (GlyphId16, u16)> + '_ {
        let (one, two) = match self {
            ClassDef::Format1(table) => (Some(table.iter()), None),
            ClassDef::Format2(table) => (None, Some(table.iter())),
        };
        one.into_iter().flatten().chain(two.into_iter().flatten())
    }

    /// The glyphs belonging to each class below `class_count`.
    ///
    /// Class 0 only holds the glyphs that are explicitly assigned to it.
    pub fn class_glyphs(&self, class_count: u16) -> Vec<Vec<GlyphId16>> {
        let mut classes = vec![Vec::new(); class_count as usize];
        for (glyph, class) in self.iter() {
            if let Some(glyphs) = classes.get_mut(class as usize) {
                glyphs.push(glyph);
            }
        }
        classes
    }
}

impl ClassDefFormat1 {
    pub fn get(&self, glyph: GlyphId16) -> u16 {
        glyph
            .to_u16()
            .checked_sub(self.start_glyph_id.to_u16())
            .and_then(|idx| self.class_value_array.get(idx as usize))
            .copied()
            .unwrap_or(0)
    }

    fn iter(&self) -> impl Iterator<Item = (GlyphId16, u16)> + '_ {
        let start = self.start_glyph_id.to_u16() as u32;
        self.class_value_array
            .iter()
            .enumerate()
            .filter_map(move |(i, class)| {
                let glyph = u16::try_from(start + i as u32).ok()?;
                Some((GlyphId16::new(glyph), *class))
            })
    }
}

impl ClassDefFormat2 {
    pub fn get(&self, glyph: GlyphId16) -> u16 {
        self.class_range_records
            .binary_search_by(|rec| {
                if rec.end_glyph_id < glyph {
                    Ordering::Less
                } else if rec.start_glyph_id > glyph {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .map(|idx| self.class_range_records[idx].class)
            .unwrap_or(0)
    }

    fn iter(&self) -> impl Iterator<Item = (GlyphId16, u16)> + '_ {
        self.class_range_records.iter().flat_map(|rec| {
            (rec.start_glyph_id.to_u16()..=rec.end_glyph_id.to_u16())
                .map(move |gid| (GlyphId16::new(gid), rec.class))
        })
    }
}

impl ClassRangeRecord {
    fn read(cursor: &mut Cursor) -> Result<Self, ReadError> {
        Ok(ClassRangeRecord {
            start_glyph_id: cursor.read()?,
            end_glyph_id: cursor.read()?,
            class: cursor.read()?,
        })
    }
}

impl<'a> FontRead<'a> for ClassDef {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            ClassDefFormat1::FORMAT => Ok(Self::Format1(FontRead::read(data)?)),
            ClassDefFormat2::FORMAT => Ok(Self::Format2(FontRead::read(data)?)),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> FontRead<'a> for ClassDefFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let start_glyph_id = cursor.read()?;
        let glyph_count: u16 = cursor.read()?;
        let class_value_array = cursor.read_array(glyph_count as usize)?;
        Ok(ClassDefFormat1 {
            start_glyph_id,
            class_value_array,
        })
    }
}

impl<'a> FontRead<'a> for ClassDefFormat2 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2);
        let class_range_count: u16 = cursor.read()?;
        let class_range_records =
            cursor.read_records(class_range_count as usize, ClassRangeRecord::read)?;
        Ok(ClassDefFormat2 {
            class_range_records,
        })
    }
}

#[cfg(test)]
mod tests {
    use spot_test_data::layout::{class_def_format1, class_def_format2};

    use super::*;

    #[test]
    fn format1_classes() {
        let data = class_def_format1(10, &[1, 0, 2]);
        let class_def = ClassDef::read(FontData::new(&data)).unwrap();
        assert_eq!(class_def.get(GlyphId16::new(9)), 0);
        assert_eq!(class_def.get(GlyphId16::new(10)), 1);
        assert_eq!(class_def.get(GlyphId16::new(11)), 0);
        assert_eq!(class_def.get(GlyphId16::new(12)), 2);
        assert_eq!(class_def.get(GlyphId16::new(13)), 0);
    }

    #[test]
    fn format2_classes() {
        let data = class_def_format2(&[(5, 7, 1), (20, 20, 3)]);
        let class_def = ClassDef::read(FontData::new(&data)).unwrap();
        assert_eq!(class_def.get(GlyphId16::new(4)), 0);
        assert_eq!(class_def.get(GlyphId16::new(6)), 1);
        assert_eq!(class_def.get(GlyphId16::new(20)), 3);
        assert_eq!(class_def.get(GlyphId16::new(21)), 0);
    }

    #[test]
    fn class_glyphs() {
        let data = class_def_format2(&[(5, 6, 1), (8, 8, 0), (9, 9, 2), (30, 30, 7)]);
        let class_def = ClassDef::read(FontData::new(&data)).unwrap();
        let classes = class_def.class_glyphs(3);
        assert_eq!(classes.len(), 3);
        // class 0 only lists what was explicitly assigned
        assert_eq!(classes[0], vec![GlyphId16::new(8)]);
        assert_eq!(classes[1], vec![GlyphId16::new(5), GlyphId16::new(6)]);
        assert_eq!(classes[2], vec![GlyphId16::new(9)]);
    }
}
