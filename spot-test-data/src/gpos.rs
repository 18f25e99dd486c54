//! GPOS test data, and assemblers for GPOS subtables.
//!
//! Value records are passed as the raw field values, in field order; the
//! caller is responsible for matching them to the value format.

use crate::bebuffer::BeBuffer;
use crate::layout::{class_def_format2, coverage_format1};

// https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#example-2-singleposformat1-subtable
#[rustfmt::skip]
pub static SINGLEPOSFORMAT1: &[u8] = &[
    0x00, 0x01, // format 1
    0x00, 0x08, // coverage offset
    0x00, 0x02, // valueFormat: Y_PLACEMENT
    0xFF, 0xB0, // yPlacement -80
    // coverage format 2
    0x00, 0x02, 0x00, 0x01,
    0x01, 0xB3, 0x01, 0xBC, 0x00, 0x00,
];

// https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#example-3-singleposformat2-subtable
#[rustfmt::skip]
pub static SINGLEPOSFORMAT2: &[u8] = &[
    0x00, 0x02, // format 2
    0x00, 0x14, // coverage offset
    0x00, 0x05, // valueFormat: X_PLACEMENT | X_ADVANCE
    0x00, 0x03, // valueCount
    0x00, 0x32, 0x00, 0x32,
    0x00, 0x19, 0x00, 0x19,
    0x00, 0x0A, 0x00, 0x0A,
    // coverage format 1
    0x00, 0x01, 0x00, 0x03,
    0x00, 0x4F, 0x01, 0x25, 0x01, 0x29,
];

// https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#example-4-pairposformat1-subtable
#[rustfmt::skip]
pub static PAIRPOSFORMAT1: &[u8] = &[
    0x00, 0x01, // format 1
    0x00, 0x1E, // coverage offset
    0x00, 0x04, // valueFormat1: X_ADVANCE
    0x00, 0x01, // valueFormat2: X_PLACEMENT
    0x00, 0x02, // pairSetCount
    0x00, 0x0E, // pairSetOffsets[0]
    0x00, 0x16, // pairSetOffsets[1]
    // pair set 0
    0x00, 0x01, 0x00, 0x59, 0xFF, 0xE2, 0xFF, 0xEC,
    // pair set 1
    0x00, 0x01, 0x00, 0x59, 0xFF, 0xD8, 0xFF, 0xE7,
    // coverage format 1
    0x00, 0x01, 0x00, 0x02, 0x00, 0x2D, 0x00, 0x31,
];

// https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#example-5-pairposformat2-subtable
#[rustfmt::skip]
pub static PAIRPOSFORMAT2: &[u8] = &[
    0x00, 0x02, // format 2
    0x00, 0x18, // coverage offset
    0x00, 0x04, // valueFormat1: X_ADVANCE
    0x00, 0x00, // valueFormat2
    0x00, 0x22, // classDef1 offset
    0x00, 0x32, // classDef2 offset
    0x00, 0x02, // class1Count
    0x00, 0x02, // class2Count
    0x00, 0x00, 0x00, 0x00, // class 1 record 0
    0x00, 0x00, 0xFF, 0xCE, // class 1 record 1
    // coverage format 1
    0x00, 0x01, 0x00, 0x03, 0x00, 0x46, 0x00, 0x47, 0x00, 0x49,
    // classDef1 format 2
    0x00, 0x02, 0x00, 0x02,
    0x00, 0x46, 0x00, 0x47, 0x00, 0x01,
    0x00, 0x49, 0x00, 0x49, 0x00, 0x01,
    // classDef2 format 2
    0x00, 0x02, 0x00, 0x01,
    0x00, 0x6A, 0x00, 0x6B, 0x00, 0x01,
];

#[rustfmt::skip]
pub static ANCHORFORMAT1: &[u8] = &[
    0x00, 0x01, // format 1
    0x00, 0xBD, // x 189
    0xFF, 0xF3, // y -13
];

#[rustfmt::skip]
pub static ANCHORFORMAT2: &[u8] = &[
    0x00, 0x02, // format 2
    0x01, 0x42, // x 322
    0x03, 0x84, // y 900
    0x00, 0x0D, // anchorPoint 13
];

#[rustfmt::skip]
pub static ANCHORFORMAT3: &[u8] = &[
    0x00, 0x03, // format 3
    0x01, 0x17, // x 279
    0x05, 0x15, // y 1301
    0x00, 0x0A, // xDeviceOffset
    0x00, 0x00, // yDeviceOffset (null)
    // device
    0x00, 0x0C, // startSize 12
    0x00, 0x11, // endSize 17
    0x00, 0x01, // deltaFormat: LOCAL_2_BIT_DELTAS
    0x55, 0x50, // 1, 1, 1, 1, 1, 1
];

/// A single positioning subtable (format 1) sharing one value record.
pub fn single_pos_format1(glyphs: &[u16], value_format: u16, values: &[i16]) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push_with_tag(0u16, "coverage")
        .push(value_format)
        .extend(values.iter().copied())
        .append_child16("coverage", 0, &coverage_format1(glyphs))
        .into_inner()
}

/// A single positioning subtable (format 2) with one record per glyph.
pub fn single_pos_format2(glyphs: &[u16], value_format: u16, values: &[&[i16]]) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .push(2u16)
        .push_with_tag(0u16, "coverage")
        .push(value_format)
        .push(values.len() as u16);
    for record in values {
        buf = buf.extend(record.iter().copied());
    }
    buf.append_child16("coverage", 0, &coverage_format1(glyphs))
        .into_inner()
}

/// A pair positioning subtable (format 1).
///
/// `pairs` maps each (sorted) first glyph to its `(second glyph, record1,
/// record2)` entries.
#[allow(clippy::type_complexity)]
pub fn pair_pos_format1(
    value_format1: u16,
    value_format2: u16,
    pairs: &[(u16, &[(u16, &[i16], &[i16])])],
) -> Vec<u8> {
    let first_glyphs = pairs.iter().map(|(g, _)| *g).collect::<Vec<_>>();
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push_with_tag(0u16, "coverage")
        .push(value_format1)
        .push(value_format2)
        .push(pairs.len() as u16);
    for i in 0..pairs.len() {
        buf = buf.push_with_tag(0u16, &format!("pair_set{i}"));
    }
    for (i, (_, records)) in pairs.iter().enumerate() {
        let mut set = BeBuffer::new().push(records.len() as u16);
        for (second, record1, record2) in records.iter() {
            set = set
                .push(*second)
                .extend(record1.iter().copied())
                .extend(record2.iter().copied());
        }
        buf = buf.append_child16(&format!("pair_set{i}"), 0, &set);
    }
    buf.append_child16("coverage", 0, &coverage_format1(&first_glyphs))
        .into_inner()
}

/// A pair positioning subtable (format 2).
///
/// `records` is indexed by first class, then second class.
#[allow(clippy::type_complexity)]
pub fn pair_pos_format2(
    value_format1: u16,
    value_format2: u16,
    coverage: &[u16],
    class_def1: &[(u16, u16, u16)],
    class_def2: &[(u16, u16, u16)],
    records: &[&[(&[i16], &[i16])]],
) -> Vec<u8> {
    let class2_count = records.first().map(|row| row.len()).unwrap_or_default();
    let mut buf = BeBuffer::new()
        .push(2u16)
        .push_with_tag(0u16, "coverage")
        .push(value_format1)
        .push(value_format2)
        .push_with_tag(0u16, "class_def1")
        .push_with_tag(0u16, "class_def2")
        .push(records.len() as u16)
        .push(class2_count as u16);
    for row in records {
        for (record1, record2) in row.iter() {
            buf = buf
                .extend(record1.iter().copied())
                .extend(record2.iter().copied());
        }
    }
    buf.append_child16("coverage", 0, &coverage_format1(coverage))
        .append_child16("class_def1", 0, &class_def_format2(class_def1))
        .append_child16("class_def2", 0, &class_def_format2(class_def2))
        .into_inner()
}

/// A format 1 anchor.
pub fn anchor_format1(x: i16, y: i16) -> Vec<u8> {
    BeBuffer::new().push(1u16).push(x).push(y).into_inner()
}

/// A cursive attachment subtable from sorted `(glyph, entry, exit)` records.
#[allow(clippy::type_complexity)]
pub fn cursive_pos_format1(records: &[(u16, Option<(i16, i16)>, Option<(i16, i16)>)]) -> Vec<u8> {
    let glyphs = records.iter().map(|(g, _, _)| *g).collect::<Vec<_>>();
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push_with_tag(0u16, "coverage")
        .push(records.len() as u16);
    for i in 0..records.len() {
        buf = buf
            .push_with_tag(0u16, &format!("entry{i}"))
            .push_with_tag(0u16, &format!("exit{i}"));
    }
    buf = buf.append_child16("coverage", 0, &coverage_format1(&glyphs));
    for (i, (_, entry, exit)) in records.iter().enumerate() {
        if let Some((x, y)) = entry {
            buf = buf.append_child16(&format!("entry{i}"), 0, &anchor_format1(*x, *y));
        }
        if let Some((x, y)) = exit {
            buf = buf.append_child16(&format!("exit{i}"), 0, &anchor_format1(*x, *y));
        }
    }
    buf.into_inner()
}

fn mark_array(marks: &[(u16, u16, (i16, i16))]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(marks.len() as u16);
    for (i, (_, class, _)) in marks.iter().enumerate() {
        buf = buf.push(*class).push_with_tag(0u16, &format!("anchor{i}"));
    }
    for (i, (_, _, (x, y))) in marks.iter().enumerate() {
        buf = buf.append_child16(&format!("anchor{i}"), 0, &anchor_format1(*x, *y));
    }
    buf.into_inner()
}

// a count followed by rows of nullable anchor offsets, then the anchors
fn anchor_rows(rows: &[&[Option<(i16, i16)>]]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(rows.len() as u16);
    for (r, row) in rows.iter().enumerate() {
        for c in 0..row.len() {
            buf = buf.push_with_tag(0u16, &format!("anchor{r}_{c}"));
        }
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, anchor) in row.iter().enumerate() {
            if let Some((x, y)) = anchor {
                buf = buf.append_child16(&format!("anchor{r}_{c}"), 0, &anchor_format1(*x, *y));
            }
        }
    }
    buf.into_inner()
}

/// A mark-to-base (or, identically laid out, mark-to-mark) subtable.
///
/// `marks` holds sorted `(glyph, class, anchor)` records, `bases` holds
/// sorted base glyphs with one optional anchor per mark class.
#[allow(clippy::type_complexity)]
pub fn mark_base_pos_format1(
    marks: &[(u16, u16, (i16, i16))],
    bases: &[(u16, &[Option<(i16, i16)>])],
    mark_class_count: u16,
) -> Vec<u8> {
    let mark_glyphs = marks.iter().map(|(g, _, _)| *g).collect::<Vec<_>>();
    let base_glyphs = bases.iter().map(|(g, _)| *g).collect::<Vec<_>>();
    let rows = bases.iter().map(|(_, row)| *row).collect::<Vec<_>>();
    BeBuffer::new()
        .push(1u16)
        .push_with_tag(0u16, "mark_coverage")
        .push_with_tag(0u16, "base_coverage")
        .push(mark_class_count)
        .push_with_tag(0u16, "mark_array")
        .push_with_tag(0u16, "base_array")
        .append_child16("mark_coverage", 0, &coverage_format1(&mark_glyphs))
        .append_child16("base_coverage", 0, &coverage_format1(&base_glyphs))
        .append_child16("mark_array", 0, &mark_array(marks))
        .append_child16("base_array", 0, &anchor_rows(&rows))
        .into_inner()
}

/// A mark-to-ligature subtable.
///
/// Each ligature holds one row of optional anchors (one per mark class) for
/// each of its components.
#[allow(clippy::type_complexity)]
pub fn mark_lig_pos_format1(
    marks: &[(u16, u16, (i16, i16))],
    ligatures: &[(u16, &[&[Option<(i16, i16)>]])],
    mark_class_count: u16,
) -> Vec<u8> {
    let mark_glyphs = marks.iter().map(|(g, _, _)| *g).collect::<Vec<_>>();
    let ligature_glyphs = ligatures.iter().map(|(g, _)| *g).collect::<Vec<_>>();
    let mut ligature_array = BeBuffer::new().push(ligatures.len() as u16);
    for i in 0..ligatures.len() {
        ligature_array = ligature_array.push_with_tag(0u16, &format!("attach{i}"));
    }
    for (i, (_, components)) in ligatures.iter().enumerate() {
        ligature_array =
            ligature_array.append_child16(&format!("attach{i}"), 0, &anchor_rows(components));
    }
    BeBuffer::new()
        .push(1u16)
        .push_with_tag(0u16, "mark_coverage")
        .push_with_tag(0u16, "ligature_coverage")
        .push(mark_class_count)
        .push_with_tag(0u16, "mark_array")
        .push_with_tag(0u16, "ligature_array")
        .append_child16("mark_coverage", 0, &coverage_format1(&mark_glyphs))
        .append_child16("ligature_coverage", 0, &coverage_format1(&ligature_glyphs))
        .append_child16("mark_array", 0, &mark_array(marks))
        .append_child16("ligature_array", 0, &ligature_array)
        .into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_format1_builder_matches_opentype_example() {
        let built = pair_pos_format1(
            0x0004,
            0x0001,
            &[
                (0x2D, &[(0x59, &[-30], &[-20])]),
                (0x31, &[(0x59, &[-40], &[-25])]),
            ],
        );
        assert_eq!(built, PAIRPOSFORMAT1);
    }

    #[test]
    fn single_format1_builder() {
        let built = single_pos_format1(&[7], 0x0004, &[50]);
        assert_eq!(built, vec![0, 1, 0, 8, 0, 4, 0, 50, 0, 1, 0, 1, 0, 7]);
    }
}
