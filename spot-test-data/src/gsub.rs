//! GSUB test data, and assemblers for GSUB subtables.
//!
//! The canned tables follow the examples in the OpenType specification.

use std::collections::BTreeMap;

use crate::bebuffer::BeBuffer;
use crate::layout::coverage_format1;

// https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-2-singlesubstformat1-subtable
#[rustfmt::skip]
pub static SINGLESUBSTFORMAT1_TABLE: &[u8] = &[
    0x00, 0x01, // format 1
    0x00, 0x06, // coverage offset
    0x00, 0xC0, // deltaGlyphID 192
    // coverage format 2
    0x00, 0x02, 0x00, 0x01,
    0x00, 0x4E, 0x00, 0x58, 0x00, 0x00, // glyphs 78..=88
];

// https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-3-singlesubstformat2-subtable
#[rustfmt::skip]
pub static SINGLESUBSTFORMAT2_TABLE: &[u8] = &[
    0x00, 0x02, // format 2
    0x00, 0x0E, // coverage offset
    0x00, 0x04, // glyphCount
    0x01, 0x31, 0x01, 0x35, 0x01, 0x3E, 0x01, 0x43,
    // coverage format 1
    0x00, 0x01, 0x00, 0x04,
    0x00, 0x3C, 0x00, 0x40, 0x00, 0x4B, 0x00, 0x4F,
];

// https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-4-multiplesubstformat1-subtable
#[rustfmt::skip]
pub static MULTIPLESUBSTFORMAT1_TABLE: &[u8] = &[
    0x00, 0x01, // format 1
    0x00, 0x08, // coverage offset
    0x00, 0x01, // sequenceCount
    0x00, 0x0E, // sequenceOffsets[0]
    // coverage format 1
    0x00, 0x01, 0x00, 0x01, 0x00, 0xF1,
    // sequence
    0x00, 0x03, 0x00, 0x1A, 0x00, 0x1A, 0x00, 0x1D,
];

// https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-5-alternatesubstformat-1-subtable
#[rustfmt::skip]
pub static ALTERNATESUBSTFORMAT1_TABLE: &[u8] = &[
    0x00, 0x01, // format 1
    0x00, 0x08, // coverage offset
    0x00, 0x01, // alternateSetCount
    0x00, 0x0E, // alternateSetOffsets[0]
    // coverage format 1
    0x00, 0x01, 0x00, 0x01, 0x00, 0x3A,
    // alternate set
    0x00, 0x02, 0x00, 0xC9, 0x00, 0xCA,
];

// https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-6-ligaturesubstformat1-subtable
#[rustfmt::skip]
pub static LIGATURESUBSTFORMAT1_TABLE: &[u8] = &[
    0x00, 0x01, // format 1
    0x00, 0x0A, // coverage offset
    0x00, 0x02, // ligatureSetCount
    0x00, 0x12, // ligatureSetOffsets[0]
    0x00, 0x1E, // ligatureSetOffsets[1]
    // coverage format 1
    0x00, 0x01, 0x00, 0x02, 0x00, 0x19, 0x00, 0x1A,
    // ligature set 0
    0x00, 0x01, 0x00, 0x04,
    0x01, 0x5B, 0x00, 0x03, 0x00, 0x28, 0x00, 0x17,
    // ligature set 1
    0x00, 0x01, 0x00, 0x04,
    0x00, 0xF1, 0x00, 0x03, 0x00, 0x1A, 0x00, 0x1D,
];

/// A single substitution (format 1) adding `delta` to each covered glyph.
pub fn single_subst_format1(glyphs: &[u16], delta: i16) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push(6u16)
        .push(delta)
        .append(&coverage_format1(glyphs))
        .into_inner()
}

/// A single substitution (format 2) from sorted `(glyph, substitute)` pairs.
pub fn single_subst_format2(mapping: &[(u16, u16)]) -> Vec<u8> {
    let glyphs = mapping.iter().map(|(g, _)| *g).collect::<Vec<_>>();
    BeBuffer::new()
        .push(2u16)
        .push_with_tag(0u16, "coverage")
        .push(mapping.len() as u16)
        .extend(mapping.iter().map(|(_, sub)| *sub))
        .append_child16("coverage", 0, &coverage_format1(&glyphs))
        .into_inner()
}

/// A multiple substitution from sorted `(glyph, sequence)` pairs.
pub fn multiple_subst_format1(mapping: &[(u16, &[u16])]) -> Vec<u8> {
    let glyphs = mapping.iter().map(|(g, _)| *g).collect::<Vec<_>>();
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push_with_tag(0u16, "coverage")
        .push(mapping.len() as u16);
    for i in 0..mapping.len() {
        buf = buf.push_with_tag(0u16, &format!("sequence{i}"));
    }
    buf = buf.append_child16("coverage", 0, &coverage_format1(&glyphs));
    for (i, (_, sequence)) in mapping.iter().enumerate() {
        let sequence = BeBuffer::new()
            .push(sequence.len() as u16)
            .extend(sequence.iter().copied());
        buf = buf.append_child16(&format!("sequence{i}"), 0, &sequence);
    }
    buf.into_inner()
}

/// A ligature substitution from `(components, ligature glyph)` pairs.
///
/// The components include the first glyph; ligatures sharing a first glyph
/// keep the order they are given in.
pub fn ligature_subst_format1(ligatures: &[(&[u16], u16)]) -> Vec<u8> {
    let mut sets = BTreeMap::<u16, Vec<_>>::new();
    for (components, ligature) in ligatures {
        if let Some((first, rest)) = components.split_first() {
            sets.entry(*first).or_default().push((*ligature, rest));
        }
    }
    let first_glyphs = sets.keys().copied().collect::<Vec<_>>();
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push_with_tag(0u16, "coverage")
        .push(sets.len() as u16);
    for i in 0..sets.len() {
        buf = buf.push_with_tag(0u16, &format!("set{i}"));
    }
    buf = buf.append_child16("coverage", 0, &coverage_format1(&first_glyphs));
    for (i, set) in sets.values().enumerate() {
        let mut set_buf = BeBuffer::new().push(set.len() as u16);
        for j in 0..set.len() {
            set_buf = set_buf.push_with_tag(0u16, &format!("ligature{j}"));
        }
        for (j, (ligature, rest)) in set.iter().enumerate() {
            let ligature = BeBuffer::new()
                .push(*ligature)
                .push(rest.len() as u16 + 1)
                .extend(rest.iter().copied());
            set_buf = set_buf.append_child16(&format!("ligature{j}"), 0, &ligature);
        }
        buf = buf.append_child16(&format!("set{i}"), 0, &set_buf);
    }
    buf.into_inner()
}

/// A reverse chaining single substitution.
pub fn reverse_chain_single_subst_format1(
    coverage: &[u16],
    backtrack: &[&[u16]],
    lookahead: &[&[u16]],
    substitutes: &[u16],
) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push_with_tag(0u16, "coverage")
        .push(backtrack.len() as u16);
    for i in 0..backtrack.len() {
        buf = buf.push_with_tag(0u16, &format!("backtrack{i}"));
    }
    buf = buf.push(lookahead.len() as u16);
    for i in 0..lookahead.len() {
        buf = buf.push_with_tag(0u16, &format!("lookahead{i}"));
    }
    buf = buf
        .push(substitutes.len() as u16)
        .extend(substitutes.iter().copied())
        .append_child16("coverage", 0, &coverage_format1(coverage));
    for (i, glyphs) in backtrack.iter().enumerate() {
        buf = buf.append_child16(&format!("backtrack{i}"), 0, &coverage_format1(glyphs));
    }
    for (i, glyphs) in lookahead.iter().enumerate() {
        buf = buf.append_child16(&format!("lookahead{i}"), 0, &coverage_format1(glyphs));
    }
    buf.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ligature_builder_matches_opentype_example() {
        let built = ligature_subst_format1(&[(&[0x19, 0x28, 0x17], 347), (&[0x1A, 0x1A, 0x1D], 0xF1)]);
        assert_eq!(built, LIGATURESUBSTFORMAT1_TABLE);
    }

    #[test]
    fn single_format2_builder_matches_opentype_example() {
        let built = single_subst_format2(&[(0x3C, 305), (0x40, 309), (0x4B, 318), (0x4F, 323)]);
        assert_eq!(built, SINGLESUBSTFORMAT2_TABLE);
    }
}
