use pretty_assertions::assert_eq;
use rstest::rstest;
use spot_test_data::gsub as test_data;
use spot_test_data::layout::{
    extension_subtable, layout_table_with_lookups, lookup, sequence_context_format3,
};

use super::*;

fn gids(raw: &[u16]) -> Vec<GlyphId16> {
    raw.iter().copied().map(GlyphId16::new).collect()
}

fn gsub_with_subtable(lookup_type: u16, subtable: &[u8]) -> Gsub {
    let lookups = [lookup(lookup_type, 0, None, &[subtable.to_vec()])];
    Gsub::read(FontData::new(&layout_table_with_lookups(&lookups))).unwrap()
}

#[test]
fn singlesubstformat1() {
    // https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-2-singlesubstformat1-subtable
    let SingleSubst::Format1(table) =
        SingleSubst::read(FontData::new(test_data::SINGLESUBSTFORMAT1_TABLE)).unwrap()
    else {
        panic!("wrong format");
    };
    assert_eq!(table.delta_glyph_id, 192);
    assert_eq!(table.coverage.len(), 11);
}

#[test]
fn singlesubstformat2() {
    // https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-3-singlesubstformat2-subtable
    let SingleSubst::Format2(table) =
        SingleSubst::read(FontData::new(test_data::SINGLESUBSTFORMAT2_TABLE)).unwrap()
    else {
        panic!("wrong format");
    };
    assert_eq!(table.substitute_glyph_ids, gids(&[305, 309, 318, 323]));
}

#[test]
fn multiplesubstformat1() {
    // https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-4-multiplesubstformat1-subtable
    let table =
        MultipleSubstFormat1::read(FontData::new(test_data::MULTIPLESUBSTFORMAT1_TABLE)).unwrap();
    assert_eq!(table.sequences.len(), 1);
    assert_eq!(
        table.sequences[0].substitute_glyph_ids,
        gids(&[0x1A, 0x1A, 0x1D])
    );
}

#[test]
fn alternatesubstformat1() {
    // https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-5-alternatesubstformat-1-subtable
    let table =
        AlternateSubstFormat1::read(FontData::new(test_data::ALTERNATESUBSTFORMAT1_TABLE))
            .unwrap();
    assert_eq!(table.alternate_sets.len(), 1);
    assert_eq!(
        table.alternate_sets[0].alternate_glyph_ids,
        gids(&[0xC9, 0xCA])
    );
}

#[test]
fn ligaturesubstformat1() {
    // https://learn.microsoft.com/en-us/typography/opentype/spec/gsub#example-6-ligaturesubstformat1-subtable
    let table =
        LigatureSubstFormat1::read(FontData::new(test_data::LIGATURESUBSTFORMAT1_TABLE)).unwrap();
    assert_eq!(table.ligature_sets.len(), 2);
    let lig0 = &table.ligature_sets[0].ligatures[0];
    assert_eq!(lig0.ligature_glyph, GlyphId16::new(347));
    assert_eq!(lig0.component_glyph_ids, gids(&[0x28, 0x17]));
    let lig1 = &table.ligature_sets[1].ligatures[0];
    assert_eq!(lig1.ligature_glyph, GlyphId16::new(0xF1));
    assert_eq!(lig1.component_glyph_ids, gids(&[0x1A, 0x1D]));
}

#[test]
fn ligature_with_zero_component_count() {
    let data = [0x01, 0x5B, 0x00, 0x00];
    let ligature = Ligature::read(FontData::new(&data)).unwrap();
    assert_eq!(ligature.ligature_glyph, GlyphId16::new(347));
    assert!(ligature.component_glyph_ids.is_empty());
}

#[test]
fn reverse_chain_single_subst() {
    let data = test_data::reverse_chain_single_subst_format1(
        &[0x10, 0x11],
        &[&[0x20]],
        &[&[0x30], &[0x31, 0x32]],
        &[0x50, 0x51],
    );
    let table = ReverseChainSingleSubstFormat1::read(FontData::new(&data)).unwrap();
    assert_eq!(table.coverage.get(GlyphId16::new(0x11)), Some(1));
    assert_eq!(table.backtrack_coverages.len(), 1);
    assert_eq!(table.lookahead_coverages.len(), 2);
    assert_eq!(
        table.lookahead_coverages[1].get(GlyphId16::new(0x32)),
        Some(1)
    );
    assert_eq!(table.substitute_glyph_ids, gids(&[0x50, 0x51]));
}

#[test]
fn unknown_single_format() {
    assert_eq!(
        SingleSubst::read(FontData::new(&[0, 3, 0, 6, 0, 0])),
        Err(ReadError::InvalidFormat(3))
    );
}

#[rstest]
#[case::first_covered(&[78], &[270])]
#[case::last_covered(&[88], &[280])]
#[case::not_covered(&[77], &[])]
#[case::two_glyphs(&[78, 79], &[])]
#[case::empty(&[], &[])]
fn single_substitution_format1(#[case] input: &[u16], #[case] expected: &[u16]) {
    let gsub = gsub_with_subtable(lookup_type::SINGLE, test_data::SINGLESUBSTFORMAT1_TABLE);
    assert_eq!(gsub.substitute(0, &gids(input)), Ok(gids(expected)));
}

#[rstest]
#[case::first(0x3C, &[305])]
#[case::last(0x4F, &[323])]
#[case::between(0x3D, &[])]
fn single_substitution_format2(#[case] input: u16, #[case] expected: &[u16]) {
    let gsub = gsub_with_subtable(lookup_type::SINGLE, test_data::SINGLESUBSTFORMAT2_TABLE);
    assert_eq!(gsub.substitute(0, &gids(&[input])), Ok(gids(expected)));
}

#[test]
fn single_substitution_wraps_around() {
    let subtable = test_data::single_subst_format1(&[0xFFFF], 2);
    let gsub = gsub_with_subtable(lookup_type::SINGLE, &subtable);
    assert_eq!(
        gsub.substitute(0, &gids(&[0xFFFF])),
        Ok(gids(&[1]))
    );
}

#[test]
fn multiple_substitution() {
    let gsub = gsub_with_subtable(
        lookup_type::MULTIPLE,
        test_data::MULTIPLESUBSTFORMAT1_TABLE,
    );
    assert_eq!(
        gsub.substitute(0, &gids(&[0xF1])),
        Ok(gids(&[0x1A, 0x1A, 0x1D]))
    );
    assert_eq!(gsub.substitute(0, &gids(&[0xF2])), Ok(Vec::new()));
    assert_eq!(gsub.substitute(0, &gids(&[0xF1, 0xF1])), Ok(Vec::new()));
}

#[test]
fn multiple_substitution_to_nothing() {
    let subtable = test_data::multiple_subst_format1(&[(0x30, &[])]);
    let gsub = gsub_with_subtable(lookup_type::MULTIPLE, &subtable);
    assert_eq!(gsub.substitute(0, &gids(&[0x30])), Ok(Vec::new()));
}

const F: u16 = 0x49;
const I: u16 = 0x4C;
const L: u16 = 0x4F;
const FI: u16 = 0x120;
const FFI: u16 = 0x121;

fn fi_ligatures() -> Vec<u8> {
    test_data::ligature_subst_format1(&[(&[F, I], FI), (&[F, F, I], FFI)])
}

#[rstest]
#[case::fi(&[F, I], &[FI])]
#[case::ffi(&[F, F, I], &[FFI])]
#[case::f_alone(&[F], &[])]
#[case::fl(&[F, L], &[])]
#[case::fi_plus_more(&[F, I, I], &[])]
#[case::not_covered(&[I, F], &[])]
#[case::empty(&[], &[])]
fn ligature_substitution(#[case] input: &[u16], #[case] expected: &[u16]) {
    let gsub = gsub_with_subtable(lookup_type::LIGATURE, &fi_ligatures());
    assert_eq!(gsub.substitute(0, &gids(input)), Ok(gids(expected)));
}

#[test]
fn first_matching_ligature_wins() {
    let subtable = test_data::ligature_subst_format1(&[(&[F, I], FI), (&[F, I], FFI)]);
    let gsub = gsub_with_subtable(lookup_type::LIGATURE, &subtable);
    assert_eq!(gsub.substitute(0, &gids(&[F, I])), Ok(gids(&[FI])));
}

#[rstest]
#[case::fi(&[F, I])]
#[case::ffi(&[F, F, I])]
#[case::fl(&[F, L])]
fn extension_matches_direct_lookup(#[case] input: &[u16]) {
    let direct = gsub_with_subtable(lookup_type::LIGATURE, &fi_ligatures());
    let wrapped = gsub_with_subtable(
        lookup_type::EXTENSION,
        &extension_subtable(lookup_type::LIGATURE, &fi_ligatures()),
    );
    assert_eq!(
        wrapped.substitute(0, &gids(input)),
        direct.substitute(0, &gids(input))
    );
}

#[test]
fn alternate_is_not_evaluated() {
    let gsub = gsub_with_subtable(
        lookup_type::ALTERNATE,
        test_data::ALTERNATESUBSTFORMAT1_TABLE,
    );
    assert_eq!(
        gsub.substitute(0, &gids(&[0x3A])),
        Err(EvalError::UnsupportedLookupType {
            lookup_index: 0,
            lookup_type: lookup_type::ALTERNATE
        })
    );
}

#[test]
fn context_is_not_evaluated() {
    let subtable = sequence_context_format3(&[&[1]], &[(0, 0)]);
    let gsub = gsub_with_subtable(lookup_type::CONTEXT, &subtable);
    let err = gsub.substitute(0, &gids(&[1])).unwrap_err();
    assert_eq!(
        err,
        EvalError::UnsupportedLookupType {
            lookup_index: 0,
            lookup_type: lookup_type::CONTEXT
        }
    );
    assert_eq!(
        err.to_string(),
        "lookup 0 has type 5, which cannot be evaluated"
    );
}

#[test]
fn lookup_index_out_of_range() {
    let gsub = gsub_with_subtable(lookup_type::SINGLE, test_data::SINGLESUBSTFORMAT1_TABLE);
    assert_eq!(
        gsub.substitute(5, &gids(&[78])),
        Err(EvalError::LookupIndexOutOfRange(5))
    );
}

#[test]
fn multiple_subtables_are_not_evaluated() {
    let lookups = [lookup(
        lookup_type::SINGLE,
        0,
        None,
        &[
            test_data::single_subst_format1(&[1], 1),
            test_data::single_subst_format1(&[2], 1),
        ],
    )];
    let gsub = Gsub::read(FontData::new(&layout_table_with_lookups(&lookups))).unwrap();
    assert_eq!(
        gsub.substitute(0, &gids(&[1])),
        Err(EvalError::MultipleSubtables {
            lookup_index: 0,
            count: 2
        })
    );
}

#[test]
fn undecodable_subtable_is_missing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let gsub = gsub_with_subtable(lookup_type::SINGLE, &[0, 9, 0, 6, 0, 0]);
    assert_eq!(gsub.diagnostics().len(), 1);
    assert_eq!(
        gsub.substitute(0, &gids(&[1])),
        Err(EvalError::MissingSubtable { lookup_index: 0 })
    );
}

#[test]
fn lookup_without_subtables_is_missing() {
    let lookups = [lookup(lookup_type::SINGLE, 0, None, &[])];
    let gsub = Gsub::read(FontData::new(&layout_table_with_lookups(&lookups))).unwrap();
    assert_eq!(
        gsub.substitute(0, &gids(&[1])),
        Err(EvalError::MissingSubtable { lookup_index: 0 })
    );
}

#[test]
fn lookup_types() {
    let gsub = gsub_with_subtable(
        lookup_type::EXTENSION,
        &extension_subtable(
            lookup_type::MULTIPLE,
            test_data::MULTIPLESUBSTFORMAT1_TABLE,
        ),
    );
    let lookup = gsub.lookup(0).unwrap();
    assert_eq!(lookup.lookup_type, lookup_type::EXTENSION);
    assert_eq!(lookup.resolved_lookup_type(), lookup_type::MULTIPLE);
    assert!(matches!(
        lookup.subtables_resolved().next(),
        Some(SubstitutionSubtable::Multiple(_))
    ));
}

#[cfg(feature = "serde")]
#[test]
fn serde_round_trip() {
    let gsub = gsub_with_subtable(lookup_type::LIGATURE, &fi_ligatures());
    let json = serde_json::to_string(&gsub).unwrap();
    let back: Gsub = serde_json::from_str(&json).unwrap();
    assert_eq!(back, gsub);
}
