use pretty_assertions::assert_eq;
use spot_test_data::{
    gsub::{single_subst_format1, single_subst_format2},
    layout::{
        chained_sequence_context_format1, chained_sequence_context_format3, extension_subtable, feature_list, layout_table,
        layout_table_with_lookups, lookup, script_list, sequence_context_format1,
        sequence_context_format3, TestRule, TestScript,
    },
    BeBuffer,
};
use types::GlyphId16;

use super::*;
use crate::tables::gsub::{lookup_type, EvalError, Gsub};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn single_lookup(glyph: u16, delta: i16) -> Vec<u8> {
    lookup(
        lookup_type::SINGLE,
        0,
        None,
        &[single_subst_format1(&[glyph], delta)],
    )
}

fn read_gsub(lookups: &[Vec<u8>]) -> Gsub {
    Gsub::read(FontData::new(&layout_table_with_lookups(lookups))).unwrap()
}

#[test]
fn lookup_indices_for_script_and_language() {
    let scripts = script_list(&[
        TestScript {
            tag: *b"DFLT",
            default_features: Some(&[0]),
            lang_systems: &[],
        },
        TestScript {
            tag: *b"latn",
            default_features: Some(&[1]),
            lang_systems: &[(*b"TRK ", &[1, 2])],
        },
    ]);
    let features = feature_list(&[
        (*b"liga", &[2, 0]),
        (*b"kern", &[1]),
        (*b"liga", &[3, 0, 3]),
    ]);
    let lookups = (0..4).map(|i| single_lookup(i, 1)).collect::<Vec<_>>();
    let data = layout_table(&scripts, &features, &spot_test_data::layout::lookup_list(&lookups));
    let gsub = Gsub::read(FontData::new(&data)).unwrap();

    let dflt = Tag::new(b"DFLT");
    let latn = Tag::new(b"latn");
    let liga = Tag::new(b"liga");
    let kern = Tag::new(b"kern");
    assert_eq!(gsub.lookup_indices(dflt, None, liga), vec![0, 2]);
    assert_eq!(
        gsub.lookup_indices(latn, Some(Tag::new(b"TRK ")), liga),
        vec![0, 3]
    );
    // unlisted languages use the default language system
    assert_eq!(
        gsub.lookup_indices(latn, Some(Tag::new(b"ENG ")), liga),
        Vec::<u16>::new()
    );
    assert_eq!(
        gsub.lookup_indices(latn, Some(Tag::new(b"ENG ")), kern),
        vec![1]
    );
    assert!(gsub
        .lookup_indices(Tag::new(b"grek"), None, liga)
        .is_empty());
    assert!(gsub.diagnostics().is_empty());
}

#[test]
fn version_1_1_header() {
    let data = BeBuffer::new()
        .push(1u16)
        .push(1u16)
        .extend([0u16, 0, 0])
        .push(0x1234u32);
    let gsub = Gsub::read(FontData::new(data.as_slice())).unwrap();
    assert_eq!(gsub.version, MajorMinor::VERSION_1_1);
    assert_eq!(gsub.feature_variations_offset, Some(Offset32::new(0x1234)));
    assert!(gsub.script_list.script_records.is_empty());
    assert!(gsub.feature_list.feature_records.is_empty());
    assert!(gsub.lookup_list.is_empty());
}

#[test]
fn unknown_major_version() {
    let data = BeBuffer::new().push(2u16).push(0u16).extend([0u16, 0, 0]);
    assert_eq!(
        Gsub::read(FontData::new(data.as_slice())),
        Err(ReadError::InvalidFormat(2))
    );
}

#[test]
fn truncated_header() {
    assert_eq!(
        Gsub::read(FontData::new(&[0, 1, 0, 0, 0])),
        Err(ReadError::OutOfBounds)
    );
}

#[test]
fn null_feature_keeps_its_slot() {
    init_logging();
    let scripts = script_list(&[TestScript {
        tag: *b"DFLT",
        default_features: Some(&[0, 1]),
        lang_systems: &[],
    }]);
    #[rustfmt::skip]
    let features = BeBuffer::new()
        .push(2u16)
        .extend(*b"liga").push(0u16)
        .extend(*b"kern").push(14u16)
        .push(0u16).push(1u16).push(0u16);
    let data = layout_table(
        &scripts,
        features.as_slice(),
        &spot_test_data::layout::lookup_list(&[single_lookup(4, 1)]),
    );
    let gsub = Gsub::read(FontData::new(&data)).unwrap();
    assert_eq!(gsub.feature_list.feature_records.len(), 2);
    assert_eq!(
        gsub.feature_list.get(0).unwrap().feature,
        Default::default()
    );
    let dflt = Tag::new(b"DFLT");
    assert!(gsub
        .lookup_indices(dflt, None, Tag::new(b"liga"))
        .is_empty());
    assert_eq!(gsub.lookup_indices(dflt, None, Tag::new(b"kern")), vec![0]);
    assert_eq!(
        gsub.substitute(0, &[GlyphId16::new(4)]),
        Ok(vec![GlyphId16::new(5)])
    );
}

#[test]
fn null_lookup_keeps_its_slot() {
    init_logging();
    let lookup_list = BeBuffer::new()
        .push(2u16)
        .push(0u16)
        .push(6u16)
        .append(&single_lookup(4, 1));
    let data = layout_table(
        &script_list(&[]),
        &feature_list(&[]),
        lookup_list.as_slice(),
    );
    let gsub = Gsub::read(FontData::new(&data)).unwrap();
    assert_eq!(gsub.lookup_list.len(), 2);
    let placeholder = gsub.lookup(0).unwrap();
    assert_eq!(placeholder.lookup_type, 0);
    assert!(placeholder.subtables.is_empty());
    assert_eq!(gsub.lookup(1).unwrap().lookup_type, lookup_type::SINGLE);
    assert_eq!(
        gsub.diagnostics(),
        &[Diagnostic::NullOffset {
            lookup_index: Some(0),
            lookup_type: 0
        }]
    );
}

#[test]
fn null_subtable_offset() {
    let subtable = single_subst_format1(&[4], 1);
    // two offsets, the first null, then the subtable right after the header
    let lookup = BeBuffer::new()
        .push(lookup_type::SINGLE)
        .push(0u16)
        .push(2u16)
        .push(0u16)
        .push(10u16)
        .append(&subtable);
    let gsub = read_gsub(&[lookup.into_inner()]);
    let lookup = gsub.lookup(0).unwrap();
    assert_eq!(lookup.subtables.len(), 2);
    assert!(lookup.subtables[0].is_none());
    assert!(lookup.subtables[1].is_some());
    assert_eq!(
        gsub.diagnostics(),
        &[Diagnostic::NullOffset {
            lookup_index: Some(0),
            lookup_type: lookup_type::SINGLE
        }]
    );
}

#[test]
fn unsupported_subtables_leave_empty_slots() {
    init_logging();
    let bad_format = vec![0, 3, 0, 6, 0, 0];
    let gsub = read_gsub(&[
        lookup(
            9,
            0,
            None,
            &[single_subst_format1(&[1], 1), single_subst_format1(&[2], 1)],
        ),
        lookup(
            lookup_type::SINGLE,
            0,
            None,
            &[
                single_subst_format1(&[1], 1),
                bad_format,
                single_subst_format2(&[(5, 6)]),
            ],
        ),
    ]);

    assert_eq!(
        gsub.diagnostics(),
        &[
            Diagnostic::UnsupportedLookupType {
                lookup_index: Some(0),
                lookup_type: 9
            },
            Diagnostic::UnsupportedLookupType {
                lookup_index: Some(0),
                lookup_type: 9
            },
            Diagnostic::UnsupportedFormat {
                lookup_index: Some(1),
                lookup_type: lookup_type::SINGLE,
                format: 3
            },
        ]
    );
    let unknown = gsub.lookup(0).unwrap();
    assert_eq!(unknown.subtables, vec![None, None]);

    let partial = gsub.lookup(1).unwrap();
    let present = partial
        .subtables
        .iter()
        .map(Option::is_some)
        .collect::<Vec<_>>();
    assert_eq!(present, vec![true, false, true]);
    assert_eq!(partial.subtables_resolved().count(), 2);
}

#[test]
fn extension_is_resolved() {
    let gsub = read_gsub(&[lookup(
        lookup_type::EXTENSION,
        0,
        None,
        &[extension_subtable(
            lookup_type::SINGLE,
            &single_subst_format1(&[5], 10),
        )],
    )]);
    let lookup = gsub.lookup(0).unwrap();
    assert_eq!(lookup.lookup_type, lookup_type::EXTENSION);
    assert_eq!(lookup.resolved_lookup_type(), lookup_type::SINGLE);
    assert!(!lookup.is_context());

    let Some(Some(subtable)) = lookup.subtables.first() else {
        panic!("missing extension subtable");
    };
    let extension = subtable.as_extension().unwrap();
    assert_eq!(extension.extension_lookup_type, lookup_type::SINGLE);
    assert_eq!(extension.extension_offset, Offset32::new(8));
    assert_eq!(
        extension.resolve().map(LookupSubtable::lookup_type),
        Some(lookup_type::SINGLE)
    );
    assert!(gsub.diagnostics().is_empty());
}

// wraps a single substitution in `depth` extension subtables
fn nested_extensions(depth: u8) -> Vec<u8> {
    let mut subtable = single_subst_format1(&[5], 10);
    let mut wrapped_type = lookup_type::SINGLE;
    for _ in 0..depth {
        subtable = extension_subtable(wrapped_type, &subtable);
        wrapped_type = lookup_type::EXTENSION;
    }
    lookup(lookup_type::EXTENSION, 0, None, &[subtable])
}

#[test]
fn extension_chains_up_to_the_limit() {
    let gsub = read_gsub(&[nested_extensions(MAX_EXTENSION_NESTING)]);
    assert!(gsub.diagnostics().is_empty());
    assert_eq!(
        gsub.substitute(0, &[GlyphId16::new(5)]),
        Ok(vec![GlyphId16::new(15)])
    );
}

#[test]
fn extension_chains_past_the_limit() {
    init_logging();
    let gsub = read_gsub(&[nested_extensions(MAX_EXTENSION_NESTING + 1)]);
    assert_eq!(
        gsub.diagnostics(),
        &[Diagnostic::RecursionLimitExceeded {
            lookup_index: 0,
            depth: MAX_EXTENSION_NESTING + 1
        }]
    );
    assert_eq!(gsub.lookup(0).unwrap().subtables_resolved().count(), 0);
    assert_eq!(
        gsub.substitute(0, &[GlyphId16::new(5)]),
        Err(EvalError::MissingSubtable { lookup_index: 0 })
    );
}

#[test]
fn mark_filtering_set() {
    let flags = LookupFlag::USE_MARK_FILTERING_SET | LookupFlag::IGNORE_MARKS;
    let gsub = read_gsub(&[
        lookup(
            lookup_type::SINGLE,
            flags.to_bits(),
            Some(3),
            &[single_subst_format1(&[5], 1)],
        ),
        single_lookup(5, 1),
    ]);
    let filtered = gsub.lookup(0).unwrap();
    assert_eq!(filtered.mark_filtering_set, Some(3));
    assert!(filtered.lookup_flag.contains(LookupFlag::IGNORE_MARKS));
    // the subtable offsets still resolve past the extra field
    assert_eq!(filtered.subtables_resolved().count(), 1);
    assert_eq!(gsub.lookup(1).unwrap().mark_filtering_set, None);
}

fn context_lookup(actions: &[(u16, u16)]) -> Vec<u8> {
    lookup(
        lookup_type::CONTEXT,
        0,
        None,
        &[sequence_context_format3(&[&[1], &[2]], actions)],
    )
}

fn chained_context_lookup(actions: &[(u16, u16)]) -> Vec<u8> {
    lookup(
        lookup_type::CHAINED_CONTEXT,
        0,
        None,
        &[chained_sequence_context_format3(&[&[9]], &[&[1]], &[], actions)],
    )
}

#[test]
fn context_chain_stops_at_the_nesting_limit() {
    init_logging();
    let gsub = read_gsub(&[
        context_lookup(&[(0, 1)]),
        chained_context_lookup(&[(0, 2)]),
        context_lookup(&[(1, 3)]),
        single_lookup(1, 1),
    ]);
    let expansion = gsub.expand_context(0);
    let innermost = ContextRuleExpansion {
        subtable_index: 0,
        rule: RuleLocation::Coverage,
        actions: vec![ActionExpansion {
            sequence_index: 0,
            lookup_index: 2,
            target: ActionTarget::RecursionLimit,
        }],
    };
    assert_eq!(
        expansion,
        ContextExpansion {
            lookup_index: 0,
            rules: vec![ContextRuleExpansion {
                subtable_index: 0,
                rule: RuleLocation::Coverage,
                actions: vec![ActionExpansion {
                    sequence_index: 0,
                    lookup_index: 1,
                    target: ActionTarget::Context(vec![innermost]),
                }],
            }],
            diagnostics: vec![Diagnostic::RecursionLimitExceeded {
                lookup_index: 2,
                depth: 2
            }],
        }
    );
}

fn chained_glyph_context_lookup(actions: &[(u16, u16)]) -> Vec<u8> {
    let rule = TestRule {
        backtrack: &[8],
        input: &[1, 2],
        lookahead: &[3],
        actions,
    };
    lookup(
        lookup_type::CHAINED_CONTEXT,
        0,
        None,
        &[chained_sequence_context_format1(&[rule])],
    )
}

#[test]
fn chained_glyph_contexts_stop_at_the_nesting_limit() {
    init_logging();
    let gsub = read_gsub(&[
        chained_glyph_context_lookup(&[(0, 1)]),
        chained_glyph_context_lookup(&[(0, 2)]),
        chained_glyph_context_lookup(&[(1, 3)]),
        single_lookup(2, 1),
    ]);
    let first_rule = RuleLocation::Glyph {
        coverage_index: 0,
        rule_index: 0,
    };
    let innermost = ContextRuleExpansion {
        subtable_index: 0,
        rule: first_rule,
        actions: vec![ActionExpansion {
            sequence_index: 0,
            lookup_index: 2,
            target: ActionTarget::RecursionLimit,
        }],
    };
    assert_eq!(
        gsub.expand_context(0),
        ContextExpansion {
            lookup_index: 0,
            rules: vec![ContextRuleExpansion {
                subtable_index: 0,
                rule: first_rule,
                actions: vec![ActionExpansion {
                    sequence_index: 0,
                    lookup_index: 1,
                    target: ActionTarget::Context(vec![innermost]),
                }],
            }],
            diagnostics: vec![Diagnostic::RecursionLimitExceeded {
                lookup_index: 2,
                depth: 2
            }],
        }
    );
}

#[test]
fn context_chain_within_the_limit() {
    let gsub = read_gsub(&[
        context_lookup(&[(0, 1)]),
        chained_context_lookup(&[(0, 2)]),
        context_lookup(&[(1, 3)]),
        single_lookup(1, 1),
    ]);
    let expansion = gsub.expand_context(1);
    assert!(expansion.diagnostics.is_empty());
    let [rule] = expansion.rules.as_slice() else {
        panic!("expected one rule");
    };
    let ActionTarget::Context(nested) = &rule.actions[0].target else {
        panic!("expected a nested context");
    };
    assert_eq!(
        nested[0].actions,
        vec![ActionExpansion {
            sequence_index: 1,
            lookup_index: 3,
            target: ActionTarget::Lookup {
                lookup_type: lookup_type::SINGLE
            },
        }]
    );
}

#[test]
fn cyclic_context_terminates() {
    init_logging();
    let gsub = read_gsub(&[context_lookup(&[(0, 0)])]);
    let expansion = gsub.expand_context(0);
    assert_eq!(
        expansion.diagnostics,
        vec![Diagnostic::RecursionLimitExceeded {
            lookup_index: 0,
            depth: 2
        }]
    );
    let ActionTarget::Context(nested) = &expansion.rules[0].actions[0].target else {
        panic!("expected a nested context");
    };
    assert_eq!(nested[0].actions[0].target, ActionTarget::RecursionLimit);
}

#[test]
fn context_actions_with_missing_lookups() {
    let rule = TestRule {
        input: &[10, 11],
        actions: &[(0, 1), (1, 99)],
        ..Default::default()
    };
    let gsub = read_gsub(&[
        lookup(
            lookup_type::EXTENSION,
            0,
            None,
            &[extension_subtable(
                lookup_type::CONTEXT,
                &sequence_context_format1(&[rule]),
            )],
        ),
        single_lookup(10, 1),
    ]);
    assert!(gsub.lookup(0).unwrap().is_context());
    let expansion = gsub.expand_context(0);
    assert!(expansion.diagnostics.is_empty());
    assert_eq!(
        expansion.rules,
        vec![ContextRuleExpansion {
            subtable_index: 0,
            rule: RuleLocation::Glyph {
                coverage_index: 0,
                rule_index: 0
            },
            actions: vec![
                ActionExpansion {
                    sequence_index: 0,
                    lookup_index: 1,
                    target: ActionTarget::Lookup {
                        lookup_type: lookup_type::SINGLE
                    },
                },
                ActionExpansion {
                    sequence_index: 1,
                    lookup_index: 99,
                    target: ActionTarget::Missing,
                },
            ],
        }]
    );
}

#[test]
fn non_context_lookups_have_no_rules() {
    let gsub = read_gsub(&[single_lookup(1, 1)]);
    assert_eq!(
        gsub.expand_context(0),
        ContextExpansion {
            lookup_index: 0,
            rules: Vec::new(),
            diagnostics: Vec::new(),
        }
    );
    assert!(gsub.expand_context(7).rules.is_empty());
}

#[test]
fn caller_provided_nesting_state() {
    let gsub = read_gsub(&[context_lookup(&[(0, 1)]), context_lookup(&[(0, 2)])]);
    let mut ctx = NestingContext::new();
    let rules = gsub.expand_context_with(0, &mut ctx);
    assert_eq!(ctx.depth(), 0);
    assert_eq!(
        rules[0].actions[0].target,
        ActionTarget::Context(vec![ContextRuleExpansion {
            subtable_index: 0,
            rule: RuleLocation::Coverage,
            actions: vec![ActionExpansion {
                sequence_index: 0,
                lookup_index: 2,
                target: ActionTarget::Missing,
            }],
        }])
    );
    assert!(ctx.diagnostics().is_empty());
}
