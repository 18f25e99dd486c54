//! Assemblers for the structures shared by GSUB and GPOS.
//!
//! These compute every offset from the lengths of the pieces they are given,
//! which keeps the larger test tables readable.

use std::collections::BTreeMap;

use crate::bebuffer::BeBuffer;

/// A format 1 coverage table. Glyphs must already be sorted.
pub fn coverage_format1(glyphs: &[u16]) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push(glyphs.len() as u16)
        .extend(glyphs.iter().copied())
        .into_inner()
}

/// A format 2 coverage table from inclusive `(start, end)` ranges.
pub fn coverage_format2(ranges: &[(u16, u16)]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(2u16).push(ranges.len() as u16);
    let mut start_index = 0u16;
    for (start, end) in ranges {
        buf = buf.push(*start).push(*end).push(start_index);
        start_index += end - start + 1;
    }
    buf.into_inner()
}

/// A format 1 class definition table.
pub fn class_def_format1(start_glyph: u16, classes: &[u16]) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push(start_glyph)
        .push(classes.len() as u16)
        .extend(classes.iter().copied())
        .into_inner()
}

/// A format 2 class definition table from `(start, end, class)` ranges.
pub fn class_def_format2(ranges: &[(u16, u16, u16)]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(2u16).push(ranges.len() as u16);
    for (start, end, class) in ranges {
        buf = buf.push(*start).push(*end).push(*class);
    }
    buf.into_inner()
}

/// A lookup table holding the given (already encoded) subtables.
///
/// If `mark_filtering_set` is provided the caller is responsible for also
/// setting the `USE_MARK_FILTERING_SET` bit in `lookup_flag`.
pub fn lookup(
    lookup_type: u16,
    lookup_flag: u16,
    mark_filtering_set: Option<u16>,
    subtables: &[Vec<u8>],
) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .push(lookup_type)
        .push(lookup_flag)
        .push(subtables.len() as u16);
    for i in 0..subtables.len() {
        buf = buf.push_with_tag(0u16, &format!("subtable{i}"));
    }
    if let Some(set) = mark_filtering_set {
        buf = buf.push(set);
    }
    for (i, subtable) in subtables.iter().enumerate() {
        buf = buf.append_child16(&format!("subtable{i}"), 0, subtable);
    }
    buf.into_inner()
}

/// A lookup list holding the given (already encoded) lookups.
pub fn lookup_list(lookups: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(lookups.len() as u16);
    for i in 0..lookups.len() {
        buf = buf.push_with_tag(0u16, &format!("lookup{i}"));
    }
    for (i, lookup) in lookups.iter().enumerate() {
        buf = buf.append_child16(&format!("lookup{i}"), 0, lookup);
    }
    buf.into_inner()
}

/// An extension subtable (format 1) wrapping `wrapped`, which is placed
/// directly after the 8-byte extension header.
pub fn extension_subtable(extension_lookup_type: u16, wrapped: &[u8]) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push(extension_lookup_type)
        .push(8u32)
        .append(wrapped)
        .into_inner()
}

/// A LangSys table with no required feature.
pub fn lang_sys(feature_indices: &[u16]) -> Vec<u8> {
    BeBuffer::new()
        .push(0u16)
        .push(0xFFFFu16)
        .push(feature_indices.len() as u16)
        .extend(feature_indices.iter().copied())
        .into_inner()
}

/// A script: the default LangSys feature indices plus tagged LangSys tables.
pub struct TestScript<'a> {
    pub tag: [u8; 4],
    pub default_features: Option<&'a [u16]>,
    pub lang_systems: &'a [([u8; 4], &'a [u16])],
}

fn script(script: &TestScript) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .push_with_tag(0u16, "default")
        .push(script.lang_systems.len() as u16);
    for (i, (tag, _)) in script.lang_systems.iter().enumerate() {
        buf = buf.extend(*tag).push_with_tag(0u16, &format!("langsys{i}"));
    }
    if let Some(features) = script.default_features {
        buf = buf.append_child16("default", 0, &lang_sys(features));
    }
    for (i, (_, features)) in script.lang_systems.iter().enumerate() {
        buf = buf.append_child16(&format!("langsys{i}"), 0, &lang_sys(features));
    }
    buf.into_inner()
}

/// A script list from the given scripts. Tags must already be sorted.
pub fn script_list(scripts: &[TestScript]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(scripts.len() as u16);
    for (i, script) in scripts.iter().enumerate() {
        buf = buf
            .extend(script.tag)
            .push_with_tag(0u16, &format!("script{i}"));
    }
    for (i, item) in scripts.iter().enumerate() {
        buf = buf.append_child16(&format!("script{i}"), 0, &script(item));
    }
    buf.into_inner()
}

/// A feature list from `(tag, lookup indices)` pairs.
pub fn feature_list(features: &[([u8; 4], &[u16])]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(features.len() as u16);
    for (i, (tag, _)) in features.iter().enumerate() {
        buf = buf.extend(*tag).push_with_tag(0u16, &format!("feature{i}"));
    }
    for (i, (_, lookups)) in features.iter().enumerate() {
        let feature = BeBuffer::new()
            .push(0u16)
            .push(lookups.len() as u16)
            .extend(lookups.iter().copied());
        buf = buf.append_child16(&format!("feature{i}"), 0, &feature);
    }
    buf.into_inner()
}

/// A version 1.0 GSUB or GPOS table from its three lists.
pub fn layout_table(script_list: &[u8], feature_list: &[u8], lookup_list: &[u8]) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push(0u16)
        .push_with_tag(0u16, "scripts")
        .push_with_tag(0u16, "features")
        .push_with_tag(0u16, "lookups")
        .append_child16("scripts", 0, script_list)
        .append_child16("features", 0, feature_list)
        .append_child16("lookups", 0, lookup_list)
        .into_inner()
}

/// A complete layout table with a single `DFLT` script whose default
/// LangSys enables one `test` feature that references every lookup.
pub fn layout_table_with_lookups(lookups: &[Vec<u8>]) -> Vec<u8> {
    let all_lookups = (0..lookups.len() as u16).collect::<Vec<_>>();
    let scripts = script_list(&[TestScript {
        tag: *b"DFLT",
        default_features: Some(&[0]),
        lang_systems: &[],
    }]);
    let features = feature_list(&[(*b"test", all_lookups.as_slice())]);
    layout_table(&scripts, &features, &lookup_list(lookups))
}

/// One contextual rule, for the sequence context assemblers.
///
/// `input` is the full input sequence, including the first glyph (or class).
/// `backtrack` and `lookahead` are ignored by the non-chained assemblers.
#[derive(Clone, Copy, Debug, Default)]
pub struct TestRule<'a> {
    pub backtrack: &'a [u16],
    pub input: &'a [u16],
    pub lookahead: &'a [u16],
    pub actions: &'a [(u16, u16)],
}

fn rule(rule: &TestRule, chained: bool) -> Vec<u8> {
    let mut buf = BeBuffer::new();
    if chained {
        buf = buf
            .push(rule.backtrack.len() as u16)
            .extend(rule.backtrack.iter().copied());
    }
    buf = buf.push(rule.input.len() as u16);
    if !chained {
        buf = buf.push(rule.actions.len() as u16);
    }
    buf = buf.extend(rule.input.iter().skip(1).copied());
    if chained {
        buf = buf
            .push(rule.lookahead.len() as u16)
            .extend(rule.lookahead.iter().copied())
            .push(rule.actions.len() as u16);
    }
    for (sequence_index, lookup_index) in rule.actions {
        buf = buf.push(*sequence_index).push(*lookup_index);
    }
    buf.into_inner()
}

fn rule_set(rules: &[&TestRule], chained: bool) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(rules.len() as u16);
    for i in 0..rules.len() {
        buf = buf.push_with_tag(0u16, &format!("rule{i}"));
    }
    for (i, item) in rules.iter().enumerate() {
        buf = buf.append_child16(&format!("rule{i}"), 0, &rule(item, chained));
    }
    buf.into_inner()
}

// rules grouped by the first glyph (or class) of their input sequence
fn group_by_first<'a, 'b>(rules: &'b [TestRule<'a>]) -> BTreeMap<u16, Vec<&'b TestRule<'a>>> {
    let mut groups = BTreeMap::<u16, Vec<_>>::new();
    for rule in rules {
        if let Some(first) = rule.input.first() {
            groups.entry(*first).or_default().push(rule);
        }
    }
    groups
}

fn context_format1(rules: &[TestRule], chained: bool) -> Vec<u8> {
    let groups = group_by_first(rules);
    let first_glyphs = groups.keys().copied().collect::<Vec<_>>();
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push_with_tag(0u16, "coverage")
        .push(groups.len() as u16);
    for i in 0..groups.len() {
        buf = buf.push_with_tag(0u16, &format!("set{i}"));
    }
    buf = buf.append_child16("coverage", 0, &coverage_format1(&first_glyphs));
    for (i, set) in groups.values().enumerate() {
        buf = buf.append_child16(&format!("set{i}"), 0, &rule_set(set, chained));
    }
    buf.into_inner()
}

/// A format 1 (glyph based) sequence context subtable.
pub fn sequence_context_format1(rules: &[TestRule]) -> Vec<u8> {
    context_format1(rules, false)
}

/// A format 1 (glyph based) chained sequence context subtable.
pub fn chained_sequence_context_format1(rules: &[TestRule]) -> Vec<u8> {
    context_format1(rules, true)
}

/// A format 2 (class based) sequence context subtable.
///
/// The rule inputs are classes; class sets without rules get a null offset.
pub fn sequence_context_format2(
    coverage: &[u16],
    class_def: &[(u16, u16, u16)],
    class_count: u16,
    rules: &[TestRule],
) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .push(2u16)
        .push_with_tag(0u16, "coverage")
        .push_with_tag(0u16, "class_def")
        .push(class_count);
    for class in 0..class_count {
        buf = buf.push_with_tag(0u16, &format!("set{class}"));
    }
    buf = buf
        .append_child16("coverage", 0, &coverage_format1(coverage))
        .append_child16("class_def", 0, &class_def_format2(class_def));
    for (class, set) in group_by_first(rules) {
        buf = buf.append_child16(&format!("set{class}"), 0, &rule_set(&set, false));
    }
    buf.into_inner()
}

/// A format 2 (class based) chained sequence context subtable.
///
/// `class_defs` holds the backtrack, input and lookahead class ranges.
pub fn chained_sequence_context_format2(
    coverage: &[u16],
    class_defs: [&[(u16, u16, u16)]; 3],
    class_count: u16,
    rules: &[TestRule],
) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .push(2u16)
        .push_with_tag(0u16, "coverage")
        .push_with_tag(0u16, "backtrack")
        .push_with_tag(0u16, "input")
        .push_with_tag(0u16, "lookahead")
        .push(class_count);
    for class in 0..class_count {
        buf = buf.push_with_tag(0u16, &format!("set{class}"));
    }
    buf = buf
        .append_child16("coverage", 0, &coverage_format1(coverage))
        .append_child16("backtrack", 0, &class_def_format2(class_defs[0]))
        .append_child16("input", 0, &class_def_format2(class_defs[1]))
        .append_child16("lookahead", 0, &class_def_format2(class_defs[2]));
    for (class, set) in group_by_first(rules) {
        buf = buf.append_child16(&format!("set{class}"), 0, &rule_set(&set, true));
    }
    buf.into_inner()
}

fn push_coverage_offsets(mut buf: BeBuffer, name: &str, coverages: &[&[u16]]) -> BeBuffer {
    buf = buf.push(coverages.len() as u16);
    for i in 0..coverages.len() {
        buf = buf.push_with_tag(0u16, &format!("{name}{i}"));
    }
    buf
}

fn append_coverages(mut buf: BeBuffer, name: &str, coverages: &[&[u16]]) -> BeBuffer {
    for (i, glyphs) in coverages.iter().enumerate() {
        buf = buf.append_child16(&format!("{name}{i}"), 0, &coverage_format1(glyphs));
    }
    buf
}

fn push_actions(mut buf: BeBuffer, actions: &[(u16, u16)]) -> BeBuffer {
    for (sequence_index, lookup_index) in actions {
        buf = buf.push(*sequence_index).push(*lookup_index);
    }
    buf
}

/// A format 3 (coverage based) sequence context subtable.
pub fn sequence_context_format3(input: &[&[u16]], actions: &[(u16, u16)]) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .push(3u16)
        .push(input.len() as u16)
        .push(actions.len() as u16);
    for i in 0..input.len() {
        buf = buf.push_with_tag(0u16, &format!("input{i}"));
    }
    buf = push_actions(buf, actions);
    append_coverages(buf, "input", input).into_inner()
}

/// A format 3 (coverage based) chained sequence context subtable.
pub fn chained_sequence_context_format3(
    backtrack: &[&[u16]],
    input: &[&[u16]],
    lookahead: &[&[u16]],
    actions: &[(u16, u16)],
) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(3u16);
    buf = push_coverage_offsets(buf, "backtrack", backtrack);
    buf = push_coverage_offsets(buf, "input", input);
    buf = push_coverage_offsets(buf, "lookahead", lookahead);
    buf = push_actions(buf.push(actions.len() as u16), actions);
    buf = append_coverages(buf, "backtrack", backtrack);
    buf = append_coverages(buf, "input", input);
    append_coverages(buf, "lookahead", lookahead).into_inner()
}
