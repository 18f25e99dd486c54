//! Following contextual lookups into the lookups they invoke.
//!
//! A sequence context rule names other lookups by index, and those may be
//! contextual themselves. The font decides how deep (or how cyclic) that
//! graph is, so the traversal carries an explicit depth and gives up past
//! [`MAX_CONTEXT_NESTING`].

use super::{LayoutTable, LookupSubtable, RuleLocation};
use crate::diagnostic::Diagnostic;

/// How many contextual lookups may be entered below the one being expanded.
pub const MAX_CONTEXT_NESTING: u8 = 1;

/// The rules of a contextual lookup, with the lookups they invoke.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContextExpansion {
    pub lookup_index: u16,
    pub rules: Vec<ContextRuleExpansion>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ContextRuleExpansion {
    /// The index of the subtable (in its lookup) holding the rule.
    pub subtable_index: u16,
    pub rule: RuleLocation,
    pub actions: Vec<ActionExpansion>,
}

/// One (sequence index, lookup index) action of a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActionExpansion {
    pub sequence_index: u16,
    pub lookup_index: u16,
    pub target: ActionTarget,
}

/// What an action's lookup index refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ActionTarget {
    /// The index is past the end of the lookup list.
    Missing,
    /// A lookup that does not invoke other lookups.
    Lookup { lookup_type: u16 },
    /// A contextual lookup, and its own expanded rules.
    Context(Vec<ContextRuleExpansion>),
    /// A contextual lookup that was not entered because it is nested too deeply.
    RecursionLimit,
}

/// Traversal state for [`LayoutTable::expand_context_with`].
#[derive(Clone, Debug, Default)]
pub struct NestingContext {
    depth: u8,
    diagnostics: Vec<Diagnostic>,
}

impl NestingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of contextual lookups currently entered.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<T: LookupSubtable> LayoutTable<T> {
    /// Expand the contextual rules of the lookup at `lookup_index`.
    ///
    /// A lookup that is not contextual (or does not exist) has no rules.
    pub fn expand_context(&self, lookup_index: u16) -> ContextExpansion {
        let mut ctx = NestingContext::new();
        let rules = self.expand_context_with(lookup_index, &mut ctx);
        ContextExpansion {
            lookup_index,
            rules,
            diagnostics: ctx.into_diagnostics(),
        }
    }

    /// Like [`expand_context`][Self::expand_context], with caller-provided state.
    ///
    /// The lookup at `lookup_index` is entered at the context's current depth.
    pub fn expand_context_with(
        &self,
        lookup_index: u16,
        ctx: &mut NestingContext,
    ) -> Vec<ContextRuleExpansion> {
        let Some(lookup) = self.lookup(lookup_index) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        for (subtable_index, subtable) in lookup.subtables.iter().enumerate() {
            let Some(subtable) = subtable else {
                continue;
            };
            let resolved = match subtable.as_extension() {
                Some(extension) => match extension.resolve() {
                    Some(inner) => inner,
                    None => continue,
                },
                None => subtable,
            };
            let Some(rules) = resolved.context_rules() else {
                continue;
            };
            for rule in rules {
                let actions = rule
                    .seq_lookup_records
                    .iter()
                    .map(|record| ActionExpansion {
                        sequence_index: record.sequence_index,
                        lookup_index: record.lookup_list_index,
                        target: self.expand_target(record.lookup_list_index, ctx),
                    })
                    .collect();
                result.push(ContextRuleExpansion {
                    subtable_index: subtable_index as u16,
                    rule: rule.location,
                    actions,
                });
            }
        }
        result
    }

    fn expand_target(&self, lookup_index: u16, ctx: &mut NestingContext) -> ActionTarget {
        let Some(lookup) = self.lookup(lookup_index) else {
            return ActionTarget::Missing;
        };
        if !lookup.is_context() {
            return ActionTarget::Lookup {
                lookup_type: lookup.resolved_lookup_type(),
            };
        }
        if ctx.depth >= MAX_CONTEXT_NESTING {
            let diagnostic = Diagnostic::RecursionLimitExceeded {
                lookup_index,
                depth: ctx.depth.saturating_add(1),
            };
            log::warn!("{}: {}", T::TABLE_TAG, diagnostic);
            ctx.diagnostics.push(diagnostic);
            return ActionTarget::RecursionLimit;
        }
        ctx.depth += 1;
        let rules = self.expand_context_with(lookup_index, ctx);
        ctx.depth -= 1;
        ActionTarget::Context(rules)
    }
}
