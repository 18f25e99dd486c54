//! OpenType Layout common table formats
//!
//! The pieces shared by GSUB and GPOS: the table header, the script,
//! feature and lookup lists, and the subtable formats that both tables use.

mod class_def;
mod context;
mod coverage;
mod device;
mod feature;
mod lookup_flag;
mod nesting;
mod script;

use types::{MajorMinor, Offset, Offset16, Offset32, Tag};

pub use class_def::{ClassDef, ClassDefFormat1, ClassDefFormat2, ClassRangeRecord};
pub use context::{
    ChainedSequenceContext, ChainedSequenceContextFormat1, ChainedSequenceContextFormat2,
    ChainedSequenceContextFormat3, ChainedSequenceRule, ChainedSequenceRuleSet, RuleActions,
    RuleLocation, SequenceContext, SequenceContextFormat1, SequenceContextFormat2,
    SequenceContextFormat3, SequenceLookupRecord, SequenceRule, SequenceRuleSet,
};
pub use coverage::{CoverageFormat1, CoverageFormat2, CoverageTable, RangeRecord};
pub use device::{DeltaFormat, Device, DeviceOrVariationIndex, VariationIndex};
pub use feature::{Feature, FeatureList, FeatureRecord};
pub use lookup_flag::LookupFlag;
pub use nesting::{
    ActionExpansion, ActionTarget, ContextExpansion, ContextRuleExpansion, NestingContext,
    MAX_CONTEXT_NESTING,
};
pub use script::{LangSys, LangSysRecord, Script, ScriptList, ScriptRecord};

use crate::{
    diagnostic::{DecodeContext, Diagnostic},
    font_data::FontData,
    read::FontRead,
    ReadError,
};

/// How deeply extension subtables may wrap other extension subtables.
pub const MAX_EXTENSION_NESTING: u8 = 8;

/// The subtable type of a layout table (GSUB or GPOS).
///
/// This is what lets the two tables share the lookup, lookup list and
/// extension machinery.
pub trait LookupSubtable: Sized {
    /// The tag of the table these subtables belong to.
    const TABLE_TAG: Tag;
    /// The lookup type of the extension subtable.
    const EXTENSION_LOOKUP_TYPE: u16;

    /// `true` for lookup types that can be decoded, excluding the extension type.
    fn is_known_lookup_type(lookup_type: u16) -> bool;

    /// `true` for the sequence context and chained sequence context types.
    fn is_context_lookup_type(lookup_type: u16) -> bool;

    /// Decode a subtable of a known, non-extension `lookup_type`.
    fn read_subtable(
        data: FontData,
        lookup_type: u16,
        ctx: &mut DecodeContext,
    ) -> Result<Self, ReadError>;

    fn from_extension(extension: ExtensionSubtable<Self>) -> Self;

    fn as_extension(&self) -> Option<&ExtensionSubtable<Self>>;

    /// The lookup type of this subtable; for an extension, the extension type.
    fn lookup_type(&self) -> u16;

    /// The rules of a (chained) sequence context subtable.
    fn context_rules(&self) -> Option<Vec<RuleActions<'_>>>;
}

/// A GSUB or GPOS table.
///
/// Decoding never fails because of a single bad subtable: those become
/// empty slots, and the problem is recorded in [`diagnostics`][Self::diagnostics].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutTable<T> {
    pub version: MajorMinor,
    pub script_list: ScriptList,
    pub feature_list: FeatureList,
    pub lookup_list: LookupList<T>,
    /// Only present in version 1.1; the table itself is not decoded.
    pub feature_variations_offset: Option<Offset32>,
    #[cfg_attr(feature = "serde", serde(skip_deserializing))]
    diagnostics: Vec<Diagnostic>,
}

/// A [Lookup List Table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#lookup-list-table)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookupList<T> {
    pub lookups: Vec<Lookup<T>>,
}

/// A [Lookup Table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#lookup-table)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lookup<T> {
    pub lookup_type: u16,
    pub lookup_flag: LookupFlag,
    /// One slot per subtable offset; `None` where the subtable could not be
    /// decoded.
    pub subtables: Vec<Option<T>>,
    pub mark_filtering_set: Option<u16>,
}

/// An extension subtable, wrapping a subtable of another lookup type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtensionSubtable<T> {
    pub extension_lookup_type: u16,
    /// Relative to the start of this extension subtable.
    pub extension_offset: Offset32,
    pub subtable: Option<Box<T>>,
}

impl<T> LayoutTable<T> {
    pub fn lookup(&self, lookup_index: u16) -> Option<&Lookup<T>> {
        self.lookup_list.get(lookup_index)
    }

    /// Problems found while decoding this table.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The lookups that `feature` contributes for a script and language.
    ///
    /// With no `lang`, the script's default language system is used; an
    /// unlisted `lang` also falls back to it. The required feature is
    /// included if it has the requested tag. The result is sorted and free
    /// of duplicates.
    pub fn lookup_indices(&self, script: Tag, lang: Option<Tag>, feature: Tag) -> Vec<u16> {
        let Some(script) = self.script_list.get(script) else {
            return Vec::new();
        };
        let lang_sys = match lang {
            Some(tag) => script.lang_sys(tag),
            None => script.default_lang_sys.as_ref(),
        };
        let Some(lang_sys) = lang_sys else {
            return Vec::new();
        };
        let mut result = lang_sys
            .all_feature_indices()
            .filter_map(|index| self.feature_list.get(index))
            .filter(|record| record.feature_tag == feature)
            .flat_map(|record| record.feature.lookup_list_indices.iter().copied())
            .collect::<Vec<_>>();
        result.sort_unstable();
        result.dedup();
        result
    }
}

impl<'a, T: LookupSubtable> FontRead<'a> for LayoutTable<T> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: MajorMinor = cursor.read()?;
        if version.major != 1 {
            return Err(ReadError::InvalidFormat(version.major.into()));
        }
        let script_list_offset: Offset16 = cursor.read()?;
        let feature_list_offset: Offset16 = cursor.read()?;
        let lookup_list_offset: Offset16 = cursor.read()?;
        let feature_variations_offset = version
            .compatible(MajorMinor::VERSION_1_1)
            .then(|| cursor.read::<Offset32>())
            .transpose()?;

        let script_list = match data.resolve_nullable_offset(script_list_offset)? {
            Some(data) => ScriptList::read(data)?,
            None => ScriptList::default(),
        };
        let feature_list = match data.resolve_nullable_offset(feature_list_offset)? {
            Some(data) => FeatureList::read(data)?,
            None => FeatureList::default(),
        };
        let mut ctx = DecodeContext::new(T::TABLE_TAG);
        let lookup_list = match data.resolve_nullable_offset(lookup_list_offset)? {
            Some(data) => LookupList::read(data, &mut ctx)?,
            None => LookupList::default(),
        };
        Ok(LayoutTable {
            version,
            script_list,
            feature_list,
            lookup_list,
            feature_variations_offset,
            diagnostics: ctx.into_diagnostics(),
        })
    }
}

impl<T> LookupList<T> {
    pub fn get(&self, lookup_index: u16) -> Option<&Lookup<T>> {
        self.lookups.get(lookup_index as usize)
    }

    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }
}

impl<T> Default for LookupList<T> {
    fn default() -> Self {
        LookupList {
            lookups: Vec::new(),
        }
    }
}

impl<T: LookupSubtable> LookupList<T> {
    pub(crate) fn read(data: FontData, ctx: &mut DecodeContext) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let lookup_count: u16 = cursor.read()?;
        let lookup_offsets: Vec<Offset16> = cursor.read_array(lookup_count as usize)?;
        let mut lookups = Vec::with_capacity(lookup_offsets.len());
        for (lookup_index, offset) in lookup_offsets.into_iter().enumerate() {
            let lookup_index = lookup_index as u16;
            let lookup = match data.resolve_nullable_offset(offset)? {
                Some(data) => Lookup::read(data, lookup_index, ctx)?,
                None => {
                    // keep the slot, so later lookup indices stay valid
                    ctx.enter_lookup(lookup_index, 0);
                    ctx.null_offset();
                    Lookup::placeholder()
                }
            };
            lookups.push(lookup);
        }
        Ok(LookupList { lookups })
    }
}

impl<T> Lookup<T> {
    fn placeholder() -> Self {
        Lookup {
            lookup_type: 0,
            lookup_flag: LookupFlag::empty(),
            subtables: Vec::new(),
            mark_filtering_set: None,
        }
    }
}

impl<T: LookupSubtable> Lookup<T> {
    pub(crate) fn read(
        data: FontData,
        lookup_index: u16,
        ctx: &mut DecodeContext,
    ) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let lookup_type: u16 = cursor.read()?;
        let lookup_flag: LookupFlag = cursor.read()?;
        let subtable_count: u16 = cursor.read()?;
        let subtable_offsets: Vec<Offset16> = cursor.read_array(subtable_count as usize)?;
        let mark_filtering_set = lookup_flag
            .contains(LookupFlag::USE_MARK_FILTERING_SET)
            .then(|| cursor.read::<u16>())
            .transpose()?;

        ctx.enter_lookup(lookup_index, lookup_type);
        let subtables = subtable_offsets
            .into_iter()
            .map(|offset| read_subtable_slot(data, offset, lookup_type, ctx))
            .collect::<Result<_, _>>()?;
        Ok(Lookup {
            lookup_type,
            lookup_flag,
            subtables,
            mark_filtering_set,
        })
    }

    /// The decoded subtables, with extension indirection removed.
    ///
    /// Empty slots (and extensions that wrap nothing) are skipped.
    pub fn subtables_resolved(&self) -> impl Iterator<Item = &T> + '_ {
        self.subtables
            .iter()
            .flatten()
            .filter_map(|subtable| match subtable.as_extension() {
                Some(extension) => extension.resolve(),
                None => Some(subtable),
            })
    }

    /// The lookup type of this lookup's subtables, looking through extensions.
    pub fn resolved_lookup_type(&self) -> u16 {
        self.subtables_resolved()
            .next()
            .map(LookupSubtable::lookup_type)
            .unwrap_or(self.lookup_type)
    }

    /// `true` if this lookup's subtables are (chained) sequence contexts.
    pub fn is_context(&self) -> bool {
        T::is_context_lookup_type(self.resolved_lookup_type())
    }
}

impl<T: LookupSubtable> ExtensionSubtable<T> {
    pub(crate) fn read(data: FontData, ctx: &mut DecodeContext) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format.into()));
        }
        let extension_lookup_type: u16 = cursor.read()?;
        let extension_offset: Offset32 = cursor.read()?;
        let subtable = if ctx.enter_extension() {
            let result = read_subtable_slot(data, extension_offset, extension_lookup_type, ctx);
            ctx.exit_extension();
            result?.map(Box::new)
        } else {
            None
        };
        Ok(ExtensionSubtable {
            extension_lookup_type,
            extension_offset,
            subtable,
        })
    }

    /// The wrapped subtable, following any chain of extensions.
    pub fn resolve(&self) -> Option<&T> {
        let mut current = self;
        loop {
            let inner = current.subtable.as_deref()?;
            match inner.as_extension() {
                Some(next) => current = next,
                None => return Some(inner),
            }
        }
    }
}

/// Decode one subtable slot of a lookup.
///
/// Problems local to the subtable are reported to `ctx` and produce `None`;
/// only errors that make the rest of the table unreadable are returned.
pub(crate) fn read_subtable_slot<T: LookupSubtable>(
    data: FontData,
    offset: impl Offset,
    lookup_type: u16,
    ctx: &mut DecodeContext,
) -> Result<Option<T>, ReadError> {
    let Some(data) = data.resolve_nullable_offset(offset)? else {
        ctx.null_offset();
        return Ok(None);
    };
    let previous = ctx.replace_lookup_type(lookup_type);
    let result = if lookup_type == T::EXTENSION_LOOKUP_TYPE {
        ExtensionSubtable::read(data, ctx).map(T::from_extension)
    } else if T::is_known_lookup_type(lookup_type) {
        T::read_subtable(data, lookup_type, ctx)
    } else {
        ctx.unsupported_lookup_type(lookup_type);
        ctx.replace_lookup_type(previous);
        return Ok(None);
    };
    let result = match result {
        Ok(subtable) => Ok(Some(subtable)),
        Err(ReadError::InvalidFormat(format)) => {
            ctx.unsupported_format(format as u16);
            Ok(None)
        }
        Err(ReadError::NullOffset) => {
            ctx.null_offset();
            Ok(None)
        }
        Err(e) => Err(e),
    };
    ctx.replace_lookup_type(previous);
    result
}

/// Read the tables at each of `offsets`, none of which may be null.
pub(crate) fn read_offsets<'a, T: FontRead<'a>>(
    data: FontData<'a>,
    offsets: &[impl Offset],
) -> Result<Vec<T>, ReadError> {
    offsets
        .iter()
        .map(|offset| T::read(data.resolve_offset(*offset)?))
        .collect()
}

/// Read the tables at each of `offsets`; null offsets become `None`.
pub(crate) fn read_nullable_offsets<'a, T: FontRead<'a>>(
    data: FontData<'a>,
    offsets: &[impl Offset],
) -> Result<Vec<Option<T>>, ReadError> {
    offsets
        .iter()
        .map(|offset| {
            data.resolve_nullable_offset(*offset)?
                .map(T::read)
                .transpose()
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/layout.rs"]
mod tests;
