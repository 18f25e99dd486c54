//! The script list and language systems.

use types::{Offset16, Tag};

use crate::{font_data::FontData, read::FontRead, ReadError};

/// A [Script List Table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#script-list-table-and-script-record)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptList {
    pub script_records: Vec<ScriptRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptRecord {
    pub script_tag: Tag,
    pub script: Script,
}

/// A [Script Table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#script-table-and-language-system-record)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Script {
    pub default_lang_sys: Option<LangSys>,
    pub lang_sys_records: Vec<LangSysRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LangSysRecord {
    pub lang_sys_tag: Tag,
    pub lang_sys: LangSys,
}

/// A [Language System Table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#language-system-table)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LangSys {
    /// Index of a feature required for this language system, if any.
    pub required_feature_index: Option<u16>,
    pub feature_indices: Vec<u16>,
}

impl ScriptList {
    /// Returns the index of the script with the given tag.
    pub fn index_for_tag(&self, tag: Tag) -> Option<u16> {
        self.script_records
            .iter()
            .position(|rec| rec.script_tag == tag)
            .map(|index| index as u16)
    }

    /// Returns the script with the given tag.
    pub fn get(&self, tag: Tag) -> Option<&Script> {
        self.script_records
            .iter()
            .find(|rec| rec.script_tag == tag)
            .map(|rec| &rec.script)
    }
}

impl Script {
    /// Returns the language system with the given tag.
    ///
    /// Falls back to the default language system if the tag is not listed.
    pub fn lang_sys(&self, tag: Tag) -> Option<&LangSys> {
        self.lang_sys_records
            .iter()
            .find(|rec| rec.lang_sys_tag == tag)
            .map(|rec| &rec.lang_sys)
            .or(self.default_lang_sys.as_ref())
    }
}

impl LangSys {
    /// All feature indices, starting with the required feature if present.
    pub fn all_feature_indices(&self) -> impl Iterator<Item = u16> + '_ {
        self.required_feature_index
            .into_iter()
            .chain(self.feature_indices.iter().copied())
    }
}

impl<'a> FontRead<'a> for ScriptList {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let script_count: u16 = cursor.read()?;
        let raw_records = cursor.read_records(script_count as usize, |cursor| {
            Ok((cursor.read::<Tag>()?, cursor.read::<Offset16>()?))
        })?;
        let script_records = raw_records
            .into_iter()
            .map(|(script_tag, offset)| {
                let script = match data.resolve_nullable_offset(offset)? {
                    Some(data) => Script::read(data)?,
                    None => Script::default(),
                };
                Ok(ScriptRecord { script_tag, script })
            })
            .collect::<Result<_, ReadError>>()?;
        Ok(ScriptList { script_records })
    }
}

impl<'a> FontRead<'a> for Script {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let default_lang_sys_offset: Offset16 = cursor.read()?;
        let lang_sys_count: u16 = cursor.read()?;
        let raw_records = cursor.read_records(lang_sys_count as usize, |cursor| {
            Ok((cursor.read::<Tag>()?, cursor.read::<Offset16>()?))
        })?;
        let default_lang_sys = data
            .resolve_nullable_offset(default_lang_sys_offset)?
            .map(LangSys::read)
            .transpose()?;
        let lang_sys_records = raw_records
            .into_iter()
            .map(|(lang_sys_tag, offset)| {
                let lang_sys = LangSys::read(data.resolve_offset(offset)?)?;
                Ok(LangSysRecord {
                    lang_sys_tag,
                    lang_sys,
                })
            })
            .collect::<Result<_, ReadError>>()?;
        Ok(Script {
            default_lang_sys,
            lang_sys_records,
        })
    }
}

impl<'a> FontRead<'a> for LangSys {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        // lookupOrderOffset, reserved
        cursor.advance_by(2);
        let required_feature_index: u16 = cursor.read()?;
        let feature_index_count: u16 = cursor.read()?;
        let feature_indices = cursor.read_array(feature_index_count as usize)?;
        Ok(LangSys {
            required_feature_index: (required_feature_index != 0xFFFF)
                .then_some(required_feature_index),
            feature_indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use spot_test_data::layout::{script_list, TestScript};

    use super::*;

    #[test]
    fn lang_sys_fallback() {
        let data = script_list(&[
            TestScript {
                tag: *b"DFLT",
                default_features: Some(&[0]),
                lang_systems: &[],
            },
            TestScript {
                tag: *b"latn",
                default_features: Some(&[1, 2]),
                lang_systems: &[(*b"TRK ", &[3])],
            },
        ]);
        let list = ScriptList::read(FontData::new(&data)).unwrap();
        assert_eq!(list.index_for_tag(Tag::new(b"latn")), Some(1));
        let latn = list.get(Tag::new(b"latn")).unwrap();
        assert_eq!(
            latn.lang_sys(Tag::new(b"TRK ")).unwrap().feature_indices,
            vec![3]
        );
        assert_eq!(
            latn.lang_sys(Tag::new(b"DEU ")).unwrap().feature_indices,
            vec![1, 2]
        );
        assert!(list.get(Tag::new(b"cyrl")).is_none());
    }

    #[test]
    fn script_without_default() {
        let data = script_list(&[TestScript {
            tag: *b"grek",
            default_features: None,
            lang_systems: &[(*b"ELL ", &[0])],
        }]);
        let list = ScriptList::read(FontData::new(&data)).unwrap();
        let grek = list.get(Tag::new(b"grek")).unwrap();
        assert!(grek.default_lang_sys.is_none());
        assert!(grek.lang_sys(Tag::new(b"ENG ")).is_none());
        assert!(grek.lang_sys(Tag::new(b"ELL ")).is_some());
    }
}
