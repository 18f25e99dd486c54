//! The feature list.

use types::{Offset16, Tag};

use crate::{font_data::FontData, read::FontRead, ReadError};

/// A [Feature List Table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#feature-list-table)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureList {
    pub feature_records: Vec<FeatureRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureRecord {
    pub feature_tag: Tag,
    pub feature: Feature,
}

/// A [Feature Table](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#feature-table)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feature {
    /// Offset to the feature parameters; these are not decoded.
    pub feature_params_offset: Offset16,
    pub lookup_list_indices: Vec<u16>,
}

impl FeatureList {
    /// Returns the feature record at the given index.
    pub fn get(&self, index: u16) -> Option<&FeatureRecord> {
        self.feature_records.get(index as usize)
    }
}

impl<'a> FontRead<'a> for FeatureList {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let feature_count: u16 = cursor.read()?;
        let raw_records = cursor.read_records(feature_count as usize, |cursor| {
            Ok((cursor.read::<Tag>()?, cursor.read::<Offset16>()?))
        })?;
        let feature_records = raw_records
            .into_iter()
            .map(|(feature_tag, offset)| {
                // a null feature keeps its place, so feature indices stay valid
                let feature = match data.resolve_nullable_offset(offset)? {
                    Some(data) => Feature::read(data)?,
                    None => Feature::default(),
                };
                Ok(FeatureRecord {
                    feature_tag,
                    feature,
                })
            })
            .collect::<Result<_, ReadError>>()?;
        Ok(FeatureList { feature_records })
    }
}

impl<'a> FontRead<'a> for Feature {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let feature_params_offset = cursor.read()?;
        let lookup_index_count: u16 = cursor.read()?;
        let lookup_list_indices = cursor.read_array(lookup_index_count as usize)?;
        Ok(Feature {
            feature_params_offset,
            lookup_list_indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use spot_test_data::layout::feature_list;

    use super::*;

    #[test]
    fn feature_list_get() {
        let data = feature_list(&[(*b"liga", &[0, 2]), (*b"kern", &[1])]);
        let list = FeatureList::read(FontData::new(&data)).unwrap();
        assert_eq!(list.get(0).unwrap().feature_tag, Tag::new(b"liga"));
        assert_eq!(list.get(0).unwrap().feature.lookup_list_indices, vec![0, 2]);
        assert_eq!(list.get(1).unwrap().feature_tag, Tag::new(b"kern"));
        assert!(list.get(2).is_none());
    }
}
