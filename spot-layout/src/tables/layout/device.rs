//! Device and VariationIndex tables

use crate::{font_data::FontData, read::FontRead, ReadError};

/// The `deltaFormat` field of a device table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeltaFormat {
    /// Signed 2-bit value, 8 values per uint16
    Local2BitDeltas,
    /// Signed 4-bit value, 4 values per uint16
    Local4BitDeltas,
    /// Signed 8-bit value, 2 values per uint16
    Local8BitDeltas,
    /// VariationIndex table, contains a delta-set index pair.
    VariationIndex,
}

impl DeltaFormat {
    pub fn new(raw: u16) -> Option<Self> {
        match raw {
            0x0001 => Some(Self::Local2BitDeltas),
            0x0002 => Some(Self::Local4BitDeltas),
            0x0003 => Some(Self::Local8BitDeltas),
            0x8000 => Some(Self::VariationIndex),
            _ => None,
        }
    }

    fn bits_per_value(self) -> u32 {
        match self {
            DeltaFormat::Local2BitDeltas => 2,
            DeltaFormat::Local4BitDeltas => 4,
            DeltaFormat::Local8BitDeltas => 8,
            DeltaFormat::VariationIndex => 0,
        }
    }

    pub(crate) fn value_count(self, start_size: u16, end_size: u16) -> usize {
        let range_len = end_size.saturating_add(1).saturating_sub(start_size) as usize;
        let val_per_word = match self {
            DeltaFormat::Local2BitDeltas => 8,
            DeltaFormat::Local4BitDeltas => 4,
            DeltaFormat::Local8BitDeltas => 2,
            _ => return 0,
        };

        let count = range_len / val_per_word;
        let extra = (range_len % val_per_word).min(1);
        count + extra
    }
}

/// A [Device](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#device-and-variationindex-tables)
/// table, or a VariationIndex table that shares its layout.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceOrVariationIndex {
    Device(Device),
    VariationIndex(VariationIndex),
}

/// Per-ppem adjustments for hinted rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Device {
    pub start_size: u16,
    pub end_size: u16,
    pub delta_format: DeltaFormat,
    /// The packed delta values.
    pub delta_value: Vec<u16>,
}

/// A reference into an item variation store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariationIndex {
    pub delta_set_outer_index: u16,
    pub delta_set_inner_index: u16,
}

impl Device {
    /// The unpacked deltas, one per size from `start_size` to `end_size`.
    pub fn deltas(&self) -> Vec<i8> {
        let bits = self.delta_format.bits_per_value();
        if bits == 0 {
            return Vec::new();
        }
        let per_word = 16 / bits;
        let count = (self.end_size as usize + 1).saturating_sub(self.start_size as usize);
        (0..count)
            .filter_map(|i| {
                let word = *self.delta_value.get(i / per_word as usize)?;
                let shift = 16 - bits * (i as u32 % per_word + 1);
                let raw = (word >> shift) & ((1 << bits) - 1);
                // sign extend
                let value = ((raw << (16 - bits)) as i16) >> (16 - bits);
                Some(value as i8)
            })
            .collect()
    }
}

impl<'a> FontRead<'a> for DeviceOrVariationIndex {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let first: u16 = cursor.read()?;
        let second: u16 = cursor.read()?;
        let raw_format: u16 = cursor.read()?;
        let delta_format =
            DeltaFormat::new(raw_format).ok_or(ReadError::InvalidFormat(raw_format.into()))?;
        if delta_format == DeltaFormat::VariationIndex {
            return Ok(Self::VariationIndex(VariationIndex {
                delta_set_outer_index: first,
                delta_set_inner_index: second,
            }));
        }
        let count = delta_format.value_count(first, second);
        let delta_value = cursor.read_array(count)?;
        Ok(Self::Device(Device {
            start_size: first,
            end_size: second,
            delta_format,
            delta_value,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_bit_deltas() {
        #[rustfmt::skip]
        let data = [
            0, 12, 0, 17, // sizes 12..=17
            0, 1,         // LOCAL_2_BIT_DELTAS
            0b0101_1111, 0b1000_0000, // 1, 1, -1, -1, -2, 0
        ];
        let table = DeviceOrVariationIndex::read(FontData::new(&data)).unwrap();
        let DeviceOrVariationIndex::Device(device) = table else {
            panic!("expected a device table");
        };
        assert_eq!(device.deltas(), vec![1, 1, -1, -1, -2, 0]);
    }

    #[test]
    fn eight_bit_deltas() {
        let data = [0, 9, 0, 11, 0, 3, 0xFB, 0x05, 0x7F, 0x00];
        let table = DeviceOrVariationIndex::read(FontData::new(&data)).unwrap();
        let DeviceOrVariationIndex::Device(device) = table else {
            panic!("expected a device table");
        };
        assert_eq!(device.deltas(), vec![-5, 5, 127]);
    }

    #[test]
    fn variation_index() {
        let data = [0, 2, 0, 7, 0x80, 0x00];
        assert_eq!(
            DeviceOrVariationIndex::read(FontData::new(&data)).unwrap(),
            DeviceOrVariationIndex::VariationIndex(VariationIndex {
                delta_set_outer_index: 2,
                delta_set_inner_index: 7,
            })
        );
    }

    #[test]
    fn unknown_delta_format() {
        let data = [0, 2, 0, 7, 0, 4];
        assert_eq!(
            DeviceOrVariationIndex::read(FontData::new(&data)),
            Err(ReadError::InvalidFormat(4))
        );
    }
}
