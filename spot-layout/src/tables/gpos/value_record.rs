//! A GPOS ValueRecord, and the ValueFormat that describes its layout

use std::ops::{BitOr, BitOrAssign};

use types::{FixedSize, Offset16};

use crate::{
    font_data::FontData,
    read::{ComputeSize, FontRead, FontReadWithArgs, ReadArgs},
    tables::layout::DeviceOrVariationIndex,
    ReadError,
};

/// The [ValueFormat](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#value-record)
/// bit enumeration: which fields of a [`ValueRecord`] are present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueFormat(u16);

impl ValueFormat {
    /// Includes horizontal adjustment for placement
    pub const X_PLACEMENT: Self = ValueFormat(0x0001);
    /// Includes vertical adjustment for placement
    pub const Y_PLACEMENT: Self = ValueFormat(0x0002);
    /// Includes horizontal adjustment for advance
    pub const X_ADVANCE: Self = ValueFormat(0x0004);
    /// Includes vertical adjustment for advance
    pub const Y_ADVANCE: Self = ValueFormat(0x0008);
    /// Includes Device table (non-variable font) / VariationIndex table (variable font) for horizontal placement
    pub const X_PLACEMENT_DEVICE: Self = ValueFormat(0x0010);
    /// Includes Device table (non-variable font) / VariationIndex table (variable font) for vertical placement
    pub const Y_PLACEMENT_DEVICE: Self = ValueFormat(0x0020);
    /// Includes Device table (non-variable font) / VariationIndex table (variable font) for horizontal advance
    pub const X_ADVANCE_DEVICE: Self = ValueFormat(0x0040);
    /// Includes Device table (non-variable font) / VariationIndex table (variable font) for vertical advance
    pub const Y_ADVANCE_DEVICE: Self = ValueFormat(0x0080);

    /// A mask with all the device/variation index bits set
    pub const ANY_DEVICE_OR_VARIDX: Self = ValueFormat(0x0010 | 0x0020 | 0x0040 | 0x0080);

    // the fields of a value record, in wire order
    const FIELDS: [Self; 8] = [
        Self::X_PLACEMENT,
        Self::Y_PLACEMENT,
        Self::X_ADVANCE,
        Self::Y_ADVANCE,
        Self::X_PLACEMENT_DEVICE,
        Self::Y_PLACEMENT_DEVICE,
        Self::X_ADVANCE_DEVICE,
        Self::Y_ADVANCE_DEVICE,
    ];

    /// Returns an empty set of flags.
    pub const fn empty() -> Self {
        ValueFormat(0)
    }

    /// Returns the raw value of the flags currently stored.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Convert from underlying bit representation, dropping any bits
    /// that do not correspond to flags.
    pub const fn from_bits_truncate(bits: u16) -> Self {
        ValueFormat(bits & 0x00FF)
    }

    /// Returns `true` if all of the flags in `other` are contained within `self`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Return the number of bytes required to store a [`ValueRecord`] in this format.
    #[inline]
    pub fn record_byte_len(self) -> usize {
        self.0.count_ones() as usize * u16::RAW_BYTE_LEN
    }
}

impl BitOr for ValueFormat {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ValueFormat {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl types::Scalar for ValueFormat {
    type Raw = <u16 as types::Scalar>::Raw;
    fn to_raw(self) -> Self::Raw {
        types::Scalar::to_raw(self.0)
    }
    fn from_raw(raw: Self::Raw) -> Self {
        Self::from_bits_truncate(<u16 as types::Scalar>::from_raw(raw))
    }
}

/// A Positioning ValueRecord.
///
/// A field is `Some` exactly when its bit was set in the format the record
/// was read with. An absent adjustment has the value 0.
///
/// The device offsets are relative to the subtable (or PairSet) that holds
/// the record; use [`device`][Self::device] to resolve them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRecord {
    pub x_placement: Option<i16>,
    pub y_placement: Option<i16>,
    pub x_advance: Option<i16>,
    pub y_advance: Option<i16>,
    pub x_placement_device: Option<Offset16>,
    pub y_placement_device: Option<Offset16>,
    pub x_advance_device: Option<Offset16>,
    pub y_advance_device: Option<Offset16>,
}

impl ValueRecord {
    pub fn read(data: FontData, format: ValueFormat) -> Result<Self, ReadError> {
        let mut this = ValueRecord::default();
        let mut cursor = data.cursor();

        if format.contains(ValueFormat::X_PLACEMENT) {
            this.x_placement = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::Y_PLACEMENT) {
            this.y_placement = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::X_ADVANCE) {
            this.x_advance = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::Y_ADVANCE) {
            this.y_advance = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::X_PLACEMENT_DEVICE) {
            this.x_placement_device = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::Y_PLACEMENT_DEVICE) {
            this.y_placement_device = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::X_ADVANCE_DEVICE) {
            this.x_advance_device = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::Y_ADVANCE_DEVICE) {
            this.y_advance_device = Some(cursor.read()?);
        }
        Ok(this)
    }

    /// The format with a bit set for each field that is present.
    pub fn format(&self) -> ValueFormat {
        let mut format = ValueFormat::empty();
        for (flag, value) in self.raw_fields() {
            if value.is_some() {
                format |= flag;
            }
        }
        format
    }

    /// Append the wire representation of this record in `format` to `out`.
    ///
    /// Fields in `format` that this record does not have are written as 0;
    /// fields this record has that are not in `format` are skipped.
    pub fn write_into(&self, format: ValueFormat, out: &mut Vec<u8>) {
        for (flag, value) in self.raw_fields() {
            if format.contains(flag) {
                out.extend(value.unwrap_or_default().to_be_bytes());
            }
        }
    }

    /// Resolve one of this record's device offsets against `data`, the start
    /// of the structure holding the record.
    ///
    /// Returns `None` if the offset is absent or null.
    pub fn device(
        offset: Option<Offset16>,
        data: FontData,
    ) -> Option<Result<DeviceOrVariationIndex, ReadError>> {
        match data.resolve_nullable_offset(offset?) {
            Ok(Some(data)) => Some(DeviceOrVariationIndex::read(data)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }

    fn raw_fields(&self) -> [(ValueFormat, Option<u16>); 8] {
        let offset = |offset: Option<Offset16>| offset.map(|off| off.to_u32() as u16);
        let values = [
            self.x_placement.map(|v| v as u16),
            self.y_placement.map(|v| v as u16),
            self.x_advance.map(|v| v as u16),
            self.y_advance.map(|v| v as u16),
            offset(self.x_placement_device),
            offset(self.y_placement_device),
            offset(self.x_advance_device),
            offset(self.y_advance_device),
        ];
        let mut result = [(ValueFormat::empty(), None); 8];
        for (slot, (flag, value)) in result
            .iter_mut()
            .zip(ValueFormat::FIELDS.into_iter().zip(values))
        {
            *slot = (flag, value);
        }
        result
    }
}

impl ReadArgs for ValueRecord {
    type Args = ValueFormat;
}

impl<'a> FontReadWithArgs<'a> for ValueRecord {
    fn read_with_args(data: FontData<'a>, args: &Self::Args) -> Result<Self, ReadError> {
        ValueRecord::read(data, *args)
    }
}

impl ComputeSize for ValueRecord {
    #[inline]
    fn compute_size(args: &ValueFormat) -> Result<usize, ReadError> {
        Ok(args.record_byte_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanity_check_format_const() {
        let format = ValueFormat::X_ADVANCE_DEVICE
            | ValueFormat::Y_ADVANCE_DEVICE
            | ValueFormat::Y_PLACEMENT_DEVICE
            | ValueFormat::X_PLACEMENT_DEVICE;
        assert_eq!(format, ValueFormat::ANY_DEVICE_OR_VARIDX);
        assert_eq!(format.record_byte_len(), 4 * 2);
        assert_eq!(ValueFormat::from_bits_truncate(0xFF05).bits(), 0x05);
    }

    #[test]
    fn fields_follow_wire_order() {
        // y placement and x advance set; x placement is not
        let format = ValueFormat::Y_PLACEMENT | ValueFormat::X_ADVANCE;
        let data = [0xFF, 0xB0, 0x00, 0x32];
        let record = ValueRecord::read(FontData::new(&data), format).unwrap();
        assert_eq!(record.x_placement, None);
        assert_eq!(record.y_placement, Some(-80));
        assert_eq!(record.x_advance, Some(50));
        assert_eq!(record.format(), format);
    }

    #[test]
    fn x_advance_reencodes() {
        let data = [0x00, 0x32];
        let record = ValueRecord::read(FontData::new(&data), ValueFormat::X_ADVANCE).unwrap();
        assert_eq!(record.x_advance, Some(50));
        let mut out = Vec::new();
        record.write_into(ValueFormat::X_ADVANCE, &mut out);
        assert_eq!(out, data);
    }

    #[test]
    fn round_trip_every_format() {
        let bytes = (1..=16u8).collect::<Vec<_>>();
        for bits in 0..=0xFFu16 {
            let format = ValueFormat::from_bits_truncate(bits);
            let len = format.record_byte_len();
            assert_eq!(ValueRecord::compute_size(&format), Ok(len));
            let record = ValueRecord::read(FontData::new(&bytes[..len]), format).unwrap();
            assert_eq!(record.format(), format);
            let mut out = Vec::new();
            record.write_into(format, &mut out);
            assert_eq!(out, &bytes[..len], "format {bits:#04X}");
        }
    }

    #[test]
    fn absent_fields_written_as_zero() {
        let record = ValueRecord {
            x_advance: Some(-1),
            ..Default::default()
        };
        let mut out = Vec::new();
        record.write_into(ValueFormat::X_PLACEMENT | ValueFormat::X_ADVANCE, &mut out);
        assert_eq!(out, [0, 0, 0xFF, 0xFF]);
    }

    #[test]
    fn truncated_record() {
        let data = [0x00, 0x32];
        assert_eq!(
            ValueRecord::read(
                FontData::new(&data),
                ValueFormat::X_ADVANCE | ValueFormat::Y_ADVANCE
            ),
            Err(ReadError::OutOfBounds)
        );
    }

    #[test]
    fn resolve_device() {
        #[rustfmt::skip]
        let data = [
            0, 0, 0, 0,       // (the record would live here)
            0, 12, 0, 12, 0, 3, 0xFB, 0x00, // device: size 12, delta -5
        ];
        let record = ValueRecord {
            x_advance_device: Some(Offset16::new(4)),
            ..Default::default()
        };
        let device = ValueRecord::device(record.x_advance_device, FontData::new(&data))
            .unwrap()
            .unwrap();
        let DeviceOrVariationIndex::Device(device) = device else {
            panic!("expected a device table");
        };
        assert_eq!(device.deltas(), vec![-5]);
        assert!(ValueRecord::device(record.x_placement_device, FontData::new(&data)).is_none());
    }
}
