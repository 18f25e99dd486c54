//! Anchor tables

use types::Offset16;

use crate::{
    diagnostic::DecodeContext,
    font_data::FontData,
    read::{FontRead, Format},
    tables::layout::DeviceOrVariationIndex,
    ReadError,
};

/// An [Anchor Table](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#anchor-tables)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorTable {
    Format1(AnchorFormat1),
    Format2(AnchorFormat2),
    Format3(AnchorFormat3),
}

/// Design units only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorFormat1 {
    pub x_coordinate: i16,
    pub y_coordinate: i16,
}

/// Design units plus a contour point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorFormat2 {
    pub x_coordinate: i16,
    pub y_coordinate: i16,
    pub anchor_point: u16,
}

/// Design units plus Device or VariationIndex tables.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnchorFormat3 {
    pub x_coordinate: i16,
    pub y_coordinate: i16,
    pub x_device: Option<DeviceOrVariationIndex>,
    pub y_device: Option<DeviceOrVariationIndex>,
}

impl Format<u16> for AnchorFormat1 {
    const FORMAT: u16 = 1;
}

impl Format<u16> for AnchorFormat2 {
    const FORMAT: u16 = 2;
}

impl Format<u16> for AnchorFormat3 {
    const FORMAT: u16 = 3;
}

impl AnchorTable {
    pub fn x(&self) -> i16 {
        match self {
            AnchorTable::Format1(table) => table.x_coordinate,
            AnchorTable::Format2(table) => table.x_coordinate,
            AnchorTable::Format3(table) => table.x_coordinate,
        }
    }

    pub fn y(&self) -> i16 {
        match self {
            AnchorTable::Format1(table) => table.y_coordinate,
            AnchorTable::Format2(table) => table.y_coordinate,
            AnchorTable::Format3(table) => table.y_coordinate,
        }
    }
}

impl<'a> FontRead<'a> for AnchorTable {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            AnchorFormat1::FORMAT => Ok(Self::Format1(FontRead::read(data)?)),
            AnchorFormat2::FORMAT => Ok(Self::Format2(FontRead::read(data)?)),
            AnchorFormat3::FORMAT => Ok(Self::Format3(FontRead::read(data)?)),
            other => Err(ReadError::InvalidFormat(other.into())),
        }
    }
}

impl<'a> FontRead<'a> for AnchorFormat1 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(AnchorFormat1 {
            x_coordinate: data.read_at(2)?,
            y_coordinate: data.read_at(4)?,
        })
    }
}

impl<'a> FontRead<'a> for AnchorFormat2 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        Ok(AnchorFormat2 {
            x_coordinate: data.read_at(2)?,
            y_coordinate: data.read_at(4)?,
            anchor_point: data.read_at(6)?,
        })
    }
}

impl<'a> FontRead<'a> for AnchorFormat3 {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let x_device_offset: Offset16 = data.read_at(6)?;
        let y_device_offset: Offset16 = data.read_at(8)?;
        Ok(AnchorFormat3 {
            x_coordinate: data.read_at(2)?,
            y_coordinate: data.read_at(4)?,
            x_device: data
                .resolve_nullable_offset(x_device_offset)?
                .map(DeviceOrVariationIndex::read)
                .transpose()?,
            y_device: data
                .resolve_nullable_offset(y_device_offset)?
                .map(DeviceOrVariationIndex::read)
                .transpose()?,
        })
    }
}

/// Read the (nullable) anchor at `offset` from `data`.
///
/// An anchor (or anchor device table) in an unknown format is reported and
/// read as absent, so the rest of the subtable survives.
pub(crate) fn read_anchor(
    data: FontData,
    offset: Offset16,
    ctx: &mut DecodeContext,
) -> Result<Option<AnchorTable>, ReadError> {
    let Some(data) = data.resolve_nullable_offset(offset)? else {
        return Ok(None);
    };
    match AnchorTable::read(data) {
        Ok(anchor) => Ok(Some(anchor)),
        Err(ReadError::InvalidFormat(format)) => {
            ctx.unsupported_format(format as u16);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
