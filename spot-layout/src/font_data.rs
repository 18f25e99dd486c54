//! raw font bytes

use std::ops::{Bound, Range, RangeBounds};

use types::{FixedSize, Offset, Scalar};

use crate::read::{ComputeSize, FontReadWithArgs, ReadError};

/// A reference to raw binary font data.
///
/// This is a wrapper around a byte slice, that provides convenience methods
/// for parsing and validating that data. Every read is bounds checked; a
/// read that would extend past the end of the slice is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontData<'a> {
    bytes: &'a [u8],
}

/// A cursor for sequentially reading the fields of a table.
pub(crate) struct Cursor<'a> {
    pos: usize,
    data: FontData<'a>,
}

impl<'a> FontData<'a> {
    /// Create a new `FontData` with these bytes.
    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData { bytes }
    }

    /// The length of the data, in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if the data has a length of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the data starting at `pos`, or `None` if `pos` is out of bounds.
    pub fn split_off(&self, pos: usize) -> Option<FontData<'a>> {
        self.bytes.get(pos..).map(|bytes| FontData { bytes })
    }

    pub fn slice(&self, range: impl RangeBounds<usize>) -> Option<FontData<'a>> {
        let bounds: (Bound<usize>, Bound<usize>) =
            (range.start_bound().cloned(), range.end_bound().cloned());
        self.bytes.get(bounds).map(|bytes| FontData { bytes })
    }

    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        self.bytes
            .get(offset..offset + T::RAW_BYTE_LEN)
            .and_then(T::read)
            .ok_or(ReadError::OutOfBounds)
    }

    pub fn read_with_args<T>(&self, range: Range<usize>, args: &T::Args) -> Result<T, ReadError>
    where
        T: FontReadWithArgs<'a>,
    {
        self.slice(range)
            .ok_or(ReadError::OutOfBounds)
            .and_then(|data| T::read_with_args(data, args))
    }

    /// Returns the data that a non-null offset points to.
    ///
    /// Offsets are interpreted relative to the start of this data, which
    /// should be the start of the table that declared the offset.
    pub fn resolve_offset<O: Offset>(&self, offset: O) -> Result<FontData<'a>, ReadError> {
        let pos = offset.non_null().ok_or(ReadError::NullOffset)?;
        self.split_off(pos).ok_or(ReadError::OutOfBounds)
    }

    /// Like [`resolve_offset`][Self::resolve_offset], but a null offset
    /// resolves to `None`.
    pub fn resolve_nullable_offset<O: Offset>(
        &self,
        offset: O,
    ) -> Result<Option<FontData<'a>>, ReadError> {
        match offset.non_null() {
            None => Ok(None),
            Some(pos) => self.split_off(pos).ok_or(ReadError::OutOfBounds).map(Some),
        }
    }

    pub(crate) fn cursor(&self) -> Cursor<'a> {
        Cursor {
            pos: 0,
            data: *self,
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> Cursor<'a> {
    pub(crate) fn advance_by(&mut self, n_bytes: usize) {
        self.pos += n_bytes;
    }

    pub(crate) fn read<T: Scalar>(&mut self) -> Result<T, ReadError> {
        let temp = self.data.read_at(self.pos);
        self.pos += T::RAW_BYTE_LEN;
        temp
    }

    pub(crate) fn read_with_args<T>(&mut self, args: &T::Args) -> Result<T, ReadError>
    where
        T: FontReadWithArgs<'a> + ComputeSize,
    {
        let len = T::compute_size(args)?;
        let temp = self.data.read_with_args(self.pos..self.pos + len, args);
        self.pos += len;
        temp
    }

    /// Read `len` scalars into a vec.
    pub(crate) fn read_array<T: Scalar>(&mut self, len: usize) -> Result<Vec<T>, ReadError> {
        let byte_len = len * T::RAW_BYTE_LEN;
        // check the whole range first, so a bogus count fails before allocating
        self.data
            .slice(self.pos..self.pos + byte_len)
            .ok_or(ReadError::OutOfBounds)?;
        (0..len).map(|_| self.read()).collect()
    }

    /// Read `len` records that each need `args`.
    pub(crate) fn read_array_with_args<T>(
        &mut self,
        len: usize,
        args: &T::Args,
    ) -> Result<Vec<T>, ReadError>
    where
        T: FontReadWithArgs<'a> + ComputeSize,
    {
        let byte_len = len * T::compute_size(args)?;
        self.data
            .slice(self.pos..self.pos + byte_len)
            .ok_or(ReadError::OutOfBounds)?;
        (0..len).map(|_| self.read_with_args(args)).collect()
    }

    /// Read `len` records with the provided function.
    pub(crate) fn read_records<T>(
        &mut self,
        len: usize,
        mut read: impl FnMut(&mut Cursor<'a>) -> Result<T, ReadError>,
    ) -> Result<Vec<T>, ReadError> {
        (0..len).map(|_| read(self)).collect()
    }
}

impl AsRef<[u8]> for FontData<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for FontData<'a> {
    fn from(src: &'a [u8]) -> FontData<'a> {
        FontData::new(src)
    }
}

#[cfg(test)]
mod tests {
    use types::Offset16;

    use super::*;

    #[test]
    fn reads_are_bounds_checked() {
        let data = FontData::new(&[0, 1, 0, 2, 0xFF]);
        assert_eq!(data.read_at::<u16>(2).unwrap(), 2);
        assert!(matches!(data.read_at::<u16>(4), Err(ReadError::OutOfBounds)));
        assert!(matches!(data.read_at::<u32>(2), Err(ReadError::OutOfBounds)));
    }

    #[test]
    fn cursor_arrays() {
        let data = FontData::new(&[0, 1, 0, 2, 0, 3]);
        let mut cursor = data.cursor();
        assert_eq!(cursor.read_array::<u16>(2).unwrap(), vec![1, 2]);
        assert!(cursor.read_array::<u16>(2).is_err());
        // a failed array read does not consume anything
        assert_eq!(cursor.read::<u16>().unwrap(), 3);
    }

    #[test]
    fn resolve_offsets() {
        let data = FontData::new(&[0, 0, 0, 4, 0xAB, 0xCD]);
        assert!(matches!(
            data.resolve_offset(Offset16::null()),
            Err(ReadError::NullOffset)
        ));
        assert!(data
            .resolve_nullable_offset(Offset16::null())
            .unwrap()
            .is_none());
        let child = data.resolve_offset(Offset16::new(4)).unwrap();
        assert_eq!(child.as_bytes(), &[0xAB, 0xCD]);
        assert!(matches!(
            data.resolve_offset(Offset16::new(40)),
            Err(ReadError::OutOfBounds)
        ));
    }
}
