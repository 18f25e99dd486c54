//! small utilities for building big-endian test inputs

use std::collections::HashMap;

use spot_types::Scalar;

/// A convenience type for generating a buffer of big-endian bytes.
///
/// Locations can be tagged while pushing, so that offsets which are only
/// known once a child table has been appended can be patched afterwards
/// with [`write_at`][Self::write_at].
#[derive(Debug, Clone, Default)]
pub struct BeBuffer {
    data: Vec<u8>,
    tagged_locations: HashMap<String, usize>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// The current length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer contains zero bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return a reference to the contents of the buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        self.data.extend(item.to_raw().as_ref());
        self
    }

    pub fn push_with_tag(mut self, item: impl Scalar, tag: &str) -> Self {
        self.tagged_locations
            .insert(tag.to_string(), self.data.len());
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            self.data.extend(item.to_raw().as_ref());
        }
        self
    }

    /// Append raw bytes, typically an already assembled child table.
    pub fn append(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn offset_for(&self, tag: &str) -> usize {
        // panic on unrecognized tags
        self.tagged_locations.get(tag).copied().unwrap()
    }

    fn data_for(&mut self, tag: &str) -> &mut [u8] {
        let offset = self.offset_for(tag);
        &mut self.data[offset..]
    }

    pub fn write_at(&mut self, tag: &str, item: impl Scalar) {
        let data = self.data_for(tag);
        let raw = item.to_raw();
        let new_data: &[u8] = raw.as_ref();

        if data.len() < new_data.len() {
            panic!("not enough room left in buffer for the requested write.");
        }

        for (left, right) in data.iter_mut().zip(new_data) {
            *left = *right
        }
    }

    /// Append `child`, and point the 16-bit offset at `tag` to it.
    ///
    /// The offset is computed relative to `base`, the position in this
    /// buffer of the table that declares the offset.
    pub fn append_child16(mut self, tag: &str, base: usize, child: &[u8]) -> Self {
        let offset = u16::try_from(self.data.len() - base).unwrap();
        self.write_at(tag, offset);
        self.append(child)
    }

    /// Like [`append_child16`][Self::append_child16], for 32-bit offsets.
    pub fn append_child32(mut self, tag: &str, base: usize, child: &[u8]) -> Self {
        let offset = u32::try_from(self.data.len() - base).unwrap();
        self.write_at(tag, offset);
        self.append(child)
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_offsets() {
        let buf = BeBuffer::new()
            .push(1u16)
            .push_with_tag(0u16, "child")
            .append_child16("child", 0, &[0xAB, 0xCD]);
        assert_eq!(buf.as_slice(), &[0, 1, 0, 4, 0xAB, 0xCD]);
    }
}
