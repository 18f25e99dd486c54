use std::fmt::{Debug, Display, Formatter};

/// An OpenType tag.
///
/// [In OpenType][data-types], a tag is a 4-byte array where each byte is in the
/// printable ASCII range `(0x20..=0x7E)`.
///
/// We do not enforce this constraint, since script, language and feature
/// tags read from real fonts are not always well-formed and still need to be
/// reported.
///
/// [data-types]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#data-types
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag([u8; 4]);

impl Tag {
    /// Construct a `Tag` from raw bytes.
    pub const fn new(src: &[u8; 4]) -> Tag {
        Tag(*src)
    }

    /// Construct a tag from a string of up to four bytes, padding with spaces.
    ///
    /// Returns `None` if the input is empty or longer than four bytes.
    pub fn from_str_padded(src: &str) -> Option<Tag> {
        let bytes = src.as_bytes();
        if bytes.is_empty() || bytes.len() > 4 {
            return None;
        }
        let mut raw = [b' '; 4];
        raw[..bytes.len()].copy_from_slice(bytes);
        Some(Tag(raw))
    }

    /// Return the raw byte array representing this tag.
    pub const fn to_raw(self) -> [u8; 4] {
        self.0
    }

    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            if (0x20..=0x7E).contains(&byte) {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "{{0x{byte:02X}}}")?;
            }
        }
        Ok(())
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl PartialEq<&[u8; 4]> for Tag {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

impl crate::raw::Scalar for Tag {
    type Raw = [u8; 4];

    fn from_raw(raw: [u8; 4]) -> Self {
        Tag(raw)
    }

    fn to_raw(self) -> [u8; 4] {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded() {
        assert_eq!(Tag::from_str_padded("cv1"), Some(Tag::new(b"cv1 ")));
        assert_eq!(Tag::from_str_padded("liga"), Some(Tag::new(b"liga")));
        assert!(Tag::from_str_padded("").is_none());
        assert!(Tag::from_str_padded("ligature").is_none());
    }

    #[test]
    fn display_escapes_unprintable() {
        assert_eq!(Tag::new(b"GSUB").to_string(), "GSUB");
        assert_eq!(Tag::new(&[b'a', 0, b'c', b'd']).to_string(), "a{0x00}cd");
        assert_eq!(format!("{:?}", Tag::new(b"kern")), "Tag(kern)");
    }
}
