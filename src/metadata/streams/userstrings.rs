//! The `#US` (user strings) heap.
//!
//! String literals referenced by `ldstr`. Each entry is a CompressedInt
//! byte count followed by UTF-16LE code units; when the count is odd the
//! final byte is a flag indicating whether the string needs handling
//! beyond 8-bit character sets.
//!
//! # Reference
//! - ECMA-335 II.24.2.4

use widestring::U16String;

use crate::{
    file::parser::Parser,
    metadata::streams::HeapItem,
    Error::{HeapIndexOutOfRange, TruncatedStructure},
    Result,
};

/// A decoded `#US` entry: the string plus its trailing flag byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserString {
    /// The decoded UTF-16 string.
    pub value: String,
    /// The trailing flag byte, present when the entry length is odd.
    /// Non-zero means the string contains characters outside the basic
    /// 8-bit range.
    pub flag: Option<u8>,
}

/// The `#US` heap.
///
/// ```rust
/// use dotmeta::metadata::streams::UserStringsHeap;
///
/// let data = [0x00, 0x05, b'H', 0x00, b'i', 0x00, 0x00];
/// let heap = UserStringsHeap::from(&data, 0x2000);
/// let item = heap.get(1).unwrap();
/// assert_eq!(item.value.value, "Hi");
/// assert_eq!(item.value.flag, Some(0));
/// ```
pub struct UserStringsHeap<'a> {
    data: &'a [u8],
    rva: u32,
}

impl<'a> UserStringsHeap<'a> {
    /// Wrap a `#US` stream located at `rva`.
    #[must_use]
    pub fn from(data: &'a [u8], rva: u32) -> UserStringsHeap<'a> {
        UserStringsHeap { data, rva }
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Look up the user string at `index`, absent on any failure.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<HeapItem<'a, UserString>> {
        self.try_get(index).ok()
    }

    /// Look up the user string at `index`, reporting the failure kind.
    ///
    /// # Errors
    /// [`HeapIndexOutOfRange`] when the index or the declared length run
    /// past the heap; [`crate::Error::InvalidCompressedInt`] for a bad
    /// length prefix; a decoding error for invalid UTF-16.
    pub fn try_get(&self, index: usize) -> Result<HeapItem<'a, UserString>> {
        if index >= self.data.len() {
            return Err(HeapIndexOutOfRange { heap: "#US", index });
        }

        let mut parser = Parser::new(self.data);
        parser.seek(index)?;
        let length = parser.read_compressed_uint()? as usize;

        let payload_offset = parser.pos();
        let raw = match parser.bytes(length) {
            Ok(raw) => raw,
            Err(TruncatedStructure(_)) => {
                return Err(HeapIndexOutOfRange { heap: "#US", index })
            }
            Err(error) => return Err(error),
        };

        let (string_bytes, flag) = if length % 2 == 1 {
            (&raw[..length - 1], Some(raw[length - 1]))
        } else {
            (raw, None)
        };

        let units: Vec<u16> = string_bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let value = U16String::from_vec(units)
            .to_string()
            .map_err(|_| decoding_error!("invalid UTF-16 at #US offset {:#x}", index))?;

        Ok(HeapItem {
            raw,
            value: UserString { value, flag },
            rva: self.rva + payload_offset as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = [
            0x00,
            0x1B, // 27 bytes: 13 UTF-16 units + flag
            0x48, 0x00, 0x65, 0x00, 0x6C, 0x00, 0x6C, 0x00, 0x6F, 0x00, 0x2C, 0x00,
            0x20, 0x00, 0x57, 0x00, 0x6F, 0x00, 0x72, 0x00, 0x6C, 0x00, 0x64, 0x00,
            0x21, 0x00,
            0x00, // flag byte
        ];

        let heap = UserStringsHeap::from(&data, 0x3000);
        let item = heap.get(1).unwrap();

        assert_eq!(item.value.value, "Hello, World!");
        assert_eq!(item.value.flag, Some(0));
        assert_eq!(item.raw.len(), 27);
        assert_eq!(item.rva, 0x3002);
    }

    #[test]
    fn even_length_has_no_flag() {
        let data = [0x00, 0x04, b'H', 0x00, b'i', 0x00];
        let heap = UserStringsHeap::from(&data, 0);

        let item = heap.get(1).unwrap();
        assert_eq!(item.value.value, "Hi");
        assert_eq!(item.value.flag, None);
    }

    #[test]
    fn overlong_entry_is_absent() {
        // Declared length 0x20 but only five bytes remain.
        let data = [0x00, 0x20, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC];
        let heap = UserStringsHeap::from(&data, 0);

        assert!(heap.get(1).is_none());
        assert!(matches!(
            heap.try_get(1),
            Err(HeapIndexOutOfRange { heap: "#US", .. })
        ));
    }

    #[test]
    fn out_of_range_is_absent() {
        let data = [0x00, 0x00];
        let heap = UserStringsHeap::from(&data, 0);
        assert!(heap.get(100).is_none());
    }
}
