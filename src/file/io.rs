//! Bounds-checked little-endian reads from byte slices.
//!
//! All metadata structures in a CLI image are little-endian. The helpers
//! here are the lowest layer of the decoder; everything that walks raw
//! bytes goes through them so out-of-range reads surface as
//! [`Error::TruncatedStructure`](crate::Error::TruncatedStructure) instead
//! of panics.

use crate::{Error::TruncatedStructure, Result};

/// Primitive types that can be assembled from little-endian bytes.
pub trait LeRead: Sized {
    /// The fixed-size byte array backing this type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Build the value from little-endian bytes.
    fn from_le(bytes: Self::Bytes) -> Self;
}

macro_rules! le_read {
    ($($ty:ty),+) => {
        $(
            impl LeRead for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )+
    };
}

le_read!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Read a `T` from the start of `data`.
pub fn read_le<T: LeRead>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a `T` at `offset`, advancing the offset by the bytes consumed.
pub fn read_le_at<T: LeRead>(data: &[u8], offset: &mut usize) -> Result<T> {
    let width = std::mem::size_of::<T>();
    let end = offset
        .checked_add(width)
        .ok_or(TruncatedStructure("offset overflow"))?;
    if end > data.len() {
        return Err(TruncatedStructure("unexpected end of data"));
    }

    let Ok(bytes) = data[*offset..end].try_into() else {
        return Err(TruncatedStructure("unexpected end of data"));
    };

    *offset = end;
    Ok(T::from_le(bytes))
}

/// Read a 2- or 4-byte index column, widening to `u32`.
///
/// Metadata index columns grow from 2 to 4 bytes when the indexed heap or
/// table crosses the 16-bit boundary; `wide` carries that decision.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, wide: bool) -> Result<u32> {
    if wide {
        read_le_at::<u32>(data, offset)
    } else {
        Ok(u32::from(read_le_at::<u16>(data, offset)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn scalar_widths() {
        assert_eq!(read_le::<u8>(&BUFFER).unwrap(), 0x01);
        assert_eq!(read_le::<u16>(&BUFFER).unwrap(), 0x0201);
        assert_eq!(read_le::<u32>(&BUFFER).unwrap(), 0x0403_0201);
        assert_eq!(read_le::<u64>(&BUFFER).unwrap(), 0x0807_0605_0403_0201);
        assert_eq!(read_le::<i16>(&BUFFER).unwrap(), 0x0201);
    }

    #[test]
    fn offset_advances() {
        let mut offset = 2;
        assert_eq!(read_le_at::<u16>(&BUFFER, &mut offset).unwrap(), 0x0403);
        assert_eq!(offset, 4);
    }

    #[test]
    fn dyn_widths() {
        let mut offset = 0;
        assert_eq!(read_le_at_dyn(&BUFFER, &mut offset, true).unwrap(), 0x0403_0201);

        offset = 0;
        assert_eq!(read_le_at_dyn(&BUFFER, &mut offset, false).unwrap(), 0x0201);
    }

    #[test]
    fn truncation() {
        let short = [0xFF, 0xFF];
        assert!(matches!(
            read_le::<u32>(&short),
            Err(TruncatedStructure(_))
        ));

        let mut offset = 7;
        assert!(read_le_at::<u16>(&BUFFER, &mut offset).is_err());
        assert_eq!(offset, 7);
    }
}
