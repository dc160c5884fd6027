//! Metadata root and stream directory.
//!
//! The metadata root sits at the RVA named by the CLI header: the
//! `0x424A5342` signature, a length-prefixed version string, and the
//! directory of streams. All directory entries are preserved in file
//! order; when several share a name the facade's shortcut accessors bind
//! to the last occurrence, matching runtime behavior.
//!
//! # Reference
//! - ECMA-335 II.24.2.1

use crate::{
    file::io::{read_le, read_le_at},
    metadata::{
        diagnostics::{DiagnosticContext, DiagnosticSink},
        streams::StreamHeader,
    },
    Error::{InvalidMetadataSignature, TruncatedStructure},
    Result,
};

/// Magic signature of physical metadata (`"BSJB"`).
pub const METADATA_SIGNATURE: u32 = 0x424A_5342;

/// The metadata root header plus the stream directory.
pub struct MetadataRoot {
    /// Signature, `0x424A5342` for a valid root.
    pub signature: u32,
    /// Major version of the metadata format.
    pub major_version: u16,
    /// Minor version of the metadata format.
    pub minor_version: u16,
    /// Reserved, zero in conforming images.
    pub reserved: u32,
    /// Declared byte length of the version-string field (NUL padding
    /// included).
    pub length: u32,
    /// Runtime version string, NUL padding stripped.
    pub version: String,
    /// Reserved flags field.
    pub flags: u16,
    /// Declared number of streams.
    pub stream_count: u16,
    /// Every stream directory entry, in file order; duplicates included.
    pub stream_headers: Vec<StreamHeader>,
}

impl MetadataRoot {
    /// Parse the metadata root from `data` (the full metadata slice).
    ///
    /// Duplicate stream names are reported through `sink` but kept;
    /// a directory entry that cannot be read truncates the directory at
    /// that point with a warning rather than failing the parse, as long
    /// as the fixed header itself was intact.
    ///
    /// # Errors
    /// [`InvalidMetadataSignature`] when the magic does not match;
    /// [`TruncatedStructure`] when the fixed header or the version string
    /// run past the end of `data`.
    pub fn read(data: &[u8], sink: &dyn DiagnosticSink) -> Result<MetadataRoot> {
        if data.len() < 20 {
            return Err(TruncatedStructure("metadata root"));
        }

        let signature = read_le::<u32>(data)?;
        if signature != METADATA_SIGNATURE {
            return Err(InvalidMetadataSignature(signature));
        }

        let mut offset = 12;
        let length = read_le_at::<u32>(data, &mut offset)?;
        let version_end = offset
            .checked_add(length as usize)
            .ok_or(TruncatedStructure("metadata root version string"))?;
        if version_end + 4 > data.len() {
            return Err(TruncatedStructure("metadata root version string"));
        }

        let version: String = data[offset..version_end]
            .iter()
            .take_while(|&&byte| byte != 0)
            .map(|&byte| char::from(byte))
            .collect();
        offset = version_end;

        let flags = read_le_at::<u16>(data, &mut offset)?;
        let stream_count = read_le_at::<u16>(data, &mut offset)?;

        let mut stream_headers = Vec::with_capacity(stream_count as usize);
        for index in 0..stream_count {
            if offset >= data.len() {
                sink.warn(
                    format!(
                        "stream directory ends after {index} of {stream_count} entries"
                    ),
                    DiagnosticContext::none(),
                );
                break;
            }

            let header = match StreamHeader::read(&data[offset..]) {
                Ok(header) => header,
                Err(error) => {
                    sink.warn(
                        format!("stream directory entry {index} unreadable: {error}"),
                        DiagnosticContext::none(),
                    );
                    break;
                }
            };

            if stream_headers
                .iter()
                .any(|existing: &StreamHeader| existing.name == header.name)
            {
                sink.warn(
                    format!("duplicate stream name '{}'", header.name),
                    DiagnosticContext::none(),
                );
            }

            offset += header.entry_size();
            stream_headers.push(header);
        }

        Ok(MetadataRoot {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length,
            version,
            flags,
            stream_count,
            stream_headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::diagnostics::{Diagnostics, NullSink};

    fn crafted_root() -> Vec<u8> {
        #[rustfmt::skip]
        let bytes = vec![
            0x42, 0x53, 0x4A, 0x42,             // signature
            0x01, 0x00,                         // major
            0x01, 0x00,                         // minor
            0x00, 0x00, 0x00, 0x00,             // reserved
            0x0C, 0x00, 0x00, 0x00,             // version length = 12
            b'v', b'4', b'.', b'0', b'.', b'3', b'0', b'3', b'1', b'9', 0x00, 0x00,
            0x00, 0x00,                         // flags
            0x01, 0x00,                         // one stream
            0x6C, 0x00, 0x00, 0x00,             // offset
            0x08, 0x00, 0x00, 0x00,             // size
            0x23, 0x7E, 0x00, 0x00,             // "#~"
        ];
        bytes
    }

    #[test]
    fn crafted() {
        let data = crafted_root();
        let root = MetadataRoot::read(&data, &NullSink).unwrap();

        assert_eq!(root.signature, METADATA_SIGNATURE);
        assert_eq!(root.major_version, 1);
        assert_eq!(root.minor_version, 1);
        assert_eq!(root.length, 12);
        assert_eq!(root.version, "v4.0.30319");
        assert_eq!(root.stream_count, 1);
        assert_eq!(root.stream_headers.len(), 1);
        assert_eq!(root.stream_headers[0].name, "#~");
        assert_eq!(root.stream_headers[0].offset, 0x6C);
    }

    #[test]
    fn invalid_signature() {
        let mut data = crafted_root();
        data[0] = 0xFF;

        assert!(matches!(
            MetadataRoot::read(&data, &NullSink),
            Err(InvalidMetadataSignature(_))
        ));
    }

    #[test]
    fn duplicate_streams_kept_with_warning() {
        #[rustfmt::skip]
        let data = vec![
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            b'v', b'4', 0x00, 0x00,
            0x00, 0x00,
            0x02, 0x00,
            // #Strings at 0x40
            0x40, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            b'#', b'S', b't', b'r', b'i', b'n', b'g', b's', 0x00, 0x00, 0x00, 0x00,
            // duplicate #Strings at 0x50
            0x50, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            b'#', b'S', b't', b'r', b'i', b'n', b'g', b's', 0x00, 0x00, 0x00, 0x00,
        ];

        let diagnostics = Diagnostics::new();
        let root = MetadataRoot::read(&data, &diagnostics).unwrap();

        assert_eq!(root.stream_headers.len(), 2);
        assert_eq!(root.stream_headers[0].offset, 0x40);
        assert_eq!(root.stream_headers[1].offset, 0x50);
        assert_eq!(diagnostics.count(), 1);
        assert!(diagnostics.iter().next().unwrap().message.contains("duplicate"));
    }

    #[test]
    fn truncated_directory_warns() {
        let mut data = crafted_root();
        // Claim a second stream that is not there.
        let count_offset = 28 + 2;
        data[count_offset] = 2;

        let diagnostics = Diagnostics::new();
        let root = MetadataRoot::read(&data, &diagnostics).unwrap();
        assert_eq!(root.stream_headers.len(), 1);
        assert_eq!(diagnostics.count(), 1);
    }
}
