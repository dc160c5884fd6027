//! The `.resources` (resource-set) format.
//!
//! An embedded resource whose payload starts with the `0xBEEFCACE` magic
//! is a serialized resource set: a header naming the reader types, a type
//! table, parallel hash and name-pointer arrays, a name section of
//! UTF-16 names, and a data section of typed values. Entry damage is
//! contained per entry - an unreadable name or value keeps its slot with
//! raw bytes and a warning, so the entry count always matches the header.
//!
//! Layout walked here:
//!
//! ```text
//! u32  magic (0xBEEFCACE)
//! u32  resource-manager header version
//! u32  reader count
//! u32  size of the reader-types blob
//! ...  reader-types blob (CompressedInt-prefixed UTF-8 strings)
//! u32  format version
//! u32  resource count
//! u32  type count
//! ...  type names (CompressedInt-prefixed UTF-8)
//! ...  padding to an 8-byte boundary
//! u32  name hash, resource-count times
//! u32  name position, resource-count times
//! u32  data-section offset (relative to the payload start)
//! ...  name section: per entry a CompressedInt-prefixed UTF-16LE name
//!      followed by a u32 offset into the data section
//! ...  data section: per entry a type tag followed by the typed value
//! ```

use crate::{
    file::parser::Parser,
    metadata::diagnostics::{DiagnosticContext, DiagnosticSink},
    Error::{InvalidResourceSet, UnknownResourceType},
    Result,
};

/// Magic number of a serialized resource set.
pub const RESOURCE_SET_MAGIC: u32 = 0xBEEF_CACE;

/// The `DateTimeKind` carried in bits 62-63 of a serialized
/// `System.DateTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeKind {
    /// Neither UTC nor local.
    Unspecified,
    /// Coordinated universal time.
    Utc,
    /// Local time (the reserved ambiguous-DST encoding maps here too,
    /// as `DateTime.FromBinary` does).
    Local,
}

impl DateTimeKind {
    fn from_bits(bits: u8) -> DateTimeKind {
        match bits & 0x3 {
            0 => DateTimeKind::Unspecified,
            1 => DateTimeKind::Utc,
            _ => DateTimeKind::Local,
        }
    }
}

/// A typed resource value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceValue {
    /// `System.String`, CompressedInt-prefixed UTF-8.
    String(String),
    /// `System.Boolean`, one byte.
    Boolean(bool),
    /// `System.Char`, one UTF-16 code unit.
    Char(char),
    /// `System.Byte`.
    Byte(u8),
    /// `System.SByte`.
    SByte(i8),
    /// `System.Int16`.
    Int16(i16),
    /// `System.UInt16`.
    UInt16(u16),
    /// `System.Int32`.
    Int32(i32),
    /// `System.UInt32`.
    UInt32(u32),
    /// `System.Int64`.
    Int64(i64),
    /// `System.UInt64`.
    UInt64(u64),
    /// `System.Single`.
    Single(f32),
    /// `System.Double`.
    Double(f64),
    /// `System.Decimal` as its four raw 32-bit words.
    Decimal {
        /// Low mantissa word.
        lo: i32,
        /// Middle mantissa word.
        mid: i32,
        /// High mantissa word.
        hi: i32,
        /// Sign (bit 31) and scale (bits 16-23).
        flags: i32,
    },
    /// `System.DateTime`: masked ticks plus the Kind from the top bits.
    DateTime {
        /// 100-nanosecond intervals since 0001-01-01, bits 0-61 of the
        /// stored value.
        ticks: i64,
        /// The `DateTimeKind` from bits 62-63.
        kind: DateTimeKind,
    },
    /// `System.TimeSpan` ticks.
    TimeSpan(i64),
    /// `System.Byte[]`, u32-length-prefixed.
    ByteArray(Vec<u8>),
    /// `System.IO.Stream`, u32-length-prefixed.
    Stream(Vec<u8>),
    /// A type this parser does not interpret; the raw bytes are kept.
    Unknown {
        /// The type-table name, when the tag resolved to one.
        type_name: Option<String>,
        /// The undecoded payload bytes.
        bytes: Vec<u8>,
    },
}

impl ResourceValue {
    /// Decode a value of the named type at the parser's position.
    fn from_type_name(name: &str, parser: &mut Parser) -> Result<ResourceValue> {
        // Type-table names are assembly-qualified; match on the leading
        // type name alone.
        let plain = name.split(',').next().unwrap_or(name).trim();

        Ok(match plain {
            "System.String" => ResourceValue::String(parser.read_compressed_string_utf8()?),
            "System.Boolean" => ResourceValue::Boolean(parser.read_le::<u8>()? != 0),
            "System.Char" => {
                let unit = parser.read_le::<u16>()?;
                ResourceValue::Char(char::from_u32(u32::from(unit)).ok_or_else(|| {
                    decoding_error!("invalid UTF-16 code unit {:#06x} for System.Char", unit)
                })?)
            }
            "System.Byte" => ResourceValue::Byte(parser.read_le::<u8>()?),
            "System.SByte" => ResourceValue::SByte(parser.read_le::<i8>()?),
            "System.Int16" => ResourceValue::Int16(parser.read_le::<i16>()?),
            "System.UInt16" => ResourceValue::UInt16(parser.read_le::<u16>()?),
            "System.Int32" => ResourceValue::Int32(parser.read_le::<i32>()?),
            "System.UInt32" => ResourceValue::UInt32(parser.read_le::<u32>()?),
            "System.Int64" => ResourceValue::Int64(parser.read_le::<i64>()?),
            "System.UInt64" => ResourceValue::UInt64(parser.read_le::<u64>()?),
            "System.Single" => ResourceValue::Single(parser.read_le::<f32>()?),
            "System.Double" => ResourceValue::Double(parser.read_le::<f64>()?),
            "System.Decimal" => ResourceValue::Decimal {
                lo: parser.read_le::<i32>()?,
                mid: parser.read_le::<i32>()?,
                hi: parser.read_le::<i32>()?,
                flags: parser.read_le::<i32>()?,
            },
            "System.DateTime" => {
                let stored = parser.read_le::<i64>()?;
                ResourceValue::DateTime {
                    ticks: stored & 0x3FFF_FFFF_FFFF_FFFF,
                    kind: DateTimeKind::from_bits((stored >> 62) as u8),
                }
            }
            "System.TimeSpan" => ResourceValue::TimeSpan(parser.read_le::<i64>()?),
            "System.Byte[]" | "System.IO.Stream" | "System.IO.MemoryStream" => {
                let length = parser.read_le::<u32>()? as usize;
                let bytes = parser.bytes(length)?.to_vec();
                if plain == "System.Byte[]" {
                    ResourceValue::ByteArray(bytes)
                } else {
                    ResourceValue::Stream(bytes)
                }
            }
            _ => return Err(UnknownResourceType(plain.to_string())),
        })
    }
}

/// The fixed fields of a resource-set header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSetHeader {
    /// The `0xBEEFCACE` magic.
    pub magic: u32,
    /// Resource-manager header version.
    pub header_version: u32,
    /// Declared reader count.
    pub reader_count: u32,
    /// Byte size of the reader-types blob.
    pub reader_types_size: u32,
    /// Format version of the reader section.
    pub version: u32,
    /// Number of entries in the set.
    pub resource_count: u32,
    /// Number of entries in the type table.
    pub type_count: u32,
    /// Offset of the data section relative to the payload start.
    pub data_section_offset: u32,
}

/// One entry of a resource set.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// The type tag read at the entry's data offset, when reachable.
    pub type_tag: Option<u32>,
    /// Pre-computed hash of the entry name.
    pub hash: u32,
    /// Offset of the name within the name section.
    pub name_ptr: u32,
    /// Offset of the value within the data section, when the name record
    /// was readable.
    pub data_offset: Option<u32>,
    /// The decoded entry name.
    pub name: Option<String>,
    /// The decoded value; absent only when even raw recovery failed.
    pub data: Option<ResourceValue>,
}

/// A parsed `.resources` payload.
#[derive(Debug, Clone)]
pub struct ResourceSet {
    /// The fixed header fields.
    pub header: ResourceSetHeader,
    /// Reader type names from the reader-types blob.
    pub reader_types: Vec<String>,
    /// The type table indexed by entry type tags.
    pub types: Vec<String>,
    /// All entries; always `header.resource_count` of them.
    pub entries: Vec<ResourceEntry>,
}

impl ResourceSet {
    /// Parse a resource-set payload.
    ///
    /// # Errors
    /// [`InvalidResourceSet`] when the header or its arrays cannot be
    /// read. Entry-level damage never fails the set; broken entries keep
    /// their slot with a warning through `sink`.
    pub fn parse(data: &[u8], rva: u32, sink: &dyn DiagnosticSink) -> Result<ResourceSet> {
        let mut parser = Parser::new(data);

        let magic = parser
            .read_le::<u32>()
            .map_err(|_| InvalidResourceSet("payload shorter than the magic".into()))?;
        if magic != RESOURCE_SET_MAGIC {
            return Err(InvalidResourceSet(format!(
                "magic {magic:#010x} does not match {RESOURCE_SET_MAGIC:#010x}"
            )));
        }

        let header_version = header_field(&mut parser, "header version")?;
        let reader_count = header_field(&mut parser, "reader count")?;
        let reader_types_size = header_field(&mut parser, "reader-types size")?;

        let reader_blob = parser
            .bytes(reader_types_size as usize)
            .map_err(|_| InvalidResourceSet("reader-types blob truncated".into()))?;
        let reader_types = parse_reader_types(reader_blob, reader_count, rva, sink);

        let version = header_field(&mut parser, "format version")?;
        let resource_count = header_field(&mut parser, "resource count")?;
        let type_count = header_field(&mut parser, "type count")?;

        let mut types = Vec::with_capacity(type_count as usize);
        for index in 0..type_count {
            match parser.read_compressed_string_utf8() {
                Ok(name) => types.push(name),
                Err(error) => {
                    return Err(InvalidResourceSet(format!(
                        "type name {index} unreadable: {error}"
                    )))
                }
            }
        }

        parser
            .align(8)
            .map_err(|_| InvalidResourceSet("padding runs past the payload".into()))?;

        let mut hashes = Vec::with_capacity(resource_count as usize);
        for _ in 0..resource_count {
            hashes.push(header_field(&mut parser, "name hash array")?);
        }
        let mut name_ptrs = Vec::with_capacity(resource_count as usize);
        for _ in 0..resource_count {
            name_ptrs.push(header_field(&mut parser, "name pointer array")?);
        }

        let data_section_offset = header_field(&mut parser, "data-section offset")?;
        let name_section_offset = parser.pos();

        let header = ResourceSetHeader {
            magic,
            header_version,
            reader_count,
            reader_types_size,
            version,
            resource_count,
            type_count,
            data_section_offset,
        };

        let mut entries = Vec::with_capacity(resource_count as usize);
        for index in 0..resource_count as usize {
            entries.push(read_entry(
                data,
                name_section_offset,
                data_section_offset as usize,
                hashes[index],
                name_ptrs[index],
                &types,
                rva,
                sink,
            ));
        }

        Ok(ResourceSet {
            header,
            reader_types,
            types,
            entries,
        })
    }

    /// Look up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResourceEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.as_deref() == Some(name))
    }
}

fn header_field(parser: &mut Parser, what: &str) -> Result<u32> {
    parser
        .read_le::<u32>()
        .map_err(|_| InvalidResourceSet(format!("{what} truncated")))
}

fn parse_reader_types(
    blob: &[u8],
    reader_count: u32,
    rva: u32,
    sink: &dyn DiagnosticSink,
) -> Vec<String> {
    let mut parser = Parser::new(blob);
    let mut readers = Vec::new();

    while parser.has_more_data() && (readers.len() as u32) < reader_count {
        match parser.read_compressed_string_utf8() {
            Ok(name) => readers.push(name),
            Err(error) => {
                sink.warn(
                    format!("reader-types blob unreadable: {error}"),
                    DiagnosticContext::at_rva(rva),
                );
                break;
            }
        }
    }

    readers
}

#[allow(clippy::too_many_arguments)]
fn read_entry(
    data: &[u8],
    name_section_offset: usize,
    data_section_offset: usize,
    hash: u32,
    name_ptr: u32,
    types: &[String],
    rva: u32,
    sink: &dyn DiagnosticSink,
) -> ResourceEntry {
    let mut entry = ResourceEntry {
        type_tag: None,
        hash,
        name_ptr,
        data_offset: None,
        name: None,
        data: None,
    };

    let mut parser = Parser::new(data);

    // Name record: CompressedInt-prefixed UTF-16 name, then the data
    // offset.
    let name_result = parser
        .seek(name_section_offset + name_ptr as usize)
        .and_then(|()| parser.read_compressed_string_utf16());
    match name_result {
        Ok(name) => entry.name = Some(name),
        Err(error) => {
            sink.warn(
                format!("resource entry name unreadable: {error}"),
                DiagnosticContext::at_rva(rva),
            );
            return entry;
        }
    }

    let data_offset = match parser.read_le::<u32>() {
        Ok(offset) => offset,
        Err(error) => {
            sink.warn(
                format!("resource entry data offset unreadable: {error}"),
                DiagnosticContext::at_rva(rva),
            );
            return entry;
        }
    };
    entry.data_offset = Some(data_offset);

    // Value record: type tag, then the typed payload.
    let value_start = data_section_offset + data_offset as usize;
    if parser.seek(value_start).is_err() {
        sink.warn(
            format!("resource entry data offset {data_offset:#x} past the payload"),
            DiagnosticContext::at_rva(rva),
        );
        return entry;
    }

    let type_tag = match parser.read_compressed_uint() {
        Ok(tag) => tag,
        Err(error) => {
            sink.warn(
                format!("resource entry type tag unreadable: {error}"),
                DiagnosticContext::at_rva(rva),
            );
            return entry;
        }
    };
    entry.type_tag = Some(type_tag);

    let type_name = types.get(type_tag as usize);
    let decoded = match type_name {
        Some(name) => ResourceValue::from_type_name(name, &mut parser),
        None => Err(UnknownResourceType(format!(
            "type tag {type_tag} has no type-table entry"
        ))),
    };

    entry.data = Some(match decoded {
        Ok(value) => value,
        Err(error) => {
            sink.warn(
                format!("resource entry not interpreted: {error}"),
                DiagnosticContext::at_rva(rva),
            );
            // Keep the raw bytes: a CompressedInt-prefixed slice when
            // one fits, the rest of the payload otherwise.
            let mut raw_parser = Parser::new(data);
            let bytes = raw_parser
                .seek(value_start)
                .and_then(|()| raw_parser.read_compressed_uint())
                .and_then(|length| raw_parser.bytes(length as usize))
                .map(<[u8]>::to_vec)
                .unwrap_or_else(|_| data[value_start.min(data.len())..].to_vec());

            ResourceValue::Unknown {
                type_name: type_name.cloned(),
                bytes,
            }
        }
    });

    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        file::parser::write_compressed_uint,
        metadata::diagnostics::{Diagnostics, NullSink},
    };

    fn compressed_utf8(text: &str, out: &mut Vec<u8>) {
        write_compressed_uint(text.len() as u32, out).unwrap();
        out.extend_from_slice(text.as_bytes());
    }

    fn compressed_utf16(text: &str, out: &mut Vec<u8>) {
        let units: Vec<u16> = text.encode_utf16().collect();
        write_compressed_uint((units.len() * 2) as u32, out).unwrap();
        for unit in units {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    }

    /// Builds a one-entry set holding a `System.String` value.
    pub(crate) fn crafted_set(name: &str, value: &str) -> Vec<u8> {
        let mut reader_types = Vec::new();
        compressed_utf8("System.Resources.ResourceReader", &mut reader_types);

        let mut data = Vec::new();
        data.extend_from_slice(&RESOURCE_SET_MAGIC.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes()); // header version
        data.extend_from_slice(&1u32.to_le_bytes()); // reader count
        data.extend_from_slice(&(reader_types.len() as u32).to_le_bytes());
        data.extend_from_slice(&reader_types);
        data.extend_from_slice(&2u32.to_le_bytes()); // format version
        data.extend_from_slice(&1u32.to_le_bytes()); // resource count
        data.extend_from_slice(&1u32.to_le_bytes()); // type count
        compressed_utf8("System.String", &mut data);
        while data.len() % 8 != 0 {
            data.push(b'P');
        }
        data.extend_from_slice(&0x1234_5678u32.to_le_bytes()); // hash
        data.extend_from_slice(&0u32.to_le_bytes()); // name position

        // Name section follows the (yet unknown) data-section offset.
        let mut name_section = Vec::new();
        compressed_utf16(name, &mut name_section);
        name_section.extend_from_slice(&0u32.to_le_bytes()); // data offset

        let data_section_offset = data.len() + 4 + name_section.len();
        data.extend_from_slice(&(data_section_offset as u32).to_le_bytes());
        data.extend_from_slice(&name_section);

        data.push(0x00); // type tag 0 -> System.String
        compressed_utf8(value, &mut data);
        data
    }

    #[test]
    fn string_entry() {
        let payload = crafted_set("greeting", "hello");
        let set = ResourceSet::parse(&payload, 0x3000, &NullSink).unwrap();

        assert_eq!(set.header.magic, RESOURCE_SET_MAGIC);
        assert_eq!(set.header.resource_count, 1);
        assert_eq!(set.header.type_count, 1);
        assert_eq!(set.reader_types.len(), 1);
        assert_eq!(set.types, ["System.String"]);
        assert_eq!(set.entries.len(), 1);

        let entry = &set.entries[0];
        assert_eq!(entry.name.as_deref(), Some("greeting"));
        assert_eq!(entry.type_tag, Some(0));
        assert_eq!(entry.data_offset, Some(0));
        assert_eq!(entry.data, Some(ResourceValue::String("hello".into())));

        assert!(set.get("greeting").is_some());
        assert!(set.get("other").is_none());
    }

    #[test]
    fn bad_magic() {
        let data = [0u8; 16];
        assert!(matches!(
            ResourceSet::parse(&data, 0, &NullSink),
            Err(InvalidResourceSet(_))
        ));
    }

    #[test]
    fn datetime_kind_is_exposed() {
        // Kind = Utc (bits 62-63 = 01), ticks = 637_000_000_000_000_000.
        let ticks: i64 = 637_000_000_000_000_000;
        let stored = ticks | (1i64 << 62);

        let mut data = Vec::new();
        data.extend_from_slice(&stored.to_le_bytes());

        let mut parser = Parser::new(&data);
        let value = ResourceValue::from_type_name("System.DateTime", &mut parser).unwrap();

        assert_eq!(
            value,
            ResourceValue::DateTime {
                ticks,
                kind: DateTimeKind::Utc,
            }
        );
    }

    #[test]
    fn unknown_type_keeps_raw_bytes() {
        let mut payload = crafted_set("entry", "xy");
        // Rewrite the type table to a name the parser does not know:
        // same length as "System.String".
        let needle = b"System.String";
        let position = payload
            .windows(needle.len())
            .position(|window| window == needle)
            .unwrap();
        payload[position..position + needle.len()].copy_from_slice(b"Custom.Animal");

        let diagnostics = Diagnostics::new();
        let set = ResourceSet::parse(&payload, 0, &diagnostics).unwrap();

        assert_eq!(set.entries.len(), 1);
        let entry = &set.entries[0];
        match entry.data.as_ref().unwrap() {
            ResourceValue::Unknown { type_name, bytes } => {
                assert_eq!(type_name.as_deref(), Some("Custom.Animal"));
                assert_eq!(bytes, b"xy");
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
        assert!(diagnostics.count() >= 1);
    }
}
