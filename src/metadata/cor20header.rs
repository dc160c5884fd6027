//! The CLI header (`IMAGE_COR20_HEADER`).
//!
//! The COM descriptor data directory of a .NET PE points at this 72-byte
//! structure, which in turn locates the metadata root, the manifest
//! resource blob and the strong-name signature.
//!
//! # Reference
//! - ECMA-335 II.25.3.3

use crate::{file::parser::Parser, Error::TruncatedStructure, Result};

/// The fixed-size CLI header at the start of the CLR runtime directory.
///
/// Fields are read verbatim; reserved fields and flag bits are not
/// validated so that slightly-malformed images still load.
pub struct CliHeader {
    /// Size of this header in bytes, nominally 72.
    pub cb: u32,
    /// Minimum runtime major version required to run the image.
    pub major_runtime_version: u16,
    /// Minimum runtime minor version.
    pub minor_runtime_version: u16,
    /// RVA of the metadata root.
    pub meta_data_rva: u32,
    /// Size of the metadata in bytes.
    pub meta_data_size: u32,
    /// Runtime flags (`COMIMAGE_FLAGS_*`).
    pub flags: u32,
    /// `MethodDef` or `File` token of the entry point, or a native RVA.
    pub entry_point_token: u32,
    /// RVA of the manifest resource blob.
    pub resource_rva: u32,
    /// Size of the manifest resource blob.
    pub resource_size: u32,
    /// RVA of the strong-name signature hash.
    pub strong_name_signature_rva: u32,
    /// Size of the strong-name signature hash.
    pub strong_name_signature_size: u32,
    /// Reserved, zero in conforming images.
    pub code_manager_table_rva: u32,
    /// Reserved, zero in conforming images.
    pub code_manager_table_size: u32,
    /// RVA of the vtable fixup array.
    pub vtable_fixups_rva: u32,
    /// Size of the vtable fixup array.
    pub vtable_fixups_size: u32,
    /// Reserved, zero in conforming images.
    pub export_address_table_jmp_rva: u32,
    /// Reserved, zero in conforming images.
    pub export_address_table_jmp_size: u32,
    /// Reserved, zero in conforming images.
    pub managed_native_header_rva: u32,
    /// Reserved, zero in conforming images.
    pub managed_native_header_size: u32,
}

impl CliHeader {
    /// Read a `CliHeader` from the start of `data`.
    ///
    /// # Errors
    /// Fails with [`TruncatedStructure`] when fewer than 72 bytes are
    /// available. No other validation is performed.
    pub fn read(data: &[u8]) -> Result<CliHeader> {
        if data.len() < 72 {
            return Err(TruncatedStructure("CLI header"));
        }

        let mut parser = Parser::new(data);

        Ok(CliHeader {
            cb: parser.read_le::<u32>()?,
            major_runtime_version: parser.read_le::<u16>()?,
            minor_runtime_version: parser.read_le::<u16>()?,
            meta_data_rva: parser.read_le::<u32>()?,
            meta_data_size: parser.read_le::<u32>()?,
            flags: parser.read_le::<u32>()?,
            entry_point_token: parser.read_le::<u32>()?,
            resource_rva: parser.read_le::<u32>()?,
            resource_size: parser.read_le::<u32>()?,
            strong_name_signature_rva: parser.read_le::<u32>()?,
            strong_name_signature_size: parser.read_le::<u32>()?,
            code_manager_table_rva: parser.read_le::<u32>()?,
            code_manager_table_size: parser.read_le::<u32>()?,
            vtable_fixups_rva: parser.read_le::<u32>()?,
            vtable_fixups_size: parser.read_le::<u32>()?,
            export_address_table_jmp_rva: parser.read_le::<u32>()?,
            export_address_table_jmp_size: parser.read_le::<u32>()?,
            managed_native_header_rva: parser.read_le::<u32>()?,
            managed_native_header_size: parser.read_le::<u32>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x48, 0x00, 0x00, 0x00, // cb = 72
            0x02, 0x00,             // major_runtime_version = 2
            0x05, 0x00,             // minor_runtime_version = 5
            0x00, 0x20, 0x00, 0x00, // meta_data_rva = 0x2000
            0x00, 0x10, 0x00, 0x00, // meta_data_size = 0x1000
            0x01, 0x00, 0x00, 0x00, // flags = ILONLY
            0x01, 0x00, 0x00, 0x06, // entry_point_token = 0x06000001
            0x00, 0x30, 0x00, 0x00, // resource_rva = 0x3000
            0x80, 0x00, 0x00, 0x00, // resource_size = 0x80
            0x00, 0x00, 0x00, 0x00, // strong_name_signature_rva
            0x00, 0x00, 0x00, 0x00, // strong_name_signature_size
            0x00, 0x00, 0x00, 0x00, // code_manager_table_rva
            0x00, 0x00, 0x00, 0x00, // code_manager_table_size
            0x00, 0x00, 0x00, 0x00, // vtable_fixups_rva
            0x00, 0x00, 0x00, 0x00, // vtable_fixups_size
            0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_rva
            0x00, 0x00, 0x00, 0x00, // export_address_table_jmp_size
            0x00, 0x00, 0x00, 0x00, // managed_native_header_rva
            0x00, 0x00, 0x00, 0x00, // managed_native_header_size
        ];

        let header = CliHeader::read(&header_bytes).unwrap();
        assert_eq!(header.cb, 72);
        assert_eq!(header.major_runtime_version, 2);
        assert_eq!(header.minor_runtime_version, 5);
        assert_eq!(header.meta_data_rva, 0x2000);
        assert_eq!(header.meta_data_size, 0x1000);
        assert_eq!(header.flags, 1);
        assert_eq!(header.entry_point_token, 0x0600_0001);
        assert_eq!(header.resource_rva, 0x3000);
        assert_eq!(header.resource_size, 0x80);
    }

    #[test]
    fn truncated() {
        let short = [0u8; 40];
        assert!(matches!(
            CliHeader::read(&short),
            Err(TruncatedStructure("CLI header"))
        ));
    }
}
