//! The `AssemblyRef` table (0x23).

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, AssemblyFlags, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `AssemblyRef` row.
#[derive(Debug, Clone)]
pub struct AssemblyRefRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Major version of the referenced assembly.
    pub major_version: u16,
    /// Minor version.
    pub minor_version: u16,
    /// Build number.
    pub build_number: u16,
    /// Revision number.
    pub revision_number: u16,
    /// `AssemblyFlags` bitmask.
    pub flags: u32,
    /// `#Blob` index of the public key or its token.
    pub public_key_or_token: u32,
    /// `#Strings` index of the referenced assembly's name.
    pub name: u32,
    /// `#Strings` index of the culture string.
    pub culture: u32,
    /// `#Blob` index of the file hash.
    pub hash_value: u32,
}

impl TableRow for AssemblyRefRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* versions */            8 +
            /* flags */               4 +
            /* public_key_or_token */ layout.blob_bytes() +
            /* name */                layout.str_bytes() +
            /* culture */             layout.str_bytes() +
            /* hash_value */          layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(AssemblyRefRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyRef, rid),
            offset: *offset,
            major_version: read_le_at::<u16>(data, offset)?,
            minor_version: read_le_at::<u16>(data, offset)?,
            build_number: read_le_at::<u16>(data, offset)?,
            revision_number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            public_key_or_token: read_le_at_dyn(data, offset, layout.wide_blobs())?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            culture: read_le_at_dyn(data, offset, layout.wide_strings())?,
            hash_value: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `AssemblyRef` row.
#[derive(Debug, Clone)]
pub struct AssemblyRef {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Major version of the referenced assembly.
    pub major_version: u16,
    /// Minor version.
    pub minor_version: u16,
    /// Build number.
    pub build_number: u16,
    /// Revision number.
    pub revision_number: u16,
    /// Assembly flags.
    pub flags: AssemblyFlags,
    /// Public key or token blob.
    pub public_key_or_token: Option<Vec<u8>>,
    /// Referenced assembly name.
    pub name: Option<String>,
    /// Culture string; empty for culture-neutral references.
    pub culture: Option<String>,
    /// File hash blob.
    pub hash_value: Option<Vec<u8>>,
}

impl AssemblyRefRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> AssemblyRef {
        AssemblyRef {
            rid: self.rid,
            token: self.token,
            major_version: self.major_version,
            minor_version: self.minor_version,
            build_number: self.build_number,
            revision_number: self.revision_number,
            flags: AssemblyFlags::from_bits_retain(self.flags),
            public_key_or_token: ctx.blob(
                self.public_key_or_token,
                TableId::AssemblyRef,
                self.rid,
            ),
            name: ctx.string(self.name, TableId::AssemblyRef, self.rid),
            culture: ctx.string(self.culture, TableId::AssemblyRef, self.rid),
            hash_value: ctx.blob(self.hash_value, TableId::AssemblyRef, self.rid),
        }
    }
}
