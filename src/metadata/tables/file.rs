//! The `File` table (0x26): files of a multi-file assembly.

use bitflags::bitflags;

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

bitflags! {
    /// `FileAttributes` (ECMA-335 II.23.1.6).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileAttributes: u32 {
        /// The file is a resource file without metadata.
        const CONTAINS_NO_META_DATA = 0x0001;
    }
}

/// Physical `File` row.
#[derive(Debug, Clone)]
pub struct FileRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `FileAttributes` bitmask.
    pub flags: u32,
    /// `#Strings` index of the file name.
    pub name: u32,
    /// `#Blob` index of the file hash.
    pub hash_value: u32,
}

impl TableRow for FileRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* flags */      4 +
            /* name */       layout.str_bytes() +
            /* hash_value */ layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(FileRaw {
            rid,
            token: Token::from_parts(TableId::File, rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            hash_value: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `File` row.
#[derive(Debug, Clone)]
pub struct File {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// File attributes.
    pub flags: FileAttributes,
    /// File name.
    pub name: Option<String>,
    /// File hash blob.
    pub hash_value: Option<Vec<u8>>,
}

impl FileRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> File {
        File {
            rid: self.rid,
            token: self.token,
            flags: FileAttributes::from_bits_retain(self.flags),
            name: ctx.string(self.name, TableId::File, self.rid),
            hash_value: ctx.blob(self.hash_value, TableId::File, self.rid),
        }
    }
}
