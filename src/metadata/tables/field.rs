//! The `Field` table (0x04).

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `Field` row.
#[derive(Debug, Clone)]
pub struct FieldRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `FieldAttributes` bitmask.
    pub flags: u16,
    /// `#Strings` index of the field name.
    pub name: u32,
    /// `#Blob` index of the field signature.
    pub signature: u32,
}

impl TableRow for FieldRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* flags */     2 +
            /* name */      layout.str_bytes() +
            /* signature */ layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(FieldRaw {
            rid,
            token: Token::from_parts(TableId::Field, rid),
            offset: *offset,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            signature: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `Field` row.
#[derive(Debug, Clone)]
pub struct Field {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// `FieldAttributes` bitmask.
    pub flags: u16,
    /// Field name.
    pub name: Option<String>,
    /// Field signature blob.
    pub signature: Option<Vec<u8>>,
}

impl FieldRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> Field {
        Field {
            rid: self.rid,
            token: self.token,
            flags: self.flags,
            name: ctx.string(self.name, TableId::Field, self.rid),
            signature: ctx.blob(self.signature, TableId::Field, self.rid),
        }
    }
}
