//! The `FieldPtr` table (0x03), an indirection layer between `TypeDef`
//! field runs and the `Field` table in uncompressed (`#-`) streams.

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `FieldPtr` row.
#[derive(Debug, Clone)]
pub struct FieldPtrRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index into the `Field` table.
    pub field: u32,
}

impl TableRow for FieldPtrRaw {
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(layout.index_bytes(TableId::Field))
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(FieldPtrRaw {
            rid,
            token: Token::from_parts(TableId::FieldPtr, rid),
            offset: *offset,
            field: read_le_at_dyn(data, offset, layout.wide_index(TableId::Field))?,
        })
    }
}

/// Linked `FieldPtr` row.
#[derive(Debug, Clone)]
pub struct FieldPtr {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The `Field` row this entry forwards to.
    pub field: Option<RowRef>,
}

impl FieldPtrRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> FieldPtr {
        FieldPtr {
            rid: self.rid,
            token: self.token,
            field: ctx.row(TableId::Field, self.field, TableId::FieldPtr, self.rid),
        }
    }
}
