//! The `MethodPtr` table (0x05), the method counterpart of `FieldPtr`.

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `MethodPtr` row.
#[derive(Debug, Clone)]
pub struct MethodPtrRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index into the `MethodDef` table.
    pub method: u32,
}

impl TableRow for MethodPtrRaw {
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(layout.index_bytes(TableId::MethodDef))
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(MethodPtrRaw {
            rid,
            token: Token::from_parts(TableId::MethodPtr, rid),
            offset: *offset,
            method: read_le_at_dyn(data, offset, layout.wide_index(TableId::MethodDef))?,
        })
    }
}

/// Linked `MethodPtr` row.
#[derive(Debug, Clone)]
pub struct MethodPtr {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The `MethodDef` row this entry forwards to.
    pub method: Option<RowRef>,
}

impl MethodPtrRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> MethodPtr {
        MethodPtr {
            rid: self.rid,
            token: self.token,
            method: ctx.row(TableId::MethodDef, self.method, TableId::MethodPtr, self.rid),
        }
    }
}
