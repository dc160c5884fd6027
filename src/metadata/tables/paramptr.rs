//! The `ParamPtr` table (0x07), the parameter counterpart of `FieldPtr`.

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `ParamPtr` row.
#[derive(Debug, Clone)]
pub struct ParamPtrRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index into the `Param` table.
    pub param: u32,
}

impl TableRow for ParamPtrRaw {
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(layout.index_bytes(TableId::Param))
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(ParamPtrRaw {
            rid,
            token: Token::from_parts(TableId::ParamPtr, rid),
            offset: *offset,
            param: read_le_at_dyn(data, offset, layout.wide_index(TableId::Param))?,
        })
    }
}

/// Linked `ParamPtr` row.
#[derive(Debug, Clone)]
pub struct ParamPtr {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The `Param` row this entry forwards to.
    pub param: Option<RowRef>,
}

impl ParamPtrRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> ParamPtr {
        ParamPtr {
            rid: self.rid,
            token: self.token,
            param: ctx.row(TableId::Param, self.param, TableId::ParamPtr, self.rid),
        }
    }
}
