//! The `FieldLayout` table (0x10).

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `FieldLayout` row.
#[derive(Debug, Clone)]
pub struct FieldLayoutRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Byte offset of the field within its type.
    pub field_offset: u32,
    /// 1-based index of the positioned `Field` row.
    pub field: u32,
}

impl TableRow for FieldLayoutRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* field_offset */ 4 +
            /* field */        layout.index_bytes(TableId::Field)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(FieldLayoutRaw {
            rid,
            token: Token::from_parts(TableId::FieldLayout, rid),
            offset: *offset,
            field_offset: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, layout.wide_index(TableId::Field))?,
        })
    }
}

/// Linked `FieldLayout` row.
#[derive(Debug, Clone)]
pub struct FieldLayout {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the field within its type.
    pub field_offset: u32,
    /// The positioned field.
    pub field: Option<RowRef>,
}

impl FieldLayoutRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> FieldLayout {
        FieldLayout {
            rid: self.rid,
            token: self.token,
            field_offset: self.field_offset,
            field: ctx.row(TableId::Field, self.field, TableId::FieldLayout, self.rid),
        }
    }
}
