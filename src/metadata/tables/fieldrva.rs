//! The `FieldRVA` table (0x1D).

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `FieldRVA` row.
#[derive(Debug, Clone)]
pub struct FieldRvaRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// RVA of the field's initial data.
    pub rva: u32,
    /// 1-based index of the `Field` row.
    pub field: u32,
}

impl TableRow for FieldRvaRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* rva */   4 +
            /* field */ layout.index_bytes(TableId::Field)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(FieldRvaRaw {
            rid,
            token: Token::from_parts(TableId::FieldRva, rid),
            offset: *offset,
            rva: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, layout.wide_index(TableId::Field))?,
        })
    }
}

/// Linked `FieldRVA` row.
#[derive(Debug, Clone)]
pub struct FieldRva {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// RVA of the field's initial data.
    pub rva: u32,
    /// The initialized field.
    pub field: Option<RowRef>,
}

impl FieldRvaRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> FieldRva {
        FieldRva {
            rid: self.rid,
            token: self.token,
            rva: self.rva,
            field: ctx.row(TableId::Field, self.field, TableId::FieldRva, self.rid),
        }
    }
}
