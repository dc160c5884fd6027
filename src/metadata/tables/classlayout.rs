//! The `ClassLayout` table (0x0F).

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `ClassLayout` row.
#[derive(Debug, Clone)]
pub struct ClassLayoutRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Field packing alignment.
    pub packing_size: u16,
    /// Total declared size of the type, zero when automatic.
    pub class_size: u32,
    /// 1-based index of the laid-out `TypeDef` row.
    pub parent: u32,
}

impl TableRow for ClassLayoutRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* packing_size */ 2 +
            /* class_size */   4 +
            /* parent */       layout.index_bytes(TableId::TypeDef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(ClassLayoutRaw {
            rid,
            token: Token::from_parts(TableId::ClassLayout, rid),
            offset: *offset,
            packing_size: read_le_at::<u16>(data, offset)?,
            class_size: read_le_at::<u32>(data, offset)?,
            parent: read_le_at_dyn(data, offset, layout.wide_index(TableId::TypeDef))?,
        })
    }
}

/// Linked `ClassLayout` row.
#[derive(Debug, Clone)]
pub struct ClassLayout {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Field packing alignment.
    pub packing_size: u16,
    /// Total declared size of the type.
    pub class_size: u32,
    /// The laid-out type.
    pub parent: Option<RowRef>,
}

impl ClassLayoutRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> ClassLayout {
        ClassLayout {
            rid: self.rid,
            token: self.token,
            packing_size: self.packing_size,
            class_size: self.class_size,
            parent: ctx.row(TableId::TypeDef, self.parent, TableId::ClassLayout, self.rid),
        }
    }
}
