//! The `PropertyPtr` table (0x16).

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `PropertyPtr` row.
#[derive(Debug, Clone)]
pub struct PropertyPtrRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index into the `Property` table.
    pub property: u32,
}

impl TableRow for PropertyPtrRaw {
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(layout.index_bytes(TableId::Property))
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(PropertyPtrRaw {
            rid,
            token: Token::from_parts(TableId::PropertyPtr, rid),
            offset: *offset,
            property: read_le_at_dyn(data, offset, layout.wide_index(TableId::Property))?,
        })
    }
}

/// Linked `PropertyPtr` row.
#[derive(Debug, Clone)]
pub struct PropertyPtr {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The `Property` row this entry forwards to.
    pub property: Option<RowRef>,
}

impl PropertyPtrRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> PropertyPtr {
        PropertyPtr {
            rid: self.rid,
            token: self.token,
            property: ctx.row(TableId::Property, self.property, TableId::PropertyPtr, self.rid),
        }
    }
}
