//! The `EventPtr` table (0x13).

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `EventPtr` row.
#[derive(Debug, Clone)]
pub struct EventPtrRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index into the `Event` table.
    pub event: u32,
}

impl TableRow for EventPtrRaw {
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(layout.index_bytes(TableId::Event))
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(EventPtrRaw {
            rid,
            token: Token::from_parts(TableId::EventPtr, rid),
            offset: *offset,
            event: read_le_at_dyn(data, offset, layout.wide_index(TableId::Event))?,
        })
    }
}

/// Linked `EventPtr` row.
#[derive(Debug, Clone)]
pub struct EventPtr {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The `Event` row this entry forwards to.
    pub event: Option<RowRef>,
}

impl EventPtrRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> EventPtr {
        EventPtr {
            rid: self.rid,
            token: self.token,
            event: ctx.row(TableId::Event, self.event, TableId::EventPtr, self.rid),
        }
    }
}
