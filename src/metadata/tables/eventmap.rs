//! The `EventMap` table (0x12).
//!
//! Maps a type to the contiguous run of `Event` rows it owns; the
//! `event_list` column follows the same run-list rule as
//! `TypeDef.field_list`.

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `EventMap` row.
#[derive(Debug, Clone)]
pub struct EventMapRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index of the owning `TypeDef` row.
    pub parent: u32,
    /// Start of this type's event run in the `Event` table.
    pub event_list: u32,
}

impl TableRow for EventMapRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* parent */     layout.index_bytes(TableId::TypeDef) +
            /* event_list */ layout.index_bytes(TableId::Event)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(EventMapRaw {
            rid,
            token: Token::from_parts(TableId::EventMap, rid),
            offset: *offset,
            parent: read_le_at_dyn(data, offset, layout.wide_index(TableId::TypeDef))?,
            event_list: read_le_at_dyn(data, offset, layout.wide_index(TableId::Event))?,
        })
    }
}

/// Linked `EventMap` row.
#[derive(Debug, Clone)]
pub struct EventMap {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The owning type.
    pub parent: Option<RowRef>,
    /// The events the type owns, in declaration order.
    pub events: Vec<RowRef>,
}

impl EventMapRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> EventMap {
        let next = ctx.next_row::<EventMapRaw>(self.rid);

        EventMap {
            rid: self.rid,
            token: self.token,
            parent: ctx.row(TableId::TypeDef, self.parent, TableId::EventMap, self.rid),
            events: ctx.run_list(
                TableId::Event,
                self.event_list,
                next.as_ref().map(|row| row.event_list),
                TableId::EventMap,
                self.rid,
            ),
        }
    }
}
