//! The `Event` table (0x14).

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{
            linker::LinkContext, CodedIndex, CodedIndexKind, RowRef, TableId, TableLayout,
            TableRow,
        },
        token::Token,
    },
    Result,
};

/// Physical `Event` row.
#[derive(Debug, Clone)]
pub struct EventRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `EventAttributes` bitmask.
    pub event_flags: u16,
    /// `#Strings` index of the event name.
    pub name: u32,
    /// `TypeDefOrRef` coded index of the event's delegate type.
    pub event_type: CodedIndex,
}

impl TableRow for EventRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* event_flags */ 2 +
            /* name */        layout.str_bytes() +
            /* event_type */  layout.coded_bytes(CodedIndexKind::TypeDefOrRef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(EventRaw {
            rid,
            token: Token::from_parts(TableId::Event, rid),
            offset: *offset,
            event_flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            event_type: CodedIndex::read(data, offset, layout, CodedIndexKind::TypeDefOrRef)?,
        })
    }
}

/// Linked `Event` row.
#[derive(Debug, Clone)]
pub struct Event {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// `EventAttributes` bitmask.
    pub event_flags: u16,
    /// Event name.
    pub name: Option<String>,
    /// The event's delegate type.
    pub event_type: Option<RowRef>,
}

impl EventRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> Event {
        Event {
            rid: self.rid,
            token: self.token,
            event_flags: self.event_flags,
            name: ctx.string(self.name, TableId::Event, self.rid),
            event_type: ctx.coded(&self.event_type, TableId::Event, self.rid),
        }
    }
}
