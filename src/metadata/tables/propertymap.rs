//! The `PropertyMap` table (0x15).
//!
//! The property counterpart of `EventMap`, with the same run-list rule.

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `PropertyMap` row.
#[derive(Debug, Clone)]
pub struct PropertyMapRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index of the owning `TypeDef` row.
    pub parent: u32,
    /// Start of this type's property run in the `Property` table.
    pub property_list: u32,
}

impl TableRow for PropertyMapRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* parent */        layout.index_bytes(TableId::TypeDef) +
            /* property_list */ layout.index_bytes(TableId::Property)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(PropertyMapRaw {
            rid,
            token: Token::from_parts(TableId::PropertyMap, rid),
            offset: *offset,
            parent: read_le_at_dyn(data, offset, layout.wide_index(TableId::TypeDef))?,
            property_list: read_le_at_dyn(data, offset, layout.wide_index(TableId::Property))?,
        })
    }
}

/// Linked `PropertyMap` row.
#[derive(Debug, Clone)]
pub struct PropertyMap {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The owning type.
    pub parent: Option<RowRef>,
    /// The properties the type owns, in declaration order.
    pub properties: Vec<RowRef>,
}

impl PropertyMapRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> PropertyMap {
        let next = ctx.next_row::<PropertyMapRaw>(self.rid);

        PropertyMap {
            rid: self.rid,
            token: self.token,
            parent: ctx.row(TableId::TypeDef, self.parent, TableId::PropertyMap, self.rid),
            properties: ctx.run_list(
                TableId::Property,
                self.property_list,
                next.as_ref().map(|row| row.property_list),
                TableId::PropertyMap,
                self.rid,
            ),
        }
    }
}
