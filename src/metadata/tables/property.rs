//! The `Property` table (0x17).

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `Property` row.
#[derive(Debug, Clone)]
pub struct PropertyRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `PropertyAttributes` bitmask.
    pub flags: u16,
    /// `#Strings` index of the property name.
    pub name: u32,
    /// `#Blob` index of the property signature.
    pub property_type: u32,
}

impl TableRow for PropertyRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* flags */         2 +
            /* name */          layout.str_bytes() +
            /* property_type */ layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(PropertyRaw {
            rid,
            token: Token::from_parts(TableId::Property, rid),
            offset: *offset,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            property_type: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `Property` row.
#[derive(Debug, Clone)]
pub struct Property {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// `PropertyAttributes` bitmask.
    pub flags: u16,
    /// Property name.
    pub name: Option<String>,
    /// Property signature blob.
    pub property_type: Option<Vec<u8>>,
}

impl PropertyRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> Property {
        Property {
            rid: self.rid,
            token: self.token,
            flags: self.flags,
            name: ctx.string(self.name, TableId::Property, self.rid),
            property_type: ctx.blob(self.property_type, TableId::Property, self.rid),
        }
    }
}
