//! The `Module` table (0x00).
//!
//! One row per image describing the module itself: its name and the
//! module version id used to tell two builds of the same module apart.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `Module` row.
#[derive(Debug, Clone)]
pub struct ModuleRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Reserved 2-byte generation counter, zero in conforming images.
    pub generation: u16,
    /// `#Strings` index of the module name.
    pub name: u32,
    /// 1-based `#GUID` index of the module version id.
    pub mvid: u32,
    /// 1-based `#GUID` index; reserved, zero in conforming images.
    pub encid: u32,
    /// 1-based `#GUID` index; reserved, zero in conforming images.
    pub encbaseid: u32,
}

impl TableRow for ModuleRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* generation */ 2 +
            /* name */       layout.str_bytes() +
            /* mvid */       layout.guid_bytes() +
            /* encid */      layout.guid_bytes() +
            /* encbaseid */  layout.guid_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(ModuleRaw {
            rid,
            token: Token::from_parts(TableId::Module, rid),
            offset: *offset,
            generation: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            mvid: read_le_at_dyn(data, offset, layout.wide_guids())?,
            encid: read_le_at_dyn(data, offset, layout.wide_guids())?,
            encbaseid: read_le_at_dyn(data, offset, layout.wide_guids())?,
        })
    }
}

/// Linked `Module` row.
#[derive(Debug, Clone)]
pub struct Module {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Generation counter.
    pub generation: u16,
    /// Module name.
    pub name: Option<String>,
    /// Module version id.
    pub mvid: Option<uguid::Guid>,
    /// Edit-and-continue id, absent in conforming images.
    pub encid: Option<uguid::Guid>,
    /// Edit-and-continue base id, absent in conforming images.
    pub encbaseid: Option<uguid::Guid>,
}

impl ModuleRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> Module {
        Module {
            rid: self.rid,
            token: self.token,
            generation: self.generation,
            name: ctx.string(self.name, TableId::Module, self.rid),
            mvid: ctx.guid(self.mvid, TableId::Module, self.rid),
            encid: ctx.guid(self.encid, TableId::Module, self.rid),
            encbaseid: ctx.guid(self.encbaseid, TableId::Module, self.rid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{MetadataTable, TableLayout};

    #[test]
    fn crafted_narrow() {
        let data = [
            0x01, 0x01, // generation
            0x02, 0x02, // name
            0x03, 0x03, // mvid
            0x04, 0x04, // encid
            0x05, 0x05, // encbaseid
        ];

        let layout = TableLayout::for_tests(&[(TableId::Module, 1)], false, false, false);
        let table = MetadataTable::<ModuleRaw>::new(&data, 0, 1, layout);

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0000_0001);
        assert_eq!(row.generation, 0x0101);
        assert_eq!(row.name, 0x0202);
        assert_eq!(row.mvid, 0x0303);
        assert_eq!(row.encid, 0x0404);
        assert_eq!(row.encbaseid, 0x0505);

        assert!(table.get(0).is_none());
        assert!(table.get(2).is_none());
    }

    #[test]
    fn crafted_wide() {
        let data = [
            0x01, 0x01, // generation
            0x02, 0x02, 0x02, 0x02, // name
            0x03, 0x03, 0x03, 0x03, // mvid
            0x04, 0x04, 0x04, 0x04, // encid
            0x05, 0x05, 0x05, 0x05, // encbaseid
        ];

        let layout = TableLayout::for_tests(&[(TableId::Module, 1)], true, true, true);
        let table = MetadataTable::<ModuleRaw>::new(&data, 0, 1, layout);

        let row = table.get(1).unwrap();
        assert_eq!(row.name, 0x0202_0202);
        assert_eq!(row.mvid, 0x0303_0303);
    }
}
