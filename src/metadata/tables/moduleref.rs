//! The `ModuleRef` table (0x1A).

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `ModuleRef` row.
#[derive(Debug, Clone)]
pub struct ModuleRefRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `#Strings` index of the referenced module's name.
    pub name: u32,
}

impl TableRow for ModuleRefRaw {
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(layout.str_bytes())
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(ModuleRefRaw {
            rid,
            token: Token::from_parts(TableId::ModuleRef, rid),
            offset: *offset,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
        })
    }
}

/// Linked `ModuleRef` row.
#[derive(Debug, Clone)]
pub struct ModuleRef {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Referenced module name.
    pub name: Option<String>,
}

impl ModuleRefRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> ModuleRef {
        ModuleRef {
            rid: self.rid,
            token: self.token,
            name: ctx.string(self.name, TableId::ModuleRef, self.rid),
        }
    }
}
