//! The `AssemblyRefOS` table (0x25). Rarely emitted.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `AssemblyRefOS` row.
#[derive(Debug, Clone)]
pub struct AssemblyRefOsRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Operating system platform identifier.
    pub os_platform_id: u32,
    /// OS major version.
    pub os_major_version: u32,
    /// OS minor version.
    pub os_minor_version: u32,
    /// 1-based index of the qualified `AssemblyRef` row.
    pub assembly_ref: u32,
}

impl TableRow for AssemblyRefOsRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* os triple */    12 +
            /* assembly_ref */ layout.index_bytes(TableId::AssemblyRef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(AssemblyRefOsRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyRefOs, rid),
            offset: *offset,
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, layout.wide_index(TableId::AssemblyRef))?,
        })
    }
}

/// Linked `AssemblyRefOS` row.
#[derive(Debug, Clone)]
pub struct AssemblyRefOs {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Operating system platform identifier.
    pub os_platform_id: u32,
    /// OS major version.
    pub os_major_version: u32,
    /// OS minor version.
    pub os_minor_version: u32,
    /// The qualified assembly reference.
    pub assembly_ref: Option<RowRef>,
}

impl AssemblyRefOsRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> AssemblyRefOs {
        AssemblyRefOs {
            rid: self.rid,
            token: self.token,
            os_platform_id: self.os_platform_id,
            os_major_version: self.os_major_version,
            os_minor_version: self.os_minor_version,
            assembly_ref: ctx.row(
                TableId::AssemblyRef,
                self.assembly_ref,
                TableId::AssemblyRefOs,
                self.rid,
            ),
        }
    }
}
