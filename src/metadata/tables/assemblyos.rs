//! The `AssemblyOS` table (0x22). Rarely emitted.

use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `AssemblyOS` row.
#[derive(Debug, Clone)]
pub struct AssemblyOsRaw {
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
}

impl TableRow for AssemblyOsRaw {
    fn row_size(_layout: &TableLayout) -> u32 {
        12
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, _layout: &TableLayout) -> Result<Self> {
        Ok(AssemblyOsRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyOs, rid),
            offset: *offset,
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// Linked `AssemblyOS` row.
#[derive(Debug, Clone)]
pub struct AssemblyOs {
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
}

impl AssemblyOsRaw {
    pub(crate) fn link(&self, _ctx: &LinkContext) -> AssemblyOs {
        AssemblyOs {
            rid: self.rid,
            token: self.token,
            os_platform_id: self.os_platform_id,
            os_major_version: self.os_major_version,
            os_minor_version: self.os_minor_version,
        }
    }
}
