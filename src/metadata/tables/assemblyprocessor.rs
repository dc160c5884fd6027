//! The `AssemblyProcessor` table (0x21). Rarely emitted.

use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `AssemblyProcessor` row.
#[derive(Debug, Clone)]
pub struct AssemblyProcessorRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Processor architecture identifier.
    pub processor: u32,
}

impl TableRow for AssemblyProcessorRaw {
    fn row_size(_layout: &TableLayout) -> u32 {
        4
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, _layout: &TableLayout) -> Result<Self> {
        Ok(AssemblyProcessorRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyProcessor, rid),
            offset: *offset,
            processor: read_le_at::<u32>(data, offset)?,
        })
    }
}

/// Linked `AssemblyProcessor` row.
#[derive(Debug, Clone)]
pub struct AssemblyProcessor {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Processor architecture identifier.
    pub processor: u32,
}

impl AssemblyProcessorRaw {
    pub(crate) fn link(&self, _ctx: &LinkContext) -> AssemblyProcessor {
        AssemblyProcessor {
            rid: self.rid,
            token: self.token,
            processor: self.processor,
        }
    }
}
