//! The `AssemblyRefProcessor` table (0x24). Rarely emitted.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `AssemblyRefProcessor` row.
#[derive(Debug, Clone)]
pub struct AssemblyRefProcessorRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Processor architecture identifier.
    pub processor: u32,
    /// 1-based index of the qualified `AssemblyRef` row.
    pub assembly_ref: u32,
}

impl TableRow for AssemblyRefProcessorRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* processor */    4 +
            /* assembly_ref */ layout.index_bytes(TableId::AssemblyRef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(AssemblyRefProcessorRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyRefProcessor, rid),
            offset: *offset,
            processor: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, layout.wide_index(TableId::AssemblyRef))?,
        })
    }
}

/// Linked `AssemblyRefProcessor` row.
#[derive(Debug, Clone)]
pub struct AssemblyRefProcessor {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Processor architecture identifier.
    pub processor: u32,
    /// The qualified assembly reference.
    pub assembly_ref: Option<RowRef>,
}

impl AssemblyRefProcessorRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> AssemblyRefProcessor {
        AssemblyRefProcessor {
            rid: self.rid,
            token: self.token,
            processor: self.processor,
            assembly_ref: ctx.row(
                TableId::AssemblyRef,
                self.assembly_ref,
                TableId::AssemblyRefProcessor,
                self.rid,
            ),
        }
    }
}
