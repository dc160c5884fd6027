//! The `StandAloneSig` table (0x11).

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `StandAloneSig` row.
#[derive(Debug, Clone)]
pub struct StandAloneSigRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `#Blob` index of the signature.
    pub signature: u32,
}

impl TableRow for StandAloneSigRaw {
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(layout.blob_bytes())
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(StandAloneSigRaw {
            rid,
            token: Token::from_parts(TableId::StandAloneSig, rid),
            offset: *offset,
            signature: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `StandAloneSig` row.
#[derive(Debug, Clone)]
pub struct StandAloneSig {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Signature blob.
    pub signature: Option<Vec<u8>>,
}

impl StandAloneSigRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> StandAloneSig {
        StandAloneSig {
            rid: self.rid,
            token: self.token,
            signature: ctx.blob(self.signature, TableId::StandAloneSig, self.rid),
        }
    }
}
