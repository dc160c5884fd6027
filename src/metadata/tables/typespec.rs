//! The `TypeSpec` table (0x1B).

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `TypeSpec` row.
#[derive(Debug, Clone)]
pub struct TypeSpecRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `#Blob` index of the type specification signature.
    pub signature: u32,
}

impl TableRow for TypeSpecRaw {
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(layout.blob_bytes())
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(TypeSpecRaw {
            rid,
            token: Token::from_parts(TableId::TypeSpec, rid),
            offset: *offset,
            signature: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `TypeSpec` row.
#[derive(Debug, Clone)]
pub struct TypeSpec {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Type specification signature blob.
    pub signature: Option<Vec<u8>>,
}

impl TypeSpecRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> TypeSpec {
        TypeSpec {
            rid: self.rid,
            token: self.token,
            signature: ctx.blob(self.signature, TableId::TypeSpec, self.rid),
        }
    }
}
