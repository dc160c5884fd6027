//! The `MethodSpec` table (0x2B): generic method instantiations.

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{
            linker::LinkContext, CodedIndex, CodedIndexKind, RowRef, TableId, TableLayout,
            TableRow,
        },
        token::Token,
    },
    Result,
};

/// Physical `MethodSpec` row.
#[derive(Debug, Clone)]
pub struct MethodSpecRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `MethodDefOrRef` coded index of the instantiated method.
    pub method: CodedIndex,
    /// `#Blob` index of the instantiation signature.
    pub instantiation: u32,
}

impl TableRow for MethodSpecRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* method */        layout.coded_bytes(CodedIndexKind::MethodDefOrRef) +
            /* instantiation */ layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(MethodSpecRaw {
            rid,
            token: Token::from_parts(TableId::MethodSpec, rid),
            offset: *offset,
            method: CodedIndex::read(data, offset, layout, CodedIndexKind::MethodDefOrRef)?,
            instantiation: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `MethodSpec` row.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The instantiated method.
    pub method: Option<RowRef>,
    /// Instantiation signature blob.
    pub instantiation: Option<Vec<u8>>,
}

impl MethodSpecRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> MethodSpec {
        MethodSpec {
            rid: self.rid,
            token: self.token,
            method: ctx.coded(&self.method, TableId::MethodSpec, self.rid),
            instantiation: ctx.blob(self.instantiation, TableId::MethodSpec, self.rid),
        }
    }
}
