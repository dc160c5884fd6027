//! The `Constant` table (0x0B): compile-time constants for fields,
//! parameters and properties.

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{
            linker::LinkContext, CodedIndex, CodedIndexKind, RowRef, TableId, TableLayout,
            TableRow,
        },
        token::Token,
    },
    Result,
};

/// Physical `Constant` row.
#[derive(Debug, Clone)]
pub struct ConstantRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Element type of the constant (`ELEMENT_TYPE_*`).
    pub const_type: u8,
    /// Padding byte, zero in conforming images.
    pub padding: u8,
    /// `HasConstant` coded index of the owning row.
    pub parent: CodedIndex,
    /// `#Blob` index of the constant value.
    pub value: u32,
}

impl TableRow for ConstantRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* const_type + padding */ 2 +
            /* parent */               layout.coded_bytes(CodedIndexKind::HasConstant) +
            /* value */                layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(ConstantRaw {
            rid,
            token: Token::from_parts(TableId::Constant, rid),
            offset: *offset,
            const_type: read_le_at::<u8>(data, offset)?,
            padding: read_le_at::<u8>(data, offset)?,
            parent: CodedIndex::read(data, offset, layout, CodedIndexKind::HasConstant)?,
            value: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `Constant` row.
#[derive(Debug, Clone)]
pub struct Constant {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Element type of the constant.
    pub const_type: u8,
    /// The row the constant belongs to.
    pub parent: Option<RowRef>,
    /// Raw constant value.
    pub value: Option<Vec<u8>>,
}

impl ConstantRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> Constant {
        Constant {
            rid: self.rid,
            token: self.token,
            const_type: self.const_type,
            parent: ctx.coded(&self.parent, TableId::Constant, self.rid),
            value: ctx.blob(self.value, TableId::Constant, self.rid),
        }
    }
}
