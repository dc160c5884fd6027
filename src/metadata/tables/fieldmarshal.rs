//! The `FieldMarshal` table (0x0D).

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

/// Physical `FieldMarshal` row.
#[derive(Debug, Clone)]
pub struct FieldMarshalRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `HasFieldMarshal` coded index of the marshalled row.
    pub parent: CodedIndex,
    /// `#Blob` index of the native type descriptor.
    pub native_type: u32,
}

impl TableRow for FieldMarshalRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* parent */      layout.coded_bytes(CodedIndexKind::HasFieldMarshal) +
            /* native_type */ layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(FieldMarshalRaw {
            rid,
            token: Token::from_parts(TableId::FieldMarshal, rid),
            offset: *offset,
            parent: CodedIndex::read(data, offset, layout, CodedIndexKind::HasFieldMarshal)?,
            native_type: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `FieldMarshal` row.
#[derive(Debug, Clone)]
pub struct FieldMarshal {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The field or parameter being marshalled.
    pub parent: Option<RowRef>,
    /// Native type descriptor blob.
    pub native_type: Option<Vec<u8>>,
}

impl FieldMarshalRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> FieldMarshal {
        FieldMarshal {
            rid: self.rid,
            token: self.token,
            parent: ctx.coded(&self.parent, TableId::FieldMarshal, self.rid),
            native_type: ctx.blob(self.native_type, TableId::FieldMarshal, self.rid),
        }
    }
}
