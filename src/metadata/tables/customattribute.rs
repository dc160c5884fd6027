//! The `CustomAttribute` table (0x0C).

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

/// Physical `CustomAttribute` row.
#[derive(Debug, Clone)]
pub struct CustomAttributeRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `HasCustomAttribute` coded index of the annotated row.
    pub parent: CodedIndex,
    /// `CustomAttributeType` coded index of the attribute constructor.
    pub constructor: CodedIndex,
    /// `#Blob` index of the attribute value.
    pub value: u32,
}

impl TableRow for CustomAttributeRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* parent */      layout.coded_bytes(CodedIndexKind::HasCustomAttribute) +
            /* constructor */ layout.coded_bytes(CodedIndexKind::CustomAttributeType) +
            /* value */       layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(CustomAttributeRaw {
            rid,
            token: Token::from_parts(TableId::CustomAttribute, rid),
            offset: *offset,
            parent: CodedIndex::read(data, offset, layout, CodedIndexKind::HasCustomAttribute)?,
            constructor: CodedIndex::read(
                data,
                offset,
                layout,
                CodedIndexKind::CustomAttributeType,
            )?,
            value: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `CustomAttribute` row.
#[derive(Debug, Clone)]
pub struct CustomAttribute {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The annotated row.
    pub parent: Option<RowRef>,
    /// The attribute constructor.
    pub constructor: Option<RowRef>,
    /// Raw attribute value blob.
    pub value: Option<Vec<u8>>,
}

impl CustomAttributeRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> CustomAttribute {
        CustomAttribute {
            rid: self.rid,
            token: self.token,
            parent: ctx.coded(&self.parent, TableId::CustomAttribute, self.rid),
            constructor: ctx.coded(&self.constructor, TableId::CustomAttribute, self.rid),
            value: ctx.blob(self.value, TableId::CustomAttribute, self.rid),
        }
    }
}
