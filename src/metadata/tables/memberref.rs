//! The `MemberRef` table (0x0A): references to fields and methods owned
//! by another scope.

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

/// Physical `MemberRef` row.
#[derive(Debug, Clone)]
pub struct MemberRefRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `MemberRefParent` coded index of the owning scope.
    pub class: CodedIndex,
    /// `#Strings` index of the member name.
    pub name: u32,
    /// `#Blob` index of the member signature.
    pub signature: u32,
}

impl TableRow for MemberRefRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* class */     layout.coded_bytes(CodedIndexKind::MemberRefParent) +
            /* name */      layout.str_bytes() +
            /* signature */ layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(MemberRefRaw {
            rid,
            token: Token::from_parts(TableId::MemberRef, rid),
            offset: *offset,
            class: CodedIndex::read(data, offset, layout, CodedIndexKind::MemberRefParent)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            signature: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `MemberRef` row.
#[derive(Debug, Clone)]
pub struct MemberRef {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The scope owning the referenced member.
    pub class: Option<RowRef>,
    /// Member name.
    pub name: Option<String>,
    /// Member signature blob.
    pub signature: Option<Vec<u8>>,
}

impl MemberRefRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> MemberRef {
        MemberRef {
            rid: self.rid,
            token: self.token,
            class: ctx.coded(&self.class, TableId::MemberRef, self.rid),
            name: ctx.string(self.name, TableId::MemberRef, self.rid),
            signature: ctx.blob(self.signature, TableId::MemberRef, self.rid),
        }
    }
}
