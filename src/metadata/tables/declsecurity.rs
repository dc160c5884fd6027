//! The `DeclSecurity` table (0x0E).

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

/// Physical `DeclSecurity` row.
#[derive(Debug, Clone)]
pub struct DeclSecurityRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Security action code.
    pub action: u16,
    /// `HasDeclSecurity` coded index of the protected row.
    pub parent: CodedIndex,
    /// `#Blob` index of the permission set.
    pub permission_set: u32,
}

impl TableRow for DeclSecurityRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* action */         2 +
            /* parent */         layout.coded_bytes(CodedIndexKind::HasDeclSecurity) +
            /* permission_set */ layout.blob_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(DeclSecurityRaw {
            rid,
            token: Token::from_parts(TableId::DeclSecurity, rid),
            offset: *offset,
            action: read_le_at::<u16>(data, offset)?,
            parent: CodedIndex::read(data, offset, layout, CodedIndexKind::HasDeclSecurity)?,
            permission_set: read_le_at_dyn(data, offset, layout.wide_blobs())?,
        })
    }
}

/// Linked `DeclSecurity` row.
#[derive(Debug, Clone)]
pub struct DeclSecurity {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Security action code.
    pub action: u16,
    /// The protected row.
    pub parent: Option<RowRef>,
    /// Permission set blob.
    pub permission_set: Option<Vec<u8>>,
}

impl DeclSecurityRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> DeclSecurity {
        DeclSecurity {
            rid: self.rid,
            token: self.token,
            action: self.action,
            parent: ctx.coded(&self.parent, TableId::DeclSecurity, self.rid),
            permission_set: ctx.blob(self.permission_set, TableId::DeclSecurity, self.rid),
        }
    }
}
