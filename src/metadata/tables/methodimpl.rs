//! The `MethodImpl` table (0x19).

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

/// Physical `MethodImpl` row.
#[derive(Debug, Clone)]
pub struct MethodImplRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index of the `TypeDef` row owning the override.
    pub class: u32,
    /// `MethodDefOrRef` coded index of the implementing method.
    pub method_body: CodedIndex,
    /// `MethodDefOrRef` coded index of the declaration being implemented.
    pub method_declaration: CodedIndex,
}

impl TableRow for MethodImplRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* class */              layout.index_bytes(TableId::TypeDef) +
            /* method_body */        layout.coded_bytes(CodedIndexKind::MethodDefOrRef) +
            /* method_declaration */ layout.coded_bytes(CodedIndexKind::MethodDefOrRef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(MethodImplRaw {
            rid,
            token: Token::from_parts(TableId::MethodImpl, rid),
            offset: *offset,
            class: read_le_at_dyn(data, offset, layout.wide_index(TableId::TypeDef))?,
            method_body: CodedIndex::read(data, offset, layout, CodedIndexKind::MethodDefOrRef)?,
            method_declaration: CodedIndex::read(
                data,
                offset,
                layout,
                CodedIndexKind::MethodDefOrRef,
            )?,
        })
    }
}

/// Linked `MethodImpl` row.
#[derive(Debug, Clone)]
pub struct MethodImpl {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The type owning the override.
    pub class: Option<RowRef>,
    /// The implementing method.
    pub method_body: Option<RowRef>,
    /// The declaration being implemented.
    pub method_declaration: Option<RowRef>,
}

impl MethodImplRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> MethodImpl {
        MethodImpl {
            rid: self.rid,
            token: self.token,
            class: ctx.row(TableId::TypeDef, self.class, TableId::MethodImpl, self.rid),
            method_body: ctx.coded(&self.method_body, TableId::MethodImpl, self.rid),
            method_declaration: ctx.coded(&self.method_declaration, TableId::MethodImpl, self.rid),
        }
    }
}
