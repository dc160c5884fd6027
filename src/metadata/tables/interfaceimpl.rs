//! The `InterfaceImpl` table (0x09).

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

/// Physical `InterfaceImpl` row.
#[derive(Debug, Clone)]
pub struct InterfaceImplRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index of the implementing `TypeDef` row.
    pub class: u32,
    /// `TypeDefOrRef` coded index of the implemented interface.
    pub interface: CodedIndex,
}

impl TableRow for InterfaceImplRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* class */     layout.index_bytes(TableId::TypeDef) +
            /* interface */ layout.coded_bytes(CodedIndexKind::TypeDefOrRef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(InterfaceImplRaw {
            rid,
            token: Token::from_parts(TableId::InterfaceImpl, rid),
            offset: *offset,
            class: read_le_at_dyn(data, offset, layout.wide_index(TableId::TypeDef))?,
            interface: CodedIndex::read(data, offset, layout, CodedIndexKind::TypeDefOrRef)?,
        })
    }
}

/// Linked `InterfaceImpl` row.
#[derive(Debug, Clone)]
pub struct InterfaceImpl {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The implementing type.
    pub class: Option<RowRef>,
    /// The implemented interface.
    pub interface: Option<RowRef>,
}

impl InterfaceImplRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> InterfaceImpl {
        InterfaceImpl {
            rid: self.rid,
            token: self.token,
            class: ctx.row(TableId::TypeDef, self.class, TableId::InterfaceImpl, self.rid),
            interface: ctx.coded(&self.interface, TableId::InterfaceImpl, self.rid),
        }
    }
}
