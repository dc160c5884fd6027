//! The `MethodSemantics` table (0x18): associates getter/setter/adder
//! style methods with their property or event.

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

/// Physical `MethodSemantics` row.
#[derive(Debug, Clone)]
pub struct MethodSemanticsRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `MethodSemanticsAttributes` bitmask (setter, getter, other, adder,
    /// remover, fire).
    pub semantics: u16,
    /// 1-based index of the accessor `MethodDef` row.
    pub method: u32,
    /// `HasSemantics` coded index of the owning event or property.
    pub association: CodedIndex,
}

impl TableRow for MethodSemanticsRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* semantics */   2 +
            /* method */      layout.index_bytes(TableId::MethodDef) +
            /* association */ layout.coded_bytes(CodedIndexKind::HasSemantics)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(MethodSemanticsRaw {
            rid,
            token: Token::from_parts(TableId::MethodSemantics, rid),
            offset: *offset,
            semantics: read_le_at::<u16>(data, offset)?,
            method: read_le_at_dyn(data, offset, layout.wide_index(TableId::MethodDef))?,
            association: CodedIndex::read(data, offset, layout, CodedIndexKind::HasSemantics)?,
        })
    }
}

/// Linked `MethodSemantics` row.
#[derive(Debug, Clone)]
pub struct MethodSemantics {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// `MethodSemanticsAttributes` bitmask.
    pub semantics: u16,
    /// The accessor method.
    pub method: Option<RowRef>,
    /// The owning event or property.
    pub association: Option<RowRef>,
}

impl MethodSemanticsRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> MethodSemantics {
        MethodSemantics {
            rid: self.rid,
            token: self.token,
            semantics: self.semantics,
            method: ctx.row(
                TableId::MethodDef,
                self.method,
                TableId::MethodSemantics,
                self.rid,
            ),
            association: ctx.coded(&self.association, TableId::MethodSemantics, self.rid),
        }
    }
}
