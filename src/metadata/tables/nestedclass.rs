//! The `NestedClass` table (0x29).

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

/// Physical `NestedClass` row.
#[derive(Debug, Clone)]
pub struct NestedClassRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index of the nested `TypeDef` row.
    pub nested_class: u32,
    /// 1-based index of the enclosing `TypeDef` row.
    pub enclosing_class: u32,
}

impl TableRow for NestedClassRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* nested_class */    layout.index_bytes(TableId::TypeDef) +
            /* enclosing_class */ layout.index_bytes(TableId::TypeDef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(NestedClassRaw {
            rid,
            token: Token::from_parts(TableId::NestedClass, rid),
            offset: *offset,
            nested_class: read_le_at_dyn(data, offset, layout.wide_index(TableId::TypeDef))?,
            enclosing_class: read_le_at_dyn(data, offset, layout.wide_index(TableId::TypeDef))?,
        })
    }
}

/// Linked `NestedClass` row.
#[derive(Debug, Clone)]
pub struct NestedClass {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The nested type.
    pub nested_class: Option<RowRef>,
    /// The enclosing type.
    pub enclosing_class: Option<RowRef>,
}

impl NestedClassRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> NestedClass {
        NestedClass {
            rid: self.rid,
            token: self.token,
            nested_class: ctx.row(
                TableId::TypeDef,
                self.nested_class,
                TableId::NestedClass,
                self.rid,
            ),
            enclosing_class: ctx.row(
                TableId::TypeDef,
                self.enclosing_class,
                TableId::NestedClass,
                self.rid,
            ),
        }
    }
}
