//! The `ExportedType` table (0x27).

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

/// Physical `ExportedType` row.
#[derive(Debug, Clone)]
pub struct ExportedTypeRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `TypeAttributes` bitmask.
    pub flags: u32,
    /// Hint: the `TypeDef` token of the type in its defining module.
    pub type_def_id: u32,
    /// `#Strings` index of the type name.
    pub type_name: u32,
    /// `#Strings` index of the type namespace.
    pub type_namespace: u32,
    /// `Implementation` coded index of where the type lives.
    pub implementation: CodedIndex,
}

impl TableRow for ExportedTypeRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* flags */          4 +
            /* type_def_id */    4 +
            /* type_name */      layout.str_bytes() +
            /* type_namespace */ layout.str_bytes() +
            /* implementation */ layout.coded_bytes(CodedIndexKind::Implementation)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(ExportedTypeRaw {
            rid,
            token: Token::from_parts(TableId::ExportedType, rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            type_def_id: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            type_namespace: read_le_at_dyn(data, offset, layout.wide_strings())?,
            implementation: CodedIndex::read(data, offset, layout, CodedIndexKind::Implementation)?,
        })
    }
}

/// Linked `ExportedType` row.
#[derive(Debug, Clone)]
pub struct ExportedType {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// `TypeAttributes` bitmask.
    pub flags: u32,
    /// Hint token of the type in its defining module.
    pub type_def_id: u32,
    /// Type name.
    pub name: Option<String>,
    /// Type namespace.
    pub namespace: Option<String>,
    /// Where the type actually lives.
    pub implementation: Option<RowRef>,
}

impl ExportedTypeRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> ExportedType {
        ExportedType {
            rid: self.rid,
            token: self.token,
            flags: self.flags,
            type_def_id: self.type_def_id,
            name: ctx.string(self.type_name, TableId::ExportedType, self.rid),
            namespace: ctx.string(self.type_namespace, TableId::ExportedType, self.rid),
            implementation: ctx.coded(&self.implementation, TableId::ExportedType, self.rid),
        }
    }
}
