//! The `GenericParam` table (0x2A).

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

/// Physical `GenericParam` row.
#[derive(Debug, Clone)]
pub struct GenericParamRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 0-based ordinal of the parameter within its owner.
    pub number: u16,
    /// `GenericParamAttributes` bitmask.
    pub flags: u16,
    /// `TypeOrMethodDef` coded index of the owning type or method.
    pub owner: CodedIndex,
    /// `#Strings` index of the parameter name.
    pub name: u32,
}

impl TableRow for GenericParamRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* number */ 2 +
            /* flags */  2 +
            /* owner */  layout.coded_bytes(CodedIndexKind::TypeOrMethodDef) +
            /* name */   layout.str_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(GenericParamRaw {
            rid,
            token: Token::from_parts(TableId::GenericParam, rid),
            offset: *offset,
            number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            owner: CodedIndex::read(data, offset, layout, CodedIndexKind::TypeOrMethodDef)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
        })
    }
}

/// Linked `GenericParam` row.
#[derive(Debug, Clone)]
pub struct GenericParam {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// 0-based ordinal of the parameter within its owner.
    pub number: u16,
    /// `GenericParamAttributes` bitmask.
    pub flags: u16,
    /// The owning type or method.
    pub owner: Option<RowRef>,
    /// Parameter name.
    pub name: Option<String>,
}

impl GenericParamRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> GenericParam {
        GenericParam {
            rid: self.rid,
            token: self.token,
            number: self.number,
            flags: self.flags,
            owner: ctx.coded(&self.owner, TableId::GenericParam, self.rid),
            name: ctx.string(self.name, TableId::GenericParam, self.rid),
        }
    }
}
