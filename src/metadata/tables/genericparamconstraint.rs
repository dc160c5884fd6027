//! The `GenericParamConstraint` table (0x2C).

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

/// Physical `GenericParamConstraint` row.
#[derive(Debug, Clone)]
pub struct GenericParamConstraintRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// 1-based index of the constrained `GenericParam` row.
    pub owner: u32,
    /// `TypeDefOrRef` coded index of the constraint type.
    pub constraint: CodedIndex,
}

impl TableRow for GenericParamConstraintRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* owner */      layout.index_bytes(TableId::GenericParam) +
            /* constraint */ layout.coded_bytes(CodedIndexKind::TypeDefOrRef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(GenericParamConstraintRaw {
            rid,
            token: Token::from_parts(TableId::GenericParamConstraint, rid),
            offset: *offset,
            owner: read_le_at_dyn(data, offset, layout.wide_index(TableId::GenericParam))?,
            constraint: CodedIndex::read(data, offset, layout, CodedIndexKind::TypeDefOrRef)?,
        })
    }
}

/// Linked `GenericParamConstraint` row.
#[derive(Debug, Clone)]
pub struct GenericParamConstraint {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The constrained generic parameter.
    pub owner: Option<RowRef>,
    /// The constraint type.
    pub constraint: Option<RowRef>,
}

impl GenericParamConstraintRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> GenericParamConstraint {
        GenericParamConstraint {
            rid: self.rid,
            token: self.token,
            owner: ctx.row(
                TableId::GenericParam,
                self.owner,
                TableId::GenericParamConstraint,
                self.rid,
            ),
            constraint: ctx.coded(&self.constraint, TableId::GenericParamConstraint, self.rid),
        }
    }
}
