//! The `TypeRef` table (0x01).
//!
//! Types imported from other modules or assemblies, located through a
//! `ResolutionScope` coded index.

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

/// Physical `TypeRef` row.
#[derive(Debug, Clone)]
pub struct TypeRefRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `ResolutionScope` coded index naming where the type lives.
    pub resolution_scope: CodedIndex,
    /// `#Strings` index of the type name.
    pub type_name: u32,
    /// `#Strings` index of the type namespace.
    pub type_namespace: u32,
}

impl TableRow for TypeRefRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* resolution_scope */ layout.coded_bytes(CodedIndexKind::ResolutionScope) +
            /* type_name */        layout.str_bytes() +
            /* type_namespace */   layout.str_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(TypeRefRaw {
            rid,
            token: Token::from_parts(TableId::TypeRef, rid),
            offset: *offset,
            resolution_scope: CodedIndex::read(
                data,
                offset,
                layout,
                CodedIndexKind::ResolutionScope,
            )?,
            type_name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            type_namespace: read_le_at_dyn(data, offset, layout.wide_strings())?,
        })
    }
}

/// Linked `TypeRef` row.
#[derive(Debug, Clone)]
pub struct TypeRef {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// The scope the type is resolved against.
    pub resolution_scope: Option<RowRef>,
    /// Type name.
    pub name: Option<String>,
    /// Type namespace; empty for global types.
    pub namespace: Option<String>,
}

impl TypeRefRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> TypeRef {
        TypeRef {
            rid: self.rid,
            token: self.token,
            resolution_scope: ctx.coded(&self.resolution_scope, TableId::TypeRef, self.rid),
            name: ctx.string(self.type_name, TableId::TypeRef, self.rid),
            namespace: ctx.string(self.type_namespace, TableId::TypeRef, self.rid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{MetadataTable, TableLayout};

    #[test]
    fn crafted_narrow() {
        let data = [
            0x0A, 0x00, // resolution_scope: tag 2 = AssemblyRef, row 2
            0x42, 0x00, // type_name
            0x43, 0x00, // type_namespace
        ];

        let layout = TableLayout::for_tests(
            &[(TableId::TypeRef, 1), (TableId::AssemblyRef, 4)],
            false,
            false,
            false,
        );
        let table = MetadataTable::<TypeRefRaw>::new(&data, 0, 1, layout);

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x0100_0001);
        assert_eq!(row.resolution_scope.table, Some(TableId::AssemblyRef));
        assert_eq!(row.resolution_scope.row, 2);
        assert_eq!(row.type_name, 0x42);
        assert_eq!(row.type_namespace, 0x43);
    }
}
