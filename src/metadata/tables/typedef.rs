//! The `TypeDef` table (0x02).
//!
//! Types defined in this module. `field_list` and `method_list` are
//! run-list columns: a row owns the child rows from its own start index up
//! to the next row's start index, the last row owning through the end of
//! the child table.

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

/// Physical `TypeDef` row.
#[derive(Debug, Clone)]
pub struct TypeDefRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `TypeAttributes` bitmask.
    pub flags: u32,
    /// `#Strings` index of the type name.
    pub type_name: u32,
    /// `#Strings` index of the type namespace.
    pub type_namespace: u32,
    /// `TypeDefOrRef` coded index of the base type.
    pub extends: CodedIndex,
    /// Start of this type's field run in the `Field` table.
    pub field_list: u32,
    /// Start of this type's method run in the `MethodDef` table.
    pub method_list: u32,
}

impl TableRow for TypeDefRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* flags */          4 +
            /* type_name */      layout.str_bytes() +
            /* type_namespace */ layout.str_bytes() +
            /* extends */        layout.coded_bytes(CodedIndexKind::TypeDefOrRef) +
            /* field_list */     layout.index_bytes(TableId::Field) +
            /* method_list */    layout.index_bytes(TableId::MethodDef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(TypeDefRaw {
            rid,
            token: Token::from_parts(TableId::TypeDef, rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            type_namespace: read_le_at_dyn(data, offset, layout.wide_strings())?,
            extends: CodedIndex::read(data, offset, layout, CodedIndexKind::TypeDefOrRef)?,
            field_list: read_le_at_dyn(data, offset, layout.wide_index(TableId::Field))?,
            method_list: read_le_at_dyn(data, offset, layout.wide_index(TableId::MethodDef))?,
        })
    }
}

/// Linked `TypeDef` row.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// `TypeAttributes` bitmask.
    pub flags: u32,
    /// Type name.
    pub name: Option<String>,
    /// Type namespace; empty for global types.
    pub namespace: Option<String>,
    /// Base type, absent for interfaces and `System.Object` itself.
    pub extends: Option<RowRef>,
    /// The fields this type owns, in declaration order.
    pub fields: Vec<RowRef>,
    /// The methods this type owns, in declaration order.
    pub methods: Vec<RowRef>,
}

impl TypeDefRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> TypeDef {
        let next = ctx.next_row::<TypeDefRaw>(self.rid);

        TypeDef {
            rid: self.rid,
            token: self.token,
            flags: self.flags,
            name: ctx.string(self.type_name, TableId::TypeDef, self.rid),
            namespace: ctx.string(self.type_namespace, TableId::TypeDef, self.rid),
            extends: ctx.coded(&self.extends, TableId::TypeDef, self.rid),
            fields: ctx.run_list(
                TableId::Field,
                self.field_list,
                next.as_ref().map(|row| row.field_list),
                TableId::TypeDef,
                self.rid,
            ),
            methods: ctx.run_list(
                TableId::MethodDef,
                self.method_list,
                next.as_ref().map(|row| row.method_list),
                TableId::TypeDef,
                self.rid,
            ),
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
            0x01, 0x00, 0x10, 0x00, // flags
            0x42, 0x00, // type_name
            0x43, 0x00, // type_namespace
            0x05, 0x00, // extends: tag 1 = TypeRef, row 1
            0x01, 0x00, // field_list
            0x02, 0x00, // method_list
        ];

        let layout = TableLayout::for_tests(
            &[
                (TableId::TypeDef, 1),
                (TableId::TypeRef, 2),
                (TableId::Field, 4),
                (TableId::MethodDef, 4),
            ],
            false,
            false,
            false,
        );
        let table = MetadataTable::<TypeDefRaw>::new(&data, 0, 1, layout);

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x0200_0001);
        assert_eq!(row.flags, 0x0010_0001);
        assert_eq!(row.extends.table, Some(TableId::TypeRef));
        assert_eq!(row.extends.row, 1);
        assert_eq!(row.field_list, 1);
        assert_eq!(row.method_list, 2);
    }

    #[test]
    fn crafted_wide_indexes() {
        // Field table crosses 2^16 rows, so field_list becomes 4 bytes.
        let data = [
            0x00, 0x00, 0x00, 0x00, // flags
            0x42, 0x00, // type_name
            0x43, 0x00, // type_namespace
            0x00, 0x00, // extends (null)
            0x01, 0x00, 0x02, 0x00, // field_list
            0x03, 0x00, // method_list
        ];

        let layout = TableLayout::for_tests(
            &[
                (TableId::TypeDef, 1),
                (TableId::Field, 0x2_0000),
                (TableId::MethodDef, 4),
            ],
            false,
            false,
            false,
        );
        let table = MetadataTable::<TypeDefRaw>::new(&data, 0, 1, layout);

        let row = table.get(1).unwrap();
        assert_eq!(row.field_list, 0x0002_0001);
        assert_eq!(row.method_list, 3);
        assert!(row.extends.is_null());
    }
}
