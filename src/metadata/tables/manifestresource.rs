//! The `ManifestResource` table (0x28).
//!
//! Each row names one resource. A null `Implementation` coded index means
//! the payload is embedded in this image at `offset` bytes past the CLI
//! header's resources directory; otherwise the index points at the `File`
//! or `AssemblyRef` row holding it.

use bitflags::bitflags;

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

bitflags! {
    /// `ManifestResourceAttributes` (ECMA-335 II.23.1.9).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ManifestResourceAttributes: u32 {
        /// The resource is exported from the assembly.
        const PUBLIC = 0x0001;
        /// The resource is private to the assembly.
        const PRIVATE = 0x0002;
    }
}

/// Physical `ManifestResource` row.
#[derive(Debug, Clone)]
pub struct ManifestResourceRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Byte offset of the payload relative to the resources directory;
    /// not an RVA.
    pub data_offset: u32,
    /// `ManifestResourceAttributes` bitmask.
    pub flags: u32,
    /// `#Strings` index of the resource name.
    pub name: u32,
    /// `Implementation` coded index; null for embedded resources.
    pub implementation: CodedIndex,
}

impl TableRow for ManifestResourceRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* data_offset */    4 +
            /* flags */          4 +
            /* name */           layout.str_bytes() +
            /* implementation */ layout.coded_bytes(CodedIndexKind::Implementation)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(ManifestResourceRaw {
            rid,
            token: Token::from_parts(TableId::ManifestResource, rid),
            offset: *offset,
            data_offset: read_le_at::<u32>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            implementation: CodedIndex::read(data, offset, layout, CodedIndexKind::Implementation)?,
        })
    }
}

/// Linked `ManifestResource` row.
#[derive(Debug, Clone)]
pub struct ManifestResource {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Payload offset relative to the resources directory.
    pub data_offset: u32,
    /// Resource visibility flags.
    pub flags: ManifestResourceAttributes,
    /// Resource name.
    pub name: Option<String>,
    /// The `File` or `AssemblyRef` row holding the payload; absent for
    /// embedded resources.
    pub implementation: Option<RowRef>,
}

impl ManifestResourceRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> ManifestResource {
        ManifestResource {
            rid: self.rid,
            token: self.token,
            data_offset: self.data_offset,
            flags: ManifestResourceAttributes::from_bits_retain(self.flags),
            name: ctx.string(self.name, TableId::ManifestResource, self.rid),
            implementation: ctx.coded(&self.implementation, TableId::ManifestResource, self.rid),
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
            0x00, 0x01, 0x00, 0x00, // data_offset
            0x01, 0x00, 0x00, 0x00, // flags: public
            0x2A, 0x00, // name
            0x05, 0x00, // implementation: tag 1 = AssemblyRef, row 1
        ];

        let layout = TableLayout::for_tests(
            &[
                (TableId::ManifestResource, 1),
                (TableId::File, 2),
                (TableId::AssemblyRef, 2),
            ],
            false,
            false,
            false,
        );
        let table = MetadataTable::<ManifestResourceRaw>::new(&data, 0, 1, layout);

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x2800_0001);
        assert_eq!(row.data_offset, 0x100);
        assert_eq!(row.flags, 1);
        assert_eq!(row.name, 0x2A);
        assert_eq!(row.implementation.table, Some(TableId::AssemblyRef));
        assert_eq!(row.implementation.row, 1);
    }

    #[test]
    fn null_implementation_means_embedded() {
        let data = [
            0x00, 0x00, 0x00, 0x00, // data_offset
            0x02, 0x00, 0x00, 0x00, // flags: private
            0x01, 0x00, // name
            0x00, 0x00, // implementation: null
        ];

        let layout =
            TableLayout::for_tests(&[(TableId::ManifestResource, 1)], false, false, false);
        let table = MetadataTable::<ManifestResourceRaw>::new(&data, 0, 1, layout);

        let row = table.get(1).unwrap();
        assert!(row.implementation.is_null());
    }
}
