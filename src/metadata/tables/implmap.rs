//! The `ImplMap` table (0x1C): P/Invoke forwarding.

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

/// Physical `ImplMap` row.
#[derive(Debug, Clone)]
pub struct ImplMapRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `PInvokeAttributes` bitmask.
    pub mapping_flags: u16,
    /// `MemberForwarded` coded index of the forwarded member.
    pub member_forwarded: CodedIndex,
    /// `#Strings` index of the unmanaged entry point name.
    pub import_name: u32,
    /// 1-based index of the target `ModuleRef` row.
    pub import_scope: u32,
}

impl TableRow for ImplMapRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* mapping_flags */    2 +
            /* member_forwarded */ layout.coded_bytes(CodedIndexKind::MemberForwarded) +
            /* import_name */      layout.str_bytes() +
            /* import_scope */     layout.index_bytes(TableId::ModuleRef)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(ImplMapRaw {
            rid,
            token: Token::from_parts(TableId::ImplMap, rid),
            offset: *offset,
            mapping_flags: read_le_at::<u16>(data, offset)?,
            member_forwarded: CodedIndex::read(
                data,
                offset,
                layout,
                CodedIndexKind::MemberForwarded,
            )?,
            import_name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            import_scope: read_le_at_dyn(data, offset, layout.wide_index(TableId::ModuleRef))?,
        })
    }
}

/// Linked `ImplMap` row.
#[derive(Debug, Clone)]
pub struct ImplMap {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// `PInvokeAttributes` bitmask.
    pub mapping_flags: u16,
    /// The forwarded field or method.
    pub member_forwarded: Option<RowRef>,
    /// Unmanaged entry point name.
    pub import_name: Option<String>,
    /// The module providing the entry point.
    pub import_scope: Option<RowRef>,
}

impl ImplMapRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> ImplMap {
        ImplMap {
            rid: self.rid,
            token: self.token,
            mapping_flags: self.mapping_flags,
            member_forwarded: ctx.coded(&self.member_forwarded, TableId::ImplMap, self.rid),
            import_name: ctx.string(self.import_name, TableId::ImplMap, self.rid),
            import_scope: ctx.row(
                TableId::ModuleRef,
                self.import_scope,
                TableId::ImplMap,
                self.rid,
            ),
        }
    }
}
