//! The `Param` table (0x08).

use bitflags::bitflags;

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

bitflags! {
    /// `ParamAttributes` (ECMA-335 II.23.1.13).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamAttributes: u16 {
        /// Parameter is an input.
        const IN = 0x0001;
        /// Parameter is an output.
        const OUT = 0x0002;
        /// Parameter is optional.
        const OPTIONAL = 0x0010;
        /// Parameter has a default value in the `Constant` table.
        const HAS_DEFAULT = 0x1000;
        /// Parameter has marshalling information.
        const HAS_FIELD_MARSHAL = 0x2000;
    }
}

/// Physical `Param` row.
#[derive(Debug, Clone)]
pub struct ParamRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// `ParamAttributes` bitmask.
    pub flags: u16,
    /// Parameter position; zero names the return value.
    pub sequence: u16,
    /// `#Strings` index of the parameter name.
    pub name: u32,
}

impl TableRow for ParamRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* flags */    2 +
            /* sequence */ 2 +
            /* name */     layout.str_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(ParamRaw {
            rid,
            token: Token::from_parts(TableId::Param, rid),
            offset: *offset,
            flags: read_le_at::<u16>(data, offset)?,
            sequence: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
        })
    }
}

/// Linked `Param` row.
#[derive(Debug, Clone)]
pub struct Param {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Parameter attributes.
    pub flags: ParamAttributes,
    /// Parameter position; zero names the return value.
    pub sequence: u16,
    /// Parameter name.
    pub name: Option<String>,
}

impl ParamRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> Param {
        Param {
            rid: self.rid,
            token: self.token,
            flags: ParamAttributes::from_bits_retain(self.flags),
            sequence: self.sequence,
            name: ctx.string(self.name, TableId::Param, self.rid),
        }
    }
}
