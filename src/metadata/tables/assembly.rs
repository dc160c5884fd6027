//! The `Assembly` table (0x20): the assembly manifest, one row at most.

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
    /// `AssemblyFlags` (ECMA-335 II.23.1.2).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AssemblyFlags: u32 {
        /// The assembly reference holds the full public key.
        const PUBLIC_KEY = 0x0001;
        /// The assembly may be retargeted at runtime.
        const RETARGETABLE = 0x0100;
        /// The JIT compiler should not generate optimized code.
        const DISABLE_JIT_COMPILE_OPTIMIZER = 0x4000;
        /// The JIT compiler should generate tracking information.
        const ENABLE_JIT_COMPILE_TRACKING = 0x8000;
    }
}

/// Physical `Assembly` row.
#[derive(Debug, Clone)]
pub struct AssemblyRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// Hash algorithm used for file hashes (`AssemblyHashAlgorithm`).
    pub hash_alg_id: u32,
    /// Major version.
    pub major_version: u16,
    /// Minor version.
    pub minor_version: u16,
    /// Build number.
    pub build_number: u16,
    /// Revision number.
    pub revision_number: u16,
    /// `AssemblyFlags` bitmask.
    pub flags: u32,
    /// `#Blob` index of the public key.
    pub public_key: u32,
    /// `#Strings` index of the assembly name.
    pub name: u32,
    /// `#Strings` index of the culture string.
    pub culture: u32,
}

impl TableRow for AssemblyRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* hash_alg_id */ 4 +
            /* versions */    8 +
            /* flags */       4 +
            /* public_key */  layout.blob_bytes() +
            /* name */        layout.str_bytes() +
            /* culture */     layout.str_bytes()
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(AssemblyRaw {
            rid,
            token: Token::from_parts(TableId::Assembly, rid),
            offset: *offset,
            hash_alg_id: read_le_at::<u32>(data, offset)?,
            major_version: read_le_at::<u16>(data, offset)?,
            minor_version: read_le_at::<u16>(data, offset)?,
            build_number: read_le_at::<u16>(data, offset)?,
            revision_number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            public_key: read_le_at_dyn(data, offset, layout.wide_blobs())?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            culture: read_le_at_dyn(data, offset, layout.wide_strings())?,
        })
    }
}

/// Linked `Assembly` row.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Hash algorithm used for file hashes.
    pub hash_alg_id: u32,
    /// Major version.
    pub major_version: u16,
    /// Minor version.
    pub minor_version: u16,
    /// Build number.
    pub build_number: u16,
    /// Revision number.
    pub revision_number: u16,
    /// Assembly flags.
    pub flags: AssemblyFlags,
    /// Public key blob.
    pub public_key: Option<Vec<u8>>,
    /// Assembly name.
    pub name: Option<String>,
    /// Culture string; empty for culture-neutral assemblies.
    pub culture: Option<String>,
}

impl AssemblyRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> Assembly {
        Assembly {
            rid: self.rid,
            token: self.token,
            hash_alg_id: self.hash_alg_id,
            major_version: self.major_version,
            minor_version: self.minor_version,
            build_number: self.build_number,
            revision_number: self.revision_number,
            flags: AssemblyFlags::from_bits_retain(self.flags),
            public_key: ctx.blob(self.public_key, TableId::Assembly, self.rid),
            name: ctx.string(self.name, TableId::Assembly, self.rid),
            culture: ctx.string(self.culture, TableId::Assembly, self.rid),
        }
    }
}
