//! The `MethodDef` table (0x06).
//!
//! Method definitions. `param_list` is a run-list column into the `Param`
//! table; a method with an RVA of zero has no IL body in this image
//! (abstract, runtime-provided, or forwarded through P/Invoke).

use bitflags::bitflags;

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{linker::LinkContext, RowRef, TableId, TableLayout, TableRow},
        token::Token,
    },
    Result,
};

bitflags! {
    /// `MethodAttributes` (ECMA-335 II.23.1.10).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodAttributes: u16 {
        /// Member not referenceable.
        const PRIVATE_SCOPE = 0x0000;
        /// Accessible only by the parent type.
        const PRIVATE = 0x0001;
        /// Accessible by sub-types only in this assembly.
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible by anyone in the assembly.
        const ASSEM = 0x0003;
        /// Accessible only by type and sub-types.
        const FAMILY = 0x0004;
        /// Accessible by sub-types anywhere, plus anyone in the assembly.
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible by anyone who has visibility to this scope.
        const PUBLIC = 0x0006;
        /// Defined on the type, not per instance.
        const STATIC = 0x0010;
        /// Method may not be overridden.
        const FINAL = 0x0020;
        /// Method is virtual.
        const VIRTUAL = 0x0040;
        /// Method hides by name and signature.
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new vtable slot.
        const NEW_SLOT = 0x0100;
        /// Method can only be overridden when also accessible.
        const STRICT = 0x0200;
        /// Method does not provide an implementation.
        const ABSTRACT = 0x0400;
        /// The name describes special semantics.
        const SPECIAL_NAME = 0x0800;
        /// Implementation is forwarded through P/Invoke.
        const PINVOKE_IMPL = 0x2000;
        /// Managed method exported to unmanaged code.
        const UNMANAGED_EXPORT = 0x0008;
        /// The runtime checks the name encoding.
        const RT_SPECIAL_NAME = 0x1000;
        /// Method has declarative security.
        const HAS_SECURITY = 0x4000;
        /// Method calls another method containing security code.
        const REQUIRE_SEC_OBJECT = 0x8000;
    }
}

bitflags! {
    /// `MethodImplAttributes` (ECMA-335 II.23.1.11).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodImplAttributes: u16 {
        /// Implementation is IL.
        const IL = 0x0000;
        /// Implementation is native code.
        const NATIVE = 0x0001;
        /// Implementation is OPTIL.
        const OPTIL = 0x0002;
        /// Implementation is provided by the runtime.
        const RUNTIME = 0x0003;
        /// Implementation is unmanaged.
        const UNMANAGED = 0x0004;
        /// Method is defined elsewhere (merge scenarios).
        const FORWARD_REF = 0x0010;
        /// Signature is exported exactly as declared.
        const PRESERVE_SIG = 0x0080;
        /// Reserved for internal runtime use.
        const INTERNAL_CALL = 0x1000;
        /// Single-threaded through the body.
        const SYNCHRONIZED = 0x0020;
        /// Method may not be inlined.
        const NO_INLINING = 0x0008;
        /// Method will not be optimized by the JIT.
        const NO_OPTIMIZATION = 0x0040;
        /// Method should be inlined aggressively.
        const AGGRESSIVE_INLINING = 0x0100;
    }
}

/// Physical `MethodDef` row.
#[derive(Debug, Clone)]
pub struct MethodDefRaw {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// Byte offset of the row within its table.
    pub offset: usize,
    /// RVA of the method body, zero when the method has no body here.
    pub rva: u32,
    /// `MethodImplAttributes` bitmask.
    pub impl_flags: u16,
    /// `MethodAttributes` bitmask.
    pub flags: u16,
    /// `#Strings` index of the method name.
    pub name: u32,
    /// `#Blob` index of the method signature.
    pub signature: u32,
    /// Start of this method's parameter run in the `Param` table.
    pub param_list: u32,
}

impl TableRow for MethodDefRaw {
    #[rustfmt::skip]
    fn row_size(layout: &TableLayout) -> u32 {
        u32::from(
            /* rva */        4 +
            /* impl_flags */ 2 +
            /* flags */      2 +
            /* name */       layout.str_bytes() +
            /* signature */  layout.blob_bytes() +
            /* param_list */ layout.index_bytes(TableId::Param)
        )
    }

    fn read(data: &[u8], offset: &mut usize, rid: u32, layout: &TableLayout) -> Result<Self> {
        Ok(MethodDefRaw {
            rid,
            token: Token::from_parts(TableId::MethodDef, rid),
            offset: *offset,
            rva: read_le_at::<u32>(data, offset)?,
            impl_flags: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, layout.wide_strings())?,
            signature: read_le_at_dyn(data, offset, layout.wide_blobs())?,
            param_list: read_le_at_dyn(data, offset, layout.wide_index(TableId::Param))?,
        })
    }
}

/// Linked `MethodDef` row.
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// 1-based row id.
    pub rid: u32,
    /// Metadata token of this row.
    pub token: Token,
    /// RVA of the method body, zero when absent.
    pub rva: u32,
    /// Implementation attributes.
    pub impl_flags: MethodImplAttributes,
    /// Method attributes.
    pub flags: MethodAttributes,
    /// Method name.
    pub name: Option<String>,
    /// Method signature blob.
    pub signature: Option<Vec<u8>>,
    /// The parameters this method owns, in sequence order.
    pub params: Vec<RowRef>,
}

impl MethodDefRaw {
    pub(crate) fn link(&self, ctx: &LinkContext) -> MethodDef {
        let next = ctx.next_row::<MethodDefRaw>(self.rid);

        MethodDef {
            rid: self.rid,
            token: self.token,
            rva: self.rva,
            impl_flags: MethodImplAttributes::from_bits_retain(self.impl_flags),
            flags: MethodAttributes::from_bits_retain(self.flags),
            name: ctx.string(self.name, TableId::MethodDef, self.rid),
            signature: ctx.blob(self.signature, TableId::MethodDef, self.rid),
            params: ctx.run_list(
                TableId::Param,
                self.param_list,
                next.as_ref().map(|row| row.param_list),
                TableId::MethodDef,
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
            0x50, 0x20, 0x00, 0x00, // rva
            0x00, 0x00, // impl_flags
            0x96, 0x00, // flags: public | hidebysig | static
            0x42, 0x00, // name
            0x10, 0x00, // signature
            0x01, 0x00, // param_list
        ];

        let layout = TableLayout::for_tests(
            &[(TableId::MethodDef, 1), (TableId::Param, 2)],
            false,
            false,
            false,
        );
        let table = MetadataTable::<MethodDefRaw>::new(&data, 0, 1, layout);

        let row = table.get(1).unwrap();
        assert_eq!(row.token.value(), 0x0600_0001);
        assert_eq!(row.rva, 0x2050);
        assert_eq!(row.flags, 0x0096);
        assert_eq!(row.name, 0x42);
        assert_eq!(row.signature, 0x10);
        assert_eq!(row.param_list, 1);
    }
}
