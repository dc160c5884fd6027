//! Coded indices.
//!
//! A coded index packs a tag selecting one of several candidate tables and
//! a 1-based row index into a single integer:
//! `value = tag | (row << tag_bits)` where `tag_bits` is the smallest
//! number of bits that distinguishes the candidates. The physical column
//! is 2 bytes unless any candidate table has `2^(16 - tag_bits)` rows or
//! more.
//!
//! # Reference
//! - ECMA-335 II.24.2.6; Portable PDB format for
//!   [`CodedIndexKind::HasCustomDebugInformation`]

use strum::{EnumCount, EnumIter};

use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{TableId, TableLayout},
        token::Token,
    },
    Result,
};

/// The coded-index kinds and their candidate table lists.
///
/// Candidate slots are `Option<TableId>`: a `None` slot is a tag value the
/// format reserves but assigns no table (the unused `CustomAttributeType`
/// tags, and the Portable-PDB-only targets of `HasCustomDebugInformation`
/// that carry no metadata table in this stream). Decoding such a tag
/// resolves to no table at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum CodedIndexKind {
    /// `TypeDef`, `TypeRef` or `TypeSpec`.
    TypeDefOrRef,
    /// `Field`, `Param` or `Property`.
    HasConstant,
    /// Any row kind that can carry a custom attribute.
    HasCustomAttribute,
    /// `Field` or `Param`.
    HasFieldMarshal,
    /// `TypeDef`, `MethodDef` or `Assembly`.
    HasDeclSecurity,
    /// `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef` or `TypeSpec`.
    MemberRefParent,
    /// `Event` or `Property`.
    HasSemantics,
    /// `MethodDef` or `MemberRef`.
    MethodDefOrRef,
    /// `Field` or `MethodDef`.
    MemberForwarded,
    /// `File`, `AssemblyRef` or `ExportedType`.
    Implementation,
    /// `MethodDef` or `MemberRef`; tags 0, 1 and 4 are unused.
    CustomAttributeType,
    /// `Module`, `ModuleRef`, `AssemblyRef` or `TypeRef`.
    ResolutionScope,
    /// `TypeDef` or `MethodDef`.
    TypeOrMethodDef,
    /// Any row kind that can carry custom debug information (Portable
    /// PDB).
    HasCustomDebugInformation,
}

impl CodedIndexKind {
    /// The candidate table list, indexed by tag value.
    #[must_use]
    pub fn tables(&self) -> &'static [Option<TableId>] {
        use TableId::*;

        match self {
            CodedIndexKind::TypeDefOrRef => &[Some(TypeDef), Some(TypeRef), Some(TypeSpec)],
            CodedIndexKind::HasConstant => &[Some(Field), Some(Param), Some(Property)],
            CodedIndexKind::HasCustomAttribute => &[
                Some(MethodDef),
                Some(Field),
                Some(TypeRef),
                Some(TypeDef),
                Some(Param),
                Some(InterfaceImpl),
                Some(MemberRef),
                Some(Module),
                // Tag 8 is labeled "Permission" in the standard; the table
                // behind it is DeclSecurity.
                Some(DeclSecurity),
                Some(Property),
                Some(Event),
                Some(StandAloneSig),
                Some(ModuleRef),
                Some(TypeSpec),
                Some(Assembly),
                Some(AssemblyRef),
                Some(File),
                Some(ExportedType),
                Some(ManifestResource),
                Some(GenericParam),
                Some(GenericParamConstraint),
                Some(MethodSpec),
            ],
            CodedIndexKind::HasFieldMarshal => &[Some(Field), Some(Param)],
            CodedIndexKind::HasDeclSecurity => {
                &[Some(TypeDef), Some(MethodDef), Some(Assembly)]
            }
            CodedIndexKind::MemberRefParent => &[
                Some(TypeDef),
                Some(TypeRef),
                Some(ModuleRef),
                Some(MethodDef),
                Some(TypeSpec),
            ],
            CodedIndexKind::HasSemantics => &[Some(Event), Some(Property)],
            CodedIndexKind::MethodDefOrRef => &[Some(MethodDef), Some(MemberRef)],
            CodedIndexKind::MemberForwarded => &[Some(Field), Some(MethodDef)],
            CodedIndexKind::Implementation => {
                &[Some(File), Some(AssemblyRef), Some(ExportedType)]
            }
            CodedIndexKind::CustomAttributeType => {
                &[None, None, Some(MethodDef), Some(MemberRef), None]
            }
            CodedIndexKind::ResolutionScope => &[
                Some(Module),
                Some(ModuleRef),
                Some(AssemblyRef),
                Some(TypeRef),
            ],
            CodedIndexKind::TypeOrMethodDef => &[Some(TypeDef), Some(MethodDef)],
            CodedIndexKind::HasCustomDebugInformation => &[
                Some(MethodDef),
                Some(Field),
                Some(TypeRef),
                Some(TypeDef),
                Some(Param),
                Some(InterfaceImpl),
                Some(MemberRef),
                Some(Module),
                Some(DeclSecurity),
                Some(Property),
                Some(Event),
                Some(StandAloneSig),
                Some(ModuleRef),
                Some(TypeSpec),
                Some(Assembly),
                Some(AssemblyRef),
                Some(File),
                Some(ExportedType),
                Some(ManifestResource),
                Some(GenericParam),
                Some(GenericParamConstraint),
                Some(MethodSpec),
                // Document, LocalScope, LocalVariable, LocalConstant and
                // ImportScope live in Portable PDB streams, not here.
                None,
                None,
                None,
                None,
                None,
            ],
        }
    }

    /// Number of tag bits: the smallest width covering every candidate.
    #[must_use]
    pub fn tag_bits(&self) -> u8 {
        let candidates = self.tables().len() as u32;
        (32 - (candidates - 1).leading_zeros()) as u8
    }
}

/// A decoded coded-index column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedIndex {
    /// Which coded-index kind this value belongs to.
    pub kind: CodedIndexKind,
    /// The packed integer as stored in the row.
    pub raw: u32,
    /// The tag portion.
    pub tag: u32,
    /// The 1-based row index portion; zero means a null reference.
    pub row: u32,
    /// The candidate table the tag selects, or `None` for a tag with no
    /// table behind it.
    pub table: Option<TableId>,
}

impl CodedIndex {
    /// Decode a packed value.
    #[must_use]
    pub fn decode(kind: CodedIndexKind, raw: u32) -> CodedIndex {
        let tag_bits = kind.tag_bits();
        let tag = raw & ((1 << tag_bits) - 1);
        let row = raw >> tag_bits;

        let table = kind
            .tables()
            .get(tag as usize)
            .copied()
            .flatten();

        CodedIndex {
            kind,
            raw,
            tag,
            row,
            table,
        }
    }

    /// Read a coded-index column at `offset`, using the width the layout
    /// computed for `kind`.
    ///
    /// Unknown tags are represented, not rejected; only a truncated column
    /// fails.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        layout: &TableLayout,
        kind: CodedIndexKind,
    ) -> Result<CodedIndex> {
        let raw = read_le_at_dyn(data, offset, layout.wide_coded(kind))?;
        Ok(CodedIndex::decode(kind, raw))
    }

    /// Whether this is a null reference (row index zero).
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row == 0
    }

    /// The metadata token of the referenced row, when the tag selects a
    /// table.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.table.map(|table| Token::from_parts(table, self.row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_widths() {
        assert_eq!(CodedIndexKind::TypeDefOrRef.tag_bits(), 2);
        assert_eq!(CodedIndexKind::HasFieldMarshal.tag_bits(), 1);
        assert_eq!(CodedIndexKind::MemberRefParent.tag_bits(), 3);
        assert_eq!(CodedIndexKind::HasCustomAttribute.tag_bits(), 5);
        assert_eq!(CodedIndexKind::CustomAttributeType.tag_bits(), 3);
        assert_eq!(CodedIndexKind::HasCustomDebugInformation.tag_bits(), 5);
    }

    #[test]
    fn decode_resolution_scope() {
        // tag 2 = AssemblyRef, row 3.
        let value = 2 | (3 << 2);
        let index = CodedIndex::decode(CodedIndexKind::ResolutionScope, value);

        assert_eq!(index.table, Some(TableId::AssemblyRef));
        assert_eq!(index.row, 3);
        assert_eq!(index.token().unwrap().value(), 0x2300_0003);
        assert!(!index.is_null());
    }

    #[test]
    fn null_reference() {
        let index = CodedIndex::decode(CodedIndexKind::Implementation, 0);
        assert!(index.is_null());
        assert_eq!(index.table, Some(TableId::File));
        assert_eq!(index.row, 0);
    }

    #[test]
    fn unused_tag_has_no_table() {
        // CustomAttributeType tag 0 is reserved.
        let index = CodedIndex::decode(CodedIndexKind::CustomAttributeType, 0 | (5 << 3));
        assert_eq!(index.table, None);
        assert_eq!(index.row, 5);
        assert_eq!(index.token(), None);

        // Tags past the candidate list behave the same.
        let index = CodedIndex::decode(CodedIndexKind::TypeDefOrRef, 3 | (1 << 2));
        assert_eq!(index.table, None);
    }

    #[test]
    fn read_uses_layout_width() {
        let layout = crate::metadata::tables::TableLayout::for_tests(
            &[(TableId::TypeSpec, 0x4000)],
            false,
            false,
            false,
        );

        // Wide column: 4 bytes.
        let data = [0x02, 0x00, 0x01, 0x00];
        let mut offset = 0;
        let index =
            CodedIndex::read(&data, &mut offset, &layout, CodedIndexKind::TypeDefOrRef).unwrap();
        assert_eq!(offset, 4);
        assert_eq!(index.table, Some(TableId::TypeSpec));
        assert_eq!(index.row, 0x4000);
    }
}
