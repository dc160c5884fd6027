//! ECMA-335 metadata tables.
//!
//! Each table kind has its own module holding two row types: the `*Raw`
//! struct mirroring the physical column layout (heap offsets and packed
//! indices as plain integers), and the linked struct the post-processing
//! pass produces, where every reference column has been resolved against
//! the heaps and the other tables or degraded to absent.
//!
//! The infrastructure lives beside them: [`TableLayout`] computes the
//! dynamic column widths, [`CodedIndex`] decodes packed cross-table
//! references, [`MetadataTable`] gives 1-based random access plus ordered
//! iteration over one table, and [`LinkedTables`] is the arena of linked
//! rows built by the [`linker`] pass.

pub(crate) mod layout;
pub(crate) mod linker;

mod coded;
mod table;

mod assembly;
mod assemblyos;
mod assemblyprocessor;
mod assemblyref;
mod assemblyrefos;
mod assemblyrefprocessor;
mod classlayout;
mod constant;
mod customattribute;
mod declsecurity;
mod event;
mod eventmap;
mod eventptr;
mod exportedtype;
mod field;
mod fieldlayout;
mod fieldmarshal;
mod fieldptr;
mod fieldrva;
mod file;
mod genericparam;
mod genericparamconstraint;
mod implmap;
mod interfaceimpl;
mod manifestresource;
mod memberref;
mod methoddef;
mod methodimpl;
mod methodptr;
mod methodsemantics;
mod methodspec;
mod module;
mod moduleref;
mod nestedclass;
mod param;
mod paramptr;
mod property;
mod propertymap;
mod propertyptr;
mod standalonesig;
mod typedef;
mod typeref;
mod typespec;

pub use assembly::{Assembly, AssemblyFlags, AssemblyRaw};
pub use assemblyos::{AssemblyOs, AssemblyOsRaw};
pub use assemblyprocessor::{AssemblyProcessor, AssemblyProcessorRaw};
pub use assemblyref::{AssemblyRef, AssemblyRefRaw};
pub use assemblyrefos::{AssemblyRefOs, AssemblyRefOsRaw};
pub use assemblyrefprocessor::{AssemblyRefProcessor, AssemblyRefProcessorRaw};
pub use classlayout::{ClassLayout, ClassLayoutRaw};
pub use coded::{CodedIndex, CodedIndexKind};
pub use constant::{Constant, ConstantRaw};
pub use customattribute::{CustomAttribute, CustomAttributeRaw};
pub use declsecurity::{DeclSecurity, DeclSecurityRaw};
pub use event::{Event, EventRaw};
pub use eventmap::{EventMap, EventMapRaw};
pub use eventptr::{EventPtr, EventPtrRaw};
pub use exportedtype::{ExportedType, ExportedTypeRaw};
pub use field::{Field, FieldRaw};
pub use fieldlayout::{FieldLayout, FieldLayoutRaw};
pub use fieldmarshal::{FieldMarshal, FieldMarshalRaw};
pub use fieldptr::{FieldPtr, FieldPtrRaw};
pub use fieldrva::{FieldRva, FieldRvaRaw};
pub use file::{File, FileAttributes, FileRaw};
pub use genericparam::{GenericParam, GenericParamRaw};
pub use genericparamconstraint::{GenericParamConstraint, GenericParamConstraintRaw};
pub use implmap::{ImplMap, ImplMapRaw};
pub use interfaceimpl::{InterfaceImpl, InterfaceImplRaw};
pub use layout::{TableLayout, TableLayoutRef};
pub use linker::{LinkedTables, RowRef, RowSet};
pub use manifestresource::{ManifestResource, ManifestResourceAttributes, ManifestResourceRaw};
pub use memberref::{MemberRef, MemberRefRaw};
pub use methoddef::{MethodAttributes, MethodDef, MethodDefRaw, MethodImplAttributes};
pub use methodimpl::{MethodImpl, MethodImplRaw};
pub use methodptr::{MethodPtr, MethodPtrRaw};
pub use methodsemantics::{MethodSemantics, MethodSemanticsRaw};
pub use methodspec::{MethodSpec, MethodSpecRaw};
pub use module::{Module, ModuleRaw};
pub use moduleref::{ModuleRef, ModuleRefRaw};
pub use nestedclass::{NestedClass, NestedClassRaw};
pub use param::{Param, ParamAttributes, ParamRaw};
pub use paramptr::{ParamPtr, ParamPtrRaw};
pub use property::{Property, PropertyRaw};
pub use propertymap::{PropertyMap, PropertyMapRaw};
pub use propertyptr::{PropertyPtr, PropertyPtrRaw};
pub use standalonesig::{StandAloneSig, StandAloneSigRaw};
pub use table::{MetadataTable, TableIter, TableLookup, TableRow};
pub use typedef::{TypeDef, TypeDefRaw};
pub use typeref::{TypeRef, TypeRefRaw};
pub use typespec::{TypeSpec, TypeSpecRaw};

use strum::{EnumCount, EnumIter};

/// Identifiers of the metadata tables this crate decodes, with their
/// ECMA-335 numbers.
///
/// The `valid` bitmap of the tables stream can name up to 64 tables; bits
/// outside this set stop table materialization with a warning because the
/// row size of an unknown table cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TableId {
    /// `Module` (0x00) - the current module. One row per image.
    Module = 0x00,
    /// `TypeRef` (0x01) - types imported from other scopes.
    TypeRef = 0x01,
    /// `TypeDef` (0x02) - types defined in this module.
    TypeDef = 0x02,
    /// `FieldPtr` (0x03) - field indirection for uncompressed streams.
    FieldPtr = 0x03,
    /// `Field` (0x04) - field definitions.
    Field = 0x04,
    /// `MethodPtr` (0x05) - method indirection for uncompressed streams.
    MethodPtr = 0x05,
    /// `MethodDef` (0x06) - method definitions.
    MethodDef = 0x06,
    /// `ParamPtr` (0x07) - parameter indirection for uncompressed streams.
    ParamPtr = 0x07,
    /// `Param` (0x08) - parameter definitions.
    Param = 0x08,
    /// `InterfaceImpl` (0x09) - interface implementations.
    InterfaceImpl = 0x09,
    /// `MemberRef` (0x0A) - member references into other scopes.
    MemberRef = 0x0A,
    /// `Constant` (0x0B) - compile-time constants.
    Constant = 0x0B,
    /// `CustomAttribute` (0x0C) - custom attribute applications.
    CustomAttribute = 0x0C,
    /// `FieldMarshal` (0x0D) - marshalling descriptors.
    FieldMarshal = 0x0D,
    /// `DeclSecurity` (0x0E) - declarative security.
    DeclSecurity = 0x0E,
    /// `ClassLayout` (0x0F) - explicit type layout.
    ClassLayout = 0x0F,
    /// `FieldLayout` (0x10) - explicit field offsets.
    FieldLayout = 0x10,
    /// `StandAloneSig` (0x11) - standalone signatures.
    StandAloneSig = 0x11,
    /// `EventMap` (0x12) - type-to-event ownership.
    EventMap = 0x12,
    /// `EventPtr` (0x13) - event indirection for uncompressed streams.
    EventPtr = 0x13,
    /// `Event` (0x14) - event definitions.
    Event = 0x14,
    /// `PropertyMap` (0x15) - type-to-property ownership.
    PropertyMap = 0x15,
    /// `PropertyPtr` (0x16) - property indirection for uncompressed streams.
    PropertyPtr = 0x16,
    /// `Property` (0x17) - property definitions.
    Property = 0x17,
    /// `MethodSemantics` (0x18) - accessor associations.
    MethodSemantics = 0x18,
    /// `MethodImpl` (0x19) - method implementation overrides.
    MethodImpl = 0x19,
    /// `ModuleRef` (0x1A) - external module references.
    ModuleRef = 0x1A,
    /// `TypeSpec` (0x1B) - type specifications.
    TypeSpec = 0x1B,
    /// `ImplMap` (0x1C) - P/Invoke mappings.
    ImplMap = 0x1C,
    /// `FieldRVA` (0x1D) - initialized field data locations.
    FieldRva = 0x1D,
    /// `Assembly` (0x20) - the assembly manifest.
    Assembly = 0x20,
    /// `AssemblyProcessor` (0x21) - processor info, rarely used.
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` (0x22) - OS info, rarely used.
    AssemblyOs = 0x22,
    /// `AssemblyRef` (0x23) - referenced assemblies.
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` (0x24) - processor info for references.
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` (0x25) - OS info for references.
    AssemblyRefOs = 0x25,
    /// `File` (0x26) - files of a multi-file assembly.
    File = 0x26,
    /// `ExportedType` (0x27) - types forwarded or exported.
    ExportedType = 0x27,
    /// `ManifestResource` (0x28) - the assembly's resources.
    ManifestResource = 0x28,
    /// `NestedClass` (0x29) - nesting relationships.
    NestedClass = 0x29,
    /// `GenericParam` (0x2A) - generic parameter definitions.
    GenericParam = 0x2A,
    /// `MethodSpec` (0x2B) - instantiated generic methods.
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` (0x2C) - generic parameter constraints.
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// Map a bit of the `valid` bitmap to a table identifier.
    #[must_use]
    pub fn from_bit(bit: u8) -> Option<TableId> {
        use strum::IntoEnumIterator;
        TableId::iter().find(|id| *id as u8 == bit)
    }
}

/// Registers every table: generates [`TableData`] and the
/// [`TableLookup`] impl tying each raw row type to its [`TableId`].
macro_rules! table_registry {
    ($( $variant:ident => $raw:ty ),+ $(,)?) => {
        /// Typed storage for one decoded table inside a tables stream.
        pub enum TableData<'a> {
            $(
                #[doc = concat!("The decoded `", stringify!($variant), "` table.")]
                $variant(MetadataTable<'a, $raw>),
            )+
        }

        impl<'a> TableData<'a> {
            /// Decode the table `id` from `data`.
            pub(crate) fn decode(
                id: TableId,
                data: &'a [u8],
                rva: u32,
                declared_rows: u32,
                layout: TableLayoutRef,
            ) -> TableData<'a> {
                match id {
                    $(
                        TableId::$variant => TableData::$variant(
                            MetadataTable::new(data, rva, declared_rows, layout),
                        ),
                    )+
                }
            }

            /// Bytes occupied by the decodable rows.
            #[must_use]
            pub fn byte_size(&self) -> usize {
                match self {
                    $( TableData::$variant(table) => table.byte_size(), )+
                }
            }

            /// Number of decodable rows.
            #[must_use]
            pub fn row_count(&self) -> u32 {
                match self {
                    $( TableData::$variant(table) => table.row_count(), )+
                }
            }

            /// Whether the declared rows were clamped to the stream size.
            #[must_use]
            pub fn is_truncated(&self) -> bool {
                match self {
                    $( TableData::$variant(table) => table.is_truncated(), )+
                }
            }
        }

        $(
            impl TableLookup for $raw {
                const TABLE_ID: TableId = TableId::$variant;

                fn from_data<'t, 'a>(
                    data: &'t TableData<'a>,
                ) -> Option<&'t MetadataTable<'a, Self>> {
                    match data {
                        TableData::$variant(table) => Some(table),
                        _ => None,
                    }
                }
            }
        )+
    };
}

table_registry! {
    Module => ModuleRaw,
    TypeRef => TypeRefRaw,
    TypeDef => TypeDefRaw,
    FieldPtr => FieldPtrRaw,
    Field => FieldRaw,
    MethodPtr => MethodPtrRaw,
    MethodDef => MethodDefRaw,
    ParamPtr => ParamPtrRaw,
    Param => ParamRaw,
    InterfaceImpl => InterfaceImplRaw,
    MemberRef => MemberRefRaw,
    Constant => ConstantRaw,
    CustomAttribute => CustomAttributeRaw,
    FieldMarshal => FieldMarshalRaw,
    DeclSecurity => DeclSecurityRaw,
    ClassLayout => ClassLayoutRaw,
    FieldLayout => FieldLayoutRaw,
    StandAloneSig => StandAloneSigRaw,
    EventMap => EventMapRaw,
    EventPtr => EventPtrRaw,
    Event => EventRaw,
    PropertyMap => PropertyMapRaw,
    PropertyPtr => PropertyPtrRaw,
    Property => PropertyRaw,
    MethodSemantics => MethodSemanticsRaw,
    MethodImpl => MethodImplRaw,
    ModuleRef => ModuleRefRaw,
    TypeSpec => TypeSpecRaw,
    ImplMap => ImplMapRaw,
    FieldRva => FieldRvaRaw,
    Assembly => AssemblyRaw,
    AssemblyProcessor => AssemblyProcessorRaw,
    AssemblyOs => AssemblyOsRaw,
    AssemblyRef => AssemblyRefRaw,
    AssemblyRefProcessor => AssemblyRefProcessorRaw,
    AssemblyRefOs => AssemblyRefOsRaw,
    File => FileRaw,
    ExportedType => ExportedTypeRaw,
    ManifestResource => ManifestResourceRaw,
    NestedClass => NestedClassRaw,
    GenericParam => GenericParamRaw,
    MethodSpec => MethodSpecRaw,
    GenericParamConstraint => GenericParamConstraintRaw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bit() {
        assert_eq!(TableId::from_bit(0x00), Some(TableId::Module));
        assert_eq!(TableId::from_bit(0x2C), Some(TableId::GenericParamConstraint));
        assert_eq!(TableId::from_bit(0x1E), None);
        assert_eq!(TableId::from_bit(0x3F), None);
    }

    #[test]
    fn declaration_order_is_ascending() {
        use strum::IntoEnumIterator;

        let ids: Vec<u8> = TableId::iter().map(|id| id as u8).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
