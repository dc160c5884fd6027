//! The row linking pass.
//!
//! After the tables stream is decoded, every row still holds raw integers:
//! heap offsets, simple indices and packed coded indices. This pass turns
//! each of them into a semantic value - an owned heap value, a validated
//! [`RowRef`], or a materialized run of child rows - and degrades anything
//! unreadable to absent while reporting the precise error through the
//! diagnostic sink. The row itself always survives.
//!
//! Rows are stored in one arena per table ([`RowSet`], 1-based like the
//! physical tables) and cross-reference each other through
//! `(table, row)` pairs rather than ownership, which keeps mutually
//! referential tables (`NestedClass` both ways, for instance) simple.

use crate::{
    metadata::{
        diagnostics::{DiagnosticContext, DiagnosticSink},
        streams::{BlobHeap, GuidHeap, StringsHeap, TablesStream},
        tables::{CodedIndex, TableId, TableLookup},
        token::Token,
    },
    Error,
};

/// A validated reference to a row of some table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRef {
    /// The table holding the referenced row.
    pub table: TableId,
    /// The 1-based row index.
    pub row: u32,
}

impl RowRef {
    /// Build a reference.
    #[must_use]
    pub fn new(table: TableId, row: u32) -> RowRef {
        RowRef { table, row }
    }

    /// The metadata token of the referenced row.
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(self.table, self.row)
    }
}

/// Arena of linked rows for one table, addressed 1-based like the
/// physical table it mirrors.
#[derive(Debug, Clone)]
pub struct RowSet<T> {
    rows: Vec<T>,
}

impl<T> Default for RowSet<T> {
    fn default() -> Self {
        RowSet { rows: Vec::new() }
    }
}

impl<T> RowSet<T> {
    /// Wrap the linked rows of one table.
    #[must_use]
    pub fn new(rows: Vec<T>) -> RowSet<T> {
        RowSet { rows }
    }

    /// The row at the 1-based `rid`; index zero and out-of-range indexes
    /// are absent.
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<&T> {
        if rid == 0 {
            return None;
        }
        self.rows.get(rid as usize - 1)
    }

    /// All rows in physical order, for 0-based iteration.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty or absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything a `link()` implementation may consult.
pub(crate) struct LinkContext<'a, 'b> {
    /// The decoded tables stream.
    pub tables: &'b TablesStream<'a>,
    /// The `#Strings` heap, when present.
    pub strings: Option<&'b StringsHeap<'a>>,
    /// The `#GUID` heap, when present.
    pub guids: Option<&'b GuidHeap<'a>>,
    /// The `#Blob` heap, when present.
    pub blobs: Option<&'b BlobHeap<'a>>,
    /// Warning receiver.
    pub sink: &'b dyn DiagnosticSink,
}

impl LinkContext<'_, '_> {
    fn warn(&self, error: &Error, table: TableId, rid: u32) {
        self.sink
            .warn(error.to_string(), DiagnosticContext::at_row(table, rid));
    }

    /// Resolve a `#Strings` column. Offset zero is the empty string.
    pub(crate) fn string(&self, index: u32, table: TableId, rid: u32) -> Option<String> {
        if index == 0 {
            return Some(String::new());
        }

        let Some(heap) = self.strings else {
            self.warn(
                &Error::HeapIndexOutOfRange {
                    heap: "#Strings",
                    index: index as usize,
                },
                table,
                rid,
            );
            return None;
        };

        match heap.try_get(index as usize) {
            Ok(item) => Some(item.value.to_string()),
            Err(error) => {
                self.warn(&error, table, rid);
                None
            }
        }
    }

    /// Resolve a `#GUID` column. Index zero means no GUID.
    pub(crate) fn guid(&self, index: u32, table: TableId, rid: u32) -> Option<uguid::Guid> {
        if index == 0 {
            return None;
        }

        let Some(heap) = self.guids else {
            self.warn(
                &Error::HeapIndexOutOfRange {
                    heap: "#GUID",
                    index: index as usize,
                },
                table,
                rid,
            );
            return None;
        };

        match heap.try_get(index as usize) {
            Ok(item) => Some(item.value),
            Err(error) => {
                self.warn(&error, table, rid);
                None
            }
        }
    }

    /// Resolve a `#Blob` column. Offset zero is the empty blob.
    pub(crate) fn blob(&self, index: u32, table: TableId, rid: u32) -> Option<Vec<u8>> {
        if index == 0 {
            return Some(Vec::new());
        }

        let Some(heap) = self.blobs else {
            self.warn(
                &Error::HeapIndexOutOfRange {
                    heap: "#Blob",
                    index: index as usize,
                },
                table,
                rid,
            );
            return None;
        };

        match heap.try_get(index as usize) {
            Ok(item) => Some(item.value.to_vec()),
            Err(error) => {
                self.warn(&error, table, rid);
                None
            }
        }
    }

    /// Resolve a simple index column into `target`. Index zero is a null
    /// reference; an index past the target table's rows warns and
    /// degrades to absent.
    pub(crate) fn row(
        &self,
        target: TableId,
        index: u32,
        table: TableId,
        rid: u32,
    ) -> Option<RowRef> {
        if index == 0 {
            return None;
        }

        if index > self.tables.row_count(target) {
            self.warn(
                &Error::TableIndexOutOfRange {
                    table: target,
                    row: index,
                },
                table,
                rid,
            );
            return None;
        }

        Some(RowRef::new(target, index))
    }

    /// Resolve a coded index column.
    pub(crate) fn coded(&self, index: &CodedIndex, table: TableId, rid: u32) -> Option<RowRef> {
        if index.is_null() {
            return None;
        }

        let Some(target) = index.table else {
            self.warn(
                &Error::UnknownCodedIndexTag {
                    kind: index.kind,
                    tag: index.tag,
                },
                table,
                rid,
            );
            return None;
        };

        if index.row > self.tables.row_count(target) {
            self.warn(
                &Error::TableIndexOutOfRange {
                    table: target,
                    row: index.row,
                },
                table,
                rid,
            );
            return None;
        }

        Some(RowRef::new(target, index.row))
    }

    /// Materialize a run-list column: this row's start index together
    /// with the next parent row's start delimits the owned child rows;
    /// the last parent owns through the end of the child table.
    ///
    /// An empty run yields an empty sequence, a run of one yields a
    /// single-element sequence; neither is ever elided to absent.
    pub(crate) fn run_list(
        &self,
        child: TableId,
        start: u32,
        next_start: Option<u32>,
        table: TableId,
        rid: u32,
    ) -> Vec<RowRef> {
        let child_rows = self.tables.row_count(child);

        if start == 0 {
            return Vec::new();
        }

        let mut end = match next_start {
            Some(next) if next != 0 => next,
            _ => child_rows + 1,
        };

        if end > child_rows + 1 {
            self.warn(
                &Error::TableIndexOutOfRange {
                    table: child,
                    row: end,
                },
                table,
                rid,
            );
            end = child_rows + 1;
        }

        if start > child_rows + 1 {
            self.warn(
                &Error::TableIndexOutOfRange {
                    table: child,
                    row: start,
                },
                table,
                rid,
            );
            return Vec::new();
        }

        if end < start {
            self.warn(
                &decoding_error!(
                    "run into {:?} ends before it starts ({} < {})",
                    child,
                    end,
                    start
                ),
                table,
                rid,
            );
            return Vec::new();
        }

        (start..end).map(|row| RowRef::new(child, row)).collect()
    }

    /// The raw row following `rid` in `T`'s table, used to find the end
    /// of run-list columns.
    pub(crate) fn next_row<T: TableLookup>(&self, rid: u32) -> Option<T> {
        self.tables.table::<T>().and_then(|table| table.get(rid + 1))
    }
}

/// Generates the [`LinkedTables`] struct and its build routine.
macro_rules! linked_tables {
    ($( $field:ident : $linked:ty => $raw:ty ),+ $(,)?) => {
        /// All linked rows of an image, one arena per table.
        #[derive(Default)]
        pub struct LinkedTables {
            $(
                #[doc = concat!("Linked rows of the `", stringify!($linked), "` table.")]
                pub $field: RowSet<$linked>,
            )+
        }

        impl LinkedTables {
            pub(crate) fn build(ctx: &LinkContext) -> LinkedTables {
                LinkedTables {
                    $(
                        $field: RowSet::new(
                            ctx.tables
                                .table::<$raw>()
                                .map(|table| {
                                    table.iter().map(|row| row.link(ctx)).collect()
                                })
                                .unwrap_or_default(),
                        ),
                    )+
                }
            }
        }
    };
}

use super::{
    Assembly, AssemblyOs, AssemblyOsRaw, AssemblyProcessor, AssemblyProcessorRaw, AssemblyRaw,
    AssemblyRef, AssemblyRefOs, AssemblyRefOsRaw, AssemblyRefProcessor, AssemblyRefProcessorRaw,
    AssemblyRefRaw, ClassLayout, ClassLayoutRaw, Constant, ConstantRaw, CustomAttribute,
    CustomAttributeRaw, DeclSecurity, DeclSecurityRaw, Event, EventMap, EventMapRaw, EventPtr,
    EventPtrRaw, EventRaw, ExportedType, ExportedTypeRaw, Field, FieldLayout, FieldLayoutRaw,
    FieldMarshal, FieldMarshalRaw, FieldPtr, FieldPtrRaw, FieldRaw, FieldRva, FieldRvaRaw, File,
    FileRaw, GenericParam, GenericParamConstraint, GenericParamConstraintRaw, GenericParamRaw,
    ImplMap, ImplMapRaw, InterfaceImpl, InterfaceImplRaw, ManifestResource, ManifestResourceRaw,
    MemberRef, MemberRefRaw, MethodDef, MethodDefRaw, MethodImpl, MethodImplRaw, MethodPtr,
    MethodPtrRaw, MethodSemantics, MethodSemanticsRaw, MethodSpec, MethodSpecRaw, Module,
    ModuleRaw, ModuleRef, ModuleRefRaw, NestedClass, NestedClassRaw, Param, ParamPtr, ParamPtrRaw,
    ParamRaw, Property, PropertyMap, PropertyMapRaw, PropertyPtr, PropertyPtrRaw, PropertyRaw,
    StandAloneSig, StandAloneSigRaw, TypeDef, TypeDefRaw, TypeRef, TypeRefRaw, TypeSpec,
    TypeSpecRaw,
};

linked_tables! {
    module: Module => ModuleRaw,
    type_ref: TypeRef => TypeRefRaw,
    type_def: TypeDef => TypeDefRaw,
    field_ptr: FieldPtr => FieldPtrRaw,
    field: Field => FieldRaw,
    method_ptr: MethodPtr => MethodPtrRaw,
    method_def: MethodDef => MethodDefRaw,
    param_ptr: ParamPtr => ParamPtrRaw,
    param: Param => ParamRaw,
    interface_impl: InterfaceImpl => InterfaceImplRaw,
    member_ref: MemberRef => MemberRefRaw,
    constant: Constant => ConstantRaw,
    custom_attribute: CustomAttribute => CustomAttributeRaw,
    field_marshal: FieldMarshal => FieldMarshalRaw,
    decl_security: DeclSecurity => DeclSecurityRaw,
    class_layout: ClassLayout => ClassLayoutRaw,
    field_layout: FieldLayout => FieldLayoutRaw,
    stand_alone_sig: StandAloneSig => StandAloneSigRaw,
    event_map: EventMap => EventMapRaw,
    event_ptr: EventPtr => EventPtrRaw,
    event: Event => EventRaw,
    property_map: PropertyMap => PropertyMapRaw,
    property_ptr: PropertyPtr => PropertyPtrRaw,
    property: Property => PropertyRaw,
    method_semantics: MethodSemantics => MethodSemanticsRaw,
    method_impl: MethodImpl => MethodImplRaw,
    module_ref: ModuleRef => ModuleRefRaw,
    type_spec: TypeSpec => TypeSpecRaw,
    impl_map: ImplMap => ImplMapRaw,
    field_rva: FieldRva => FieldRvaRaw,
    assembly: Assembly => AssemblyRaw,
    assembly_processor: AssemblyProcessor => AssemblyProcessorRaw,
    assembly_os: AssemblyOs => AssemblyOsRaw,
    assembly_ref: AssemblyRef => AssemblyRefRaw,
    assembly_ref_processor: AssemblyRefProcessor => AssemblyRefProcessorRaw,
    assembly_ref_os: AssemblyRefOs => AssemblyRefOsRaw,
    file: File => FileRaw,
    exported_type: ExportedType => ExportedTypeRaw,
    manifest_resource: ManifestResource => ManifestResourceRaw,
    nested_class: NestedClass => NestedClassRaw,
    generic_param: GenericParam => GenericParamRaw,
    method_spec: MethodSpec => MethodSpecRaw,
    generic_param_constraint: GenericParamConstraint => GenericParamConstraintRaw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_set_indexing() {
        let set = RowSet::new(vec!["a", "b", "c"]);

        assert_eq!(set.len(), 3);
        assert!(set.get(0).is_none());
        assert_eq!(set.get(1), Some(&"a"));
        assert_eq!(set.get(3), Some(&"c"));
        assert!(set.get(4).is_none());
        assert_eq!(set.rows(), &["a", "b", "c"]);
    }

    #[test]
    fn row_ref_token() {
        let reference = RowRef::new(TableId::AssemblyRef, 2);
        assert_eq!(reference.token().value(), 0x2300_0002);
    }
}
