//! End-to-end decoding scenarios against crafted images.

mod common;

use common::{strings_heap, tables_stream, ImageBuilder};
use dotmeta::{
    metadata::tables::{RowRef, TableId},
    CilImage, LoadOptions, Method,
};

fn module_row(name_offset: u32) -> Vec<u8> {
    let mut row = Vec::new();
    row.extend_from_slice(&0u16.to_le_bytes()); // generation
    row.extend_from_slice(&(name_offset as u16).to_le_bytes());
    row.extend_from_slice(&1u16.to_le_bytes()); // mvid
    row.extend_from_slice(&0u16.to_le_bytes()); // encid
    row.extend_from_slice(&0u16.to_le_bytes()); // encbaseid
    row
}

#[test]
fn minimal_module() {
    let (strings, offsets) = strings_heap(&["hello.dll"]);
    let tables = tables_stream(&[(0x00, 1)], &module_row(offsets[0]));

    let image = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .stream("#GUID", vec![0u8; 16])
        .build();
    let image = CilImage::from_mem(image).unwrap();

    assert_eq!(image.metadata_root().version, "v4.0.30319");
    assert_eq!(image.clr_header().major_runtime_version, 2);

    let raw = image.tables_raw().unwrap();
    assert_eq!(raw.row_count(TableId::Module), 1);

    let module = image.tables().module.get(1).unwrap();
    assert_eq!(module.name.as_deref(), Some("hello.dll"));
    assert_eq!(module.mvid.unwrap().to_bytes(), [0u8; 16]);
    assert_eq!(module.token.value(), 0x0000_0001);

    // 1-based boundaries.
    assert!(image.tables().module.get(0).is_none());
    assert!(image.tables().module.get(2).is_none());

    // The GUID heap is a 0-based sequence of heap_size / 16 records.
    let guids = image.guids().unwrap();
    assert_eq!(guids.count(), 1);
    assert_eq!(guids.iter().count(), 1);
    assert!(guids.get(0).is_none());
    assert!(guids.get(2).is_none());
}

#[test]
fn heap_items_roundtrip_to_their_rva() {
    let (strings, offsets) = strings_heap(&["hello.dll"]);
    let tables = tables_stream(&[(0x00, 1)], &module_row(offsets[0]));

    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .stream("#GUID", vec![0u8; 16])
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    let item = image.strings().unwrap().try_get(1).unwrap();
    assert_eq!(item.value, "hello.dll");

    // The raw bytes must be exactly what sits at the item's RVA.
    let offset = image.file().rva_to_offset(item.rva as usize).unwrap();
    let on_disk = image.file().data_slice(offset, item.raw.len()).unwrap();
    assert_eq!(on_disk, item.raw);
}

#[test]
fn duplicate_strings_streams_last_wins() {
    let (first, _) = strings_heap(&["first.dll"]);
    let (second, offsets) = strings_heap(&["second.dll"]);
    let tables = tables_stream(&[(0x00, 1)], &module_row(offsets[0]));

    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", first)
        .stream("#GUID", vec![0u8; 16])
        .stream("#Strings", second)
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    // Both directory entries survive, in order.
    assert_eq!(image.streams().len(), 4);
    let names: Vec<&str> = image
        .metadata_root()
        .stream_headers
        .iter()
        .map(|header| header.name.as_str())
        .collect();
    assert_eq!(names, ["#~", "#Strings", "#GUID", "#Strings"]);

    // The shortcut resolves through the last occurrence.
    let item = image.strings().unwrap().get(1).unwrap();
    assert_eq!(item.value, "second.dll");

    let module = image.tables().module.get(1).unwrap();
    assert_eq!(module.name.as_deref(), Some("second.dll"));

    // The duplicate was reported.
    let diagnostics = image.diagnostics().unwrap();
    assert!(diagnostics
        .iter()
        .any(|diagnostic| diagnostic.message.contains("duplicate")));
}

fn typedef_row(name: u32, field_list: u16, method_list: u16) -> Vec<u8> {
    let mut row = Vec::new();
    row.extend_from_slice(&0u32.to_le_bytes()); // flags
    row.extend_from_slice(&(name as u16).to_le_bytes());
    row.extend_from_slice(&0u16.to_le_bytes()); // namespace
    row.extend_from_slice(&0u16.to_le_bytes()); // extends: null
    row.extend_from_slice(&field_list.to_le_bytes());
    row.extend_from_slice(&method_list.to_le_bytes());
    row
}

fn methoddef_row(rva: u32, name: u32, signature: u16) -> Vec<u8> {
    let mut row = Vec::new();
    row.extend_from_slice(&rva.to_le_bytes());
    row.extend_from_slice(&0u16.to_le_bytes()); // impl_flags
    row.extend_from_slice(&0x0006u16.to_le_bytes()); // public
    row.extend_from_slice(&(name as u16).to_le_bytes());
    row.extend_from_slice(&signature.to_le_bytes());
    row.extend_from_slice(&1u16.to_le_bytes()); // param_list
    row
}

fn method_fixture() -> CilImage {
    let (strings, offsets) =
        strings_heap(&["app.dll", "TypeA", "TypeB", "TypeC", "M1", "M2", "M3", "M4"]);

    // Default calling convention, no params, returns void; at offset 1.
    let blob = vec![0x00, 0x03, 0x00, 0x00, 0x01];

    let mut rows = Vec::new();
    rows.extend_from_slice(&module_row(offsets[0]));
    rows.extend_from_slice(&typedef_row(offsets[1], 1, 1));
    rows.extend_from_slice(&typedef_row(offsets[2], 1, 3));
    rows.extend_from_slice(&typedef_row(offsets[3], 1, 3));
    rows.extend_from_slice(&methoddef_row(0x2050, offsets[4], 1));
    rows.extend_from_slice(&methoddef_row(0x2070, offsets[5], 1));
    rows.extend_from_slice(&methoddef_row(0, offsets[6], 1));
    rows.extend_from_slice(&methoddef_row(0, offsets[7], 1));

    let tables = tables_stream(&[(0x00, 1), (0x02, 3), (0x06, 4)], &rows);

    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .stream("#US", vec![0u8; 4])
        .stream("#GUID", vec![0u8; 16])
        .stream("#Blob", blob)
        .build();
    CilImage::from_mem(bytes).unwrap()
}

#[test]
fn method_run_lists() {
    let image = method_fixture();
    let types = &image.tables().type_def;

    // Starts 1, 3, 3 over four methods: [1, 2], [], [3, 4].
    let runs: Vec<Vec<u32>> = types
        .rows()
        .iter()
        .map(|row| row.methods.iter().map(|reference| reference.row).collect())
        .collect();
    assert_eq!(runs, [vec![1, 2], vec![], vec![3, 4]]);

    for row in types.rows() {
        for reference in &row.methods {
            assert_eq!(reference.table, TableId::MethodDef);
            assert!(image.tables().method_def.get(reference.row).is_some());
        }
    }
}

#[test]
fn run_list_of_one_is_a_single_element_sequence() {
    let (strings, offsets) = strings_heap(&["app.dll", "A", "B", "M1", "M2"]);
    let blob = vec![0x00, 0x03, 0x00, 0x00, 0x01];

    let mut rows = Vec::new();
    rows.extend_from_slice(&module_row(offsets[0]));
    rows.extend_from_slice(&typedef_row(offsets[1], 1, 1));
    rows.extend_from_slice(&typedef_row(offsets[2], 1, 2));
    rows.extend_from_slice(&methoddef_row(0x2050, offsets[3], 1));
    rows.extend_from_slice(&methoddef_row(0x2060, offsets[4], 1));

    let tables = tables_stream(&[(0x00, 1), (0x02, 2), (0x06, 2)], &rows);
    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .stream("#GUID", vec![0u8; 16])
        .stream("#Blob", blob)
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    let types = &image.tables().type_def;
    assert_eq!(
        types.get(1).unwrap().methods,
        vec![RowRef::new(TableId::MethodDef, 1)]
    );
    assert_eq!(
        types.get(2).unwrap().methods,
        vec![RowRef::new(TableId::MethodDef, 2)]
    );
}

#[test]
fn methods_split_internal_external() {
    let image = method_fixture();
    let methods = image.methods();
    assert_eq!(methods.len(), 4);

    match &methods[0] {
        Method::Internal(method) => {
            assert_eq!(method.name.as_deref(), Some("M1"));
            assert_eq!(method.rva, 0x2050);
            let signature = method.signature.as_ref().unwrap();
            assert_eq!(signature.param_count, 0);
        }
        Method::External(_) => panic!("method 1 has an RVA"),
    }

    assert!(matches!(&methods[2], Method::External(method) if method.name.as_deref() == Some("M3")));
    assert_eq!(methods[3].name(), Some("M4"));
}

#[test]
fn lazy_loading_defers_but_matches() {
    let eager = method_fixture();

    let (strings, offsets) =
        strings_heap(&["app.dll", "TypeA", "TypeB", "TypeC", "M1", "M2", "M3", "M4"]);
    let blob = vec![0x00, 0x03, 0x00, 0x00, 0x01];
    let mut rows = Vec::new();
    rows.extend_from_slice(&module_row(offsets[0]));
    rows.extend_from_slice(&typedef_row(offsets[1], 1, 1));
    rows.extend_from_slice(&typedef_row(offsets[2], 1, 3));
    rows.extend_from_slice(&typedef_row(offsets[3], 1, 3));
    rows.extend_from_slice(&methoddef_row(0x2050, offsets[4], 1));
    rows.extend_from_slice(&methoddef_row(0x2070, offsets[5], 1));
    rows.extend_from_slice(&methoddef_row(0, offsets[6], 1));
    rows.extend_from_slice(&methoddef_row(0, offsets[7], 1));
    let tables = tables_stream(&[(0x00, 1), (0x02, 3), (0x06, 4)], &rows);
    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .stream("#US", vec![0u8; 4])
        .stream("#GUID", vec![0u8; 16])
        .stream("#Blob", blob)
        .build();

    let lazy = CilImage::from_mem_with(bytes, LoadOptions::new().lazy_load(true)).unwrap();

    assert_eq!(lazy.methods().len(), eager.methods().len());
    assert_eq!(
        lazy.tables().type_def.get(2).unwrap().name,
        eager.tables().type_def.get(2).unwrap().name
    );
    assert_eq!(lazy.resources().len(), 0);
}

#[test]
fn rejects_non_clr_input() {
    assert!(CilImage::from_mem(vec![0u8; 512]).is_err());
    assert!(CilImage::from_mem(Vec::new()).is_err());
}

#[test]
fn schema_stream_is_a_tables_stream() {
    let (strings, offsets) = strings_heap(&["hello.dll"]);
    let tables = tables_stream(&[(0x00, 1)], &module_row(offsets[0]));

    let bytes = ImageBuilder::new()
        .stream("#Schema", tables)
        .stream("#Strings", strings)
        .stream("#GUID", vec![0u8; 16])
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    // #Schema serves as the tables stream and is also exposed as the
    // schema shortcut.
    assert!(image.tables_raw().is_some());
    assert!(image.schema().is_some());
    assert_eq!(
        image.tables().module.get(1).unwrap().name.as_deref(),
        Some("hello.dll")
    );
}
