//! End-to-end manifest resource scenarios.

mod common;

use common::{
    resource_set, resources_region, strings_heap, tables_stream, ImageBuilder, RESOURCES_OFFSET,
    SECTION_RVA,
};
use dotmeta::{
    metadata::{
        resources::ResourceValue,
        tables::{ManifestResourceAttributes, TableId},
    },
    CilImage, ClrResource, ResourceData,
};

fn manifest_row(offset: u32, flags: u32, name: u32, implementation: u16) -> Vec<u8> {
    let mut row = Vec::new();
    row.extend_from_slice(&offset.to_le_bytes());
    row.extend_from_slice(&flags.to_le_bytes());
    row.extend_from_slice(&(name as u16).to_le_bytes());
    row.extend_from_slice(&implementation.to_le_bytes());
    row
}

#[test]
fn internal_resource_set() {
    let (strings, offsets) = strings_heap(&["app.resources"]);
    let set = resource_set("greeting", "hello");
    let (region, payload_offsets) = resources_region(&[set.clone()]);

    let tables = tables_stream(
        &[(0x28, 1)],
        &manifest_row(payload_offsets[0], 0x0001, offsets[0], 0),
    );
    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .resources(region)
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    let resources = image.resources();
    assert_eq!(resources.len(), 1);

    let ClrResource::Internal(resource) = &resources[0] else {
        panic!("expected an internal resource");
    };
    assert_eq!(resource.name.as_deref(), Some("app.resources"));
    assert!(resource.flags.contains(ManifestResourceAttributes::PUBLIC));
    assert_eq!(resource.rva, SECTION_RVA + RESOURCES_OFFSET + 4);
    assert_eq!(resource.size as usize, set.len());

    let ResourceData::Set(parsed) = &resource.data else {
        panic!("expected a resource set");
    };
    assert_eq!(parsed.header.resource_count, 1);
    assert_eq!(parsed.entries.len() as u32, parsed.header.resource_count);
    assert_eq!(parsed.types, ["System.String"]);

    let entry = parsed.get("greeting").unwrap();
    assert_eq!(
        entry.data,
        Some(ResourceValue::String("hello".to_string()))
    );
    assert_eq!(entry.name.as_deref(), Some("greeting"));
}

#[test]
fn internal_resource_raw_payload() {
    let (strings, offsets) = strings_heap(&["blob.bin"]);
    let payload = b"just some opaque payload bytes".to_vec();
    let (region, payload_offsets) = resources_region(&[payload.clone()]);

    let tables = tables_stream(
        &[(0x28, 1)],
        &manifest_row(payload_offsets[0], 0x0002, offsets[0], 0),
    );
    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .resources(region)
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    let ClrResource::Internal(resource) = &image.resources()[0] else {
        panic!("expected an internal resource");
    };
    assert_eq!(resource.size as usize, payload.len());
    assert_eq!(resource.data.as_raw(), Some(payload.as_slice()));
    assert!(resource.data.as_set().is_none());
}

#[test]
fn two_internal_resources() {
    let (strings, offsets) = strings_heap(&["one.resources", "two.bin"]);
    let set = resource_set("key", "value");
    let raw = b"RAW!".to_vec();
    let (region, payload_offsets) = resources_region(&[set, raw.clone()]);

    let mut rows = Vec::new();
    rows.extend_from_slice(&manifest_row(payload_offsets[0], 1, offsets[0], 0));
    rows.extend_from_slice(&manifest_row(payload_offsets[1], 1, offsets[1], 0));

    let tables = tables_stream(&[(0x28, 2)], &rows);
    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .resources(region)
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    let resources = image.resources();
    assert_eq!(resources.len(), 2);
    assert!(matches!(
        &resources[0],
        ClrResource::Internal(resource) if resource.data.as_set().is_some()
    ));
    assert!(matches!(
        &resources[1],
        ClrResource::Internal(resource) if resource.data.as_raw() == Some(raw.as_slice())
    ));
}

fn assembly_ref_row(name: u32) -> Vec<u8> {
    let mut row = Vec::new();
    row.extend_from_slice(&1u16.to_le_bytes()); // major
    row.extend_from_slice(&0u16.to_le_bytes()); // minor
    row.extend_from_slice(&0u16.to_le_bytes()); // build
    row.extend_from_slice(&0u16.to_le_bytes()); // revision
    row.extend_from_slice(&0u32.to_le_bytes()); // flags
    row.extend_from_slice(&0u16.to_le_bytes()); // public key or token
    row.extend_from_slice(&(name as u16).to_le_bytes());
    row.extend_from_slice(&0u16.to_le_bytes()); // culture
    row.extend_from_slice(&0u16.to_le_bytes()); // hash
    row
}

#[test]
fn assembly_resource_has_no_data() {
    let (strings, offsets) = strings_heap(&["ext.resources", "OtherAssembly"]);

    let mut rows = Vec::new();
    rows.extend_from_slice(&assembly_ref_row(offsets[1]));
    // Implementation: tag 1 = AssemblyRef, row 1.
    rows.extend_from_slice(&manifest_row(0, 1, offsets[0], (1 << 2) | 1));

    let tables = tables_stream(&[(0x23, 1), (0x28, 1)], &rows);
    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    let resources = image.resources();
    assert_eq!(resources.len(), 1);
    assert!(resources[0].data().is_none());

    let ClrResource::Assembly(resource) = &resources[0] else {
        panic!("expected an assembly resource");
    };
    assert_eq!(resource.assembly.table, TableId::AssemblyRef);
    assert_eq!(resource.assembly.row, 1);
    assert_eq!(resource.assembly.token().value(), 0x2300_0001);
    assert_eq!(resource.assembly_name.as_deref(), Some("OtherAssembly"));
    assert_eq!(resource.name.as_deref(), Some("ext.resources"));
}

fn file_row(name: u32) -> Vec<u8> {
    let mut row = Vec::new();
    row.extend_from_slice(&1u32.to_le_bytes()); // flags: no metadata
    row.extend_from_slice(&(name as u16).to_le_bytes());
    row.extend_from_slice(&0u16.to_le_bytes()); // hash
    row
}

#[test]
fn file_resource_points_at_its_file_row() {
    let (strings, offsets) = strings_heap(&["satellite.resources", "satellite.dll"]);

    let mut rows = Vec::new();
    rows.extend_from_slice(&file_row(offsets[1]));
    // Implementation: tag 0 = File, row 1.
    rows.extend_from_slice(&manifest_row(0, 1, offsets[0], 1 << 2));

    let tables = tables_stream(&[(0x26, 1), (0x28, 1)], &rows);
    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    let ClrResource::File(resource) = &image.resources()[0] else {
        panic!("expected a file resource");
    };
    assert_eq!(resource.file.table, TableId::File);
    assert_eq!(resource.file_name.as_deref(), Some("satellite.dll"));
}

#[test]
fn broken_payload_degrades_with_warning() {
    let (strings, offsets) = strings_heap(&["gone.resources"]);

    // The offset points far outside the resources region.
    let (region, _) = resources_region(&[b"x".to_vec()]);
    let tables = tables_stream(&[(0x28, 1)], &manifest_row(0x0010_0000, 1, offsets[0], 0));

    let bytes = ImageBuilder::new()
        .stream("#~", tables)
        .stream("#Strings", strings)
        .resources(region)
        .build();
    let image = CilImage::from_mem(bytes).unwrap();

    // The resource survives with an empty payload and a warning.
    let ClrResource::Internal(resource) = &image.resources()[0] else {
        panic!("expected an internal resource");
    };
    assert_eq!(resource.size, 0);
    assert_eq!(resource.data.as_raw(), Some(&[][..]));
    assert!(image.diagnostics().unwrap().count() >= 1);
}
