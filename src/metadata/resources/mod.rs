//! The manifest resource subsystem.
//!
//! Every `ManifestResource` row is classified by its `Implementation`
//! coded index: a null index means the payload is embedded in this image
//! ([`InternalResource`]), a `File` target names a file of the assembly
//! ([`FileResource`]), an `AssemblyRef` target defers to another assembly
//! ([`AssemblyResource`]). External variants carry no data by
//! construction; their metadata row reference is the whole story.
//!
//! Embedded payloads live at `resources_rva + row.Offset` - the row's
//! offset is relative to the CLI header's resources directory, not an RVA
//! - prefixed by a 4-byte little-endian size. A payload that starts with
//! the `0xBEEFCACE` magic is parsed as a [`ResourceSet`]; anything else
//! stays raw bytes.

mod set;

pub use set::{
    DateTimeKind, ResourceEntry, ResourceSet, ResourceSetHeader, ResourceValue,
    RESOURCE_SET_MAGIC,
};

use crate::{
    file::File,
    metadata::{
        cor20header::CliHeader,
        diagnostics::{DiagnosticContext, DiagnosticSink},
        tables::{LinkedTables, ManifestResourceAttributes, RowRef, TableId},
        token::Token,
    },
};

/// Payload of an embedded resource.
#[derive(Debug, Clone)]
pub enum ResourceData {
    /// A parsed `.resources` set.
    Set(ResourceSet),
    /// Anything else, kept verbatim.
    Raw(Vec<u8>),
}

impl ResourceData {
    /// The parsed resource set, when the payload was one.
    #[must_use]
    pub fn as_set(&self) -> Option<&ResourceSet> {
        match self {
            ResourceData::Set(set) => Some(set),
            ResourceData::Raw(_) => None,
        }
    }

    /// The raw bytes, when the payload was not a resource set.
    #[must_use]
    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            ResourceData::Raw(bytes) => Some(bytes),
            ResourceData::Set(_) => None,
        }
    }
}

/// A resource embedded in this image.
#[derive(Debug, Clone)]
pub struct InternalResource {
    /// Token of the defining `ManifestResource` row.
    pub token: Token,
    /// Resource name.
    pub name: Option<String>,
    /// Visibility flags.
    pub flags: ManifestResourceAttributes,
    /// RVA of the payload (past the 4-byte size prefix).
    pub rva: u32,
    /// Payload size in bytes, from the size prefix.
    pub size: u32,
    /// The payload.
    pub data: ResourceData,
}

/// A resource stored in another file of the assembly.
#[derive(Debug, Clone)]
pub struct FileResource {
    /// Token of the defining `ManifestResource` row.
    pub token: Token,
    /// Resource name.
    pub name: Option<String>,
    /// Visibility flags.
    pub flags: ManifestResourceAttributes,
    /// The `File` row holding the payload.
    pub file: RowRef,
    /// Name of that file, when resolvable.
    pub file_name: Option<String>,
}

/// A resource living in a referenced assembly.
#[derive(Debug, Clone)]
pub struct AssemblyResource {
    /// Token of the defining `ManifestResource` row.
    pub token: Token,
    /// Resource name.
    pub name: Option<String>,
    /// Visibility flags.
    pub flags: ManifestResourceAttributes,
    /// The `AssemblyRef` row holding the payload.
    pub assembly: RowRef,
    /// Name of that assembly, when resolvable.
    pub assembly_name: Option<String>,
}

/// One manifest resource of the image.
#[derive(Debug, Clone)]
pub enum ClrResource {
    /// Embedded in this image.
    Internal(InternalResource),
    /// Stored in another file of the assembly.
    File(FileResource),
    /// Living in a referenced assembly.
    Assembly(AssemblyResource),
}

impl ClrResource {
    /// Resource name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            ClrResource::Internal(resource) => resource.name.as_deref(),
            ClrResource::File(resource) => resource.name.as_deref(),
            ClrResource::Assembly(resource) => resource.name.as_deref(),
        }
    }

    /// Token of the defining `ManifestResource` row.
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            ClrResource::Internal(resource) => resource.token,
            ClrResource::File(resource) => resource.token,
            ClrResource::Assembly(resource) => resource.token,
        }
    }

    /// The embedded payload, present only for internal resources.
    #[must_use]
    pub fn data(&self) -> Option<&ResourceData> {
        match self {
            ClrResource::Internal(resource) => Some(&resource.data),
            _ => None,
        }
    }
}

/// Classify and materialize every `ManifestResource` row.
pub(crate) fn build_resources(
    tables: &LinkedTables,
    file: &File,
    header: &CliHeader,
    sink: &dyn DiagnosticSink,
) -> Vec<ClrResource> {
    let mut resources = Vec::with_capacity(tables.manifest_resource.len());

    for row in tables.manifest_resource.rows() {
        match row.implementation {
            None => {
                resources.push(ClrResource::Internal(read_internal(
                    row.token,
                    row.name.clone(),
                    row.flags,
                    row.data_offset,
                    file,
                    header,
                    sink,
                )));
            }
            Some(target) if target.table == TableId::File => {
                let file_name = tables
                    .file
                    .get(target.row)
                    .and_then(|file_row| file_row.name.clone());
                resources.push(ClrResource::File(FileResource {
                    token: row.token,
                    name: row.name.clone(),
                    flags: row.flags,
                    file: target,
                    file_name,
                }));
            }
            Some(target) if target.table == TableId::AssemblyRef => {
                let assembly_name = tables
                    .assembly_ref
                    .get(target.row)
                    .and_then(|assembly| assembly.name.clone());
                resources.push(ClrResource::Assembly(AssemblyResource {
                    token: row.token,
                    name: row.name.clone(),
                    flags: row.flags,
                    assembly: target,
                    assembly_name,
                }));
            }
            Some(target) => {
                sink.warn(
                    format!(
                        "resource implementation points at {:?}, which cannot hold resources",
                        target.table
                    ),
                    DiagnosticContext::at_row(TableId::ManifestResource, row.rid),
                );
            }
        }
    }

    resources
}

fn read_internal(
    token: Token,
    name: Option<String>,
    flags: ManifestResourceAttributes,
    data_offset: u32,
    file: &File,
    header: &CliHeader,
    sink: &dyn DiagnosticSink,
) -> InternalResource {
    let mut resource = InternalResource {
        token,
        name,
        flags,
        rva: 0,
        size: 0,
        data: ResourceData::Raw(Vec::new()),
    };
    let context = DiagnosticContext::at_row(TableId::ManifestResource, token.row());

    let Some(rva) = header.resource_rva.checked_add(data_offset) else {
        sink.warn(
            format!("resource offset {data_offset:#x} overflows the resources directory"),
            context,
        );
        return resource;
    };

    let offset = match file.rva_to_offset(rva as usize) {
        Ok(offset) => offset,
        Err(error) => {
            sink.warn(format!("resource payload unreachable: {error}"), context);
            return resource;
        }
    };

    // 4-byte little-endian size prefix, then the payload.
    let size = match file.data_slice(offset, 4) {
        Ok(prefix) => u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]),
        Err(error) => {
            sink.warn(format!("resource size prefix unreadable: {error}"), context);
            return resource;
        }
    };

    resource.rva = rva + 4;
    resource.size = size;

    let payload = match file.data_slice(offset + 4, size as usize) {
        Ok(payload) => payload,
        Err(error) => {
            sink.warn(
                format!("resource payload of {size} bytes unreadable: {error}"),
                context,
            );
            return resource;
        }
    };

    let is_set = payload.len() >= 4
        && u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]])
            == RESOURCE_SET_MAGIC;

    resource.data = if is_set {
        match ResourceSet::parse(payload, resource.rva, sink) {
            Ok(set) => ResourceData::Set(set),
            Err(error) => {
                sink.warn(format!("resource set unreadable: {error}"), context);
                ResourceData::Raw(payload.to_vec())
            }
        }
    } else {
        ResourceData::Raw(payload.to_vec())
    };

    resource
}
