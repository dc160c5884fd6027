//! Curated re-exports for glob import.
//!
//! ```rust,no_run
//! use dotmeta::prelude::*;
//!
//! let image = CilImage::from_path("sample.dll".as_ref())?;
//! println!("{} streams", image.streams().len());
//! # Ok::<(), dotmeta::Error>(())
//! ```

pub use crate::{
    metadata::{
        cilimage::{CilImage, LoadOptions},
        cor20header::CliHeader,
        diagnostics::{DiagnosticContext, DiagnosticSink, Diagnostics},
        method::{ExternalMethod, InternalMethod, Method},
        resources::{ClrResource, InternalResource, ResourceData, ResourceSet},
        root::MetadataRoot,
        streams::{
            BlobHeap, GuidHeap, HeapItem, Stream, StreamData, StringsHeap, TablesStream,
            UserStringsHeap,
        },
        tables::{CodedIndex, CodedIndexKind, LinkedTables, RowRef, RowSet, TableId},
        token::Token,
    },
    Error, File, Result,
};
