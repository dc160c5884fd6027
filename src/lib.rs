// Copyright 2025-2026 the dotmeta contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # dotmeta
//!
//! A parser for .NET (Common Language Infrastructure, ECMA-335) executables.
//! `dotmeta` locates the CLI header inside a Portable Executable image,
//! decodes the metadata root and its streams, materializes every metadata
//! table with its dynamically-computed row layout, links rows to heaps and
//! to each other, and parses the manifest resource subsystem including
//! nested `.resources` sets.
//!
//! The parser is deliberately tolerant: structural damage that makes the
//! whole image unusable is reported as an error, while local corruption
//! (bad heap indices, truncated rows, unknown coded-index tags, broken
//! resource entries) degrades the affected field to *absent* and is
//! reported through a pluggable diagnostic sink.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use dotmeta::CilImage;
//!
//! let image = CilImage::from_path("sample.dll".as_ref())?;
//! println!("runtime {}", image.metadata_root().version);
//! for method in image.methods() {
//!     println!("method {:?}", method.name());
//! }
//! for resource in image.resources() {
//!     println!("resource {:?}", resource.name());
//! }
//! # Ok::<(), dotmeta::Error>(())
//! ```
//!
//! # Layers
//!
//! - [`crate::file`] - the PE container adapter: RVA translation, bounded
//!   slice reads, data directory lookup
//! - [`crate::metadata`] - CLI header, metadata root, heaps, tables,
//!   methods and resources
//! - [`crate::CilImage`] - the facade composing all of the above, either
//!   eagerly (default) or lazily via [`crate::LoadOptions`]
//!
//! # Concurrency
//!
//! Parsing is single-threaded and synchronous. The resulting object graph
//! is immutable and `Send + Sync`; under lazy loading the deferred pieces
//! are guarded by one-shot initializers so concurrent readers observe the
//! same materialized value.

#[macro_use]
pub(crate) mod error;

/// PE container access: backends, the [`File`] adapter and binary cursors.
pub mod file;

/// ECMA-335 metadata: header, root, streams, tables, methods, resources.
pub mod metadata;

/// Convenient re-exports of the most commonly used types.
pub mod prelude;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;
pub use file::{parser::Parser, File};
pub use metadata::{
    cilimage::{CilImage, LoadOptions},
    cor20header::CliHeader,
    diagnostics::{Diagnostic, DiagnosticContext, DiagnosticSink, Diagnostics, NullSink},
    method::{ExternalMethod, InternalMethod, Method},
    resources::{AssemblyResource, ClrResource, FileResource, InternalResource, ResourceData},
    root::MetadataRoot,
    token::Token,
};
