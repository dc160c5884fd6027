use thiserror::Error;

use crate::metadata::tables::{CodedIndexKind, TableId};

/// Builds an [`enum@Error`] value of kind `DecodingError` from a format string.
macro_rules! decoding_error {
    ($msg:expr) => {
        $crate::Error::DecodingError($msg.to_string())
    };

    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::DecodingError(format!($fmt, $($arg)*))
    };
}

/// The error type for everything this crate can report.
///
/// Two severities exist by convention rather than by type: the facade only
/// ever *returns* the structural variants (`NoClrDirectory`,
/// `InvalidMetadataSignature`, `TruncatedStructure` on the metadata root or
/// tables header, and the I/O and PE wrappers). All other variants describe
/// recoverable corruption; they are routed through the
/// [`DiagnosticSink`](crate::metadata::diagnostics::DiagnosticSink) as
/// warnings while the affected field degrades to absent.
#[derive(Error, Debug)]
pub enum Error {
    /// Provided input was empty.
    #[error("provided input was empty")]
    Empty,

    /// The PE image has no CLR runtime header directory; it is not a .NET
    /// executable.
    #[error("image has no CLR runtime header directory")]
    NoClrDirectory,

    /// The metadata root does not start with the `0x424A5342` signature.
    #[error("invalid metadata signature {0:#010x}")]
    InvalidMetadataSignature(u32),

    /// A structure ends before its fixed-size portion could be read.
    #[error("truncated structure - {0}")]
    TruncatedStructure(&'static str),

    /// A CompressedInt length prefix uses a reserved leading-bit pattern.
    #[error("invalid compressed integer prefix {0:#04x}")]
    InvalidCompressedInt(u8),

    /// A heap index points outside the heap it belongs to.
    #[error("index {index:#x} out of range for {heap} heap")]
    HeapIndexOutOfRange {
        /// Name of the heap (`#Strings`, `#US`, `#GUID`, `#Blob`).
        heap: &'static str,
        /// The offending index.
        index: usize,
    },

    /// A row index points outside the table it belongs to.
    #[error("row {row} out of range for table {table:?}")]
    TableIndexOutOfRange {
        /// Target table.
        table: TableId,
        /// The 1-based row index.
        row: u32,
    },

    /// A coded index carries a tag with no candidate table behind it.
    #[error("unknown tag {tag} for coded index {kind:?}")]
    UnknownCodedIndexTag {
        /// The coded index kind being decoded.
        kind: CodedIndexKind,
        /// The tag value found in the packed integer.
        tag: u32,
    },

    /// A resource entry names a type this parser cannot interpret.
    #[error("unknown resource type - {0}")]
    UnknownResourceType(String),

    /// A `.resources` payload violates the resource-set layout.
    #[error("invalid resource set - {0}")]
    InvalidResourceSet(String),

    /// A value could not be decoded (bad UTF-8/UTF-16, malformed framing).
    #[error("{0}")]
    DecodingError(String),

    /// File I/O failure.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// PE parsing failure reported by goblin.
    #[error("{0}")]
    PeError(#[from] goblin::error::Error),
}
