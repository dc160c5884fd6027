//! Metadata streams and heaps.
//!
//! The metadata root's directory names up to a handful of streams. Four of
//! them are *heaps* - unstructured byte regions addressed by offset (or by
//! 1-based index for `#GUID`):
//!
//! - `#Strings` - NUL-terminated UTF-8 identifier strings
//! - `#US` - CompressedInt-framed UTF-16 user strings with a trailing
//!   flag byte
//! - `#GUID` - fixed 16-byte records
//! - `#Blob` - CompressedInt-framed binary blobs
//!
//! `#~`, `#-` and `#Schema` carry the metadata tables and are handled by
//! [`TablesStream`]. Anything else is retained as opaque bytes.
//!
//! Every heap lookup returns a [`HeapItem`]: the raw payload bytes, the
//! decoded value, and the RVA the payload was read from. Out-of-range or
//! undecodable lookups are soft - [`get`](StringsHeap::get) returns
//! `None` - while the `try_get` twins surface the precise error for
//! diagnostic reporting.

mod blob;
mod guid;
mod streamheader;
mod strings;
mod tablesstream;
mod userstrings;

pub use blob::BlobHeap;
pub use guid::{GuidHeap, GuidIter};
pub use streamheader::StreamHeader;
pub use strings::{StringsHeap, StringsIter};
pub use tablesstream::TablesStream;
pub use userstrings::{UserString, UserStringsHeap};

/// A decoded heap entry.
///
/// `raw` is exactly the byte range at `rva`; re-applying the heap's
/// framing (NUL terminator, CompressedInt length prefix, fixed width)
/// around `raw` reproduces the heap bytes the item came from.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapItem<'a, T> {
    /// The payload bytes, borrowed from the image.
    pub raw: &'a [u8],
    /// The decoded value.
    pub value: T,
    /// RVA of the first payload byte.
    pub rva: u32,
}

/// One stream from the metadata directory: its header plus parsed data.
pub struct Stream<'a> {
    /// The directory entry this stream came from.
    pub header: StreamHeader,
    /// RVA of the stream's first byte.
    pub rva: u32,
    /// The parsed stream contents.
    pub data: StreamData<'a>,
}

/// Parsed contents of a stream, selected by its directory name.
pub enum StreamData<'a> {
    /// A tables stream (`#~`, `#-` or `#Schema`).
    Tables(TablesStream<'a>),
    /// The `#Strings` heap.
    Strings(StringsHeap<'a>),
    /// The `#US` heap.
    UserStrings(UserStringsHeap<'a>),
    /// The `#GUID` heap.
    Guid(GuidHeap<'a>),
    /// The `#Blob` heap.
    Blob(BlobHeap<'a>),
    /// A stream with an unrecognized name, or one whose contents failed
    /// to parse; kept as raw bytes.
    Opaque(&'a [u8]),
}

impl StreamData<'_> {
    /// Short classification of the stream contents, for display.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            StreamData::Tables(_) => "tables",
            StreamData::Strings(_) => "strings",
            StreamData::UserStrings(_) => "user-strings",
            StreamData::Guid(_) => "guid",
            StreamData::Blob(_) => "blob",
            StreamData::Opaque(_) => "opaque",
        }
    }
}
