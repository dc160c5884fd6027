//! The top-level facade.
//!
//! [`CilImage`] owns the PE file and composes every decoding phase in
//! order: CLI header, metadata root, stream directory, heaps and tables
//! stream, the row linking pass, and the method and resource views. By
//! default everything is parsed at construction; with
//! [`LoadOptions::lazy_load`] the linking pass and the derived views are
//! deferred behind one-shot cells, so the first access materializes them
//! exactly once even under concurrent readers.
//!
//! Shortcut accessors over the stream directory follow runtime behavior:
//! when several streams share a name, the **last** one wins, while all of
//! them stay enumerable through [`CilImage::streams`].

use std::{path::Path, sync::Arc, sync::OnceLock};

use ouroboros::self_referencing;

use crate::{
    file::File,
    metadata::{
        cor20header::CliHeader,
        diagnostics::{DiagnosticContext, DiagnosticSink, Diagnostics},
        method::{build_methods, Method},
        resources::{build_resources, ClrResource},
        root::MetadataRoot,
        streams::{
            BlobHeap, GuidHeap, Stream, StreamData, StringsHeap, TablesStream, UserStringsHeap,
        },
        tables::{linker::LinkContext, LinkedTables},
    },
    Error::TruncatedStructure,
    Result,
};

/// Options controlling how an image is loaded.
#[derive(Default)]
pub struct LoadOptions {
    /// Defer the linking pass, the method list and the resource list to
    /// first access. Heaps and stream headers are always parsed eagerly.
    pub lazy_load: bool,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl LoadOptions {
    /// The default options: eager loading, collecting sink.
    #[must_use]
    pub fn new() -> Self {
        LoadOptions::default()
    }

    /// Enable or disable lazy loading.
    #[must_use]
    pub fn lazy_load(mut self, lazy: bool) -> Self {
        self.lazy_load = lazy;
        self
    }

    /// Route warnings into a caller-provided sink instead of the default
    /// collecting [`Diagnostics`].
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }
}

/// Everything parsed out of one image; borrows the file's bytes.
struct ClrData<'a> {
    file: Arc<File>,
    header: CliHeader,
    metadata_rva: u32,
    root: MetadataRoot,
    streams: Vec<Stream<'a>>,
    strings_idx: Option<usize>,
    userstrings_idx: Option<usize>,
    guids_idx: Option<usize>,
    blobs_idx: Option<usize>,
    tables_idx: Option<usize>,
    schema_idx: Option<usize>,
    linked: OnceLock<LinkedTables>,
    methods: OnceLock<Vec<Method>>,
    resources: OnceLock<Vec<ClrResource>>,
    sink: Arc<dyn DiagnosticSink>,
    collected: Option<Arc<Diagnostics>>,
}

fn slice_at<'a>(data: &'a [u8], offset: usize, len: usize, what: &'static str) -> Result<&'a [u8]> {
    let end = offset
        .checked_add(len)
        .ok_or(TruncatedStructure(what))?;
    if end > data.len() {
        return Err(TruncatedStructure(what));
    }
    Ok(&data[offset..end])
}

impl<'a> ClrData<'a> {
    fn new(
        file: Arc<File>,
        data: &'a [u8],
        sink: Arc<dyn DiagnosticSink>,
        collected: Option<Arc<Diagnostics>>,
    ) -> Result<ClrData<'a>> {
        let (clr_rva, clr_size) = file.clr();
        let clr_offset = file.rva_to_offset(clr_rva)?;
        let header = CliHeader::read(slice_at(data, clr_offset, clr_size, "CLI header")?)?;

        let metadata_rva = header.meta_data_rva;
        let metadata_offset = file.rva_to_offset(metadata_rva as usize)?;
        if metadata_offset >= data.len() {
            return Err(TruncatedStructure("metadata root"));
        }
        let mut metadata_size = header.meta_data_size as usize;
        if metadata_offset + metadata_size > data.len() {
            sink.warn(
                format!(
                    "metadata size {metadata_size:#x} runs past the image; clamped to the file"
                ),
                DiagnosticContext::at_rva(metadata_rva),
            );
            metadata_size = data.len() - metadata_offset;
        }
        let metadata = &data[metadata_offset..metadata_offset + metadata_size];

        let root = MetadataRoot::read(metadata, sink.as_ref())?;

        let mut streams = Vec::with_capacity(root.stream_headers.len());
        for stream_header in &root.stream_headers {
            let start = stream_header.offset as usize;
            let declared = stream_header.size as usize;
            let stream_rva = metadata_rva.wrapping_add(stream_header.offset);

            let stream_data = if start > metadata.len() {
                sink.warn(
                    format!(
                        "stream '{}' starts past the end of the metadata",
                        stream_header.name
                    ),
                    DiagnosticContext::at_rva(stream_rva),
                );
                &[][..]
            } else if start + declared > metadata.len() {
                sink.warn(
                    format!(
                        "stream '{}' runs past the end of the metadata; clamped",
                        stream_header.name
                    ),
                    DiagnosticContext::at_rva(stream_rva),
                );
                &metadata[start..]
            } else {
                &metadata[start..start + declared]
            };

            let parsed = match stream_header.name.as_str() {
                // A truncated tables-stream header is one of the few
                // fatal conditions; everything below it degrades.
                "#~" | "#-" | "#Schema" => {
                    StreamData::Tables(TablesStream::from(stream_data, stream_rva, sink.as_ref())?)
                }
                "#Strings" => StreamData::Strings(StringsHeap::from(stream_data, stream_rva)),
                "#US" => StreamData::UserStrings(UserStringsHeap::from(stream_data, stream_rva)),
                "#GUID" => StreamData::Guid(GuidHeap::from(stream_data, stream_rva)),
                "#Blob" => StreamData::Blob(BlobHeap::from(stream_data, stream_rva)),
                _ => StreamData::Opaque(stream_data),
            };

            streams.push(Stream {
                header: stream_header.clone(),
                rva: stream_rva,
                data: parsed,
            });
        }

        // Shortcuts bind to the last occurrence of each kind.
        let mut clr = ClrData {
            file,
            header,
            metadata_rva,
            root,
            streams,
            strings_idx: None,
            userstrings_idx: None,
            guids_idx: None,
            blobs_idx: None,
            tables_idx: None,
            schema_idx: None,
            linked: OnceLock::new(),
            methods: OnceLock::new(),
            resources: OnceLock::new(),
            sink,
            collected,
        };
        for (index, stream) in clr.streams.iter().enumerate() {
            match &stream.data {
                StreamData::Strings(_) => clr.strings_idx = Some(index),
                StreamData::UserStrings(_) => clr.userstrings_idx = Some(index),
                StreamData::Guid(_) => clr.guids_idx = Some(index),
                StreamData::Blob(_) => clr.blobs_idx = Some(index),
                StreamData::Tables(_) => {
                    clr.tables_idx = Some(index);
                    if stream.header.name == "#Schema" {
                        clr.schema_idx = Some(index);
                    }
                }
                StreamData::Opaque(_) => {}
            }
        }

        Ok(clr)
    }

    fn strings(&self) -> Option<&StringsHeap<'a>> {
        match &self.streams[self.strings_idx?].data {
            StreamData::Strings(heap) => Some(heap),
            _ => None,
        }
    }

    fn userstrings(&self) -> Option<&UserStringsHeap<'a>> {
        match &self.streams[self.userstrings_idx?].data {
            StreamData::UserStrings(heap) => Some(heap),
            _ => None,
        }
    }

    fn guids(&self) -> Option<&GuidHeap<'a>> {
        match &self.streams[self.guids_idx?].data {
            StreamData::Guid(heap) => Some(heap),
            _ => None,
        }
    }

    fn blobs(&self) -> Option<&BlobHeap<'a>> {
        match &self.streams[self.blobs_idx?].data {
            StreamData::Blob(heap) => Some(heap),
            _ => None,
        }
    }

    fn tables_raw(&self) -> Option<&TablesStream<'a>> {
        match &self.streams[self.tables_idx?].data {
            StreamData::Tables(tables) => Some(tables),
            _ => None,
        }
    }

    fn schema(&self) -> Option<&TablesStream<'a>> {
        match &self.streams[self.schema_idx?].data {
            StreamData::Tables(tables) => Some(tables),
            _ => None,
        }
    }

    fn linked(&self) -> &LinkedTables {
        self.linked.get_or_init(|| {
            let Some(tables) = self.tables_raw() else {
                return LinkedTables::default();
            };

            let ctx = LinkContext {
                tables,
                strings: self.strings(),
                guids: self.guids(),
                blobs: self.blobs(),
                sink: self.sink.as_ref(),
            };
            LinkedTables::build(&ctx)
        })
    }

    fn methods(&self) -> &[Method] {
        self.methods
            .get_or_init(|| build_methods(self.linked(), self.sink.as_ref()))
    }

    fn resources(&self) -> &[ClrResource] {
        self.resources.get_or_init(|| {
            build_resources(
                self.linked(),
                &self.file,
                &self.header,
                self.sink.as_ref(),
            )
        })
    }
}

#[self_referencing]
/// A loaded .NET image with its CLR metadata decoded.
///
/// ```rust,no_run
/// use dotmeta::CilImage;
///
/// let image = CilImage::from_path("sample.dll".as_ref())?;
/// if let Some(module) = image.tables().module.get(1) {
///     println!("module {:?}", module.name);
/// }
/// # Ok::<(), dotmeta::Error>(())
/// ```
pub struct CilImage {
    /// The backing PE file.
    file: Arc<File>,
    /// Everything decoded, borrowing the file bytes.
    #[borrows(file)]
    #[not_covariant]
    data: ClrData<'this>,
}

impl CilImage {
    /// Load an image from disk with the default options.
    pub fn from_path(path: &Path) -> Result<CilImage> {
        Self::from_path_with(path, LoadOptions::default())
    }

    /// Load an image from disk.
    pub fn from_path_with(path: &Path, options: LoadOptions) -> Result<CilImage> {
        Self::load(Arc::new(File::from_path(path)?), options)
    }

    /// Parse an image from a memory buffer with the default options.
    pub fn from_mem(data: Vec<u8>) -> Result<CilImage> {
        Self::from_mem_with(data, LoadOptions::default())
    }

    /// Parse an image from a memory buffer.
    pub fn from_mem_with(data: Vec<u8>, options: LoadOptions) -> Result<CilImage> {
        Self::load(Arc::new(File::from_mem(data)?), options)
    }

    fn load(file: Arc<File>, options: LoadOptions) -> Result<CilImage> {
        let (sink, collected) = match options.sink {
            Some(sink) => (sink, None),
            None => {
                let diagnostics = Arc::new(Diagnostics::new());
                (
                    diagnostics.clone() as Arc<dyn DiagnosticSink>,
                    Some(diagnostics),
                )
            }
        };
        let lazy = options.lazy_load;

        CilImage::try_new(file, |file| {
            let data = ClrData::new(file.clone(), file.data(), sink, collected)?;

            if !lazy {
                data.linked();
                data.methods();
                data.resources();
            }

            Ok(data)
        })
    }

    /// The CLI header.
    #[must_use]
    pub fn clr_header(&self) -> &CliHeader {
        self.with_data(|data| &data.header)
    }

    /// The metadata root and stream directory.
    #[must_use]
    pub fn metadata_root(&self) -> &MetadataRoot {
        self.with_data(|data| &data.root)
    }

    /// RVA of the metadata root.
    #[must_use]
    pub fn metadata_rva(&self) -> u32 {
        self.with_data(|data| data.metadata_rva)
    }

    /// Every stream of the directory, in file order, duplicates included.
    #[must_use]
    pub fn streams(&self) -> &[Stream] {
        self.with_data(|data| data.streams.as_slice())
    }

    /// The `#Strings` heap (last occurrence wins).
    #[must_use]
    pub fn strings(&self) -> Option<&StringsHeap> {
        self.with_data(|data| data.strings())
    }

    /// The `#US` heap (last occurrence wins).
    #[must_use]
    pub fn userstrings(&self) -> Option<&UserStringsHeap> {
        self.with_data(|data| data.userstrings())
    }

    /// The `#GUID` heap (last occurrence wins).
    #[must_use]
    pub fn guids(&self) -> Option<&GuidHeap> {
        self.with_data(|data| data.guids())
    }

    /// The `#Blob` heap (last occurrence wins).
    #[must_use]
    pub fn blobs(&self) -> Option<&BlobHeap> {
        self.with_data(|data| data.blobs())
    }

    /// The raw tables stream: the last stream that parsed as one,
    /// whether named `#~`, `#-` or `#Schema`.
    #[must_use]
    pub fn tables_raw(&self) -> Option<&TablesStream> {
        self.with_data(|data| data.tables_raw())
    }

    /// The last `#Schema` stream, exposed separately from the primary
    /// tables shortcut.
    #[must_use]
    pub fn schema(&self) -> Option<&TablesStream> {
        self.with_data(|data| data.schema())
    }

    /// The linked tables. Empty when the image has no tables stream.
    #[must_use]
    pub fn tables(&self) -> &LinkedTables {
        self.with_data(|data| data.linked())
    }

    /// All methods of the image, in `MethodDef` order.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        self.with_data(|data| data.methods())
    }

    /// All manifest resources, in `ManifestResource` order.
    #[must_use]
    pub fn resources(&self) -> &[ClrResource] {
        self.with_data(|data| data.resources())
    }

    /// The underlying PE file.
    #[must_use]
    pub fn file(&self) -> &Arc<File> {
        self.borrow_file()
    }

    /// The collected warnings, unless a custom sink was installed.
    #[must_use]
    pub fn diagnostics(&self) -> Option<Arc<Diagnostics>> {
        self.with_data(|data| data.collected.clone())
    }
}
