//! PE container adapter.
//!
//! The metadata decoder does not parse PE/COFF structures itself; it relies
//! on an external PE parser (goblin) wrapped by [`File`], which narrows the
//! surface to the three operations the decoder needs: RVA to file-offset
//! translation, bounded slice reads, and data-directory lookup for the CLR
//! runtime header.
//!
//! Two data sources exist behind the [`Backend`] trait: a memory-mapped
//! file ([`File::from_path`]) and an owned buffer ([`File::from_mem`]).
//! The backing bytes outlive every parsed object; heap items and rows
//! borrow slices into them.

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{
    Error::{Empty, NoClrDirectory},
    Result,
};
use goblin::pe::{
    data_directories::{DataDirectory, DataDirectoryType},
    header::Header,
    optional_header::OptionalHeader,
    section_table::SectionTable,
    PE,
};
use memory::Memory;
use ouroboros::self_referencing;
use physical::Physical;

/// Source of image bytes.
///
/// Implementations must be thread-safe; the rest of the crate only ever
/// reads through this trait.
pub trait Backend: Send + Sync {
    /// Bounds-checked slice at `offset` of `len` bytes.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// The entire image.
    fn data(&self) -> &[u8];

    /// Total image length in bytes.
    fn len(&self) -> usize;
}

#[self_referencing]
/// A loaded PE image with a CLR runtime header.
///
/// Wraps the parsed PE structure together with its backing bytes and
/// offers the address-space conversions the metadata layer builds on.
/// Loading fails with [`NoClrDirectory`] when the image is a plain native
/// PE without .NET metadata.
pub struct File {
    /// The underlying data source (mapped file or owned buffer).
    data: Box<dyn Backend>,
    /// The parsed PE structure, borrowing the data.
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Load and parse a PE file from disk via memory mapping.
    pub fn from_path(path: &Path) -> Result<File> {
        Self::load(Physical::new(path)?)
    }

    /// Parse a PE image already held in memory.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(Memory::new(data))
    }

    fn load<T: Backend + 'static>(backend: T) -> Result<File> {
        if backend.len() == 0 {
            return Err(Empty);
        }

        File::try_new(Box::new(backend), |data| {
            let pe = PE::parse(data.data())?;

            let Some(optional_header) = pe.header.optional_header else {
                return Err(NoClrDirectory);
            };
            if optional_header
                .data_directories
                .get_clr_runtime_header()
                .is_none()
            {
                return Err(NoClrDirectory);
            }

            Ok(pe)
        })
    }

    /// Total size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Whether the image is empty (never true for a loaded image).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Preferred load address of the image.
    #[must_use]
    pub fn imagebase(&self) -> u64 {
        self.with_pe(|pe| pe.image_base as u64)
    }

    /// The PE header (COFF header plus optional header).
    #[must_use]
    pub fn header(&self) -> &Header {
        self.with_pe(|pe| &pe.header)
    }

    /// The optional header. Always present for a loaded image.
    #[must_use]
    pub fn header_optional(&self) -> &Option<OptionalHeader> {
        self.with_pe(|pe| &pe.header.optional_header)
    }

    /// RVA and size of the CLR runtime header directory.
    ///
    /// # Panics
    ///
    /// Never panics for a loaded image; the directory's presence was
    /// verified during [`File::load`].
    #[must_use]
    pub fn clr(&self) -> (usize, usize) {
        self.with_pe(|pe| {
            let optional_header = pe.header.optional_header.unwrap();
            let directory = optional_header
                .data_directories
                .get_clr_runtime_header()
                .unwrap();

            (directory.virtual_address as usize, directory.size as usize)
        })
    }

    /// Iterator over the image's section headers.
    pub fn sections(&self) -> impl Iterator<Item = &SectionTable> {
        self.with_pe(|pe| pe.sections.iter())
    }

    /// All populated data directories.
    #[must_use]
    pub fn directories(&self) -> Vec<(DataDirectoryType, DataDirectory)> {
        self.with_pe(|pe| {
            pe.header
                .optional_header
                .unwrap()
                .data_directories
                .dirs()
                .collect()
        })
    }

    /// The complete raw image.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.with_data(|data| data.data())
    }

    /// Bounds-checked slice of the raw image.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.with_data(|data| data.data_slice(offset, len))
    }

    /// Translate a relative virtual address into a file offset.
    ///
    /// A section covers `[virtual_address, virtual_address + virtual_size)`;
    /// when `virtual_size` is zero (seen in hand-crafted images) the raw
    /// data size stands in for it.
    pub fn rva_to_offset(&self, rva: usize) -> Result<usize> {
        self.with_pe(|pe| {
            for section in &pe.sections {
                let span = if section.virtual_size != 0 {
                    section.virtual_size
                } else {
                    section.size_of_raw_data
                };
                let Some(section_end) = section.virtual_address.checked_add(span) else {
                    return Err(decoding_error!(
                        "section range overflows - {} + {}",
                        section.virtual_address,
                        span
                    ));
                };

                let rva_u32 = u32::try_from(rva)
                    .map_err(|_| decoding_error!("rva {:#x} out of u32 range", rva))?;
                if rva_u32 >= section.virtual_address && rva_u32 < section_end {
                    return Ok(rva - section.virtual_address as usize
                        + section.pointer_to_raw_data as usize);
                }
            }

            Err(decoding_error!("rva {:#x} maps to no section", rva))
        })
    }

    /// Translate a file offset back into a relative virtual address.
    pub fn offset_to_rva(&self, offset: usize) -> Result<usize> {
        self.with_pe(|pe| {
            for section in &pe.sections {
                let Some(section_end) = section
                    .pointer_to_raw_data
                    .checked_add(section.size_of_raw_data)
                else {
                    return Err(decoding_error!(
                        "section range overflows - {} + {}",
                        section.pointer_to_raw_data,
                        section.size_of_raw_data
                    ));
                };

                let offset_u32 = u32::try_from(offset)
                    .map_err(|_| decoding_error!("offset {:#x} out of u32 range", offset))?;
                if offset_u32 >= section.pointer_to_raw_data && offset_u32 < section_end {
                    return Ok(offset - section.pointer_to_raw_data as usize
                        + section.virtual_address as usize);
                }
            }

            Err(decoding_error!("offset {:#x} maps to no section", offset))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert!(matches!(File::from_mem(Vec::new()), Err(Empty)));
    }

    #[test]
    fn not_a_pe() {
        let data = vec![0u8; 256];
        assert!(File::from_mem(data).is_err());
    }
}
