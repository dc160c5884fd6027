use super::Backend;
use crate::{Error::TruncatedStructure, Result};

use memmap2::Mmap;
use std::{fs, path::Path};

/// Image data backed by a memory-mapped file on disk.
#[derive(Debug)]
pub struct Physical {
    data: Mmap,
}

impl Physical {
    /// Map the file at `path` into memory.
    pub fn new(path: &Path) -> Result<Physical> {
        let file = fs::File::open(path)?;

        // SAFETY: the mapping is read-only and the file handle is kept
        // alive by the Mmap for the mapping's lifetime.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(end) = offset.checked_add(len) else {
            return Err(TruncatedStructure("slice range overflow"));
        };

        if end > self.data.len() {
            return Err(TruncatedStructure("slice past end of image"));
        }

        Ok(&self.data[offset..end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
