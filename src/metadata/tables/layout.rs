//! Physical row layout computation.
//!
//! The byte layout of a metadata table row is not static: heap index
//! columns are 2 or 4 bytes depending on the heap-size flags, simple index
//! columns depend on the target table's row count, and coded index columns
//! depend on the row counts of *every* candidate table. [`TableLayout`]
//! captures all of those decisions once per image; every row decoder
//! consults it.

use std::sync::Arc;

use strum::{EnumCount, IntoEnumIterator};

use crate::metadata::tables::{CodedIndexKind, TableId};

/// Heap-size flag: `#Strings` indexes are 4 bytes.
pub(crate) const HEAP_WIDE_STRINGS: u8 = 0x01;
/// Heap-size flag: `#GUID` indexes are 4 bytes.
pub(crate) const HEAP_WIDE_GUIDS: u8 = 0x02;
/// Heap-size flag: `#Blob` indexes are 4 bytes.
pub(crate) const HEAP_WIDE_BLOBS: u8 = 0x04;
/// Heap-size flag: four extra bytes sit between the row counts and the
/// first row.
pub(crate) const HEAP_EXTRA_DATA: u8 = 0x08;

/// Index widths and row counts for one tables stream.
pub struct TableLayout {
    row_counts: [u32; 64],
    heap_sizes: u8,
    coded_bytes: [u8; CodedIndexKind::COUNT],
}

/// Shared handle to a [`TableLayout`].
pub type TableLayoutRef = Arc<TableLayout>;

impl TableLayout {
    /// Build the layout from the 64-entry row count array and the
    /// heap-size byte of the tables-stream header.
    pub(crate) fn new(row_counts: [u32; 64], heap_sizes: u8) -> Self {
        let mut layout = TableLayout {
            row_counts,
            heap_sizes,
            coded_bytes: [0; CodedIndexKind::COUNT],
        };

        for kind in CodedIndexKind::iter() {
            let max_rows = kind
                .tables()
                .iter()
                .filter_map(|table| table.map(|id| layout.row_count(id)))
                .max()
                .unwrap_or(0);

            let threshold = 1u32 << (16 - u32::from(kind.tag_bits()));
            layout.coded_bytes[kind as usize] = if max_rows >= threshold { 4 } else { 2 };
        }

        layout
    }

    /// Layout constructor for unit tests: name the populated tables and
    /// the heap widths directly.
    #[cfg(test)]
    pub(crate) fn for_tests(
        tables: &[(TableId, u32)],
        wide_strings: bool,
        wide_guids: bool,
        wide_blobs: bool,
    ) -> TableLayoutRef {
        let mut row_counts = [0u32; 64];
        for (id, rows) in tables {
            row_counts[*id as usize] = *rows;
        }

        let mut heap_sizes = 0;
        if wide_strings {
            heap_sizes |= HEAP_WIDE_STRINGS;
        }
        if wide_guids {
            heap_sizes |= HEAP_WIDE_GUIDS;
        }
        if wide_blobs {
            heap_sizes |= HEAP_WIDE_BLOBS;
        }

        Arc::new(TableLayout::new(row_counts, heap_sizes))
    }

    /// Row count of `table`, zero when absent.
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        self.row_counts[table as usize]
    }

    /// Row count for an arbitrary bit of the `valid` bitmap, including
    /// table kinds this crate does not model.
    #[must_use]
    pub fn row_count_raw(&self, bit: u8) -> u32 {
        self.row_counts[(bit & 63) as usize]
    }

    /// Whether `#Strings` index columns are 4 bytes wide.
    #[must_use]
    pub fn wide_strings(&self) -> bool {
        self.heap_sizes & HEAP_WIDE_STRINGS != 0
    }

    /// Whether `#GUID` index columns are 4 bytes wide.
    #[must_use]
    pub fn wide_guids(&self) -> bool {
        self.heap_sizes & HEAP_WIDE_GUIDS != 0
    }

    /// Whether `#Blob` index columns are 4 bytes wide.
    #[must_use]
    pub fn wide_blobs(&self) -> bool {
        self.heap_sizes & HEAP_WIDE_BLOBS != 0
    }

    /// Byte width of a `#Strings` index column.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.wide_strings() {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#GUID` index column.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.wide_guids() {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#Blob` index column.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.wide_blobs() {
            4
        } else {
            2
        }
    }

    /// Whether a simple index into `table` is 4 bytes wide.
    #[must_use]
    pub fn wide_index(&self, table: TableId) -> bool {
        self.row_count(table) > 0xFFFF
    }

    /// Byte width of a simple index into `table`.
    #[must_use]
    pub fn index_bytes(&self, table: TableId) -> u8 {
        if self.wide_index(table) {
            4
        } else {
            2
        }
    }

    /// Whether a coded index of `kind` is 4 bytes wide.
    #[must_use]
    pub fn wide_coded(&self, kind: CodedIndexKind) -> bool {
        self.coded_bytes[kind as usize] == 4
    }

    /// Byte width of a coded index of `kind`.
    #[must_use]
    pub fn coded_bytes(&self, kind: CodedIndexKind) -> u8 {
        self.coded_bytes[kind as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_by_default() {
        let layout = TableLayout::for_tests(&[(TableId::TypeDef, 10)], false, false, false);

        assert_eq!(layout.str_bytes(), 2);
        assert_eq!(layout.guid_bytes(), 2);
        assert_eq!(layout.blob_bytes(), 2);
        assert_eq!(layout.index_bytes(TableId::TypeDef), 2);
        assert_eq!(layout.coded_bytes(CodedIndexKind::TypeDefOrRef), 2);
    }

    #[test]
    fn simple_index_boundary() {
        let layout = TableLayout::for_tests(&[(TableId::Field, 0xFFFF)], false, false, false);
        assert_eq!(layout.index_bytes(TableId::Field), 2);

        let layout = TableLayout::for_tests(&[(TableId::Field, 0x1_0000)], false, false, false);
        assert_eq!(layout.index_bytes(TableId::Field), 4);
    }

    #[test]
    fn coded_index_boundary() {
        // TypeDefOrRef has three candidates, so two tag bits: the width
        // flips when any candidate reaches 2^14 rows.
        let layout = TableLayout::for_tests(&[(TableId::TypeSpec, 0x3FFF)], false, false, false);
        assert_eq!(layout.coded_bytes(CodedIndexKind::TypeDefOrRef), 2);

        let layout = TableLayout::for_tests(&[(TableId::TypeSpec, 0x4000)], false, false, false);
        assert_eq!(layout.coded_bytes(CodedIndexKind::TypeDefOrRef), 4);

        // HasCustomAttribute uses five tag bits: the boundary is 2^11.
        let layout = TableLayout::for_tests(&[(TableId::Param, 0x800)], false, false, false);
        assert_eq!(layout.coded_bytes(CodedIndexKind::HasCustomAttribute), 4);
    }

    #[test]
    fn heap_flags() {
        let layout = TableLayout::for_tests(&[], true, false, true);
        assert_eq!(layout.str_bytes(), 4);
        assert_eq!(layout.guid_bytes(), 2);
        assert_eq!(layout.blob_bytes(), 4);
    }
}
