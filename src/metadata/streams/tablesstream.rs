//! The tables stream (`#~`, `#-` or `#Schema`).
//!
//! Layout: a fixed header (versions, heap-size byte, the 64-bit `valid`
//! and `sorted` bitmaps), one `u32` row count per set `valid` bit in
//! ascending bit order, optionally four extra bytes when heap-size bit 3
//! (`EXTRA_DATA`) is set, then the rows of every present table
//! back-to-back in ascending table order.
//!
//! Row layouts are dynamic; [`TableLayout`] is computed from this header
//! once and drives every row decode. Damage is contained: a table whose
//! declared rows do not fit is clamped with a warning, and a `valid` bit
//! naming an unknown table kind stops materialization there (later
//! offsets would be guesswork) without failing the parse.
//!
//! # Reference
//! - ECMA-335 II.24.2.6

use std::sync::Arc;

use crate::{
    file::io::{read_le, read_le_at},
    metadata::{
        diagnostics::{DiagnosticContext, DiagnosticSink},
        tables::{
            layout::HEAP_EXTRA_DATA, MetadataTable, TableData, TableId, TableLayout,
            TableLayoutRef, TableLookup,
        },
    },
    Error::TruncatedStructure,
    Result,
};

const TABLE_SLOTS: usize = TableId::GenericParamConstraint as usize + 1;

/// A decoded tables stream.
pub struct TablesStream<'a> {
    /// Major version of the table schema.
    pub major_version: u8,
    /// Minor version of the table schema.
    pub minor_version: u8,
    /// The heap-size byte (index widths plus the `EXTRA_DATA` bit).
    pub heap_sizes: u8,
    /// Bitmap of present tables.
    pub valid: u64,
    /// Bitmap of sorted tables.
    pub sorted: u64,
    /// The computed row layout for this stream.
    pub layout: TableLayoutRef,
    rva: u32,
    tables: Vec<Option<TableData<'a>>>,
}

impl<'a> TablesStream<'a> {
    /// Decode a tables stream located at `rva`.
    ///
    /// # Errors
    /// [`TruncatedStructure`] when the fixed header or the row-count
    /// array end prematurely. Everything past that point degrades with
    /// warnings instead of failing.
    pub fn from(data: &'a [u8], rva: u32, sink: &dyn DiagnosticSink) -> Result<TablesStream<'a>> {
        if data.len() < 24 {
            return Err(TruncatedStructure("tables stream header"));
        }

        let heap_sizes = read_le::<u8>(&data[6..])?;
        let valid = read_le::<u64>(&data[8..])?;
        let sorted = read_le::<u64>(&data[16..])?;

        let mut offset = 24;
        let mut row_counts = [0u32; 64];
        for bit in 0..64u8 {
            if valid & (1u64 << bit) == 0 {
                continue;
            }
            row_counts[bit as usize] = read_le_at::<u32>(data, &mut offset)
                .map_err(|_| TruncatedStructure("tables stream row counts"))?;
        }

        if heap_sizes & HEAP_EXTRA_DATA != 0 {
            // Four undocumented bytes sit between the row counts and the
            // first row when this bit is set.
            offset += 4;
        }

        let layout: TableLayoutRef = Arc::new(TableLayout::new(row_counts, heap_sizes));
        let mut tables: Vec<Option<TableData<'a>>> = Vec::with_capacity(TABLE_SLOTS);
        tables.resize_with(TABLE_SLOTS, || None);

        for bit in 0..64u8 {
            if valid & (1u64 << bit) == 0 || row_counts[bit as usize] == 0 {
                continue;
            }

            let Some(id) = TableId::from_bit(bit) else {
                sink.warn(
                    format!(
                        "valid bitmap names unknown table {bit:#04x}; remaining tables not decoded"
                    ),
                    DiagnosticContext::at_rva(rva),
                );
                break;
            };

            if offset > data.len() {
                sink.warn(
                    format!("table {id:?} starts past the end of the stream"),
                    DiagnosticContext::at_rva(rva),
                );
                break;
            }

            let table = TableData::decode(
                id,
                &data[offset..],
                rva + offset as u32,
                row_counts[bit as usize],
                layout.clone(),
            );

            offset += table.byte_size();
            let truncated = table.is_truncated();
            if truncated {
                sink.warn(
                    format!(
                        "table {id:?} truncated: {} of {} rows decodable",
                        table.row_count(),
                        row_counts[bit as usize]
                    ),
                    DiagnosticContext::at_rva(rva),
                );
            }
            tables[id as usize] = Some(table);

            if truncated {
                // Later tables would start at unknowable offsets.
                break;
            }
        }

        Ok(TablesStream {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            heap_sizes,
            valid,
            sorted,
            layout,
            rva,
            tables,
        })
    }

    /// RVA of the stream's first byte.
    #[must_use]
    pub fn rva(&self) -> u32 {
        self.rva
    }

    /// Whether the `valid` bitmap names `table`.
    #[must_use]
    pub fn has_table(&self, table: TableId) -> bool {
        self.valid & (1u64 << (table as u8)) != 0
    }

    /// Whether the `sorted` bitmap names `table`.
    #[must_use]
    pub fn is_sorted(&self, table: TableId) -> bool {
        self.sorted & (1u64 << (table as u8)) != 0
    }

    /// Declared row count of `table`.
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        self.layout.row_count(table)
    }

    /// Number of tables named by the `valid` bitmap.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// Typed access to one materialized table.
    #[must_use]
    pub fn table<T: TableLookup>(&self) -> Option<&MetadataTable<'a, T>> {
        self.tables
            .get(T::TABLE_ID as usize)
            .and_then(|slot| slot.as_ref())
            .and_then(T::from_data)
    }

    /// Untyped access to one materialized table.
    #[must_use]
    pub fn table_data(&self, id: TableId) -> Option<&TableData<'a>> {
        self.tables.get(id as usize).and_then(|slot| slot.as_ref())
    }

    /// The tables named by the `valid` bitmap, in ascending id order.
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        use strum::IntoEnumIterator;
        TableId::iter().filter(|id| self.has_table(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        diagnostics::{Diagnostics, NullSink},
        tables::{ModuleRaw, ModuleRefRaw},
    };

    fn crafted_stream(heap_sizes: u8, extra: bool) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes()); // reserved
        data.push(2); // major
        data.push(0); // minor
        data.push(heap_sizes);
        data.push(1); // reserved
        let valid = (1u64 << 0x00) | (1u64 << 0x1A);
        data.extend_from_slice(&valid.to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes()); // sorted
        data.extend_from_slice(&1u32.to_le_bytes()); // Module rows
        data.extend_from_slice(&1u32.to_le_bytes()); // ModuleRef rows
        if extra {
            data.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        }
        // Module row: generation, name, mvid, encid, encbaseid
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
        // ModuleRef row: name
        data.extend_from_slice(&[0x09, 0x00]);
        data
    }

    #[test]
    fn crafted() {
        let data = crafted_stream(0, false);
        let stream = TablesStream::from(&data, 0x1000, &NullSink).unwrap();

        assert_eq!(stream.major_version, 2);
        assert_eq!(stream.table_count(), 2);
        assert!(stream.has_table(TableId::Module));
        assert!(stream.has_table(TableId::ModuleRef));
        assert!(!stream.has_table(TableId::TypeDef));
        assert_eq!(stream.row_count(TableId::Module), 1);

        let module = stream.table::<ModuleRaw>().unwrap().get(1).unwrap();
        assert_eq!(module.name, 1);
        assert_eq!(module.mvid, 1);

        let module_ref = stream.table::<ModuleRefRaw>().unwrap().get(1).unwrap();
        assert_eq!(module_ref.name, 9);
    }

    #[test]
    fn extra_data_skip() {
        // Bit 3 of the heap-size byte inserts four bytes before the rows.
        let data = crafted_stream(HEAP_EXTRA_DATA, true);
        let stream = TablesStream::from(&data, 0, &NullSink).unwrap();

        let module = stream.table::<ModuleRaw>().unwrap().get(1).unwrap();
        assert_eq!(module.name, 1);

        let module_ref = stream.table::<ModuleRefRaw>().unwrap().get(1).unwrap();
        assert_eq!(module_ref.name, 9);
    }

    #[test]
    fn truncated_header_is_fatal() {
        let data = [0u8; 20];
        assert!(matches!(
            TablesStream::from(&data, 0, &NullSink),
            Err(TruncatedStructure(_))
        ));
    }

    #[test]
    fn truncated_rows_clamp_with_warning() {
        let mut data = crafted_stream(0, false);
        // Cut into the ModuleRef row.
        data.truncate(data.len() - 1);

        let diagnostics = Diagnostics::new();
        let stream = TablesStream::from(&data, 0, &diagnostics).unwrap();

        assert!(stream.table::<ModuleRaw>().unwrap().get(1).is_some());
        let module_refs = stream.table::<ModuleRefRaw>().unwrap();
        assert_eq!(module_refs.row_count(), 0);
        assert!(module_refs.is_truncated());
        assert_eq!(diagnostics.count(), 1);
    }

    #[test]
    fn unknown_table_bit_stops_decoding() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.push(2);
        data.push(0);
        data.push(0);
        data.push(0);
        // Module present, then the undefined table 0x1E, then Assembly.
        let valid = (1u64 << 0x00) | (1u64 << 0x1E) | (1u64 << 0x20);
        data.extend_from_slice(&valid.to_le_bytes());
        data.extend_from_slice(&0u64.to_le_bytes());
        data.extend_from_slice(&1u32.to_le_bytes()); // Module
        data.extend_from_slice(&1u32.to_le_bytes()); // table 0x1E
        data.extend_from_slice(&1u32.to_le_bytes()); // Assembly
        data.extend_from_slice(&[0u8; 64]);

        let diagnostics = Diagnostics::new();
        let stream = TablesStream::from(&data, 0, &diagnostics).unwrap();

        // Module decodes; Assembly is skipped because the unknown table
        // 0x1E sits between them in the row data.
        assert!(stream.table::<ModuleRaw>().is_some());
        assert!(stream
            .table::<crate::metadata::tables::AssemblyRaw>()
            .is_none());
        assert_eq!(diagnostics.count(), 1);
    }
}
