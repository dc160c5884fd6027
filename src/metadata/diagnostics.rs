//! Diagnostic reporting for recoverable corruption.
//!
//! The parser never aborts a whole image over local damage: an invalid
//! heap index, a truncated row or a broken resource entry sets the
//! affected field to absent and reports what happened through a
//! [`DiagnosticSink`]. The sink is pluggable via
//! [`LoadOptions`](crate::LoadOptions); the default is the lock-free
//! collecting [`Diagnostics`], and [`NullSink`] discards everything.

use std::fmt;

use crate::metadata::tables::TableId;

/// Location information attached to a warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticContext {
    /// RVA of the data the warning refers to, when known.
    pub rva: Option<u32>,
    /// Metadata table the warning refers to, when known.
    pub table: Option<TableId>,
    /// 1-based row index within `table`, when known.
    pub row: Option<u32>,
}

impl DiagnosticContext {
    /// Context with no location information.
    #[must_use]
    pub fn none() -> Self {
        DiagnosticContext::default()
    }

    /// Context pointing at an RVA.
    #[must_use]
    pub fn at_rva(rva: u32) -> Self {
        DiagnosticContext {
            rva: Some(rva),
            ..DiagnosticContext::default()
        }
    }

    /// Context pointing at a table row.
    #[must_use]
    pub fn at_row(table: TableId, row: u32) -> Self {
        DiagnosticContext {
            table: Some(table),
            row: Some(row),
            ..DiagnosticContext::default()
        }
    }
}

impl fmt::Display for DiagnosticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rva) = self.rva {
            write!(f, " (rva: {rva:#010x})")?;
        }
        if let (Some(table), Some(row)) = (self.table, self.row) {
            write!(f, " ({table:?} row {row})")?;
        }
        Ok(())
    }
}

/// Receiver for recoverable-corruption warnings.
///
/// Implementations must be thread-safe: under lazy loading the first
/// access to a deferred field may happen on any thread.
pub trait DiagnosticSink: Send + Sync {
    /// Report one recoverable problem.
    fn warn(&self, message: String, context: DiagnosticContext);
}

/// One collected warning.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Where it went wrong.
    pub context: DiagnosticContext,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.message, self.context)
    }
}

/// The default sink: collects every warning in a lock-free vector.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Diagnostics {
            entries: boxcar::Vec::new(),
        }
    }

    /// Number of collected warnings.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Whether anything has been collected.
    pub fn is_empty(&self) -> bool {
        self.entries.count() == 0
    }

    /// Iterate over all collected warnings.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, entry)| entry)
    }
}

impl DiagnosticSink for Diagnostics {
    fn warn(&self, message: String, context: DiagnosticContext) {
        self.entries.push(Diagnostic { message, context });
    }
}

/// A sink that discards every warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn warn(&self, _message: String, _context: DiagnosticContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn collects_in_order() {
        let diagnostics = Diagnostics::new();
        diagnostics.warn("first".into(), DiagnosticContext::none());
        diagnostics.warn(
            "second".into(),
            DiagnosticContext::at_row(TableId::Module, 1),
        );

        assert_eq!(diagnostics.count(), 2);
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
    }

    #[test]
    fn concurrent_warns() {
        let diagnostics = Arc::new(Diagnostics::new());
        let mut handles = Vec::new();

        for i in 0..8 {
            let sink = Arc::clone(&diagnostics);
            handles.push(thread::spawn(move || {
                sink.warn(format!("warning {i}"), DiagnosticContext::none());
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(diagnostics.count(), 8);
    }

    #[test]
    fn display_includes_context() {
        let diagnostic = Diagnostic {
            message: "bad row".into(),
            context: DiagnosticContext {
                rva: Some(0x2000),
                table: Some(TableId::TypeDef),
                row: Some(3),
            },
        };

        let rendered = format!("{diagnostic}");
        assert!(rendered.contains("bad row"));
        assert!(rendered.contains("0x00002000"));
        assert!(rendered.contains("TypeDef row 3"));
    }
}
