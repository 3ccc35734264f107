use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// DataError – everything the data layer can report to the UI
// ---------------------------------------------------------------------------

/// Errors raised by loading, filtering, aggregating and exporting tables.
///
/// An empty table is never an error: filters and aggregations that match
/// nothing return empty results.
#[derive(Debug, Error)]
pub enum DataError {
    /// The source matched none of the supported formats.
    #[error("{origin} could not be read as a table ({})", join_attempts(.attempts))]
    Unreadable {
        origin: String,
        attempts: Vec<AttemptFailure>,
    },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("column '{0}' not found in table")]
    MissingColumn(String),

    #[error("row {row} has {found} cells but the table has {expected} columns")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("spreadsheet export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("{rows} rows x {columns} columns does not fit in a worksheet")]
    ExportTooLarge { rows: usize, columns: usize },
}

/// Why one parser attempt rejected the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub format: &'static str,
    pub reason: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.format, self.reason)
    }
}

fn join_attempts(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
