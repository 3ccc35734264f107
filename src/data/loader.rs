use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::cache::{ContentKey, MemoCache};
use super::error::{AttemptFailure, DataError};
use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Data sources
// ---------------------------------------------------------------------------

/// Where a table comes from: a file on disk or bytes picked in the UI.
#[derive(Debug, Clone)]
pub enum DataSource {
    Path(PathBuf),
    Upload { name: String, bytes: Arc<[u8]> },
}

impl DataSource {
    /// Human-readable origin for messages.
    pub fn origin(&self) -> String {
        match self {
            DataSource::Path(p) => p.display().to_string(),
            DataSource::Upload { name, .. } => name.clone(),
        }
    }

    fn read(&self) -> Result<Arc<[u8]>, DataError> {
        match self {
            DataSource::Path(path) => std::fs::read(path)
                .map(Arc::from)
                .map_err(|cause| DataError::Io {
                    path: path.clone(),
                    cause,
                }),
            DataSource::Upload { bytes, .. } => Ok(Arc::clone(bytes)),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser attempts
// ---------------------------------------------------------------------------

/// One way of interpreting raw bytes as a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimiter-separated UTF-8 text with a header row.
    DelimitedText { delimiter: u8 },
    /// Spreadsheet workbook (xlsx, xls, ods); only the first sheet is read.
    Workbook,
}

impl SourceFormat {
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::DelimitedText { .. } => "delimited text",
            SourceFormat::Workbook => "workbook",
        }
    }

    pub fn parse(&self, bytes: &[u8]) -> Result<Table, String> {
        match self {
            SourceFormat::DelimitedText { delimiter } => parse_delimited(bytes, *delimiter),
            SourceFormat::Workbook => parse_workbook(bytes),
        }
    }
}

/// The formats tried for every source, in order.
pub fn default_formats(delimiter: u8) -> Vec<SourceFormat> {
    vec![
        SourceFormat::DelimitedText { delimiter },
        SourceFormat::Workbook,
    ]
}

/// Try each format in turn; the first one that parses wins.
pub fn parse_bytes(
    formats: &[SourceFormat],
    origin: &str,
    bytes: &[u8],
) -> Result<Table, DataError> {
    let mut attempts = Vec::with_capacity(formats.len());
    for format in formats {
        match format.parse(bytes) {
            Ok(table) => return Ok(table),
            Err(reason) => {
                log::debug!("{origin}: {} rejected: {reason}", format.name());
                attempts.push(AttemptFailure {
                    format: format.name(),
                    reason,
                });
            }
        }
    }
    Err(DataError::Unreadable {
        origin: origin.to_string(),
        attempts,
    })
}

// ---------------------------------------------------------------------------
// Loader – parse with memoization by content
// ---------------------------------------------------------------------------

pub struct Loader {
    formats: Vec<SourceFormat>,
    cache: MemoCache<Table>,
}

impl Loader {
    pub fn new(delimiter: u8) -> Self {
        Self::with_cache(default_formats(delimiter), MemoCache::new())
    }

    pub fn with_cache(formats: Vec<SourceFormat>, cache: MemoCache<Table>) -> Self {
        Self { formats, cache }
    }

    /// Load a table, reusing an earlier parse when the content is unchanged.
    pub fn load(&mut self, source: &DataSource) -> Result<Arc<Table>, DataError> {
        let origin = source.origin();
        let bytes = source.read()?;
        let key = ContentKey::of_bytes(&bytes);
        let formats = &self.formats;
        let table = self
            .cache
            .get_or_try_insert_with(key, || parse_bytes(formats, &origin, &bytes))?;
        log::info!(
            "Loaded {origin}: {} rows, {} columns (key {key})",
            table.len(),
            table.column_names().len()
        );
        Ok(table)
    }

    pub fn cache(&self) -> &MemoCache<Table> {
        &self.cache
    }
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<Table, String> {
    // Zip and OLE containers always carry NUL bytes; text never does.
    if bytes.contains(&0) {
        return Err("binary content".into());
    }
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("reading header: {e}"))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err("no header row".into());
    }
    let width = headers.len();

    // Short records are padded with empty cells (read as Null); long ones
    // cannot be matched to a column.
    let mut raw: Vec<Vec<String>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("record {row_no}: {e}"))?;
        if record.len() > width {
            return Err(format!(
                "record {row_no}: {} fields, header has {width}",
                record.len()
            ));
        }
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        cells.resize(width, String::new());
        raw.push(cells);
    }

    let columns = infer_columns(&raw, width);
    let rows = (0..raw.len())
        .map(|r| columns.iter().map(|col| col[r].clone()).collect())
        .collect();
    Table::new(headers, rows).map_err(|e| e.to_string())
}

/// Type each column as a whole: integer, float, bool, or text.
/// Surrounding whitespace is ignored when detecting the type; text cells
/// keep it. Returns column-major cells.
fn infer_columns(raw: &[Vec<String>], width: usize) -> Vec<Vec<CellValue>> {
    (0..width)
        .map(|c| {
            let cells: Vec<&str> = raw.iter().map(|row| row[c].as_str()).collect();
            let present = || cells.iter().map(|s| s.trim()).filter(|s| !s.is_empty());
            let convert: fn(&str) -> CellValue = if present().all(|s| s.parse::<i64>().is_ok()) {
                |s| s.trim().parse().map(CellValue::Integer).unwrap_or(CellValue::Null)
            } else if present().all(|s| s.parse::<f64>().is_ok()) {
                |s| s.trim().parse().map(CellValue::Float).unwrap_or(CellValue::Null)
            } else if present().all(|s| s == "true" || s == "false") {
                |s| CellValue::Bool(s.trim() == "true")
            } else {
                |s| CellValue::Text(s.to_string())
            };
            cells
                .iter()
                .map(|s| if s.trim().is_empty() { CellValue::Null } else { convert(s) })
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

fn parse_workbook(bytes: &[u8]) -> Result<Table, String> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or("workbook has no sheets")?
        .map_err(|e| e.to_string())?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or("first sheet is empty")?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut body: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();
    whole_floats_to_integers(&mut body, headers.len());
    Table::new(headers, body).map_err(|e| e.to_string())
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}

/// Workbooks store every number as a double. A column whose numbers are all
/// whole is read back as integers, matching what the text parser infers.
fn whole_floats_to_integers(rows: &mut [Vec<CellValue>], width: usize) {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    for c in 0..width {
        let whole = rows.iter().all(|row| match row.get(c) {
            Some(CellValue::Float(f)) => f.fract() == 0.0 && f.abs() <= MAX_EXACT,
            _ => true,
        });
        if !whole {
            continue;
        }
        for row in rows.iter_mut() {
            if let Some(cell) = row.get_mut(c) {
                if let CellValue::Float(f) = *cell {
                    *cell = CellValue::Integer(f as i64);
                }
            }
        }
    }
}
