use std::sync::Arc;

use rust_xlsxwriter::{Format, Workbook};

use super::cache::{ContentKey, MemoCache};
use super::error::DataError;
use super::model::{CellValue, Table};

/// Encode a table as a single-sheet xlsx workbook.
///
/// Row 0 holds the column names, then one row per record in table order.
/// Null cells are left blank.
pub fn to_xlsx_bytes(table: &Table, sheet_name: &str) -> Result<Vec<u8>, DataError> {
    let too_large = || DataError::ExportTooLarge {
        rows: table.len(),
        columns: table.column_names().len(),
    };

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (c, name) in table.column_names().iter().enumerate() {
        let col = u16::try_from(c).map_err(|_| too_large())?;
        sheet.write_string_with_format(0, col, name, &header)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let xl_row = u32::try_from(r + 1).map_err(|_| too_large())?;
        for (c, cell) in row.iter().enumerate() {
            let col = u16::try_from(c).map_err(|_| too_large())?;
            match cell {
                CellValue::Text(s) => {
                    sheet.write_string(xl_row, col, s)?;
                }
                CellValue::Integer(i) => {
                    sheet.write_number(xl_row, col, *i as f64)?;
                }
                CellValue::Float(f) => {
                    sheet.write_number(xl_row, col, *f)?;
                }
                CellValue::Bool(b) => {
                    sheet.write_boolean(xl_row, col, *b)?;
                }
                CellValue::Null => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Memoized xlsx encoding, keyed by table content.
pub struct Exporter {
    sheet_name: String,
    cache: MemoCache<Vec<u8>>,
}

impl Exporter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            cache: MemoCache::new(),
        }
    }

    pub fn encode(&mut self, table: &Table) -> Result<Arc<Vec<u8>>, DataError> {
        let key = ContentKey::of_table(table);
        let sheet_name = &self.sheet_name;
        self.cache
            .get_or_try_insert_with(key, || to_xlsx_bytes(table, sheet_name))
    }

    pub fn cache(&self) -> &MemoCache<Vec<u8>> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use calamine::{open_workbook_auto_from_rs, Data, Reader};
    use std::io::Cursor;

    use super::*;

    fn filtered() -> Table {
        Table::new(
            vec!["age".into(), "job".into(), "balance".into(), "y".into()],
            vec![
                vec![CellValue::Integer(25), "admin".into(), CellValue::Float(10.5), "yes".into()],
                vec![CellValue::Integer(30), "admin".into(), CellValue::Null, "yes".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn writes_header_then_rows_on_named_sheet() {
        let bytes = to_xlsx_bytes(&filtered(), "Sheet1").unwrap();
        let mut wb = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Sheet1".to_string()]);

        let range = wb.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.height(), 3);
        assert_eq!(range.width(), 4);
        assert_eq!(range.get((0, 1)), Some(&Data::String("job".into())));
        assert_eq!(range.get((1, 0)), Some(&Data::Float(25.0)));
        assert_eq!(range.get((1, 2)), Some(&Data::Float(10.5)));
        assert_eq!(range.get((2, 2)), Some(&Data::Empty));
    }

    #[test]
    fn empty_table_still_has_header() {
        let empty = filtered().with_rows(Vec::new());
        let bytes = to_xlsx_bytes(&empty, "Sheet1").unwrap();
        let mut wb = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        let range = wb.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.height(), 1);
    }

    #[test]
    fn exporter_reuses_encodings() {
        let mut exporter = Exporter::new("Sheet1");
        let a = exporter.encode(&filtered()).unwrap();
        let b = exporter.encode(&filtered()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        exporter.encode(&filtered().head(1)).unwrap();
        assert_eq!(exporter.cache().len(), 2);
    }
}
