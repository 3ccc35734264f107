use std::collections::BTreeSet;
use std::fmt;

use super::error::DataError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the record table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a CSV or workbook yields.
/// Filter selections live in `BTreeSet`s, so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord/Hash so we can put CellValue in BTreeSet --
// Equality goes through `cmp`, so floats compare bit-wise like the hash.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl CellValue {
    /// Numeric view of the cell, used by range filters.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Table – the in-memory record table
// ---------------------------------------------------------------------------

/// An ordered collection of rows sharing one column list.
///
/// Tables are never edited in place by the pipeline: filters build a new
/// table from the rows they keep, so earlier tables stay valid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table, checking that every row matches the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, DataError> {
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns.len())
        {
            return Err(DataError::RowWidth {
                row,
                found: cells.len(),
                expected: columns.len(),
            });
        }
        Ok(Table { columns, rows })
    }

    /// Same schema, different rows. Rows must come from a table with this schema.
    pub fn with_rows(&self, rows: Vec<Vec<CellValue>>) -> Table {
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of `name` in the column list.
    pub fn column_index(&self, name: &str) -> Result<usize, DataError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// All cells of one column, in row order.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &CellValue>, DataError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Sorted distinct non-null values of a column (the multiselect options).
    pub fn unique_values(&self, name: &str) -> Result<BTreeSet<CellValue>, DataError> {
        Ok(self
            .column_values(name)?
            .filter(|v| !v.is_null())
            .cloned()
            .collect())
    }

    /// Smallest and largest numeric cell of a column, `None` if it has none.
    pub fn numeric_bounds(&self, name: &str) -> Result<Option<(f64, f64)>, DataError> {
        Ok(self
            .column_values(name)?
            .filter_map(CellValue::as_f64)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            }))
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        self.with_rows(self.rows.iter().take(n).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["age".into(), "job".into()],
            vec![
                vec![CellValue::Integer(25), "admin".into()],
                vec![CellValue::Integer(40), CellValue::Null],
                vec![CellValue::Integer(30), "admin".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Integer(1), CellValue::Integer(2)], vec![CellValue::Integer(3)]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataError::RowWidth {
                row: 1,
                found: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn unique_values_are_sorted_and_skip_nulls() {
        let uniques = sample().unique_values("job").unwrap();
        assert_eq!(uniques.into_iter().collect::<Vec<_>>(), vec![CellValue::from("admin")]);
    }

    #[test]
    fn numeric_bounds_cover_all_rows() {
        assert_eq!(sample().numeric_bounds("age").unwrap(), Some((25.0, 40.0)));
        assert_eq!(sample().numeric_bounds("job").unwrap(), None);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = sample().unique_values("loan").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "loan"));
    }

    #[test]
    fn head_keeps_schema() {
        let head = sample().head(2);
        assert_eq!(head.len(), 2);
        assert_eq!(head.column_names(), sample().column_names());
        assert_eq!(sample().head(10).len(), 3);
    }

    #[test]
    fn float_equality_agrees_with_ordering() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        fn hash_of(v: &CellValue) -> u64 {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        }

        let nan = CellValue::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(nan.cmp(&nan.clone()), std::cmp::Ordering::Equal);

        let zero = CellValue::Float(0.0);
        let neg_zero = CellValue::Float(-0.0);
        assert_ne!(zero, neg_zero);
        assert_ne!(hash_of(&zero), hash_of(&neg_zero));
        assert_eq!(hash_of(&CellValue::Float(2.5)), hash_of(&CellValue::Float(2.5)));
    }

    #[test]
    fn mixed_values_order_by_kind_first() {
        let mut set = BTreeSet::new();
        set.insert(CellValue::from("b"));
        set.insert(CellValue::Float(1.5));
        set.insert(CellValue::Null);
        set.insert(CellValue::Integer(7));
        let kinds: Vec<_> = set.into_iter().collect();
        assert_eq!(
            kinds,
            vec![
                CellValue::Null,
                CellValue::Integer(7),
                CellValue::Float(1.5),
                CellValue::from("b"),
            ]
        );
    }
}
