use std::collections::BTreeSet;

use crate::config::AppConfig;

use super::error::DataError;
use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Selection: which values of a categorical column are kept
// ---------------------------------------------------------------------------

/// Multiselect state for one column.
///
/// `All` means "do not restrict this column". An empty subset is treated the
/// same way, so a user who clears every checkbox still sees data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Subset(BTreeSet<CellValue>),
}

impl Selection {
    pub fn from_values<I: IntoIterator<Item = CellValue>>(values: I) -> Self {
        let set: BTreeSet<CellValue> = values.into_iter().collect();
        if set.is_empty() {
            Selection::All
        } else {
            Selection::Subset(set)
        }
    }

    /// Whether this selection lets every row through.
    pub fn is_all(&self) -> bool {
        match self {
            Selection::All => true,
            Selection::Subset(set) => set.is_empty(),
        }
    }

    pub fn contains(&self, value: &CellValue) -> bool {
        match self {
            Selection::All => true,
            Selection::Subset(set) => set.is_empty() || set.contains(value),
        }
    }

    /// Toggle one value, collapsing back to `All` when nothing is left.
    pub fn toggle(&mut self, value: &CellValue) {
        let mut set = match std::mem::take(self) {
            Selection::All => BTreeSet::new(),
            Selection::Subset(set) => set,
        };
        if !set.remove(value) {
            set.insert(value.clone());
        }
        *self = Selection::from_values(set);
    }
}

// ---------------------------------------------------------------------------
// Single-column filters
// ---------------------------------------------------------------------------

/// Keep the rows whose `column` value is in `selection`, in their original
/// order. `All` returns the input rows untouched without looking the column up.
pub fn filter_column(table: &Table, column: &str, selection: &Selection) -> Result<Table, DataError> {
    if selection.is_all() {
        return Ok(table.clone());
    }
    let idx = table.column_index(column)?;
    let rows = table
        .rows()
        .iter()
        .filter(|row| selection.contains(&row[idx]))
        .cloned()
        .collect();
    Ok(table.with_rows(rows))
}

/// Keep the rows with `min <= value <= max`. Non-numeric cells never match.
pub fn filter_range(table: &Table, column: &str, min: f64, max: f64) -> Result<Table, DataError> {
    let idx = table.column_index(column)?;
    let rows = table
        .rows()
        .iter()
        .filter(|row| {
            row[idx]
                .as_f64()
                .is_some_and(|v| min <= v && v <= max)
        })
        .cloned()
        .collect();
    Ok(table.with_rows(rows))
}

// ---------------------------------------------------------------------------
// FilterSpec: the whole filter form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

/// One range filter plus any number of categorical filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    pub range: Option<RangeFilter>,
    pub selections: Vec<(String, Selection)>,
}

impl FilterSpec {
    /// Full range and `All` everywhere, for the configured columns the table has.
    pub fn unrestricted(table: &Table, config: &AppConfig) -> Result<Self, DataError> {
        let range = if table.has_column(&config.range_column) {
            table
                .numeric_bounds(&config.range_column)?
                .map(|(min, max)| RangeFilter {
                    column: config.range_column.clone(),
                    min,
                    max,
                })
        } else {
            None
        };
        let selections = config
            .categorical_columns
            .iter()
            .filter(|c| table.has_column(&c.column))
            .map(|c| (c.column.clone(), Selection::All))
            .collect();
        Ok(FilterSpec { range, selections })
    }

    pub fn selection_mut(&mut self, column: &str) -> Option<&mut Selection> {
        self.selections
            .iter_mut()
            .find(|(c, _)| c == column)
            .map(|(_, s)| s)
    }

    /// Number of columns currently restricting rows.
    pub fn active_count(&self) -> usize {
        self.selections.iter().filter(|(_, s)| !s.is_all()).count()
    }
}

/// Apply the range filter, then each categorical filter on the previous output.
pub fn apply_filters(table: &Table, spec: &FilterSpec) -> Result<Table, DataError> {
    let mut current = match &spec.range {
        Some(r) => filter_range(table, &r.column, r.min, r.max)?,
        None => table.clone(),
    };
    for (column, selection) in &spec.selections {
        current = filter_column(&current, column, selection)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> Table {
        Table::new(
            vec!["age".into(), "job".into(), "marital".into(), "y".into()],
            vec![
                vec![CellValue::Integer(25), "admin".into(), "single".into(), "yes".into()],
                vec![CellValue::Integer(40), "blue-collar".into(), "married".into(), "no".into()],
                vec![CellValue::Integer(30), "admin".into(), "married".into(), "yes".into()],
                vec![CellValue::Integer(52), "technician".into(), "single".into(), "no".into()],
            ],
        )
        .unwrap()
    }

    fn subset(values: &[&str]) -> Selection {
        Selection::from_values(values.iter().map(|v| CellValue::from(*v)))
    }

    #[test]
    fn all_is_identity() {
        let t = bank();
        assert_eq!(filter_column(&t, "job", &Selection::All).unwrap(), t);
        // The bypass does not even need the column to exist.
        assert_eq!(filter_column(&t, "nope", &Selection::All).unwrap(), t);
    }

    #[test]
    fn all_is_identity_with_nan_cells() {
        let t = Table::new(
            vec!["duration".into(), "y".into()],
            vec![
                vec![CellValue::Float(f64::NAN), "no".into()],
                vec![CellValue::Float(-0.0), "yes".into()],
            ],
        )
        .unwrap();
        assert_eq!(filter_column(&t, "y", &Selection::All).unwrap(), t);
        assert_eq!(apply_filters(&t, &FilterSpec::default()).unwrap(), t);
    }

    #[test]
    fn empty_selection_behaves_as_all() {
        let t = bank();
        assert_eq!(Selection::from_values(Vec::new()), Selection::All);
        let empty = Selection::Subset(BTreeSet::new());
        assert_eq!(filter_column(&t, "job", &empty).unwrap(), t);
    }

    #[test]
    fn subset_keeps_matching_rows_in_order() {
        let out = filter_column(&bank(), "job", &subset(&["admin", "technician"])).unwrap();
        let ages: Vec<_> = out.column_values("age").unwrap().cloned().collect();
        assert_eq!(ages, [25, 30, 52].map(CellValue::Integer));
    }

    #[test]
    fn subset_on_missing_column_fails() {
        let err = filter_column(&bank(), "loan", &subset(&["yes"])).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(_)));
    }

    #[test]
    fn job_scenario_yields_two_rows() {
        let t = Table::new(
            vec!["age".into(), "job".into(), "y".into()],
            vec![
                vec![CellValue::Integer(25), "admin".into(), "yes".into()],
                vec![CellValue::Integer(40), "blue-collar".into(), "no".into()],
                vec![CellValue::Integer(30), "admin".into(), "yes".into()],
            ],
        )
        .unwrap();
        assert_eq!(filter_column(&t, "job", &subset(&["admin"])).unwrap().len(), 2);

        let by_age = filter_range(&t, "age", 35.0, 50.0).unwrap();
        assert_eq!(by_age.len(), 1);
        assert_eq!(by_age.rows()[0][0], CellValue::Integer(40));
    }

    #[test]
    fn range_bounds_are_inclusive_and_may_be_empty() {
        assert_eq!(filter_range(&bank(), "age", 25.0, 30.0).unwrap().len(), 2);
        let none = filter_range(&bank(), "age", 90.0, 99.0).unwrap();
        assert!(none.is_empty());
        assert_eq!(none.column_names(), bank().column_names());
    }

    #[test]
    fn filters_commute() {
        let t = bank();
        let jobs = subset(&["admin", "blue-collar"]);
        let marital = subset(&["married"]);

        let a = filter_column(&filter_column(&t, "job", &jobs).unwrap(), "marital", &marital).unwrap();
        let b = filter_column(&filter_column(&t, "marital", &marital).unwrap(), "job", &jobs).unwrap();
        assert_eq!(a, b);

        let c = filter_range(&filter_column(&t, "job", &jobs).unwrap(), "age", 26.0, 60.0).unwrap();
        let d = filter_column(&filter_range(&t, "age", 26.0, 60.0).unwrap(), "job", &jobs).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn input_table_is_untouched() {
        let t = bank();
        let before = t.clone();
        let _ = filter_column(&t, "job", &subset(&["admin"])).unwrap();
        let _ = filter_range(&t, "age", 0.0, 1.0).unwrap();
        assert_eq!(t, before);
    }

    #[test]
    fn toggle_collapses_to_all() {
        let mut s = Selection::All;
        let admin = CellValue::from("admin");
        s.toggle(&admin);
        assert_eq!(s, subset(&["admin"]));
        s.toggle(&admin);
        assert_eq!(s, Selection::All);
    }

    #[test]
    fn unrestricted_spec_keeps_everything() {
        let t = bank();
        let spec = FilterSpec::unrestricted(&t, &AppConfig::default()).unwrap();
        let range = spec.range.as_ref().unwrap();
        assert_eq!((range.min, range.max), (25.0, 52.0));
        // Only configured columns present in the table get a selection.
        let cols: Vec<_> = spec.selections.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(cols, ["job", "marital"]);
        assert_eq!(apply_filters(&t, &spec).unwrap(), t);
    }

    #[test]
    fn pipeline_applies_every_filter() {
        let t = bank();
        let mut spec = FilterSpec::unrestricted(&t, &AppConfig::default()).unwrap();
        spec.range = Some(RangeFilter {
            column: "age".into(),
            min: 20.0,
            max: 45.0,
        });
        *spec.selection_mut("marital").unwrap() = subset(&["married"]);
        assert_eq!(spec.active_count(), 1);

        let out = apply_filters(&t, &spec).unwrap();
        let ages: Vec<_> = out.column_values("age").unwrap().cloned().collect();
        assert_eq!(ages, [40, 30].map(CellValue::Integer));
    }
}
