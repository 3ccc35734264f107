use std::collections::BTreeMap;

use super::error::DataError;
use super::model::{CellValue, Table};

/// Column header used for the percentage column when a frequency table is
/// shown or exported.
pub const SHARE_COLUMN: &str = "share_pct";

/// Percentage of rows carrying one outcome label.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub label: CellValue,
    pub percent: f64,
}

/// Normalized value counts of one column, ordered by label.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    pub column: String,
    pub shares: Vec<Share>,
}

impl FrequencyTable {
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn total_percent(&self) -> f64 {
        self.shares.iter().map(|s| s.percent).sum()
    }

    pub fn percent_of(&self, label: &CellValue) -> Option<f64> {
        self.shares
            .iter()
            .find(|s| &s.label == label)
            .map(|s| s.percent)
    }

    /// Two-column table (`column`, `share_pct`) for previews and export.
    pub fn to_table(&self) -> Table {
        let rows = self
            .shares
            .iter()
            .map(|s| vec![s.label.clone(), CellValue::Float(s.percent)])
            .collect();
        // Every row has exactly two cells.
        Table::new(vec![self.column.clone(), SHARE_COLUMN.to_string()], rows)
            .unwrap_or_default()
    }
}

/// Share of each distinct `outcome` value, in percent of the counted rows.
///
/// Null outcomes are not counted. An empty table gives an empty result.
pub fn acceptance_rate(table: &Table, outcome: &str) -> Result<FrequencyTable, DataError> {
    let mut counts: BTreeMap<&CellValue, usize> = BTreeMap::new();
    for value in table.column_values(outcome)?.filter(|v| !v.is_null()) {
        *counts.entry(value).or_default() += 1;
    }
    let total: usize = counts.values().sum();
    let shares = counts
        .into_iter()
        .map(|(label, n)| Share {
            label: label.clone(),
            percent: n as f64 * 100.0 / total as f64,
        })
        .collect();
    Ok(FrequencyTable {
        column: outcome.to_string(),
        shares,
    })
}
