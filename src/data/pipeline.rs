use super::aggregate::{acceptance_rate, FrequencyTable};
use super::error::DataError;
use super::filter::{apply_filters, FilterSpec};
use super::model::Table;

/// Result of one filter request: the reduced table plus the outcome
/// distribution before and after filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub filtered: Table,
    pub raw_rates: FrequencyTable,
    pub filtered_rates: FrequencyTable,
}

impl Analysis {
    pub fn run(raw: &Table, spec: &FilterSpec, outcome: &str) -> Result<Self, DataError> {
        let raw_rates = acceptance_rate(raw, outcome)?;
        let filtered = apply_filters(raw, spec)?;
        let filtered_rates = acceptance_rate(&filtered, outcome)?;
        log::debug!(
            "filters kept {} of {} rows ({} categorical filters active)",
            filtered.len(),
            raw.len(),
            spec.active_count()
        );
        Ok(Analysis {
            filtered,
            raw_rates,
            filtered_rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::data::filter::{RangeFilter, Selection};
    use crate::data::model::CellValue;

    fn scenario() -> Table {
        Table::new(
            vec!["age".into(), "job".into(), "y".into()],
            vec![
                vec![CellValue::Integer(25), "admin".into(), "yes".into()],
                vec![CellValue::Integer(40), "blue-collar".into(), "no".into()],
                vec![CellValue::Integer(30), "admin".into(), "yes".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn admin_filter_accepts_everyone() {
        let raw = scenario();
        let mut spec = FilterSpec::unrestricted(&raw, &AppConfig::default()).unwrap();
        *spec.selection_mut("job").unwrap() = Selection::from_values([CellValue::from("admin")]);

        let analysis = Analysis::run(&raw, &spec, "y").unwrap();
        assert_eq!(analysis.filtered.len(), 2);
        assert_eq!(analysis.filtered_rates.shares.len(), 1);
        assert_eq!(analysis.filtered_rates.percent_of(&"yes".into()), Some(100.0));
        assert!((analysis.raw_rates.total_percent() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_filter_result_is_not_an_error() {
        let raw = scenario();
        let spec = FilterSpec {
            range: Some(RangeFilter {
                column: "age".into(),
                min: 60.0,
                max: 70.0,
            }),
            selections: Vec::new(),
        };
        let analysis = Analysis::run(&raw, &spec, "y").unwrap();
        assert!(analysis.filtered.is_empty());
        assert!(analysis.filtered_rates.is_empty());
        assert!(!analysis.raw_rates.is_empty());
    }

    #[test]
    fn missing_outcome_surfaces() {
        let raw = scenario();
        let err = Analysis::run(&raw, &FilterSpec::default(), "target").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(_)));
    }
}
