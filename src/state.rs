use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::export::Exporter;
use crate::data::filter::FilterSpec;
use crate::data::loader::{DataSource, Loader};
use crate::data::model::{CellValue, Table};
use crate::data::pipeline::Analysis;

// ---------------------------------------------------------------------------
// Small UI enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bars,
    Pie,
}

/// Which table an export button refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    FilteredTable,
    RawRates,
    FilteredRates,
}

/// Options shown in one multiselect.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub column: String,
    pub label: String,
    pub values: BTreeSet<CellValue>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    loader: Loader,
    exporter: Exporter,

    /// Loaded dataset (None until a file has been read).
    pub raw: Option<Arc<Table>>,

    /// Where `raw` came from, for the top bar.
    pub origin: Option<String>,

    /// Multiselect options per configured column present in `raw`.
    pub options: Vec<FilterOptions>,

    /// Bounds of the range column in `raw`.
    pub range_bounds: Option<(f64, f64)>,

    /// Filters being edited in the side panel; no effect until applied.
    pub draft: FilterSpec,

    /// Output of the last applied filters.
    pub analysis: Option<Analysis>,

    pub chart_kind: ChartKind,

    /// Fixed colours per outcome label.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            loader: Loader::new(config.delimiter_byte()),
            exporter: Exporter::new(config.sheet_name.clone()),
            config,
            raw: None,
            origin: None,
            options: Vec::new(),
            range_bounds: None,
            draft: FilterSpec::default(),
            analysis: None,
            chart_kind: ChartKind::default(),
            color_map: None,
            status_message: None,
        }
    }

    /// Load the configured default file, if it exists.
    pub fn load_default(&mut self) {
        let path = self.config.default_data_path.clone();
        if !path.exists() {
            self.status_message = Some(format!(
                "Open a CSV/XLSX file or place the CSV at '{}'.",
                path.display()
            ));
            return;
        }
        self.load(&DataSource::Path(path));
    }

    /// Load a source and reset the filters. Errors end up in the status line.
    pub fn load(&mut self, source: &DataSource) {
        let result = self
            .loader
            .load(source)
            .map_err(anyhow::Error::from)
            .and_then(|table| self.set_dataset(table, source.origin()));
        if let Err(e) = result {
            log::error!("Failed to load {}: {e:#}", source.origin());
            self.status_message = Some(format!("Error: {e:#}"));
        }
        log::debug!(
            "loader cache: {} tables, {:?}",
            self.loader.cache().len(),
            self.loader.cache().stats()
        );
    }

    /// Ingest a newly loaded dataset, initialise filters, colours and results.
    pub fn set_dataset(&mut self, table: Arc<Table>, origin: String) -> Result<()> {
        let draft = FilterSpec::unrestricted(&table, &self.config)?;
        let options = self
            .config
            .categorical_columns
            .iter()
            .filter(|c| table.has_column(&c.column))
            .map(|c| -> Result<FilterOptions> {
                Ok(FilterOptions {
                    column: c.column.clone(),
                    label: c.label.clone(),
                    values: table.unique_values(&c.column)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let labels = table
            .unique_values(&self.config.outcome_column)
            .with_context(|| format!("{origin} has no outcome column"))?;
        let analysis = Analysis::run(&table, &draft, &self.config.outcome_column)?;

        self.range_bounds = draft.range.as_ref().map(|r| (r.min, r.max));
        self.color_map = Some(ColorMap::new(&labels));
        self.options = options;
        self.draft = draft;
        self.analysis = Some(analysis);
        self.raw = Some(table);
        self.origin = Some(origin);
        self.status_message = None;
        Ok(())
    }

    /// Commit the side-panel filters and recompute everything downstream.
    pub fn apply_filters(&mut self) {
        let Some(raw) = &self.raw else {
            return;
        };
        match Analysis::run(raw, &self.draft, &self.config.outcome_column) {
            Ok(analysis) => {
                log::info!("Filters applied: {} of {} rows kept", analysis.filtered.len(), raw.len());
                self.analysis = Some(analysis);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Filtering failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Back to the unrestricted filters, applied immediately.
    pub fn reset_filters(&mut self) {
        let Some(raw) = &self.raw else {
            return;
        };
        match FilterSpec::unrestricted(raw, &self.config) {
            Ok(spec) => {
                self.draft = spec;
                self.apply_filters();
            }
            Err(e) => {
                log::error!("Resetting filters failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Encode one of the result tables as xlsx, with its suggested file name.
    pub fn export(&mut self, target: ExportTarget) -> Result<(String, Arc<Vec<u8>>)> {
        let analysis = self.analysis.as_ref().context("nothing to export yet")?;
        let names = &self.config.export_names;
        let (name, table) = match target {
            ExportTarget::FilteredTable => (&names.filtered_table, analysis.filtered.clone()),
            ExportTarget::RawRates => (&names.raw_rates, analysis.raw_rates.to_table()),
            ExportTarget::FilteredRates => (&names.filtered_rates, analysis.filtered_rates.to_table()),
        };
        let bytes = self.exporter.encode(&table)?;
        log::debug!("export cache: {:?}", self.exporter.cache().stats());
        Ok((name.clone(), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Selection;

    const BANK_CSV: &str = "age;job;marital;y\n\
        25;admin;single;yes\n\
        40;blue-collar;married;no\n\
        30;admin;married;yes\n";

    fn loaded() -> AppState {
        let mut state = AppState::new(AppConfig::default());
        state.load(&DataSource::Upload {
            name: "bank.csv".into(),
            bytes: Arc::from(BANK_CSV.as_bytes()),
        });
        state
    }

    #[test]
    fn load_initialises_options_and_results() {
        let state = loaded();
        assert!(state.status_message.is_none());
        assert_eq!(state.range_bounds, Some((25.0, 40.0)));
        let cols: Vec<_> = state.options.iter().map(|o| o.column.as_str()).collect();
        assert_eq!(cols, ["job", "marital"]);
        assert_eq!(state.analysis.as_ref().unwrap().filtered.len(), 3);
    }

    #[test]
    fn draft_changes_wait_for_apply() {
        let mut state = loaded();
        *state.draft.selection_mut("job").unwrap() =
            Selection::from_values([CellValue::from("admin")]);
        assert_eq!(state.analysis.as_ref().unwrap().filtered.len(), 3);

        state.apply_filters();
        let analysis = state.analysis.as_ref().unwrap();
        assert_eq!(analysis.filtered.len(), 2);
        assert_eq!(analysis.filtered_rates.percent_of(&"yes".into()), Some(100.0));

        state.reset_filters();
        assert_eq!(state.analysis.as_ref().unwrap().filtered.len(), 3);
    }

    #[test]
    fn reset_restores_unrestricted_draft_and_clears_status() {
        let mut state = loaded();
        *state.draft.selection_mut("marital").unwrap() =
            Selection::from_values([CellValue::from("single")]);
        state.apply_filters();
        assert_eq!(state.analysis.as_ref().unwrap().filtered.len(), 1);
        state.status_message = Some("Error: stale".into());

        state.reset_filters();
        assert_eq!(state.draft.active_count(), 0);
        assert!(state.status_message.is_none());
        assert_eq!(state.analysis.as_ref().unwrap().filtered.len(), 3);
    }

    #[test]
    fn unreadable_upload_sets_status_and_keeps_session() {
        let mut state = loaded();
        state.load(&DataSource::Upload {
            name: "broken.bin".into(),
            bytes: Arc::from(&[0u8, 159, 146, 150][..]),
        });
        assert!(state.status_message.as_deref().unwrap().contains("broken.bin"));
        // The previous dataset is still shown.
        assert_eq!(state.origin.as_deref(), Some("bank.csv"));
    }

    #[test]
    fn exports_use_configured_names() {
        let mut state = loaded();
        let (name, bytes) = state.export(ExportTarget::FilteredRates).unwrap();
        assert_eq!(name, "bank_filtered_y.xlsx");
        assert!(bytes.starts_with(b"PK"));
    }
}
