use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional config file looked up in the working directory.
pub const CONFIG_FILE: &str = "telemarketing.json";

/// A categorical column offered as a multiselect filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterColumn {
    pub column: String,
    pub label: String,
}

impl FilterColumn {
    fn new(column: &str, label: &str) -> Self {
        Self {
            column: column.to_string(),
            label: label.to_string(),
        }
    }
}

/// File names offered in the save dialogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportNames {
    pub filtered_table: String,
    pub raw_rates: String,
    pub filtered_rates: String,
}

impl Default for ExportNames {
    fn default() -> Self {
        Self {
            filtered_table: "bank_filtered.xlsx".into(),
            raw_rates: "bank_raw_y.xlsx".into(),
            filtered_rates: "bank_filtered_y.xlsx".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Loaded at startup when it exists.
    pub default_data_path: PathBuf,
    /// Field separator of delimited text sources.
    pub delimiter: char,
    /// Binary outcome whose distribution is shown.
    pub outcome_column: String,
    /// Numeric column filtered by min/max.
    pub range_column: String,
    pub categorical_columns: Vec<FilterColumn>,
    pub preview_rows: usize,
    pub branding_image: PathBuf,
    pub sheet_name: String,
    pub export_names: ExportNames,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_data_path: PathBuf::from("data/input/bank-additional-full.csv"),
            delimiter: ';',
            outcome_column: "y".into(),
            range_column: "age".into(),
            categorical_columns: vec![
                FilterColumn::new("job", "Job"),
                FilterColumn::new("marital", "Marital status"),
                FilterColumn::new("default", "Credit in default"),
                FilterColumn::new("housing", "Housing loan"),
                FilterColumn::new("loan", "Personal loan"),
                FilterColumn::new("contact", "Contact channel"),
                FilterColumn::new("month", "Contact month"),
                FilterColumn::new("day_of_week", "Day of week"),
            ],
            preview_rows: 5,
            branding_image: PathBuf::from("img/Bank-Branding.jpg"),
            sheet_name: "Sheet1".into(),
            export_names: ExportNames::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when the file is absent; a broken file is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Using config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config: {e:#}");
                Self::default()
            }
        }
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.delimiter.is_ascii(),
            "delimiter {:?} must be a single ASCII character",
            self.delimiter
        );
        anyhow::ensure!(!self.outcome_column.is_empty(), "outcome_column must not be empty");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_bank_dataset() {
        let config = AppConfig::default();
        assert_eq!(config.delimiter_byte(), b';');
        assert_eq!(config.categorical_columns.len(), 8);
        assert_eq!(config.categorical_columns[7].column, "day_of_week");
        assert_eq!(config.export_names.filtered_table, "bank_filtered.xlsx");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "preview_rows": 10, "delimiter": "," }}"#).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.delimiter_byte(), b',');
        assert_eq!(config.outcome_column, "y");
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "delimiter": "é" }}"#).unwrap();
        assert!(AppConfig::load(file.path()).is_err());
        assert_eq!(AppConfig::load_or_default(file.path()), AppConfig::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, AppConfig::default());
    }
}
