use crate::constants;
use crate::error::{EtlError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_SOURCE: &str = "PROPERTY_ETL_SOURCE";
pub const ENV_DATABASE: &str = "PROPERTY_ETL_DATABASE";
pub const ENV_TABLE: &str = "PROPERTY_ETL_TABLE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub transform: TransformConfig,
}

/// Where data comes from and where it goes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source_file: PathBuf,
    pub database_file: PathBuf,
    pub table_name: String,
    /// Write `<table>.csv` after exploring the database.
    pub export_csv: bool,
    pub log_dir: PathBuf,
    /// Render run metrics in Prometheus text format to this file.
    pub metrics_textfile: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_file: PathBuf::from(constants::DEFAULT_SOURCE_FILE),
            database_file: PathBuf::from(constants::DEFAULT_DATABASE_FILE),
            table_name: constants::DEFAULT_TABLE_NAME.to_string(),
            export_csv: true,
            log_dir: PathBuf::from(constants::DEFAULT_LOG_DIR),
            metrics_textfile: None,
        }
    }
}

/// Validity thresholds applied by the quality gate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub min_price_per_area: f64,
    pub max_price_per_area: f64,
    pub allowed_property_types: Vec<String>,
    /// Records scraped on or before this date are dropped.
    pub scraping_date_cutoff: NaiveDate,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            min_price_per_area: constants::MIN_PRICE_PER_AREA,
            max_price_per_area: constants::MAX_PRICE_PER_AREA,
            allowed_property_types: constants::ALLOWED_PROPERTY_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scraping_date_cutoff: NaiveDate::parse_from_str(
                constants::SCRAPING_DATE_CUTOFF,
                constants::DATE_FORMAT,
            )
            .unwrap_or_default(),
        }
    }
}

impl TransformConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_price_per_area <= self.max_price_per_area) {
            return Err(EtlError::Config(format!(
                "min_price_per_area ({}) must not exceed max_price_per_area ({})",
                self.min_price_per_area, self.max_price_per_area
            )));
        }
        if self.allowed_property_types.is_empty() {
            return Err(EtlError::Config(
                "allowed_property_types must list at least one type".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load `config.toml` from the working directory if present, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
        let mut config = if default_path.exists() {
            Self::from_file(default_path)?
        } else {
            debug!("No {} found, using defaults", constants::DEFAULT_CONFIG_FILE);
            Self::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load an explicitly named config file; a missing file is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path.as_ref())?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&config_content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(v) = non_empty_env(ENV_SOURCE) {
            self.pipeline.source_file = PathBuf::from(v);
        }
        if let Some(v) = non_empty_env(ENV_DATABASE) {
            self.pipeline.database_file = PathBuf::from(v);
        }
        if let Some(v) = non_empty_env(ENV_TABLE) {
            self.pipeline.table_name = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_table_name(&self.pipeline.table_name)?;
        self.transform.validate()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Table names are interpolated into DDL, so only plain identifiers pass.
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(EtlError::Config(format!("Invalid table name '{name}'")))
    }
}
