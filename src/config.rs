//! Run configuration.
//!
//! Everything the pipeline used to treat as ambient state (source URL,
//! download destination, report path, delivery directory) is carried
//! explicitly so a run is fully described by one value.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use url::Url;

/// Default quarterly beds-timeseries publication.
pub const DEFAULT_SOURCE_URL: &str = "https://www.england.nhs.uk/statistics/wp-content/uploads/sites/2/2023/05/Beds-Timeseries-2010-11-onwards-Q4-2022-23-ADJ-for-missings-YQWSA.xls";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// HTTP location of the published `.xls` workbook.
    pub source_url: String,
    /// Where the downloaded workbook is written.
    pub input_path: PathBuf,
    /// Where the sealed report is written.
    pub output_path: PathBuf,
    /// Directory receiving the delivery copy of the sealed report.
    pub delivery_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            input_path: PathBuf::from("data.xls"),
            output_path: PathBuf::from("plots.pdf"),
            delivery_dir: std::env::temp_dir(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file. Fields missing from the file
    /// keep their defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: PipelineConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the parts of the configuration that can fail before any I/O.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.source_url)
            .with_context(|| format!("invalid source_url `{}`", self.source_url))?;
        Ok(())
    }
}
