//! Fetch the published NHS beds timeseries workbook, derive the five
//! per-category occupancy tables, and render them as a multi-page
//! stacked-bar-chart PDF report.

pub mod chart;
pub mod config;
pub mod fetch;
pub mod process;
pub mod report;
pub mod schema;

use anyhow::{Context, Result};
use std::path::PathBuf;

use config::PipelineConfig;

/// Run the full pipeline: download the workbook, extract the category
/// tables, assemble and seal the report. Returns the sealed report's
/// canonical path. Strictly sequential; the first failure aborts the run.
pub fn run(cfg: &PipelineConfig) -> Result<PathBuf> {
    cfg.validate()?;

    let client = reqwest::blocking::Client::builder()
        .build()
        .context("building HTTP client")?;
    fetch::download_spreadsheet(&client, &cfg.source_url, &cfg.input_path)?;

    let tables = process::extract_tables(&cfg.input_path)?;
    report::assemble(&tables, &cfg.output_path)
}
