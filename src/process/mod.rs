//! Spreadsheet-to-table extraction.
//!
//! The published workbook mixes a multi-row title block and a footer row
//! with the data region. This module trims it down per the layout
//! descriptor, builds the combined period labels, and derives the five
//! plotting-ready category tables.

pub mod sheet;
pub mod table;

pub use sheet::RawSheet;
pub use table::{BedRecord, CategoryTable};

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::schema::{BEDS_TIMESERIES, CATEGORIES};

/// Extract the five category tables from a downloaded workbook file.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn extract_tables(path: impl AsRef<Path>) -> Result<Vec<CategoryTable>> {
    let path = path.as_ref();
    sheet::validate_workbook_signature(path)?;
    let raw = sheet::load_sheet(path)?;
    extract_from_sheet(&raw).with_context(|| format!("extracting tables from {}", path.display()))
}

/// Extraction on an already-loaded sheet. Deterministic: the same grid
/// always yields the same tables.
pub fn extract_from_sheet(raw: &RawSheet) -> Result<Vec<CategoryTable>> {
    let grid = raw.trim(&BEDS_TIMESERIES);
    info!(rows = grid.len(), "trimmed to data region");

    let labels = table::period_labels(&grid, &BEDS_TIMESERIES);
    CATEGORIES
        .iter()
        .map(|spec| table::build_category(&grid, &labels, spec))
        .collect()
}
