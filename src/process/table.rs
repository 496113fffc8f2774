//! Per-category table derivation.

use anyhow::{bail, Context, Result};
use calamine::Data;

use crate::schema::{CategorySpec, SheetLayout};

/// One retained reporting period for one category.
///
/// `unoccupied` is derived at construction (available − occupied); the
/// grand-total column from the source never survives under its original
/// meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct BedRecord {
    pub period: String,
    pub occupied: f64,
    pub unoccupied: f64,
}

/// Plotting-ready table for one bed sub-type, rows in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    pub key: &'static str,
    pub title: &'static str,
    pub records: Vec<BedRecord>,
}

impl CategoryTable {
    /// Logical column labels, in stacking order.
    pub const COLUMNS: [&'static str; 3] = ["period", "occupied", "unoccupied"];
}

/// Combined "year quarter" label per data row, order-preserving. Missing
/// components contribute their textual placeholder (the empty string) and
/// the row is kept.
pub fn period_labels(grid: &[Vec<Data>], layout: &SheetLayout) -> Vec<String> {
    grid.iter()
        .map(|row| {
            format!(
                "{} {}",
                cell_text(row.get(layout.year_col)),
                cell_text(row.get(layout.quarter_col))
            )
        })
        .collect()
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Strictly numeric cell read; no coercion from text.
fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        _ => None,
    }
}

/// Build one category's table from the trimmed grid.
///
/// Fails with row/column coordinates on a grid too narrow for the
/// category's columns, on non-numeric count cells, and on derivations
/// that would go negative. All of these mean layout drift or anomalous
/// input, not conditions to paper over.
pub fn build_category(
    grid: &[Vec<Data>],
    labels: &[String],
    spec: &CategorySpec,
) -> Result<CategoryTable> {
    let mut records = Vec::with_capacity(grid.len());

    for (row_idx, row) in grid.iter().enumerate() {
        if row.len() < spec.min_width() {
            bail!(
                "data row {} has {} columns but category `{}` needs column {}: \
                 layout drift in the source file?",
                row_idx,
                row.len(),
                spec.key,
                spec.min_width() - 1
            );
        }

        let occupied = cell_number(&row[spec.occupied_col]).with_context(|| {
            format!(
                "non-numeric occupied-beds cell at data row {}, column {} (category `{}`)",
                row_idx, spec.occupied_col, spec.key
            )
        })?;
        let available = cell_number(&row[spec.available_col]).with_context(|| {
            format!(
                "non-numeric available-beds cell at data row {}, column {} (category `{}`)",
                row_idx, spec.available_col, spec.key
            )
        })?;

        if occupied < 0.0 {
            bail!(
                "negative occupied-beds count {} at data row {} (category `{}`)",
                occupied,
                row_idx,
                spec.key
            );
        }
        let unoccupied = available - occupied;
        if unoccupied < 0.0 {
            bail!(
                "occupied beds ({}) exceed available beds ({}) at data row {} (category `{}`)",
                occupied,
                available,
                row_idx,
                spec.key
            );
        }

        records.push(BedRecord {
            period: labels[row_idx].clone(),
            occupied,
            unoccupied,
        });
    }

    Ok(CategoryTable {
        key: spec.key,
        title: spec.title,
        records,
    })
}
