//! Workbook loading and layout trimming.

use anyhow::{bail, Context, Result};
use calamine::{open_workbook, Data, Reader, Xls};
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

use crate::schema::SheetLayout;

/// OLE2 compound-file signature; every legacy `.xls` workbook starts with it.
const OLE2_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// The full sheet as loaded: a rectangular grid of heterogeneous cells,
/// anchored at absolute row/column 0 regardless of where the used range
/// starts. Positional indices are the only identity the rows have.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub rows: Vec<Vec<Data>>,
}

/// Reject files that are not OLE2 workbooks before handing them to the
/// parser. The interesting case is an HTML error page saved verbatim by
/// the fetch stage.
pub fn validate_workbook_signature(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut magic = [0u8; 8];
    let read = file
        .read(&mut magic)
        .with_context(|| format!("reading {}", path.display()))?;

    if read >= 8 && magic == OLE2_MAGIC {
        return Ok(());
    }
    if magic.starts_with(b"<") {
        bail!(
            "{} looks like an HTML page, not an `.xls` workbook (server error page saved as data?)",
            path.display()
        );
    }
    bail!(
        "{} is not an OLE2 `.xls` workbook (bad file signature)",
        path.display()
    );
}

/// Load the first worksheet of an `.xls` workbook into a [`RawSheet`].
///
/// calamine ranges are relative to the first used cell, so the grid is
/// padded back out to absolute coordinates before any positional slicing
/// happens.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_sheet(path: impl AsRef<Path>) -> Result<RawSheet> {
    let path = path.as_ref();
    let mut workbook: Xls<_> = open_workbook(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("workbook {} has no sheets", path.display()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet `{}` from {}", sheet_name, path.display()))?;

    let (row_off, col_off) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => (0, 0),
    };
    let width = col_off + range.width();

    let mut rows: Vec<Vec<Data>> = Vec::with_capacity(row_off + range.height());
    rows.resize(row_off, vec![Data::Empty; width]);
    for source in range.rows() {
        let mut row = Vec::with_capacity(width);
        row.resize(col_off, Data::Empty);
        row.extend(source.iter().cloned());
        rows.push(row);
    }

    debug!(sheet = %sheet_name, rows = rows.len(), width, "sheet loaded");
    Ok(RawSheet { rows })
}

impl RawSheet {
    /// Cut the sheet down to its data region: drop the title prologue and
    /// the margin column, then rows that are blank across every remaining
    /// column, then the trailing footer/summary row. Offsets come from the
    /// layout descriptor, not from content detection; a sheet too short to
    /// have a data region trims to an empty grid.
    pub fn trim(&self, layout: &SheetLayout) -> Vec<Vec<Data>> {
        let mut grid: Vec<Vec<Data>> = self
            .rows
            .iter()
            .skip(layout.header_rows)
            .map(|row| row.iter().skip(layout.margin_cols).cloned().collect::<Vec<_>>())
            .filter(|row| !row_is_blank(row))
            .collect();
        // footer/summary row, dropped unconditionally when present
        grid.pop();
        grid
    }
}

fn row_is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| matches!(cell, Data::Empty))
}
