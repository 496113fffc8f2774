//! Multi-page PDF report assembly and delivery.

use anyhow::{Context, Result};
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{Image, ImageTransform, Mm, PdfDocument, PdfDocumentReference};
use std::{
    fs,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::chart::{self, CHART_HEIGHT, CHART_WIDTH};
use crate::process::CategoryTable;

/// Raster resolution at which chart pixels are placed on the page.
const RENDER_DPI: f32 = 150.0;

/// Filename of the delivery copy.
pub const DELIVERY_FILENAME: &str = "NHS_Beds_Output.pdf";

fn px_to_mm(px: u32) -> f32 {
    px as f32 * 25.4 / RENDER_DPI
}

/// A report document under construction. Pages are appended one at a time
/// and nothing touches the filesystem until [`ReportBuilder::save`] seals
/// the document; a failed build leaves no partial output file behind.
pub struct ReportBuilder {
    doc: PdfDocumentReference,
    pages: usize,
}

impl ReportBuilder {
    pub fn new(title: &str) -> Self {
        ReportBuilder {
            doc: PdfDocument::empty(title),
            pages: 0,
        }
    }

    /// Render one category's chart and append it as a full-bleed page.
    /// `buf` is scratch space reused across pages.
    pub fn add_chart_page(&mut self, table: &CategoryTable, buf: &mut Vec<u8>) -> Result<()> {
        chart::render_chart(table, buf)?;

        let (page, layer) = self.doc.add_page(
            Mm(px_to_mm(CHART_WIDTH)),
            Mm(px_to_mm(CHART_HEIGHT)),
            table.title,
        );
        let pixels = RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buf.clone())
            .context("chart buffer has unexpected dimensions")?;
        let chart_image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(pixels));
        chart_image.add_to_layer(
            self.doc.get_page(page).get_layer(layer),
            ImageTransform {
                dpi: Some(RENDER_DPI),
                ..Default::default()
            },
        );

        self.pages += 1;
        Ok(())
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Seal the document at `path` and return its canonical location.
    pub fn save(self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        self.doc
            .save(&mut BufWriter::new(file))
            .with_context(|| format!("writing report to {}", path.display()))?;
        fs::canonicalize(path).with_context(|| format!("resolving {}", path.display()))
    }
}

/// Assemble the report: one chart page per table, in the order given,
/// then seal. Any rendering failure aborts before anything is written.
pub fn assemble(tables: &[CategoryTable], output: impl AsRef<Path>) -> Result<PathBuf> {
    let mut builder = ReportBuilder::new("NHS Bed Availability");
    let mut buf = Vec::new();
    for table in tables {
        info!(category = table.key, rows = table.records.len(), "rendering chart page");
        builder
            .add_chart_page(table, &mut buf)
            .with_context(|| format!("rendering chart for category `{}`", table.key))?;
    }
    let path = builder.save(output)?;
    info!(report = %path.display(), "report sealed");
    Ok(path)
}

/// Copy the sealed report into the delivery directory, from where the
/// surrounding environment offers it to the user.
pub fn deliver(report: impl AsRef<Path>, delivery_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let report = report.as_ref();
    let delivery_dir = delivery_dir.as_ref();
    fs::create_dir_all(delivery_dir)
        .with_context(|| format!("creating {}", delivery_dir.display()))?;
    let dest = delivery_dir.join(DELIVERY_FILENAME);
    fs::copy(report, &dest).with_context(|| {
        format!("copying {} to {}", report.display(), dest.display())
    })?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::BedRecord;
    use tempfile::tempdir;

    fn sample_tables() -> Vec<CategoryTable> {
        crate::schema::CATEGORIES
            .iter()
            .map(|spec| CategoryTable {
                key: spec.key,
                title: spec.title,
                records: vec![
                    BedRecord {
                        period: "2021/22 Q4".to_string(),
                        occupied: 100_000.0,
                        unoccupied: 40_000.0,
                    },
                    BedRecord {
                        period: "2022/23 Q1".to_string(),
                        occupied: 101_000.0,
                        unoccupied: 39_000.0,
                    },
                ],
            })
            .collect()
    }

    /// Count page dictionaries, tolerating either name/value spacing.
    fn count_pdf_pages(bytes: &[u8]) -> usize {
        [&b"/Type /Page"[..], &b"/Type/Page"[..]]
            .iter()
            .map(|needle| {
                bytes
                    .windows(needle.len() + 1)
                    .filter(|w| w.starts_with(needle) && w[needle.len()] != b's')
                    .count()
            })
            .sum()
    }

    #[test]
    fn report_has_one_page_per_category() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("plots.pdf");
        let path = assemble(&sample_tables(), &out)?;

        let bytes = fs::read(&path)?;
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(count_pdf_pages(&bytes), 5);
        Ok(())
    }

    #[test]
    fn empty_tables_still_produce_five_pages() -> Result<()> {
        let dir = tempdir()?;
        let tables: Vec<CategoryTable> = crate::schema::CATEGORIES
            .iter()
            .map(|spec| CategoryTable {
                key: spec.key,
                title: spec.title,
                records: Vec::new(),
            })
            .collect();
        let path = assemble(&tables, dir.path().join("plots.pdf"))?;
        assert_eq!(count_pdf_pages(&fs::read(&path)?), 5);
        Ok(())
    }

    #[test]
    fn delivery_copy_lands_under_the_delivery_dir() -> Result<()> {
        let dir = tempdir()?;
        let report = assemble(&sample_tables(), dir.path().join("plots.pdf"))?;

        let delivery = dir.path().join("delivery");
        let delivered = deliver(&report, &delivery)?;
        assert_eq!(delivered, delivery.join(DELIVERY_FILENAME));
        assert_eq!(fs::read(&report)?.len(), fs::read(&delivered)?.len());
        Ok(())
    }
}
