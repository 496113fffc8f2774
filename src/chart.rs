//! Stacked bar chart rendering.

use anyhow::Result;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;

use crate::process::CategoryTable;

/// Chart raster dimensions, also the page dimensions of the report.
pub const CHART_WIDTH: u32 = 1600;
pub const CHART_HEIGHT: u32 = 840;

// Series colors matching the published report's house style.
const OCCUPIED_COLOR: RGBColor = RGBColor(31, 119, 180);
const UNOCCUPIED_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Render one category's stacked bar chart into `buf` as RGB8 pixels
/// (`CHART_WIDTH * CHART_HEIGHT * 3` bytes).
///
/// Periods become categorical x positions in row order; each bar stacks
/// the occupied count below the unoccupied count. A table with no records
/// still renders a complete (bar-less) chart.
pub fn render_chart(table: &CategoryTable, buf: &mut Vec<u8>) -> Result<()> {
    buf.clear();
    buf.resize((CHART_WIDTH * CHART_HEIGHT * 3) as usize, 0xFF);

    let labels: Vec<&str> = table.records.iter().map(|r| r.period.as_str()).collect();
    let n = table.records.len();
    let y_top = table
        .records
        .iter()
        .map(|r| r.occupied + r.unoccupied)
        .fold(0.0_f64, f64::max);
    let y_top = if y_top > 0.0 { y_top * 1.05 } else { 1.0 };

    let root = BitMapBackend::with_buffer(buf, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Total Number of {} NHS Beds in England", table.title),
            ("sans-serif", 36),
        )
        .margin(20)
        .x_label_area_size(130)
        .y_label_area_size(90)
        .build_cartesian_2d((0..n.max(1)).into_segmented(), 0.0..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Year and Quarter")
        .y_desc("Number of Beds")
        .x_labels(n.max(1))
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels
                .get(*i)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .x_label_style(
            ("sans-serif", 14)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 20))
        .draw()?;

    chart
        .draw_series(table.records.iter().enumerate().map(|(i, r)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), r.occupied),
                ],
                OCCUPIED_COLOR.filled(),
            )
        }))?
        .label("Occupied")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], OCCUPIED_COLOR.filled()));

    chart
        .draw_series(table.records.iter().enumerate().map(|(i, r)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(i), r.occupied),
                    (SegmentValue::Exact(i + 1), r.occupied + r.unoccupied),
                ],
                UNOCCUPIED_COLOR.filled(),
            )
        }))?
        .label("Unoccupied")
        .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], UNOCCUPIED_COLOR.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 18))
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::BedRecord;

    fn sample_table(records: Vec<BedRecord>) -> CategoryTable {
        CategoryTable {
            key: "total",
            title: "all",
            records,
        }
    }

    fn record(period: &str, occupied: f64, unoccupied: f64) -> BedRecord {
        BedRecord {
            period: period.to_string(),
            occupied,
            unoccupied,
        }
    }

    #[test]
    fn renders_bars_into_the_buffer() -> Result<()> {
        let table = sample_table(vec![
            record("2021/22 Q1", 100_000.0, 40_000.0),
            record("2021/22 Q2", 110_000.0, 30_000.0),
        ]);
        let mut buf = Vec::new();
        render_chart(&table, &mut buf)?;
        assert_eq!(buf.len(), (CHART_WIDTH * CHART_HEIGHT * 3) as usize);

        let occupied_px = buf
            .chunks_exact(3)
            .filter(|px| px[0] == 31 && px[1] == 119 && px[2] == 180)
            .count();
        assert!(occupied_px > 0, "no occupied-series pixels drawn");
        Ok(())
    }

    #[test]
    fn empty_table_still_renders_a_page() -> Result<()> {
        let table = sample_table(Vec::new());
        let mut buf = Vec::new();
        render_chart(&table, &mut buf)?;
        assert_eq!(buf.len(), (CHART_WIDTH * CHART_HEIGHT * 3) as usize);
        // axes are drawn even with no bars
        assert!(buf
            .chunks_exact(3)
            .any(|px| px[0] != 255 || px[1] != 255 || px[2] != 255));
        Ok(())
    }
}
