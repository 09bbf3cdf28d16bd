use std::path::Path;

use plotters::prelude::*;
use tracing::{info, warn};

use crate::analysis::layout::PivotMatrix;
use crate::error::{StatsError, StatsResult};
use crate::plotting::colormap::{heat, yl_gn_bu};

const COLORBAR_STEPS: usize = 100;

/// Gene x comparison heatmap, first gene on top, with a colour bar on the
/// right labelled `colorbar_label`.
pub fn plot_heatmap(matrix: &PivotMatrix, colorbar_label: &str, output_path: &Path) -> StatsResult<()> {
    let n_rows = matrix.genes.len();
    let n_cols = matrix.columns.len();
    if n_rows == 0 || n_cols == 0 {
        warn!("Nothing to draw for {}", output_path.display());
        return Ok(());
    }

    let (lo, hi) = match matrix.value_range() {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((v, _)) => (v - 0.5, v + 0.5),
        None => (0.0, 100.0),
    };
    let render = |e: &dyn std::fmt::Display| StatsError::render(output_path, e);

    let height = (40 * n_rows as u32 + 300).max(600);
    let root = BitMapBackend::new(output_path, (1000, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render(&e))?;
    let (main_area, bar_area) = root.split_horizontally(820);

    let mut chart = ChartBuilder::on(&main_area)
        .margin(10)
        .x_label_area_size(160)
        .y_label_area_size(160)
        .build_cartesian_2d((0..n_cols).into_segmented(), (0..n_rows).into_segmented())
        .map_err(|e| render(&e))?;

    // y runs bottom-up, genes are listed top-down
    let gene_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(y) if *y < n_rows => matrix.genes[n_rows - 1 - *y].clone(),
        _ => String::new(),
    };
    let column_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(x) => matrix.columns.get(*x).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n_cols)
        .y_labels(n_rows)
        .x_label_formatter(&column_label)
        .y_label_formatter(&gene_label)
        .x_label_style(
            ("sans-serif", 18)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| render(&e))?;

    let cells = matrix.values.iter().enumerate().flat_map(|(row, values)| {
        let y = n_rows - 1 - row;
        values.iter().enumerate().map(move |(x, v)| (x, y, *v))
    });

    chart
        .draw_series(cells.clone().map(|(x, y, v)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                heat(v, lo, hi).filled(),
            )
        }))
        .map_err(|e| render(&e))?;

    chart
        .draw_series(cells.map(|(x, y, _)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                BLACK.stroke_width(1),
            )
        }))
        .map_err(|e| render(&e))?;

    let mut bar = ChartBuilder::on(&bar_area)
        .margin_top(10)
        .margin_bottom(170)
        .margin_right(20)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..1f64, lo..hi)
        .map_err(|e| render(&e))?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(colorbar_label)
        .draw()
        .map_err(|e| render(&e))?;

    let step = (hi - lo) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let y0 = lo + i as f64 * step;
        Rectangle::new(
            [(0.0, y0), (1.0, y0 + step)],
            yl_gn_bu(i as f64 / (COLORBAR_STEPS - 1) as f64).filled(),
        )
    }))
    .map_err(|e| render(&e))?;

    root.present().map_err(|e| render(&e))?;
    info!(
        "Heatmap of {} genes x {} columns saved to {}",
        n_rows,
        n_cols,
        output_path.display()
    );
    Ok(())
}
