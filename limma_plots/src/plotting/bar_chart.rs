use std::path::Path;

use plotters::prelude::*;
use tracing::{error, info, warn};

use crate::error::{StatsError, StatsResult};
use crate::models::GeneResultTable;
use crate::plotting::colormap::reversed_rainbow;

/// Draws one bar per gene for `value_column` of `table`.
///
/// The column is mandatory; leaving it out is a caller bug, so the first
/// rows of the table are logged to show what was available.
pub fn plot_gene_bars(
    table: &GeneResultTable,
    value_column: Option<&str>,
    y_label: &str,
    output_path: &Path,
) -> StatsResult<()> {
    let Some(value_column) = value_column else {
        match table.to_dataframe() {
            Ok(df) => error!("No value column given for {}:\n{}", table.name(), df.head(Some(5))),
            Err(e) => error!("No value column given for {} ({})", table.name(), e),
        }
        return Err(StatsError::Precondition(format!(
            "a value column is required to plot {}",
            table.name()
        )));
    };

    let column = table.column(value_column)?;
    let n = table.height();
    if n == 0 {
        warn!("{} has no genes, skipping {}", table.name(), output_path.display());
        return Ok(());
    }

    let y_max = column
        .values
        .iter()
        .flatten()
        .fold(0.0_f64, |acc, &v| acc.max(v))
        .max(1.0)
        * 1.05;
    let palette = reversed_rainbow(n);
    let genes = table.genes();
    let render = |e: &dyn std::fmt::Display| StatsError::render(output_path, e);

    let root = BitMapBackend::new(output_path, (3000, 1000)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(180)
        .y_label_area_size(90)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)
        .map_err(|e| render(&e))?;

    let gene_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => genes.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n)
        .x_label_formatter(&gene_label)
        .x_label_style(
            ("sans-serif", 16)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_desc(y_label)
        .axis_desc_style(("sans-serif", 28))
        .draw()
        .map_err(|e| render(&e))?;

    let bars: Vec<(usize, f64)> = column
        .values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    chart
        .draw_series(bars.iter().map(|&(i, v)| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                palette[i].filled(),
            );
            bar.set_margin(0, 0, 3, 3);
            bar
        }))
        .map_err(|e| render(&e))?;

    chart
        .draw_series(bars.iter().map(|&(i, v)| {
            let mut edge = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                BLACK.stroke_width(2),
            );
            edge.set_margin(0, 0, 3, 3);
            edge
        }))
        .map_err(|e| render(&e))?;

    root.present().map_err(|e| render(&e))?;
    info!("{} / {} bar chart saved to {}", table.name(), value_column, output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PercentColumn;

    fn table() -> GeneResultTable {
        GeneResultTable::new(
            "between_control",
            vec!["GeneA".into(), "GeneB".into()],
            vec![PercentColumn::new("sen_perc", vec![Some(70.0), Some(55.0)])],
        )
        .unwrap()
    }

    #[test]
    fn missing_value_column_is_a_precondition_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bars.png");

        let err = plot_gene_bars(&table(), None, "Percentage", &out).unwrap_err();
        assert!(matches!(err, StatsError::Precondition(_)));
        assert!(!out.exists());
    }

    #[test]
    fn unknown_value_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bars.png");

        let err = plot_gene_bars(&table(), Some("ad_perc"), "Percentage", &out).unwrap_err();
        assert!(matches!(err, StatsError::MissingColumn { .. }));
    }

    #[test]
    fn bars_are_written_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("between_control_sen_perc.png");

        plot_gene_bars(&table(), Some("sen_perc"), "% < 0.001", &out).unwrap();
        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }
}
