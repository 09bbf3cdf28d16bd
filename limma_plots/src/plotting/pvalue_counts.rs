use std::path::Path;

use plotters::prelude::*;
use tracing::{info, warn};

use crate::analysis::pvalue_sweep::{pvalues, SweepRow};
use crate::error::{StatsError, StatsResult};
use crate::plotting::colormap::gist_rainbow;

/// Grouped bars: one group per p-value cut-off, one bar per label in
/// `hue_order`, height is the number of genes above threshold.
pub fn plot_pvalue_counts(
    rows: &[SweepRow],
    hue_order: &[String],
    y_label: &str,
    output_path: &Path,
) -> StatsResult<()> {
    let pvals = pvalues(rows);
    if pvals.is_empty() || hue_order.is_empty() {
        warn!("No counts to draw for {}", output_path.display());
        return Ok(());
    }

    let slots_per_group = hue_order.len() + 1;
    let total_slots = pvals.len() * slots_per_group;
    let y_max = rows.iter().map(|r| r.count).max().unwrap_or(0) as f64 * 1.1 + 1.0;
    let render = |e: &dyn std::fmt::Display| StatsError::render(output_path, e);

    let root = BitMapBackend::new(output_path, (1400, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| render(&e))?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(70)
        .build_cartesian_2d((0..total_slots).into_segmented(), 0f64..y_max)
        .map_err(|e| render(&e))?;

    let middle = hue_order.len() / 2;
    let pval_label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(s) if s % slots_per_group == middle => pvals
            .get(s / slots_per_group)
            .map(|p| format!("{p:e}"))
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(total_slots)
        .x_label_formatter(&pval_label)
        .x_desc("FDR corrected p-value cut-off")
        .y_desc(y_label)
        .draw()
        .map_err(|e| render(&e))?;

    for (h, hue) in hue_order.iter().enumerate() {
        let color = gist_rainbow(h as f64 / hue_order.len() as f64);
        let bars: Vec<(usize, f64)> = pvals
            .iter()
            .enumerate()
            .filter_map(|(g, p)| {
                rows.iter()
                    .find(|r| r.pval == *p && r.label() == *hue)
                    .map(|r| (g * slots_per_group + h, r.count as f64))
            })
            .collect();

        chart
            .draw_series(bars.into_iter().map(|(slot, count)| {
                Rectangle::new(
                    [(SegmentValue::Exact(slot), 0.0), (SegmentValue::Exact(slot + 1), count)],
                    color.filled(),
                )
            }))
            .map_err(|e| render(&e))?
            .label(hue.replace('_', ", "))
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(|e| render(&e))?;

    root.present().map_err(|e| render(&e))?;
    info!(
        "Counts across {} cut-offs saved to {}",
        pvals.len(),
        output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sweep_draws_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("counts.png");

        plot_pvalue_counts(&[], &["adult_control".to_string()], "Count >60%", &out).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn counts_across_cutoffs_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("between_pvalue_counts.png");
        let row = |pval: f64, comparison: &str, count: usize| SweepRow {
            pval,
            comparison: comparison.to_string(),
            treatment: "control".to_string(),
            count,
        };
        let rows = vec![
            row(0.05, "adult", 12),
            row(0.05, "senescent", 30),
            row(0.001, "adult", 3),
            row(0.001, "senescent", 9),
        ];
        let hues = vec!["adult_control".to_string(), "senescent_control".to_string()];

        plot_pvalue_counts(&rows, &hues, "Count >60%", &out).unwrap();
        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }
}
