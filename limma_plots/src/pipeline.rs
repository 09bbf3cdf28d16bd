use std::path::{Path, PathBuf};

use tracing::info;

use crate::analysis::layout::HeatmapLayout;
use crate::analysis::pvalue_sweep::collect_sweep;
use crate::analysis::threshold::{count_above, write_comparison_counts};
use crate::analysis::tidy::{build_tidy_table, TidyTable};
use crate::config::{PlotMode, ResultSource, StudyPaths, StudySettings};
use crate::data_handling::limma_statistics::load_sources;
use crate::error::StatsResult;
use crate::helper_functions::{ensure_dir, read_pval_cutoff};
use crate::plotting::bar_chart::plot_gene_bars;
use crate::plotting::heatmap::plot_heatmap;
use crate::plotting::pvalue_counts::plot_pvalue_counts;

/// The p-value cut-off of the current run and the directory holding its data.
#[derive(Debug, Clone)]
pub struct Cutoff {
    pub pval: String,
    pub dir: PathBuf,
}

impl Cutoff {
    pub fn load(paths: &StudyPaths) -> StatsResult<Self> {
        let pval = read_pval_cutoff(&paths.pval_settings_file)?;
        info!("pval is \"{}\"", pval);
        let dir = paths.pval_dir(&pval);
        ensure_dir(&dir)?;
        Ok(Self { pval, dir })
    }

    fn file_tag(&self) -> String {
        self.pval.replace('.', "_")
    }
}

pub fn run(paths: &StudyPaths, settings: &StudySettings) -> StatsResult<()> {
    for &mode in &settings.modes {
        run_mode(paths, settings, mode)?;
    }
    Ok(())
}

pub fn run_mode(paths: &StudyPaths, settings: &StudySettings, mode: PlotMode) -> StatsResult<()> {
    info!("Running {:?}", mode);
    match mode {
        PlotMode::BarCharts => {
            let cutoff = Cutoff::load(paths)?;
            run_bar_charts(paths, &cutoff.pval)
        }
        PlotMode::WithinHeatmap => {
            let cutoff = Cutoff::load(paths)?;
            run_heatmap(paths, &cutoff, &HeatmapLayout::within(), settings.threshold)
        }
        PlotMode::BetweenHeatmap => {
            let cutoff = Cutoff::load(paths)?;
            run_heatmap(paths, &cutoff, &HeatmapLayout::between(), settings.threshold)
        }
        PlotMode::PvalueSweep => run_pvalue_sweep(paths, settings.threshold),
    }
}

/// One bar chart per (table, column) for the tables in `SavedObjects`.
pub fn run_bar_charts(paths: &StudyPaths, pval: &str) -> StatsResult<()> {
    let root = paths.saved_objects.as_path();
    let sources: Vec<ResultSource> = ResultSource::BETWEEN
        .into_iter()
        .chain(ResultSource::WITHIN)
        .collect();

    for (source, table) in load_sources(paths, root, &sources)? {
        let y_label = if source.is_between() {
            format!("% < {pval}")
        } else {
            "Percentage".to_string()
        };
        for column in table.columns() {
            let output = root.join(format!("{}_{}.png", source.group_name(), column.name));
            plot_gene_bars(&table, Some(column.name.as_str()), &y_label, &output)?;
        }
    }
    Ok(())
}

/// Loads the layout's tables for one cut-off, writes the threshold counts
/// and draws the heatmap.
pub fn run_heatmap(
    paths: &StudyPaths,
    cutoff: &Cutoff,
    layout: &HeatmapLayout,
    threshold: f64,
) -> StatsResult<()> {
    let tidy = layout_tidy_table(paths, &cutoff.dir, layout)?;
    tidy.write_csv(&cutoff.dir.join(format!("{}_tidy.csv", layout.name)))?;

    let counts = layout.comparison_counts(&count_above(&tidy, threshold))?;
    info!("{}, pval ({}) count above {}%", layout.name, cutoff.pval, threshold);
    for c in &counts {
        info!("  {:<10} {:<8} {}", c.comparison, c.treatment, c.count);
    }
    write_comparison_counts(&cutoff.dir.join(layout.count_file_name(threshold)), &counts)?;

    let matrix = layout.pivot(&tidy)?;
    let output = cutoff
        .dir
        .join(format!("{}_heatmap_{}.png", layout.name, cutoff.file_tag()));
    plot_heatmap(&matrix, &format!("% p-value < {}", cutoff.pval), &output)
}

fn layout_tidy_table(paths: &StudyPaths, root: &Path, layout: &HeatmapLayout) -> StatsResult<TidyTable> {
    let groups = layout.groups();
    let sources: Vec<ResultSource> = ResultSource::ALL
        .into_iter()
        .filter(|s| groups.contains(&s.group_name()))
        .collect();

    let tables = load_sources(paths, root, &sources)?;
    let labelled: Vec<(&str, _)> = tables
        .iter()
        .map(|(source, table)| (source.group_name(), table))
        .collect();
    build_tidy_table(&labelled)
}

pub fn run_pvalue_sweep(paths: &StudyPaths, threshold: f64) -> StatsResult<()> {
    let sweep = collect_sweep(&paths.saved_objects)?;
    let y_label = format!("Count >{threshold}%");

    for (layout, rows) in [
        (HeatmapLayout::within(), &sweep.within),
        (HeatmapLayout::between(), &sweep.between),
    ] {
        let output = paths
            .saved_objects
            .join(format!("{}_pvalue_counts.png", layout.name));
        plot_pvalue_counts(rows, &layout.labels(), &y_label, &output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::threshold::read_comparison_counts;
    use crate::config::PVAL_DIR_PREFIX;
    use std::fs;

    fn seed_study(root: &Path, pval: &str) -> StudyPaths {
        let paths = StudyPaths::new(root);
        fs::write(&paths.pval_settings_file, format!("{pval}\n")).unwrap();
        let dir = paths.pval_dir(pval);
        fs::create_dir_all(&dir).unwrap();

        fs::write(
            dir.join("between_control_statistics.csv"),
            ",sen_perc,ad_perc,neo_perc\nGeneA,70,40,1\nGeneB,55,90,2\n",
        )
        .unwrap();
        fs::write(
            dir.join("between_tgfb_statistics.csv"),
            ",sen_perc,ad_perc,neo_perc\nGeneA,61,5,1\nGeneB,NA,60,2\n",
        )
        .unwrap();
        paths
    }

    #[test]
    fn cutoff_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let paths = StudyPaths::new(root.path());
        fs::create_dir_all(&paths.saved_objects).unwrap();
        fs::write(&paths.pval_settings_file, "0.05").unwrap();

        let cutoff = Cutoff::load(&paths).unwrap();
        assert_eq!(cutoff.pval, "0.05");
        assert!(cutoff.dir.is_dir());
        assert!(cutoff
            .dir
            .ends_with(format!("{PVAL_DIR_PREFIX}0_05")));
    }

    #[test]
    fn between_tidy_table_only_reads_between_files() {
        let root = tempfile::tempdir().unwrap();
        let paths = seed_study(root.path(), "0.001");
        let cutoff = Cutoff::load(&paths).unwrap();

        let tidy = layout_tidy_table(&paths, &cutoff.dir, &HeatmapLayout::between()).unwrap();
        // 2 genes x 2 tables x (sen_perc, ad_perc)
        assert_eq!(tidy.len(), 8);
        assert!(tidy.rows().iter().all(|r| r.group2 != "neo_perc"));
    }

    #[test]
    fn counts_written_for_between_layout() {
        let root = tempfile::tempdir().unwrap();
        let paths = seed_study(root.path(), "0.001");
        let cutoff = Cutoff::load(&paths).unwrap();
        let layout = HeatmapLayout::between();

        let tidy = layout_tidy_table(&paths, &cutoff.dir, &layout).unwrap();
        let counts = layout.comparison_counts(&count_above(&tidy, 60.0)).unwrap();
        let path = cutoff.dir.join(layout.count_file_name(60.0));
        write_comparison_counts(&path, &counts).unwrap();

        let back = read_comparison_counts(&path).unwrap();
        assert_eq!(back, counts);
        assert_eq!(
            back.iter().map(|c| c.count).collect::<Vec<_>>(),
            vec![1, 1, 0, 1]
        );
    }

    #[test]
    fn within_heatmap_without_within_files_fails() {
        let root = tempfile::tempdir().unwrap();
        let paths = seed_study(root.path(), "0.001");
        let settings = StudySettings {
            threshold: 60.0,
            modes: vec![PlotMode::WithinHeatmap],
        };

        assert!(matches!(
            run(&paths, &settings),
            Err(crate::error::StatsError::MissingInput(_))
        ));
    }
}
