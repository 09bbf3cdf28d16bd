use std::path::Path;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use limma_plots::config::{PlotMode, StudyPaths, StudySettings};
use limma_plots::pipeline;

const DATA_DIRECTORY: &str = "./LIMMA09-2018";
const PATHS_OVERRIDE: &str = "limma_plots.json";

// The sweep reads the count files the heatmap modes leave in each cut-off directory.
const MODES: [PlotMode; 1] = [PlotMode::PvalueSweep];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let override_file = Path::new(PATHS_OVERRIDE);
    let paths = if override_file.is_file() {
        StudyPaths::from_json_file(override_file)
            .with_context(|| format!("reading {}", override_file.display()))?
    } else {
        StudyPaths::new(DATA_DIRECTORY)
    };
    info!("Study directory: {}", paths.directory.display());

    let settings = StudySettings {
        modes: MODES.to_vec(),
        ..StudySettings::default()
    };

    pipeline::run(&paths, &settings).context("plotting run failed")?;

    info!("Done");
    Ok(())
}
