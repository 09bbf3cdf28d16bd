use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{StatsError, StatsResult};

/// Percentage above which a gene counts as consistently significant.
pub const DEFAULT_THRESHOLD: f64 = 60.0;

/// Where the study's inputs live and where plots are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPaths {
    pub directory: PathBuf,
    pub saved_objects: PathBuf,
    pub pval_settings_file: PathBuf,
}

impl StudyPaths {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        Self {
            saved_objects: directory.join("SavedObjects"),
            pval_settings_file: directory.join("pval"),
            directory,
        }
    }

    pub fn from_json_file(path: &Path) -> StatsResult<Self> {
        let file = File::open(path).map_err(|e| StatsError::from_open(path, e))?;
        let paths = serde_json::from_reader(BufReader::new(file))?;
        info!("Loaded study paths from {}", path.display());
        Ok(paths)
    }

    /// Directory holding the tables and counts for one p-value cut-off,
    /// e.g. `pval_less_than_0_001` for `0.001`.
    pub fn pval_dir(&self, cutoff: &str) -> PathBuf {
        self.saved_objects
            .join(format!("{}{}", PVAL_DIR_PREFIX, cutoff.replace('.', "_")))
    }

    pub fn table_path(&self, root: &Path, source: ResultSource) -> PathBuf {
        root.join(source.file_name())
    }
}

pub const PVAL_DIR_PREFIX: &str = "pval_less_than_";

/// The five LIMMA result tables of the study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    BetweenControl,
    BetweenTgfb,
    WithinNeonatal,
    WithinAdult,
    WithinSenescent,
}

impl ResultSource {
    pub const ALL: [ResultSource; 5] = [
        ResultSource::WithinNeonatal,
        ResultSource::WithinSenescent,
        ResultSource::WithinAdult,
        ResultSource::BetweenControl,
        ResultSource::BetweenTgfb,
    ];

    pub const BETWEEN: [ResultSource; 2] = [ResultSource::BetweenControl, ResultSource::BetweenTgfb];

    pub const WITHIN: [ResultSource; 3] = [
        ResultSource::WithinNeonatal,
        ResultSource::WithinAdult,
        ResultSource::WithinSenescent,
    ];

    /// Top-level label used as `group1` in the tidy table.
    pub fn group_name(&self) -> &'static str {
        match self {
            ResultSource::BetweenControl => "between_control",
            ResultSource::BetweenTgfb => "between_tgfb",
            ResultSource::WithinNeonatal => "within_neonatal",
            ResultSource::WithinAdult => "within_adult",
            ResultSource::WithinSenescent => "within_senescent",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ResultSource::BetweenControl => "between_control_statistics.csv",
            ResultSource::BetweenTgfb => "between_tgfb_statistics.csv",
            ResultSource::WithinNeonatal => "within_neonatal.csv",
            ResultSource::WithinAdult => "within_adult.csv",
            ResultSource::WithinSenescent => "within_senescent.csv",
        }
    }

    /// Columns kept from the raw file; `None` keeps them all.
    pub fn selected_columns(&self) -> Option<&'static [&'static str]> {
        match self {
            ResultSource::BetweenControl | ResultSource::BetweenTgfb => {
                Some(&["sen_perc", "ad_perc"][..])
            }
            _ => None,
        }
    }

    pub fn is_between(&self) -> bool {
        matches!(self, ResultSource::BetweenControl | ResultSource::BetweenTgfb)
    }
}

/// Which picture a run produces. Passed explicitly instead of global flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotMode {
    BarCharts,
    WithinHeatmap,
    BetweenHeatmap,
    PvalueSweep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySettings {
    pub threshold: f64,
    pub modes: Vec<PlotMode>,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            modes: vec![PlotMode::PvalueSweep],
        }
    }
}
