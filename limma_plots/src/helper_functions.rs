use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::PVAL_DIR_PREFIX;
use crate::error::{StatsError, StatsResult};

pub fn read_csv(file_path: &Path, options: CsvReadOptions) -> StatsResult<DataFrame> {
    if !file_path.exists() {
        return Err(StatsError::MissingInput(file_path.to_path_buf()));
    }

    let df = options
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()?;

    debug!("Read {} with shape {:?}", file_path.display(), df.shape());
    Ok(df)
}

pub fn dataframe_to_csv(df: &mut DataFrame, file_path: &Path) -> StatsResult<()> {
    let mut file = fs::File::create(file_path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    info!("Wrote {} rows to {}", df.height(), file_path.display());
    Ok(())
}

/// Reads the single p-value cut-off string kept next to the study data.
///
/// The string is returned as written (trimmed) because it names the output
/// directory; it must still parse as a probability.
pub fn read_pval_cutoff(file_path: &Path) -> StatsResult<String> {
    let raw = fs::read_to_string(file_path)
        .map_err(|e| StatsError::from_open(file_path, e))?;
    let cutoff = raw.trim().to_string();

    match cutoff.parse::<f64>() {
        Ok(p) if (0.0..=1.0).contains(&p) => Ok(cutoff),
        _ => Err(StatsError::InvalidPvalue(cutoff)),
    }
}

/// Recovers the cut-off from a directory name such as `pval_less_than_0_001`.
pub fn pval_from_dir_name(name: &str) -> StatsResult<f64> {
    let encoded = name
        .strip_prefix(PVAL_DIR_PREFIX)
        .ok_or_else(|| StatsError::InvalidPvalue(name.to_string()))?;

    encoded
        .replace('_', ".")
        .parse::<f64>()
        .map_err(|_| StatsError::InvalidPvalue(name.to_string()))
}

pub fn ensure_dir(path: &Path) -> StatsResult<()> {
    if !path.is_dir() {
        info!("Creating {}", path.display());
        fs::create_dir_all(path)?;
    }
    Ok(())
}
