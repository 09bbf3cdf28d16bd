//! Collects the count summaries written for every p-value cut-off so they can
//! be compared side by side.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use regex::Regex;
use tracing::{info, warn};

use crate::analysis::threshold::{read_comparison_counts, ComparisonCount};
use crate::config::PVAL_DIR_PREFIX;
use crate::error::{StatsError, StatsResult};
use crate::helper_functions::pval_from_dir_name;

#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    pub pval: f64,
    pub comparison: String,
    pub treatment: String,
    pub count: usize,
}

impl SweepRow {
    pub fn label(&self) -> String {
        format!("{}_{}", self.comparison, self.treatment)
    }
}

/// Counts for every cut-off directory, most lenient cut-off first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PvalueSweep {
    pub within: Vec<SweepRow>,
    pub between: Vec<SweepRow>,
}

impl PvalueSweep {
    pub fn is_empty(&self) -> bool {
        self.within.is_empty() && self.between.is_empty()
    }
}

/// Distinct p-values of `rows`, in row order.
pub fn pvalues(rows: &[SweepRow]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::new();
    for r in rows {
        if !out.contains(&r.pval) {
            out.push(r.pval);
        }
    }
    out
}

pub fn collect_sweep(saved_objects: &Path) -> StatsResult<PvalueSweep> {
    let pattern = saved_objects.join(format!("{PVAL_DIR_PREFIX}*"));
    let pattern = pattern.to_string_lossy();

    let mut dirs: Vec<(PathBuf, f64)> = Vec::new();
    for entry in glob(&pattern)? {
        let dir = entry.map_err(|e| StatsError::Io(e.into_error()))?;
        if !dir.is_dir() {
            continue;
        }
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let pval = pval_from_dir_name(&name)?;
        dirs.push((dir, pval));
    }

    if dirs.is_empty() {
        warn!("No {}* directories under {}", PVAL_DIR_PREFIX, saved_objects.display());
        return Ok(PvalueSweep::default());
    }

    dirs.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut sweep = PvalueSweep::default();
    for (dir, pval) in &dirs {
        info!("Collecting counts for p < {} from {}", pval, dir.display());
        let (within_file, between_file) = count_files(dir)?;

        sweep
            .within
            .extend(with_pval(*pval, read_comparison_counts(&within_file)?));
        sweep
            .between
            .extend(with_pval(*pval, read_comparison_counts(&between_file)?));
    }

    Ok(sweep)
}

fn with_pval(pval: f64, counts: Vec<ComparisonCount>) -> impl Iterator<Item = SweepRow> {
    counts.into_iter().map(move |c| SweepRow {
        pval,
        comparison: c.comparison,
        treatment: c.treatment,
        count: c.count,
    })
}

/// Exactly one within and one between count file must sit in each cut-off
/// directory.
fn count_files(dir: &Path) -> StatsResult<(PathBuf, PathBuf)> {
    let re = Regex::new(r"^(within|between)_count.*\.csv$")?;

    let mut within = Vec::new();
    let mut between = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(caps) = re.captures(&name) {
            match &caps[1] {
                "within" => within.push(path),
                _ => between.push(path),
            }
        }
    }

    match (within.len(), between.len()) {
        (1, 1) => Ok((within.remove(0), between.remove(0))),
        (w, b) => Err(StatsError::malformed(
            dir.display().to_string(),
            format!("expected one within and one between count file, found {w} and {b}"),
        )),
    }
}
