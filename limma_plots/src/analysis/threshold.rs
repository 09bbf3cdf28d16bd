use std::fs::File;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::tidy::TidyTable;
use crate::error::{StatsError, StatsResult};

/// Number of genes above the threshold for one (group1, group2) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdCount {
    pub group1: String,
    pub group2: String,
    pub count: usize,
}

/// The same count relabelled for display, keyed by (comparison, treatment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonCount {
    pub comparison: String,
    pub treatment: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable {
    counts: Vec<ThresholdCount>,
}

impl CountTable {
    pub fn counts(&self) -> &[ThresholdCount] {
        &self.counts
    }

    pub fn get(&self, group1: &str, group2: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|c| c.group1 == group1 && c.group2 == group2)
            .map(|c| c.count)
    }

    pub fn write_csv(&self, path: &Path) -> StatsResult<()> {
        write_records(path, &self.counts)
    }

    pub fn read_csv(path: &Path) -> StatsResult<Self> {
        Ok(Self {
            counts: read_records(path)?,
        })
    }
}

/// Counts, per (group1, group2), the genes whose percentage is strictly
/// greater than `threshold`. A gene sitting exactly on the threshold is not
/// counted, nor is an absent percentage. Every pair of the table is reported,
/// in first-appearance order, even when its count is zero.
pub fn count_above(tidy: &TidyTable, threshold: f64) -> CountTable {
    let mut counts: Vec<ThresholdCount> = Vec::new();

    for row in tidy.rows() {
        let above = matches!(row.percentage, Some(p) if p > threshold);
        match counts
            .iter_mut()
            .find(|c| c.group1 == row.group1 && c.group2 == row.group2)
        {
            Some(entry) => entry.count += usize::from(above),
            None => counts.push(ThresholdCount {
                group1: row.group1.clone(),
                group2: row.group2.clone(),
                count: usize::from(above),
            }),
        }
    }

    for c in &counts {
        debug!("{} / {}: {} genes > {}", c.group1, c.group2, c.count, threshold);
    }

    CountTable { counts }
}

pub fn write_comparison_counts(path: &Path, counts: &[ComparisonCount]) -> StatsResult<()> {
    write_records(path, counts)?;
    info!("Wrote {} comparison counts to {}", counts.len(), path.display());
    Ok(())
}

pub fn read_comparison_counts(path: &Path) -> StatsResult<Vec<ComparisonCount>> {
    read_records(path)
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> StatsResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_records<T: DeserializeOwned>(path: &Path) -> StatsResult<Vec<T>> {
    let file = File::open(path).map_err(|e| StatsError::from_open(path, e))?;
    let mut rdr = csv::Reader::from_reader(file);
    let records = rdr.deserialize().collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(records)
}
