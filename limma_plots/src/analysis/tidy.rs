//! Wide-to-long reshaping of the per-gene result tables.
//!
//! Each source table is labelled with a top-level group name (`group1`) and
//! its columns become sub-labels (`group2`). The output has one row per
//! (gene, group1, group2) over the union of all genes, so a gene missing from
//! one table still shows up there with an absent percentage.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{StatsError, StatsResult};
use crate::helper_functions::dataframe_to_csv;
use crate::models::GeneResultTable;

#[derive(Debug, Clone, PartialEq)]
pub struct TidyRow {
    pub gene: String,
    pub group1: String,
    pub group2: String,
    pub percentage: Option<f64>,
}

impl TidyRow {
    pub fn new(gene: &str, group1: &str, group2: &str, percentage: Option<f64>) -> Self {
        Self {
            gene: gene.to_string(),
            group1: group1.to_string(),
            group2: group2.to_string(),
            percentage,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyTable {
    rows: Vec<TidyRow>,
}

impl TidyTable {
    pub fn rows(&self) -> &[TidyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose `group1` is one of `groups`, original order preserved.
    pub fn filter_groups(&self, groups: &[&str]) -> TidyTable {
        TidyTable {
            rows: self
                .rows
                .iter()
                .filter(|r| groups.contains(&r.group1.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Distinct genes in row order.
    pub fn genes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r.gene.as_str())
            .filter(|g| seen.insert(*g))
            .collect()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let gene: Vec<&str> = self.rows.iter().map(|r| r.gene.as_str()).collect();
        let group1: Vec<&str> = self.rows.iter().map(|r| r.group1.as_str()).collect();
        let group2: Vec<&str> = self.rows.iter().map(|r| r.group2.as_str()).collect();
        let percentage: Vec<Option<f64>> = self.rows.iter().map(|r| r.percentage).collect();

        df![
            "gene" => gene,
            "group1" => group1,
            "group2" => group2,
            "percentage" => percentage
        ]
    }

    pub fn write_csv(&self, path: &Path) -> StatsResult<()> {
        let mut df = self.to_dataframe()?;
        dataframe_to_csv(&mut df, path)
    }
}

/// Flattens labelled gene tables into a single tidy table.
///
/// Genes are emitted in ascending order of the union gene set; within a gene,
/// groups keep their input order and columns keep their table order.
pub fn build_tidy_table<S: AsRef<str>>(tables: &[(S, &GeneResultTable)]) -> StatsResult<TidyTable> {
    let mut group_names = HashSet::new();
    for (group, _) in tables {
        if !group_names.insert(group.as_ref()) {
            return Err(StatsError::DuplicateGroup(group.as_ref().to_string()));
        }
    }

    let all_genes: BTreeSet<&str> = tables
        .iter()
        .flat_map(|(_, t)| t.genes().iter().map(String::as_str))
        .collect();

    let positions: Vec<HashMap<&str, usize>> = tables
        .iter()
        .map(|(_, t)| {
            t.genes()
                .iter()
                .enumerate()
                .map(|(i, g)| (g.as_str(), i))
                .collect()
        })
        .collect();

    let width: usize = tables.iter().map(|(_, t)| t.columns().len()).sum();
    let mut rows = Vec::with_capacity(all_genes.len() * width);

    for gene in &all_genes {
        for ((group, table), index) in tables.iter().zip(&positions) {
            let row = index.get(gene).copied();
            for column in table.columns() {
                let percentage = row.and_then(|i| column.values[i]);
                rows.push(TidyRow::new(gene, group.as_ref(), &column.name, percentage));
            }
        }
    }

    info!(
        "Tidy table: {} genes x {} group columns = {} rows",
        all_genes.len(),
        width,
        rows.len()
    );
    debug!(
        "Absent percentages: {}",
        rows.iter().filter(|r| r.percentage.is_none()).count()
    );

    Ok(TidyTable { rows })
}
