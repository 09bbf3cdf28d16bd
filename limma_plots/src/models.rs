use std::collections::HashSet;

use polars::prelude::*;

use crate::error::{StatsError, StatsResult};

/// Anything that can be loaded from disk into a per-gene result table.
pub trait Dataset {
    fn load(&self) -> StatsResult<GeneResultTable>;
}

/// One named percentage column of a [`GeneResultTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct PercentColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl PercentColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Per-gene LIMMA output: one row per gene, one or more percentage columns.
///
/// Gene identifiers are unique and every column has exactly one entry per
/// gene. NaN values are stored as `None`, so a cell is either a real number
/// or absent.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneResultTable {
    name: String,
    genes: Vec<String>,
    columns: Vec<PercentColumn>,
}

impl GeneResultTable {
    pub fn new(
        name: impl Into<String>,
        genes: Vec<String>,
        columns: Vec<PercentColumn>,
    ) -> StatsResult<Self> {
        let name = name.into();

        let mut seen = HashSet::with_capacity(genes.len());
        for gene in &genes {
            if !seen.insert(gene.as_str()) {
                return Err(StatsError::DuplicateGene {
                    table: name,
                    gene: gene.clone(),
                });
            }
        }

        let mut column_names = HashSet::with_capacity(columns.len());
        let mut cleaned = Vec::with_capacity(columns.len());
        for column in columns {
            if !column_names.insert(column.name.clone()) {
                return Err(StatsError::malformed(
                    &name,
                    format!("column '{}' is repeated", column.name),
                ));
            }
            if column.values.len() != genes.len() {
                return Err(StatsError::RaggedTable {
                    column: column.name,
                    expected: genes.len(),
                    found: column.values.len(),
                });
            }
            let values = column
                .values
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            cleaned.push(PercentColumn {
                name: column.name,
                values,
            });
        }

        Ok(Self {
            name,
            genes,
            columns: cleaned,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn columns(&self) -> &[PercentColumn] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.genes.len()
    }

    pub fn column(&self, name: &str) -> StatsResult<&PercentColumn> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| StatsError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Keeps only `names`, in the order given.
    pub fn select(&self, names: &[&str]) -> StatsResult<Self> {
        let columns = names
            .iter()
            .map(|n| self.column(n).cloned())
            .collect::<StatsResult<Vec<_>>>()?;

        Ok(Self {
            name: self.name.clone(),
            genes: self.genes.clone(),
            columns,
        })
    }

    /// The table as a polars frame with a leading `Gene` column.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new("Gene".into(), self.genes.clone()));
        for c in &self.columns {
            columns.push(Column::new(c.name.as_str().into(), c.values.clone()));
        }
        DataFrame::new(columns)
    }
}
