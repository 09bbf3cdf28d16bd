use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, error, info};

use crate::config::{ResultSource, StudyPaths};
use crate::error::{StatsError, StatsResult};
use crate::helper_functions::read_csv;
use crate::models::{Dataset, GeneResultTable, PercentColumn};

/// Tokens written by R/pandas for a missing percentage.
const NA_TOKENS: [&str; 5] = ["", "NA", "NaN", "nan", "NULL"];

/// One LIMMA statistics CSV: gene identifiers in the first column, one or
/// more percentage columns after it.
pub struct LimmaStatistics {
    pub path: PathBuf,
    pub source: ResultSource,
}

impl LimmaStatistics {
    pub fn new(paths: &StudyPaths, root: &Path, source: ResultSource) -> Self {
        Self {
            path: paths.table_path(root, source),
            source,
        }
    }
}

impl Dataset for LimmaStatistics {
    fn load(&self) -> StatsResult<GeneResultTable> {
        info!("Reading {} from {}", self.source.group_name(), self.path.display());

        let df = match read_csv(&self.path, read_options()) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read {}: {}", self.path.display(), e);
                return Err(e);
            }
        };

        let table = table_from_frame(self.source.group_name(), &df)?;
        let table = match self.source.selected_columns() {
            Some(columns) => table.select(columns)?,
            None => table,
        };

        debug!(
            "{}: {} genes, columns {:?}",
            table.name(),
            table.height(),
            table.columns().iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
        );
        Ok(table)
    }
}

/// NA tokens are read as nulls and every row is scanned for column types, so
/// an `NA` or a fraction deep in an otherwise integer column still parses.
fn read_options() -> CsvReadOptions {
    let null_values = NullValues::AllColumns(NA_TOKENS.iter().map(|t| (*t).into()).collect());
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
}

/// Loads every requested source from `root`, in the order given.
pub fn load_sources(
    paths: &StudyPaths,
    root: &Path,
    sources: &[ResultSource],
) -> StatsResult<Vec<(ResultSource, GeneResultTable)>> {
    sources
        .iter()
        .map(|&source| {
            let table = LimmaStatistics::new(paths, root, source).load()?;
            Ok((source, table))
        })
        .collect()
}

/// Treats the first column as the gene index and every other column as a
/// percentage column.
pub fn table_from_frame(name: &str, df: &DataFrame) -> StatsResult<GeneResultTable> {
    let columns = df.get_columns();
    let (index, values) = match columns.split_first() {
        Some((index, values)) if !values.is_empty() => (index, values),
        _ => {
            return Err(StatsError::malformed(
                name,
                "expected a gene column followed by at least one percentage column",
            ))
        }
    };

    let genes = gene_ids(name, index)?;
    let percent_columns = values
        .iter()
        .map(|column| {
            Ok(PercentColumn::new(
                column.name().as_str(),
                percent_values(name, column)?,
            ))
        })
        .collect::<StatsResult<Vec<_>>>()?;

    GeneResultTable::new(name, genes, percent_columns)
}

fn gene_ids(name: &str, index: &Column) -> StatsResult<Vec<String>> {
    let index = index.cast(&DataType::String)?;
    let genes = index
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, gene)| match gene {
            Some(g) if !g.trim().is_empty() => Ok(g.trim().to_string()),
            _ => Err(StatsError::malformed(
                name,
                format!("gene identifier missing on row {}", row + 1),
            )),
        })
        .collect::<StatsResult<Vec<_>>>()?;
    Ok(genes)
}

fn percent_values(name: &str, column: &Column) -> StatsResult<Vec<Option<f64>>> {
    match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .map(|cell| parse_percent(name, column.name().as_str(), cell))
            .collect(),
        DataType::Null => Ok(vec![None; column.len()]),
        _ => {
            let cast = column.cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = cast.f64()?.into_iter().collect();
            Ok(values)
        }
    }
}

fn parse_percent(name: &str, column: &str, cell: Option<&str>) -> StatsResult<Option<f64>> {
    let Some(raw) = cell.map(str::trim) else {
        return Ok(None);
    };
    if NA_TOKENS.contains(&raw) {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| {
        StatsError::malformed(name, format!("'{raw}' in column '{column}' is not a number"))
    })
}
