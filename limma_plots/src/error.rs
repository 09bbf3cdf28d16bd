use std::path::{Path, PathBuf};

use polars::error::PolarsError;
use thiserror::Error;

pub type StatsResult<T> = Result<T, StatsError>;

/// Everything that can stop a plotting run. None of these are recovered from.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("required input is missing: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("column '{column}' not found in {table}")]
    MissingColumn { table: String, column: String },

    #[error("gene '{gene}' appears more than once in {table}")]
    DuplicateGene { table: String, gene: String },

    #[error("group '{0}' was supplied more than once")]
    DuplicateGroup(String),

    #[error("column '{column}' has {found} values but the table has {expected} genes")]
    RaggedTable {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("malformed input in {source_name}: {message}")]
    Malformed { source_name: String, message: String },

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("invalid p-value cut-off '{0}'")]
    InvalidPvalue(String),

    #[error("failed to render {}: {message}", .path.display())]
    Render { path: PathBuf, message: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl StatsError {
    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        StatsError::Malformed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Only a file that does not exist is a missing input; any other I/O
    /// failure on `path` is passed through unchanged.
    pub fn from_open(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StatsError::MissingInput(path.to_path_buf()),
            _ => StatsError::Io(err),
        }
    }

    /// Wraps a plotting backend failure together with the file being drawn.
    pub fn render(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        StatsError::Render {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn only_not_found_is_a_missing_input() {
        let path = Path::new("SavedObjects/pval");

        let absent = StatsError::from_open(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(absent, StatsError::MissingInput(p) if p == path));

        let denied = StatsError::from_open(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, StatsError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied));
    }
}
