//! Error types.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum EnoeError {
    #[error("Input file not found: {}", .0.display())]
    MissingInputFile(PathBuf),
    #[error("Column '{column}' not found in {context}")]
    MissingColumn { column: String, context: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unsupported input format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("Wrapped spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),
    #[error("Invalid glob pattern: {0}")]
    PatternError(#[from] glob::PatternError),
    #[error("Wrapped IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Wrapped polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
    #[error("Wrapped anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
}

impl EnoeError {
    pub fn missing_column(column: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            context: context.into(),
        }
    }
}

pub type EnoeResult<T> = Result<T, EnoeError>;

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_anyhow() {
        let anyhow_error = anyhow!("An anyhow error");
        let enoe_error: EnoeError = anyhow_error.into();
        assert_eq!(enoe_error.to_string(), "Wrapped anyhow error: An anyhow error");
    }

    #[test]
    fn missing_column_names_column_and_context() {
        let err = EnoeError::missing_column("ENT,C,2", "junio.xls");
        assert_eq!(err.to_string(), "Column 'ENT,C,2' not found in junio.xls");
    }
}
