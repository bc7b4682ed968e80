use enoe::error::EnoeError;
use polars::error::PolarsError;

#[derive(thiserror::Error, Debug)]
pub enum EnoeCliError {
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("{0}")]
    EnoeError(#[from] EnoeError),
    #[error("std IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid TOML in config file: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type EnoeCliResult<T> = Result<T, EnoeCliError>;
