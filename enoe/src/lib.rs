use std::path::PathBuf;

use log::debug;
use polars::frame::DataFrame;

use crate::config::Config;
use crate::error::EnoeResult;

// Re-exports
pub use column_names as COL;

// Modules
pub mod coerce;
pub mod column_names;
pub mod concat;
pub mod config;
pub mod consolidate;
pub mod entities;
pub mod error;
pub mod factor;
pub mod filter;
pub mod inflation;
pub mod io;
pub mod residency;

/// A table produced by a step and the file it was written to.
#[derive(Debug)]
pub struct Output {
    pub path: PathBuf,
    pub table: DataFrame,
}

/// An input left out of a batch step and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a step that reads many files. `table` and `path` are `None` when no input could be
/// used, in which case nothing was written.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub table: Option<DataFrame>,
    pub path: Option<PathBuf>,
    pub processed: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
}

/// Entry point running each preparation step with a shared configuration
pub struct Enoe {
    pub config: Config,
}

impl Default for Enoe {
    fn default() -> Self {
        Self::new_with_config(Config::default())
    }
}

impl Enoe {
    pub fn new_with_config(config: Config) -> Self {
        debug!("config: {config:?}");
        Self { config }
    }

    /// Keep only the configured columns of a raw extract
    pub fn filter(&self) -> EnoeResult<Output> {
        filter::run(&self.config.filter)
    }

    /// Merge the monthly files of a quarter
    pub fn concat(&self) -> EnoeResult<BatchOutcome> {
        concat::run(&self.config.concat)
    }

    /// Percentage of each residency condition per entity, `None` when no row was usable
    pub fn residency(&self) -> EnoeResult<Option<Output>> {
        residency::run(&self.config.residency)
    }

    /// Period-over-period change of a price index
    pub fn inflation(&self) -> EnoeResult<Output> {
        inflation::run(&self.config.inflation)
    }

    /// Merge a directory of percentage reports into one summary
    pub fn consolidate(&self) -> EnoeResult<BatchOutcome> {
        consolidate::run(&self.config.consolidate)
    }
}
