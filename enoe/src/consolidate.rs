//! Summary of a directory of percentage reports: one row per report with the national mean of a
//! value column and its value for a few selected entities.

use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use itertools::Itertools;
use log::{error, info, warn};
use polars::prelude::*;

use crate::coerce::CoercionPolicy;
use crate::config::ConsolidateConfig;
use crate::error::{EnoeError, EnoeResult};
use crate::io::{read_csv, write_csv};
use crate::{BatchOutcome, Skipped};

/// Values extracted from a single report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    /// File name of the report.
    pub label: String,
    /// Unweighted mean of the value column over every row.
    pub mean: Option<f64>,
    /// Value for each configured entity, in configuration order.
    pub entities: Vec<Option<f64>>,
}

/// Reports in `config.dir` matching `config.pattern`, sorted by file name.
pub fn list_reports(config: &ConsolidateConfig) -> EnoeResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}",
        Pattern::escape(&config.dir.to_string_lossy()),
        config.pattern
    );
    let mut paths = glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(err) => {
                warn!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|path| path.is_file() && *path != config.output)
        .collect_vec();
    paths.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));
    Ok(paths)
}

/// Mean and per-entity values of one report table.
pub fn summarise(df: &DataFrame, label: &str, config: &ConsolidateConfig) -> EnoeResult<ReportSummary> {
    let column = |name: &str| {
        df.column(name)
            .map_err(|_| EnoeError::missing_column(name, format!("report {label}")))
    };
    let values = CoercionPolicy::Null.float_series(column(config.value_column.as_str())?)?;
    let values = values.f64()?;
    let names = column(config.name_column.as_str())?.str()?;

    let entities = config
        .entities
        .iter()
        .map(|entity| {
            names
                .into_iter()
                .zip(values)
                .find(|(name, _)| *name == Some(entity.as_str()))
                .and_then(|(_, value)| value)
        })
        .collect_vec();
    Ok(ReportSummary {
        label: label.to_string(),
        mean: values.mean(),
        entities,
    })
}

fn summarise_file(path: &Path, config: &ConsolidateConfig) -> EnoeResult<ReportSummary> {
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let df = read_csv(path, config.encoding)?;
    summarise(&df, &label, config)
}

/// One row per summary, sorted by label.
pub fn report_table(summaries: &[ReportSummary], config: &ConsolidateConfig) -> EnoeResult<DataFrame> {
    let mut columns = vec![
        Series::new(
            &config.label_column,
            summaries.iter().map(|s| s.label.as_str()).collect_vec(),
        ),
        Series::new(
            &config.mean_column(),
            summaries.iter().map(|s| s.mean).collect_vec(),
        ),
    ];
    columns.extend(config.entities.iter().enumerate().map(|(idx, entity)| {
        Series::new(
            &config.entity_column(entity),
            summaries
                .iter()
                .map(|s| s.entities.get(idx).copied().flatten())
                .collect_vec(),
        )
    }));
    let df = DataFrame::new(columns)?;
    Ok(df.sort([config.label_column.as_str()], SortMultipleOptions::default())?)
}

/// Summarise every report; files that cannot be read or lack a required column are skipped.
pub fn consolidate(config: &ConsolidateConfig) -> EnoeResult<BatchOutcome> {
    let paths = list_reports(config)?;
    info!(
        "Found {} reports matching '{}' in {}",
        paths.len(),
        config.pattern,
        config.dir.display()
    );

    let mut outcome = BatchOutcome::default();
    let mut summaries = vec![];
    for path in paths {
        match summarise_file(&path, config) {
            Ok(summary) => {
                info!("Processed {}", summary.label);
                summaries.push(summary);
                outcome.processed.push(path);
            }
            Err(err) => {
                error!("Failed to process {}: {err}", path.display());
                outcome.skipped.push(Skipped {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    if summaries.is_empty() {
        warn!("No report could be consolidated");
        return Ok(outcome);
    }
    outcome.table = Some(report_table(&summaries, config)?);
    Ok(outcome)
}

pub fn run(config: &ConsolidateConfig) -> EnoeResult<BatchOutcome> {
    let mut outcome = consolidate(config)?;
    if let Some(table) = outcome.table.as_mut() {
        write_csv(table, &config.output)?;
        info!("Consolidated report saved to {}", config.output.display());
        outcome.path = Some(config.output.clone());
    }
    Ok(outcome)
}
