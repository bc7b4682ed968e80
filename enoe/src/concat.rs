//! Merge the filtered monthly files of a quarter into one table, adjusting the expansion factor
//! and stamping the period label on every row.

use itertools::Itertools;
use log::{error, info, warn};
use nonempty::NonEmpty;
use polars::prelude::*;

use crate::config::ConcatConfig;
use crate::error::{EnoeError, EnoeResult};
use crate::factor::adjust_factor;
use crate::io::{read_csv, write_csv};
use crate::{BatchOutcome, Skipped, COL};

/// Label, adjust and project a single monthly table. Projection columns absent from `df` are
/// dropped without error.
pub fn prepare_month(df: DataFrame, config: &ConcatConfig, divisor: usize) -> EnoeResult<DataFrame> {
    let labelled = df
        .lazy()
        .with_column(lit(config.period_label.as_str()).alias(COL::PERIOD))
        .collect()?;
    let adjusted = adjust_factor(
        labelled,
        &config.factor_column,
        &config.adjusted_factor_column,
        divisor,
    )?;
    let available = adjusted.get_column_names();
    let projection = config
        .projection()
        .into_iter()
        .filter(|column| available.contains(&column.as_str()))
        .collect_vec();
    Ok(adjusted.select(projection)?)
}

/// Stack tables by row over the union of their columns; cells of absent columns are null.
pub fn stack(tables: Vec<DataFrame>) -> EnoeResult<DataFrame> {
    let frames = tables.into_iter().map(|df| df.lazy()).collect_vec();
    Ok(concat_lf_diagonal(frames, UnionArgs::default())?.collect()?)
}

/// Load and merge every configured file. Files that are missing or fail are recorded as skipped
/// and the rest of the batch carries on.
pub fn concatenate(config: &ConcatConfig) -> EnoeResult<BatchOutcome> {
    let files = NonEmpty::from_vec(config.files.clone())
        .ok_or_else(|| EnoeError::InvalidConfig("no monthly files configured".into()))?;
    // Divide by the number of months requested, even if some of them fail to load
    let divisor = files.len();
    info!(
        "Loading, adjusting and concatenating {divisor} files for {}",
        config.period_label
    );

    let mut outcome = BatchOutcome::default();
    let mut tables = vec![];
    for file in files.iter() {
        let path = config.base_dir.join(file);
        match read_csv(&path, config.encoding).and_then(|df| prepare_month(df, config, divisor)) {
            Ok(df) => {
                info!("File {} processed and adjusted ({} rows)", path.display(), df.height());
                tables.push(df);
                outcome.processed.push(path);
            }
            Err(err) => {
                match &err {
                    EnoeError::MissingInputFile(_) => error!("File not found: {}", path.display()),
                    _ => error!("Failed to process {}: {err}", path.display()),
                }
                outcome.skipped.push(Skipped {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    if tables.is_empty() {
        warn!("No monthly file could be loaded, check the paths and names");
        return Ok(outcome);
    }
    let table = stack(tables)?;
    info!("Concatenation complete. Total observations: {}", table.height());
    outcome.table = Some(table);
    Ok(outcome)
}

pub fn run(config: &ConcatConfig) -> EnoeResult<BatchOutcome> {
    let mut outcome = concatenate(config)?;
    if let Some(table) = outcome.table.as_mut() {
        let path = config.output_path();
        write_csv(table, &path)?;
        info!("Output saved to {}", path.display());
        outcome.path = Some(path);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use polars::df;

    use super::*;
    use crate::coerce::CoercionPolicy;
    use crate::io::Encoding;

    const HEADER: &str = "\"MUN,C,3\",\"ENT,C,2\",\"C_RES,C,1\",\"L_NAC_C,C,3\",\"FAC_NP,N,6,0\",\"EDA,C,2\"";

    fn write_month(dir: &Path, name: &str, rows: &[&str]) {
        let mut contents = vec![HEADER];
        contents.extend_from_slice(rows);
        fs::write(dir.join(name), contents.join("\n") + "\n").unwrap();
    }

    fn config(dir: &Path) -> ConcatConfig {
        ConcatConfig {
            base_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    fn floats(df: &DataFrame, column: &str) -> anyhow::Result<Vec<Option<f64>>> {
        let series = CoercionPolicy::Null.float_series(df.column(column)?)?;
        Ok(series.f64()?.into_iter().collect())
    }

    #[test]
    fn months_are_labelled_adjusted_and_projected() -> anyhow::Result<()> {
        let df = df!(
            COL::LEGACY_ENTITY => &["07", "27"],
            COL::LEGACY_EXPANSION_FACTOR => &["300", "bad"],
            "EDA,C,2" => &["30", "41"],
        )?;
        let out = prepare_month(df, &ConcatConfig::default(), 3)?;
        // Projection columns missing from the month are dropped silently
        assert_eq!(
            out.get_column_names(),
            vec![COL::LEGACY_ENTITY, COL::ADJUSTED_FACTOR, COL::PERIOD]
        );
        let factors: Vec<Option<f64>> = out.column(COL::ADJUSTED_FACTOR)?.f64()?.into_iter().collect();
        assert_eq!(factors, vec![Some(100.0), None]);
        assert!(out
            .column(COL::PERIOD)?
            .str()?
            .into_iter()
            .all(|label| label == Some("2020 T2")));
        Ok(())
    }

    #[test]
    fn stacking_uses_union_of_columns() -> anyhow::Result<()> {
        let a = df!("x" => &["1"], "y" => &["a"])?;
        let b = df!("x" => &["2", "3"], "z" => &["b", "c"])?;
        let out = stack(vec![a, b])?;
        assert_eq!(out.get_column_names(), vec!["x", "y", "z"]);
        assert_eq!(out.height(), 3);
        assert_eq!(out.column("y")?.null_count(), 2);
        assert_eq!(out.column("z")?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn missing_month_is_skipped_and_rest_merged() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write_month(dir.path(), "abrilm.csv", &["101,07,1,007,90,30", "004,27,3,027,60,41"]);
        write_month(dir.path(), "juniom.csv", &["005,23,2,023,30,22"]);

        let outcome = run(&config(dir.path()))?;
        assert_eq!(outcome.processed.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].path, dir.path().join("mayom.csv"));

        let path = outcome.path.expect("output should be written");
        assert_eq!(path, dir.path().join("Trimestre_2020_T2.csv"));
        let written = read_csv(&path, Encoding::Utf8)?;
        assert_eq!(written.height(), 3);
        assert_eq!(written.get_column_names(), ConcatConfig::default().projection());
        assert!(written
            .column(COL::PERIOD)?
            .str()?
            .into_iter()
            .all(|label| label == Some("2020 T2")));
        // Divided by the three configured months, not the two that loaded
        let factors = floats(&written, COL::ADJUSTED_FACTOR)?;
        assert_eq!(factors, vec![Some(30.0), Some(20.0), Some(10.0)]);
        Ok(())
    }

    #[test]
    fn nothing_is_written_when_every_month_fails() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let outcome = run(&config(dir.path()))?;
        assert!(outcome.table.is_none());
        assert!(outcome.path.is_none());
        assert_eq!(outcome.skipped.len(), 3);
        assert!(!dir.path().join("Trimestre_2020_T2.csv").exists());
        Ok(())
    }

    #[test]
    fn month_without_factor_column_is_skipped() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write_month(dir.path(), "abrilm.csv", &["101,07,1,007,90,30"]);
        fs::write(dir.path().join("mayom.csv"), "\"ENT,C,2\"\n07\n")?;
        let config = ConcatConfig {
            files: vec!["abrilm.csv".into(), "mayom.csv".into()],
            ..config(dir.path())
        };
        let outcome = concatenate(&config)?;
        assert_eq!(outcome.processed, vec![dir.path().join("abrilm.csv")]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.table.map(|t| t.height()), Some(1));
        Ok(())
    }

    #[test]
    fn empty_file_list_is_rejected() {
        let config = ConcatConfig {
            files: vec![],
            ..Default::default()
        };
        assert!(matches!(concatenate(&config), Err(EnoeError::InvalidConfig(_))));
    }

    #[test]
    fn reruns_produce_identical_output() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write_month(dir.path(), "abrilm.csv", &["101,07,1,007,90,30"]);
        write_month(dir.path(), "mayom.csv", &["004,27,3,027,60,41"]);
        write_month(dir.path(), "juniom.csv", &["005,23,2,023,30,22"]);
        let first = run(&config(dir.path()))?.path.unwrap();
        let first = fs::read(first)?;
        let second = run(&config(dir.path()))?.path.unwrap();
        assert_eq!(first, fs::read(second)?);
        Ok(())
    }
}
