//! Reduce a raw extract to the columns needed by the later steps.

use std::path::{Path, PathBuf};

use log::info;
use polars::prelude::*;

use crate::config::FilterConfig;
use crate::error::{EnoeError, EnoeResult};
use crate::io::{read_table, write_csv};
use crate::Output;

/// Select exactly `columns`, in that order. Fails on the first column not present in `df`; rows
/// and values are untouched.
pub fn select_columns(df: &DataFrame, columns: &[String], context: &str) -> EnoeResult<DataFrame> {
    if columns.is_empty() {
        return Err(EnoeError::InvalidConfig("no columns requested".into()));
    }
    let available = df.get_column_names();
    if let Some(missing) = columns
        .iter()
        .find(|column| !available.contains(&column.as_str()))
    {
        return Err(EnoeError::missing_column(missing.as_str(), context));
    }
    Ok(df.select(columns.iter().map(String::as_str))?)
}

/// `dir/junio.xls` with suffix `m.csv` gives `dir/juniom.csv`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}"))
}

pub fn run(config: &FilterConfig) -> EnoeResult<Output> {
    info!("Filtering columns of {}", config.input.display());
    let df = read_table(&config.input, config.encoding)?;
    let mut table = select_columns(&df, &config.columns, &config.input.display().to_string())?;
    let path = output_path(&config.input, &config.suffix);
    write_csv(&mut table, &path)?;
    info!(
        "Saved {} with {} rows and columns {:?}",
        path.display(),
        table.height(),
        config.columns
    );
    Ok(Output { path, table })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use polars::df;

    use super::*;
    use crate::io::{read_csv, Encoding};
    use crate::COL;

    fn raw() -> DataFrame {
        df!(
            "R_DEF,C,2" => &["00", "00", "15"],
            COL::LEGACY_ENTITY => &["07", "27", "23"],
            COL::LEGACY_MUNICIPALITY => &["101", "004", "005"],
            COL::LEGACY_EXPANSION_FACTOR => &["120", "95", "abc"],
        )
        .unwrap()
    }

    #[test]
    fn keeps_requested_columns_in_order() -> anyhow::Result<()> {
        let columns = vec![
            COL::LEGACY_MUNICIPALITY.to_string(),
            COL::LEGACY_ENTITY.to_string(),
        ];
        let out = select_columns(&raw(), &columns, "test")?;
        assert_eq!(
            out.get_column_names(),
            vec![COL::LEGACY_MUNICIPALITY, COL::LEGACY_ENTITY]
        );
        assert_eq!(out.height(), 3);
        assert_eq!(out.column(COL::LEGACY_MUNICIPALITY)?.str()?.get(1), Some("004"));
        Ok(())
    }

    #[test]
    fn first_missing_column_aborts() {
        let columns = vec![
            COL::LEGACY_ENTITY.to_string(),
            COL::LEGACY_RESIDENCY_CONDITION.to_string(),
            COL::LEGACY_BIRTHPLACE.to_string(),
        ];
        match select_columns(&raw(), &columns, "junio.xls") {
            Err(EnoeError::MissingColumn { column, context }) => {
                assert_eq!(column, COL::LEGACY_RESIDENCY_CONDITION);
                assert_eq!(context, "junio.xls");
            }
            other => panic!("expected a missing column error, got {other:?}"),
        }
    }

    #[test]
    fn output_name_appends_suffix_to_stem() {
        assert_eq!(
            output_path(Path::new("datos/junio.xls"), "m.csv"),
            PathBuf::from("datos/juniom.csv")
        );
    }

    #[test]
    fn run_writes_slim_csv_next_to_input() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("junio.csv");
        let mut file = std::fs::File::create(&input)?;
        writeln!(file, "\"MUN,C,3\",\"ENT,C,2\",\"C_RES,C,1\",\"L_NAC_C,C,3\",\"FAC_NP,N,6,0\",EXTRA")?;
        writeln!(file, "101,07,1,007,120,x")?;
        writeln!(file, "004,27,3,027,95,y")?;

        let config = FilterConfig {
            input,
            ..Default::default()
        };
        let output = run(&config)?;
        assert_eq!(output.path, dir.path().join("juniom.csv"));
        let written = read_csv(&output.path, Encoding::Utf8)?;
        assert_eq!(written.get_column_names(), config.columns);
        assert_eq!(written.height(), 2);
        assert_eq!(written.column(COL::LEGACY_BIRTHPLACE)?.str()?.get(0), Some("007"));
        Ok(())
    }

    #[test]
    fn run_converts_spreadsheet_extract() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("junio.xlsx");
        std::fs::copy(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/junio.xlsx"),
            &input,
        )?;
        let config = FilterConfig {
            input,
            columns: vec![
                COL::LEGACY_EXPANSION_FACTOR.to_string(),
                COL::LEGACY_MUNICIPALITY.to_string(),
            ],
            ..Default::default()
        };
        let output = run(&config)?;
        assert_eq!(output.path, dir.path().join("juniom.csv"));
        let written = read_csv(&output.path, Encoding::Utf8)?;
        assert_eq!(written.get_column_names(), config.columns);
        let municipalities: Vec<Option<&str>> =
            written.column(COL::LEGACY_MUNICIPALITY)?.str()?.into_iter().collect();
        assert_eq!(municipalities, vec![Some("007"), Some("101")]);
        let factors: Vec<Option<&str>> =
            written.column(COL::LEGACY_EXPANSION_FACTOR)?.str()?.into_iter().collect();
        assert_eq!(factors, vec![Some("120"), None]);
        Ok(())
    }

    #[test]
    fn run_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = FilterConfig {
            input: dir.path().join("junio.xls"),
            ..Default::default()
        };
        assert!(matches!(run(&config), Err(EnoeError::MissingInputFile(_))));
        assert!(!dir.path().join("juniom.csv").exists());
    }
}
