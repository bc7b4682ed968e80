//! Period-over-period change of a monthly price index.

use itertools::Itertools;
use log::info;
use polars::prelude::*;

use crate::coerce::CoercionPolicy;
use crate::config::InflationConfig;
use crate::error::{EnoeError, EnoeResult};
use crate::io::{read_csv, write_csv};
use crate::{Output, COL};

/// Percentage change between the first and last month of each complete period of `period`
/// months. Only the last row of a period carries a value; every other row is `None`, as is any
/// period whose start is missing or zero.
pub fn period_change(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(idx, current)| {
            if period == 0 || (idx + 1) % period != 0 {
                return None;
            }
            let start = values.get(idx + 1 - period).copied().flatten()?;
            let current = (*current)?;
            (start != 0.0).then(|| 100.0 * (current - start) / start)
        })
        .collect()
}

/// Rows of `df` closing a period, with their original 0-based position in `index`.
pub fn inflation_table(df: &DataFrame, config: &InflationConfig) -> EnoeResult<DataFrame> {
    if config.period == 0 {
        return Err(EnoeError::InvalidConfig(
            "inflation period must be at least one month".into(),
        ));
    }
    let index = df
        .column(&config.index_column)
        .map_err(|_| EnoeError::missing_column(config.index_column.as_str(), "price index table"))?;
    let values = CoercionPolicy::Null
        .float_series(index)?
        .f64()?
        .into_iter()
        .collect_vec();

    let (rows, changes): (Vec<u32>, Vec<f64>) = period_change(&values, config.period)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, change)| Some((idx as u32, change?)))
        .unzip();
    Ok(DataFrame::new(vec![
        Series::new(COL::ROW_INDEX, rows),
        Series::new(&config.output_column, changes),
    ])?)
}

pub fn run(config: &InflationConfig) -> EnoeResult<Output> {
    info!(
        "Computing {}-month change of '{}' from {}",
        config.period,
        config.index_column,
        config.input.display()
    );
    let df = read_csv(&config.input, config.encoding)?;
    let mut table = inflation_table(&df, config)?;
    write_csv(&mut table, &config.output)?;
    info!(
        "Inflation table with {} periods saved to {}",
        table.height(),
        config.output.display()
    );
    Ok(Output {
        path: config.output.clone(),
        table,
    })
}
