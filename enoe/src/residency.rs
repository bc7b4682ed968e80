//! Share of the weighted population in each residency condition, per federal entity.
//!
//! The quarterly table is renamed to readable names, coerced, restricted to the valid condition
//! codes and aggregated into one row per entity holding the percentage of each condition. A
//! verification column carries the sum of those percentages, which must be 100 for every entity
//! with population.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::{info, warn};
use polars::prelude::*;

use crate::coerce::CoercionPolicy;
use crate::config::{ResidencyConfig, UnknownEntityPolicy};
use crate::entities::entity_table;
use crate::error::{EnoeError, EnoeResult};
use crate::io::{read_csv, write_csv};
use crate::{Output, COL};

const TOTAL: &str = "Poblacion_Total";
const VERIFICATION_TOLERANCE: f64 = 1e-4;

/// Rename the columns listed in `rename` that exist in `df`; all other columns keep their name.
pub fn rename_columns(mut df: DataFrame, rename: &BTreeMap<String, String>) -> EnoeResult<DataFrame> {
    for (from, to) in rename {
        if df.get_column_names().contains(&from.as_str()) {
            df.rename(from, to)?;
        }
    }
    Ok(df)
}

fn require_columns(df: &DataFrame, config: &ResidencyConfig) -> EnoeResult<()> {
    let available = df.get_column_names();
    [
        &config.entity_code_column,
        &config.condition_column,
        &config.weight_column,
    ]
    .into_iter()
    .find(|column| !available.contains(&column.as_str()))
    .map_or(Ok(()), |column| {
        Err(EnoeError::missing_column(
            column.as_str(),
            "quarterly table after renaming",
        ))
    })
}

/// Coerce the condition (invalid → 0), weight (invalid → 0) and entity code (invalid → null)
/// and keep only rows with a configured condition code.
pub fn clean(df: DataFrame, config: &ResidencyConfig) -> EnoeResult<DataFrame> {
    require_columns(&df, config)?;
    if config.categories.is_empty() {
        return Err(EnoeError::InvalidConfig(
            "at least one residency category is required".into(),
        ));
    }
    let codes = Series::new(
        "codes",
        config.categories.iter().map(|c| c.code).collect_vec(),
    );
    let cleaned = df
        .lazy()
        .with_columns([
            CoercionPolicy::Zero.integer(&config.condition_column),
            CoercionPolicy::Zero.float(&config.weight_column),
            CoercionPolicy::Null.integer(&config.entity_code_column),
        ])
        .filter(col(&config.condition_column).is_in(lit(codes)))
        .collect()?;
    Ok(cleaned)
}

/// Attach `Nombre_Entidad` and resolve rows whose code has no name according to the policy.
pub fn name_entities(df: DataFrame, config: &ResidencyConfig) -> EnoeResult<DataFrame> {
    let names = entity_table(&config.entity_code_column, COL::ENTITY_NAME)?;
    let named = df
        .lazy()
        .join(
            names.lazy(),
            [col(&config.entity_code_column)],
            [col(&config.entity_code_column)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    let unknown = named.column(COL::ENTITY_NAME)?.null_count();
    if unknown == 0 {
        return Ok(named);
    }
    let resolved = match config.unknown_entity {
        UnknownEntityPolicy::Exclude => {
            warn!("Excluding {unknown} rows with an unknown entity code");
            named
                .lazy()
                .filter(col(COL::ENTITY_NAME).is_not_null())
                .collect()?
        }
        UnknownEntityPolicy::Group => {
            warn!(
                "Grouping {unknown} rows with an unknown entity code under '{}'",
                config.unknown_entity_label
            );
            named
                .lazy()
                .with_column(
                    col(COL::ENTITY_NAME).fill_null(lit(config.unknown_entity_label.as_str())),
                )
                .collect()?
        }
    };
    Ok(resolved)
}

fn add_all(columns: &[&str]) -> Expr {
    columns
        .iter()
        .fold(lit(0.0), |acc, column| acc + col(column))
}

/// Pivot the weight into one row per entity and one column per category, then normalise each
/// row to percentages of its total. Entities with a zero total get null percentages.
pub fn percentages(df: DataFrame, config: &ResidencyConfig) -> EnoeResult<DataFrame> {
    let columns = config
        .categories
        .iter()
        .map(|c| c.column.as_str())
        .collect_vec();

    let sums = config
        .categories
        .iter()
        .map(|c| {
            when(col(&config.condition_column).eq(lit(c.code)))
                .then(col(&config.weight_column))
                .otherwise(lit(0.0))
                .sum()
                .alias(&c.column)
        })
        .collect_vec();

    let shares = columns
        .iter()
        .map(|column| {
            when(col(TOTAL).eq(lit(0.0)))
                .then(lit(Null {}).cast(DataType::Float64))
                .otherwise(col(column) / col(TOTAL) * lit(100.0))
                .alias(column)
        })
        .collect_vec();

    let mut selection = vec![col(COL::ENTITY_NAME)];
    selection.extend(columns.iter().map(|column| col(column)));
    selection.push(col(COL::VERIFICATION_SUM));

    let table = df
        .lazy()
        .group_by([col(COL::ENTITY_NAME)])
        .agg(sums)
        .with_column(add_all(&columns).alias(TOTAL))
        .with_columns(shares)
        .with_column(add_all(&columns).round(5).alias(COL::VERIFICATION_SUM))
        .select(selection)
        .collect()?
        .sort([COL::ENTITY_NAME], SortMultipleOptions::default())?;
    Ok(table)
}

/// Log entities whose percentages do not add up to 100.
fn check_verification(table: &DataFrame) -> EnoeResult<()> {
    let names = table.column(COL::ENTITY_NAME)?.str()?;
    let sums = table.column(COL::VERIFICATION_SUM)?.f64()?;
    for (name, sum) in names.into_iter().zip(sums) {
        let name = name.unwrap_or_default();
        match sum {
            Some(sum) if (sum - 100.0).abs() > VERIFICATION_TOLERANCE => {
                warn!("Percentages for {name} add up to {sum}, not 100")
            }
            Some(_) => {}
            None => warn!("{name} has no weighted population, percentages are undefined"),
        }
    }
    Ok(())
}

/// Rename, clean, name and aggregate a quarterly table.
pub fn residency_table(df: DataFrame, config: &ResidencyConfig) -> EnoeResult<DataFrame> {
    let df = rename_columns(df, &config.rename)?;
    let df = clean(df, config)?;
    let df = name_entities(df, config)?;
    let table = percentages(df, config)?;
    check_verification(&table)?;
    Ok(table)
}

/// Compute and write the percentage table. Returns `None`, writing nothing, when no row has a
/// valid condition code.
pub fn run(config: &ResidencyConfig) -> EnoeResult<Option<Output>> {
    info!("Computing residency percentages from {}", config.input.display());
    let df = read_csv(&config.input, config.encoding)?;
    let mut table = residency_table(df, config)?;
    if table.height() == 0 {
        warn!(
            "No rows with a valid residency condition in {}, nothing written",
            config.input.display()
        );
        return Ok(None);
    }
    write_csv(&mut table, &config.output)?;
    info!("Percentage table saved to {}", config.output.display());
    Ok(Some(Output {
        path: config.output.clone(),
        table,
    }))
}
