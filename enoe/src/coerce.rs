//! Lenient numeric coercion applied where text columns enter a numeric computation. Values that do
//! not parse never raise: they become null or zero depending on the policy.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum CoercionPolicy {
    /// Unparseable values become null and contribute nothing to later sums.
    #[default]
    Null,
    /// Unparseable values become zero.
    Zero,
}

impl CoercionPolicy {
    /// Text of `column` without surrounding whitespace, so padded fixed-width fields parse.
    fn trimmed(column: &str) -> Expr {
        col(column)
            .cast(DataType::String)
            .str()
            .strip_chars(lit(Null {}))
    }

    /// Expression casting `column` to `f64`.
    pub fn float(self, column: &str) -> Expr {
        let expr = Self::trimmed(column).cast(DataType::Float64);
        match self {
            CoercionPolicy::Null => expr,
            CoercionPolicy::Zero => expr.fill_null(lit(0.0)),
        }
    }

    /// Expression casting `column` to `i64`. Goes through `f64` so that values written as `1.0`
    /// are accepted; fractional values are truncated.
    pub fn integer(self, column: &str) -> Expr {
        // Fill nulls while still f64
        self.float(column).cast(DataType::Int64)
    }

    /// Eager counterpart of [`CoercionPolicy::float`].
    pub fn float_series(self, series: &Series) -> PolarsResult<Series> {
        let name = series.name();
        let coerced = DataFrame::new(vec![series.clone()])?
            .lazy()
            .select([self.float(name)])
            .collect()?;
        Ok(coerced.column(name)?.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use polars::df;

    use super::*;

    fn raw() -> DataFrame {
        df!("value" => &["1.5", "abc", "3", "2.0"]).unwrap()
    }

    #[test]
    fn null_policy_keeps_invalid_values_as_null() -> anyhow::Result<()> {
        let out = raw()
            .lazy()
            .select([CoercionPolicy::Null.float("value")])
            .collect()?;
        let values: Vec<Option<f64>> = out.column("value")?.f64()?.into_iter().collect();
        assert_eq!(values, vec![Some(1.5), None, Some(3.0), Some(2.0)]);
        Ok(())
    }

    #[test]
    fn zero_policy_replaces_invalid_values() -> anyhow::Result<()> {
        let out = raw()
            .lazy()
            .select([CoercionPolicy::Zero.integer("value")])
            .collect()?;
        let values: Vec<Option<i64>> = out.column("value")?.i64()?.into_iter().collect();
        assert_eq!(values, vec![Some(1), Some(0), Some(3), Some(2)]);
        Ok(())
    }

    #[test]
    fn eager_coercion_matches_lazy() -> anyhow::Result<()> {
        let series = raw().column("value")?.clone();
        let coerced = CoercionPolicy::Zero.float_series(&series)?;
        let values: Vec<Option<f64>> = coerced.f64()?.into_iter().collect();
        assert_eq!(values, vec![Some(1.5), Some(0.0), Some(3.0), Some(2.0)]);
        Ok(())
    }

    #[test]
    fn padded_values_are_trimmed() -> anyhow::Result<()> {
        let df = df!("value" => &[" 20", "1 ", "  3.5  ", " "])?;
        let out = df
            .lazy()
            .select([
                CoercionPolicy::Zero.float("value").alias("float"),
                CoercionPolicy::Zero.integer("value").alias("integer"),
            ])
            .collect()?;
        let floats: Vec<Option<f64>> = out.column("float")?.f64()?.into_iter().collect();
        assert_eq!(floats, vec![Some(20.0), Some(1.0), Some(3.5), Some(0.0)]);
        let integers: Vec<Option<i64>> = out.column("integer")?.i64()?.into_iter().collect();
        assert_eq!(integers, vec![Some(20), Some(1), Some(3), Some(0)]);
        Ok(())
    }

    #[test]
    fn numeric_columns_pass_through() -> anyhow::Result<()> {
        let series = Series::new("value", &[Some(1.5), None, Some(95.0)]);
        let coerced = CoercionPolicy::Null.float_series(&series)?;
        assert_eq!(coerced.name(), "value");
        let values: Vec<Option<f64>> = coerced.f64()?.into_iter().collect();
        assert_eq!(values, vec![Some(1.5), None, Some(95.0)]);
        Ok(())
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(CoercionPolicy::from_str("ZERO").unwrap(), CoercionPolicy::Zero);
        assert_eq!(CoercionPolicy::from_str("null").unwrap(), CoercionPolicy::Null);
        assert!(CoercionPolicy::from_str("drop").is_err());
    }
}
