//! Expansion factor adjustment. A monthly factor weights a respondent for one month; when `n`
//! months are merged into a quarter each factor is divided by `n` so the quarter stays on the
//! population scale of a single month.

use polars::prelude::*;

use crate::coerce::CoercionPolicy;
use crate::error::{EnoeError, EnoeResult};

/// Add `adjusted_column` = `factor_column` as `f64` / `divisor`. Unparseable factors become null.
pub fn adjust_factor(
    mut df: DataFrame,
    factor_column: &str,
    adjusted_column: &str,
    divisor: usize,
) -> EnoeResult<DataFrame> {
    if divisor == 0 {
        return Err(EnoeError::InvalidConfig(
            "expansion factor divisor must be at least 1".into(),
        ));
    }
    if !df.get_column_names().contains(&factor_column) {
        return Err(EnoeError::missing_column(factor_column, "monthly table"));
    }
    // Divide element-wise so every value is exactly `w / d`
    let divisor = divisor as f64;
    let adjusted = CoercionPolicy::Null
        .float_series(df.column(factor_column)?)?
        .f64()?
        .apply_values(|w| w / divisor)
        .with_name(adjusted_column)
        .into_series();
    df.with_column(adjusted)?;
    Ok(df)
}
