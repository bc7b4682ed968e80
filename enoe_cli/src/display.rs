use comfy_table::{presets::NOTHING, *};
use itertools::Itertools;
use polars::prelude::{AnyValue, DataFrame};

use enoe::Skipped;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
    table
}

fn format_value(value: AnyValue, decimals: usize) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format!("{v:.decimals$}"),
        AnyValue::Float32(v) => format!("{v:.decimals$}"),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Print every row of `df`, floats rounded to `decimals` places.
pub fn display_table(df: &DataFrame, decimals: usize) -> anyhow::Result<()> {
    let mut table = new_table();
    table.set_header(
        df.get_column_names()
            .into_iter()
            .map(|name| Cell::new(name).add_attribute(Attribute::Bold))
            .collect_vec(),
    );
    for idx in 0..df.height() {
        let row = df
            .get_columns()
            .iter()
            .map(|series| Ok(format_value(series.get(idx)?, decimals)))
            .collect::<anyhow::Result<Vec<_>>>()?;
        table.add_row(row);
    }
    println!("\n{}", table);
    Ok(())
}

pub fn display_skipped(skipped: &[Skipped]) {
    if skipped.is_empty() {
        return;
    }
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Skipped file").add_attribute(Attribute::Bold),
        Cell::new("Reason").add_attribute(Attribute::Bold),
    ]);
    for entry in skipped {
        table.add_row(vec![entry.path.display().to_string(), entry.reason.clone()]);
    }
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    println!("\n{}", table);
}
