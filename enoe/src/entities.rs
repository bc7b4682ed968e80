//! Mexican federal entities (states) keyed by their INEGI code.

use polars::prelude::*;

/// Canonical uppercase names indexed by `code - 1`.
const ENTITY_NAMES: [&str; 32] = [
    "AGUASCALIENTES",
    "BAJA CALIFORNIA",
    "BAJA CALIFORNIA SUR",
    "CAMPECHE",
    "COAHUILA DE ZARAGOZA",
    "COLIMA",
    "CHIAPAS",
    "CHIHUAHUA",
    "CIUDAD DE MEXICO",
    "DURANGO",
    "GUANAJUATO",
    "GUERRERO",
    "HIDALGO",
    "JALISCO",
    "MEXICO",
    "MICHOACAN DE OCAMPO",
    "MORELOS",
    "NAYARIT",
    "NUEVO LEON",
    "OAXACA",
    "PUEBLA",
    "QUERETARO DE ARTEAGA",
    "QUINTANA ROO",
    "SAN LUIS POTOSI",
    "SINALOA",
    "SONORA",
    "TABASCO",
    "TAMAULIPAS",
    "TLAXCALA",
    "VERACRUZ DE IGNACIO DE LA LLAVE",
    "YUCATAN",
    "ZACATECAS",
];

/// Returns the canonical name for an entity code, `None` outside 1..=32.
pub fn entity_name(code: i64) -> Option<&'static str> {
    usize::try_from(code)
        .ok()
        .and_then(|code| code.checked_sub(1))
        .and_then(|idx| ENTITY_NAMES.get(idx))
        .copied()
}

/// All `(code, name)` pairs in code order.
pub fn entities() -> impl Iterator<Item = (i64, &'static str)> {
    ENTITY_NAMES
        .iter()
        .enumerate()
        .map(|(idx, name)| (idx as i64 + 1, *name))
}

/// The code map as a two column lookup table, used to join names onto survey rows.
pub fn entity_table(code_column: &str, name_column: &str) -> PolarsResult<DataFrame> {
    let (codes, names): (Vec<i64>, Vec<&str>) = entities().unzip();
    DataFrame::new(vec![
        Series::new(code_column, codes),
        Series::new(name_column, names),
    ])
}
