//! Settings for each preparation step. Defaults reproduce the values used for the 2020 T2
//! quarter; a TOML file only needs to list what changes between runs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::io::Encoding;
use crate::COL;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub filter: FilterConfig,
    pub concat: ConcatConfig,
    pub residency: ResidencyConfig,
    pub inflation: InflationConfig,
    pub consolidate: ConsolidateConfig,
}

fn legacy_columns() -> Vec<String> {
    vec![
        COL::LEGACY_MUNICIPALITY.into(),
        COL::LEGACY_ENTITY.into(),
        COL::LEGACY_RESIDENCY_CONDITION.into(),
        COL::LEGACY_BIRTHPLACE.into(),
    ]
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    /// Raw extract, CSV or spreadsheet.
    pub input: PathBuf,
    /// Columns to keep, in output order.
    pub columns: Vec<String>,
    /// Appended to the input stem to build the output file name.
    pub suffix: String,
    pub encoding: Encoding,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let mut columns = legacy_columns();
        columns.push(COL::LEGACY_EXPANSION_FACTOR.into());
        Self {
            input: "junio.xls".into(),
            columns,
            suffix: "m.csv".into(),
            encoding: Encoding::Utf8,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ConcatConfig {
    pub base_dir: PathBuf,
    /// Monthly files relative to `base_dir`, in period order.
    pub files: Vec<PathBuf>,
    /// Monthly expansion factor as found in the filtered files.
    pub factor_column: String,
    pub adjusted_factor_column: String,
    pub period_label: String,
    /// Source columns kept alongside the adjusted factor and the period label.
    pub columns: Vec<String>,
    pub encoding: Encoding,
    /// Defaults to `Trimestre_<label>.csv` inside `base_dir`.
    pub output: Option<PathBuf>,
}

impl Default for ConcatConfig {
    fn default() -> Self {
        Self {
            base_dir: ".".into(),
            files: vec!["abrilm.csv".into(), "mayom.csv".into(), "juniom.csv".into()],
            factor_column: COL::LEGACY_EXPANSION_FACTOR.into(),
            adjusted_factor_column: COL::ADJUSTED_FACTOR.into(),
            period_label: "2020 T2".into(),
            columns: legacy_columns(),
            encoding: Encoding::Utf8,
            output: None,
        }
    }
}

impl ConcatConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            self.base_dir
                .join(format!("Trimestre_{}.csv", self.period_label.replace(' ', "_")))
        })
    }

    /// Columns of the quarterly table, in output order.
    pub fn projection(&self) -> Vec<String> {
        self.columns
            .iter()
            .cloned()
            .chain([self.adjusted_factor_column.clone(), COL::PERIOD.to_string()])
            .collect()
    }
}

/// What to do with survey rows whose entity code has no known name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum UnknownEntityPolicy {
    /// Drop the rows before aggregating.
    #[default]
    Exclude,
    /// Aggregate them under `ResidencyConfig::unknown_entity_label`.
    Group,
}

/// A residency condition code and the percentage column it produces.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub code: i64,
    pub column: String,
}

impl Category {
    pub fn new(code: i64, column: &str) -> Self {
        Self {
            code,
            column: column.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResidencyConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub encoding: Encoding,
    pub entity_code_column: String,
    pub condition_column: String,
    pub weight_column: String,
    pub unknown_entity: UnknownEntityPolicy,
    pub unknown_entity_label: String,
    /// Legacy name to readable name.
    pub rename: BTreeMap<String, String>,
    /// Valid condition codes; rows with any other code are dropped.
    pub categories: Vec<Category>,
}

impl Default for ResidencyConfig {
    fn default() -> Self {
        let rename = [
            (COL::LEGACY_MUNICIPALITY, COL::MUNICIPALITY),
            (COL::LEGACY_ENTITY, COL::ENTITY_CODE),
            (COL::LEGACY_RESIDENCY_CONDITION, COL::RESIDENCY_CONDITION),
            (COL::LEGACY_BIRTHPLACE, COL::BIRTHPLACE),
            (COL::ADJUSTED_FACTOR, COL::EXPANSION_FACTOR),
        ]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();
        Self {
            input: "Trimestre 2 de 2020m.csv".into(),
            output: "Trimestre_2_2020p.csv".into(),
            encoding: Encoding::Latin1,
            rename,
            entity_code_column: COL::ENTITY_CODE.into(),
            condition_column: COL::RESIDENCY_CONDITION.into(),
            weight_column: COL::EXPANSION_FACTOR.into(),
            categories: vec![
                Category::new(1, COL::PCT_USUAL_RESIDENT),
                Category::new(2, COL::PCT_DEFINITIVE_ABSENT),
                Category::new(3, COL::PCT_NEW_RESIDENT),
            ],
            unknown_entity: UnknownEntityPolicy::Exclude,
            unknown_entity_label: "ENTIDAD DESCONOCIDA".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InflationConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub encoding: Encoding,
    /// Price index column to use.
    pub index_column: String,
    /// Months per reported period, 3 for quarterly.
    pub period: usize,
    pub output_column: String,
}

impl Default for InflationConfig {
    fn default() -> Self {
        Self {
            input: "INPC_SOLOS.csv".into(),
            output: "InflacionTuxtla.csv".into(),
            encoding: Encoding::Utf8,
            index_column: COL::INDEX_TUXTLA.into(),
            period: 3,
            output_column: COL::QUARTERLY_INFLATION.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ConsolidateConfig {
    /// Directory holding the percentage reports.
    pub dir: PathBuf,
    pub pattern: String,
    pub output: PathBuf,
    pub encoding: Encoding,
    pub value_column: String,
    pub name_column: String,
    /// Entities reported individually, matched exactly against `name_column`.
    pub entities: Vec<String>,
    /// Short name of the value, used in the report's column names.
    pub prefix: String,
    pub label_column: String,
}

impl Default for ConsolidateConfig {
    fn default() -> Self {
        Self {
            dir: "reportes".into(),
            pattern: "*.csv".into(),
            output: "Reporte_NR_Inflacion.csv".into(),
            encoding: Encoding::Utf8,
            value_column: COL::PCT_NEW_RESIDENT.into(),
            name_column: COL::ENTITY_NAME.into(),
            entities: vec!["CHIAPAS".into(), "TABASCO".into(), "QUINTANA ROO".into()],
            prefix: "NR".into(),
            label_column: COL::REPORT_LABEL.into(),
        }
    }
}

impl ConsolidateConfig {
    pub fn mean_column(&self) -> String {
        format!("Promedio_{}_Nacional", self.prefix)
    }

    pub fn entity_column(&self, entity: &str) -> String {
        format!("{}_{}", self.prefix, entity.replace(' ', "_"))
    }
}
