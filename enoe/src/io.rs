//! Reading survey extracts and writing results.
//!
//! Every input column is read as text: legacy codes such as `007` must survive untouched and the
//! numeric interpretation of a column is left to [`crate::coerce::CoercionPolicy`].

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use anyhow::anyhow;
use calamine::{open_workbook_auto, Data, Reader};
use encoding_rs::WINDOWS_1252;
use itertools::Itertools;
use log::{debug, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{EnoeError, EnoeResult};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Text encoding of a CSV input.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive, serialize_all = "snake_case")]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1, decoded with its windows-1252 superset as browsers and INEGI tools do.
    #[strum(to_string = "latin1", serialize = "latin-1")]
    Latin1,
}

fn read_bytes(path: &Path) -> EnoeResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EnoeError::MissingInputFile(path.to_path_buf()),
        _ => e.into(),
    })
}

fn decode(bytes: Vec<u8>, encoding: Encoding, path: &Path) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => match bytes.strip_prefix(UTF8_BOM) {
            Some(stripped) => stripped.to_vec(),
            None => bytes,
        },
        Encoding::Latin1 => {
            let (text, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                warn!("Replaced undecodable bytes while reading {}", path.display());
            }
            text.into_owned().into_bytes()
        }
    }
}

/// Read a CSV file with a header row, all columns as strings.
pub fn read_csv<P: AsRef<Path>>(path: P, encoding: Encoding) -> EnoeResult<DataFrame> {
    let path = path.as_ref();
    let bytes = decode(read_bytes(path)?, encoding, path);
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    debug!("Read {} with shape {:?}", path.display(), df.shape());
    Ok(df)
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(n) => Some(n.to_string()),
        // Spreadsheets store every number as a float; keep whole numbers free of a trailing `.0`
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some((*n as i64).to_string()),
        Data::Float(n) => Some(n.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Read the first worksheet of a spreadsheet, using its first row as the header.
pub fn read_spreadsheet<P: AsRef<Path>>(path: P) -> EnoeResult<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EnoeError::MissingInputFile(path.to_path_buf()));
    }
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no worksheets: {}", path.display()))??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let names = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| cell_to_string(cell).unwrap_or_else(|| format!("column_{idx}")))
        .collect_vec();

    let mut values: Vec<Vec<Option<String>>> =
        vec![Vec::with_capacity(range.height().saturating_sub(1)); names.len()];
    for row in rows {
        for (idx, column) in values.iter_mut().enumerate() {
            column.push(row.get(idx).and_then(cell_to_string));
        }
    }
    let columns = names
        .iter()
        .zip(values)
        .map(|(name, column)| Series::new(name, column))
        .collect_vec();
    let df = DataFrame::new(columns)?;
    debug!("Read {} with shape {:?}", path.display(), df.shape());
    Ok(df)
}

/// Read a CSV or spreadsheet depending on the file extension.
pub fn read_table<P: AsRef<Path>>(path: P, encoding: Encoding) -> EnoeResult<DataFrame> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "csv" | "txt" => read_csv(path, encoding),
        "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => read_spreadsheet(path),
        _ => Err(EnoeError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Write `df` as a UTF-8 CSV with a header row.
pub fn write_csv<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> EnoeResult<()> {
    let path = path.as_ref();
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}
