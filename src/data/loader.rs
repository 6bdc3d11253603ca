use std::collections::HashMap;
use std::io::Read;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Table};

/// Cell texts read as missing, as common dataframe readers do.
pub const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "#N/A", "NULL", "null", "NaN", "nan", "-NaN", "None", "<NA>",
];

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV (header row + records) into a [`Table`].
///
/// A column is numeric when every present cell is a number written the way
/// [`CellValue`] displays it (`10`, `2.5`, `3.0`); each cell is then an
/// integer or a float. Any other column is text and keeps the raw cell text,
/// trimming being the normalizer's job. Since exported cells are written as
/// displayed, reading an export back yields the same cell texts.
pub fn read_csv<R: Read>(input: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(false).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        bail!("CSV has no header row");
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col, value) in raw.iter_mut().zip(record.iter()) {
            col.push(value.to_string());
        }
    }

    let columns = dedupe_headers(headers)
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(&cells)))
        .collect();

    Table::new(columns).context("building table from CSV")
}

/// Rename repeated headers `name`, `name.1`, `name.2`, …
pub fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let count = seen.entry(h.clone()).or_insert(0);
            let name = if *count == 0 {
                h.clone()
            } else {
                format!("{h}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

/// True for blank cells and the [`NA_VALUES`] markers.
pub fn is_na(s: &str) -> bool {
    NA_VALUES.contains(&s.trim())
}

fn infer_column(cells: &[String]) -> Vec<CellValue> {
    let numbers: Option<Vec<CellValue>> = cells
        .iter()
        .map(|c| {
            if is_na(c) {
                Some(CellValue::Missing)
            } else {
                canonical_number(c.trim())
            }
        })
        .collect();

    numbers.unwrap_or_else(|| {
        cells
            .iter()
            .map(|c| {
                if is_na(c) {
                    CellValue::Missing
                } else {
                    CellValue::Text(c.clone())
                }
            })
            .collect()
    })
}

/// `text` as a number, only if the number displays as `text` again.
fn canonical_number(text: &str) -> Option<CellValue> {
    let cell = text
        .parse::<i64>()
        .ok()
        .map(CellValue::Integer)
        .or_else(|| {
            text.parse::<f64>()
                .ok()
                .filter(|v| !v.is_nan())
                .map(CellValue::Float)
        })?;
    (cell.to_string() == text).then_some(cell)
}

// ---------------------------------------------------------------------------
// Spreadsheet API values
// ---------------------------------------------------------------------------

/// Build a table from a worksheet value grid: the first row is the header,
/// the rest are records. Short rows are padded with missing cells.
pub fn table_from_sheet_values(rows: &[Vec<JsonValue>]) -> Result<Table> {
    let Some((header, records)) = rows.split_first() else {
        return Ok(Table::default());
    };
    let headers: Vec<String> = header
        .iter()
        .map(|v| match v {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        })
        .collect();

    let columns = dedupe_headers(headers)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let values = records
                .iter()
                .map(|r| r.get(i).map(json_to_cell).unwrap_or(CellValue::Missing))
                .collect();
            Column::new(name, values)
        })
        .collect();

    Table::new(columns).context("building table from worksheet values")
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if is_na(s) => CellValue::Missing,
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        JsonValue::Null => CellValue::Missing,
        other => CellValue::Text(other.to_string()),
    }
}
