use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the loaded sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Filter selections live in `BTreeSet`s, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Absent value. Rendered as an empty field, never as text like "nan".
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    /// Missing sorts first, then numbers, then text. Integer and float cells
    /// are distinct kinds: `Integer(5)` never equals `Float(5.0)`.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Missing => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Missing => {}
        }
    }
}

impl fmt::Display for CellValue {
    /// The text written to the grid and to exported CSV.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Keep a decimal point on integral floats so a re-read yields a float again.
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// True for missing cells and for text that is empty.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

// ---------------------------------------------------------------------------
// Column / Table – the complete loaded dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{column}' has {actual} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// One named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Ordered columns aligned by row index. Immutable once built; filtering
/// produces a new table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, rejecting columns of unequal length.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.values.len() != n_rows) {
            return Err(TableError::RaggedColumn {
                column: bad.name.clone(),
                expected: n_rows,
                actual: bad.values.len(),
            });
        }
        Ok(Self { columns, n_rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Look up a column by name. With duplicate names the first one wins.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.columns.iter().map(move |c| &c.values[index])
    }

    /// New table holding only the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            n_rows: indices.len(),
        }
    }
}
