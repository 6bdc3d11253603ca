use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::coerce::coerce_numeric;
use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Filter clauses: one (operator, operand) per column
// ---------------------------------------------------------------------------

/// A single column-scoped condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterClause {
    /// Inclusive numeric range over the coerced column.
    Range { low: i64, high: i64 },
    /// Exact, type-sensitive membership.
    In { values: BTreeSet<CellValue> },
    /// Case-insensitive substring match on any token.
    ContainsAny { tokens: Vec<String> },
    /// Case-insensitive substring match on every token.
    ContainsAll { tokens: Vec<String> },
    /// Operator this build does not know. Imposes no constraint.
    #[serde(other)]
    Unsupported,
}

/// Active clauses keyed by column name. Clauses are conjoined, so the
/// iteration order does not affect the result.
pub type FilterMapping = BTreeMap<String, FilterClause>;

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Return indices of rows that pass every clause in `filters`.
///
/// A row passes a clause when:
/// * The clause names a column the table does not have → passes (ignored)
/// * `Range`: the coerced value is present and within `[low, high]`
/// * `In`: the raw cell is one of the allowed values
/// * `ContainsAny` / `ContainsAll`: the lowercased cell text contains any / all tokens
pub fn filtered_indices(table: &Table, filters: &FilterMapping) -> Vec<usize> {
    let mut keep = vec![true; table.len()];

    for (col, clause) in filters {
        let Some(column) = table.column(col) else {
            continue;
        };
        let mask = clause_mask(column, clause);
        for (k, m) in keep.iter_mut().zip(mask) {
            *k &= m;
        }
    }

    keep.iter()
        .enumerate()
        .filter(|(_, k)| **k)
        .map(|(i, _)| i)
        .collect()
}

/// Filter `table` into a new table. The source table is never modified.
pub fn apply_filters(table: &Table, filters: &FilterMapping) -> Table {
    table.take_rows(&filtered_indices(table, filters))
}

fn clause_mask(column: &Column, clause: &FilterClause) -> Vec<bool> {
    match clause {
        FilterClause::Range { low, high } => {
            let (low, high) = (*low as f64, *high as f64);
            let (coerced, _) = coerce_numeric(&column.values);
            coerced
                .into_iter()
                .map(|v| v.is_some_and(|v| low <= v && v <= high))
                .collect()
        }
        FilterClause::In { values } => column.values.iter().map(|v| values.contains(v)).collect(),
        FilterClause::ContainsAny { tokens } => token_mask(column, tokens, false),
        FilterClause::ContainsAll { tokens } => token_mask(column, tokens, true),
        FilterClause::Unsupported => vec![true; column.values.len()],
    }
}

fn token_mask(column: &Column, tokens: &[String], require_all: bool) -> Vec<bool> {
    let tokens: Vec<String> = tokens
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();
    if tokens.is_empty() {
        return vec![true; column.values.len()];
    }

    column
        .values
        .iter()
        .map(|cell| {
            // A missing cell contains no token.
            if cell.is_missing() {
                return false;
            }
            let text = cell.to_string().to_lowercase();
            if require_all {
                tokens.iter().all(|t| text.contains(t.as_str()))
            } else {
                tokens.iter().any(|t| text.contains(t.as_str()))
            }
        })
        .collect()
}
