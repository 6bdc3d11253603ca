use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::coerce::coerce_numeric;
use super::filter::{FilterClause, FilterMapping};
use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Declarative rules: which columns can be filtered and how they are meant to be
// ---------------------------------------------------------------------------

/// The filter kind a column is configured with. The effective control may
/// differ once the data is seen (see [`classify_columns`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Numeric,
    Text,
    TextSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRule {
    pub column: &'static str,
    pub kind: FilterKind,
}

/// The widget a column actually gets for the loaded table.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterControl {
    /// Multi-select over the sorted distinct non-blank values.
    Choice { options: Vec<CellValue> },
    /// Inclusive integer range over the finite coerced values.
    Range { min: i64, max: i64 },
    /// Comma-separated token search.
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnControl {
    pub column: String,
    pub control: FilterControl,
}

/// Decide the effective control for every configured column present in `table`.
///
/// Numeric columns with no finite parseable value fall back to a choice list.
pub fn classify_columns(table: &Table, rules: &[ColumnRule]) -> Vec<ColumnControl> {
    rules
        .iter()
        .filter_map(|rule| {
            let column = table.column(rule.column)?;
            let control = match rule.kind {
                FilterKind::Numeric => numeric_bounds(&column.values)
                    .map(|(min, max)| FilterControl::Range { min, max })
                    .unwrap_or_else(|| FilterControl::Choice {
                        options: distinct_options(&column.values),
                    }),
                FilterKind::TextSearch => FilterControl::Search,
                FilterKind::Text => FilterControl::Choice {
                    options: distinct_options(&column.values),
                },
            };
            Some(ColumnControl {
                column: rule.column.to_string(),
                control,
            })
        })
        .collect()
}

/// `[floor(min), floor(max)]` over the finite coerced values, if there are any.
pub fn numeric_bounds(values: &[CellValue]) -> Option<(i64, i64)> {
    let (coerced, any_numeric) = coerce_numeric(values);
    if !any_numeric {
        return None;
    }
    let finite = coerced.into_iter().flatten().filter(|v| v.is_finite());
    let (min, max) = finite.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    Some((min.floor() as i64, max.floor() as i64))
}

/// Sorted distinct values, without missing or empty cells.
pub fn distinct_options(values: &[CellValue]) -> Vec<CellValue> {
    values
        .iter()
        .filter(|v| !v.is_blank())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ---------------------------------------------------------------------------
// User input → FilterMapping
// ---------------------------------------------------------------------------

/// How search tokens are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Combine {
    #[default]
    Or,
    And,
}

impl Combine {
    pub fn label(self) -> &'static str {
        match self {
            Combine::Or => "OR",
            Combine::And => "AND",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchInput {
    pub text: String,
    pub combine: Combine,
}

/// Everything the user has entered, per column. An absent entry is the
/// unset default: nothing selected, full range, empty search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterInputs {
    pub selections: BTreeMap<String, BTreeSet<CellValue>>,
    pub ranges: BTreeMap<String, (i64, i64)>,
    pub searches: BTreeMap<String, SearchInput>,
}

impl FilterInputs {
    /// The range shown for a column, clamped into its bounds.
    pub fn range_for(&self, column: &str, min: i64, max: i64) -> (i64, i64) {
        let (start, end) = self.ranges.get(column).copied().unwrap_or((min, max));
        let start = start.clamp(min, max);
        let end = end.clamp(min, max);
        (start.min(end), start.max(end))
    }
}

/// Build the clause set for one render pass.
pub fn build_mapping(controls: &[ColumnControl], inputs: &FilterInputs) -> FilterMapping {
    let mut mapping = FilterMapping::new();

    for ctl in controls {
        let col = &ctl.column;
        let clause = match &ctl.control {
            FilterControl::Range { min, max } => {
                // A range control always has a value.
                let (low, high) = inputs.range_for(col, *min, *max);
                Some(FilterClause::Range { low, high })
            }
            FilterControl::Choice { options } => inputs
                .selections
                .get(col)
                .map(|selected| offered_selection(selected, options))
                .filter(|values| !values.is_empty())
                .map(|values| FilterClause::In { values }),
            FilterControl::Search => inputs.searches.get(col).and_then(search_clause),
        };
        if let Some(clause) = clause {
            mapping.insert(col.clone(), clause);
        }
    }

    mapping
}

/// The part of a selection still offered by the control. Selections can
/// outlive a reload whose data no longer has some of the picked values.
pub fn offered_selection(
    selected: &BTreeSet<CellValue>,
    options: &[CellValue],
) -> BTreeSet<CellValue> {
    options
        .iter()
        .filter(|v| selected.contains(*v))
        .cloned()
        .collect()
}

fn search_clause(input: &SearchInput) -> Option<FilterClause> {
    let tokens = tokenize(&input.text);
    if tokens.is_empty() {
        return None;
    }
    Some(match input.combine {
        Combine::Or => FilterClause::ContainsAny { tokens },
        Combine::And => FilterClause::ContainsAll { tokens },
    })
}

/// Split on commas, trim, drop empty pieces.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
