use super::model::CellValue;

/// Best-effort numeric view of a column.
///
/// Every cell is parsed independently; anything that does not parse (text,
/// missing, NaN) becomes `None`. The flag is true when at least one cell
/// parsed. Both the control builder and the filter engine go through this
/// function so a range acts on exactly the values its bounds came from.
pub fn coerce_numeric(values: &[CellValue]) -> (Vec<Option<f64>>, bool) {
    let coerced: Vec<Option<f64>> = values.iter().map(coerce_cell).collect();
    let any_numeric = coerced.iter().any(Option::is_some);
    (coerced, any_numeric)
}

pub fn coerce_cell(value: &CellValue) -> Option<f64> {
    let parsed = match value {
        CellValue::Integer(i) => Some(*i as f64),
        CellValue::Float(v) => Some(*v),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        CellValue::Missing => None,
    };
    parsed.filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headcount_mixed_values() {
        let col = vec![
            CellValue::Integer(10),
            CellValue::Integer(50),
            CellValue::from("bad"),
            CellValue::Missing,
            CellValue::Integer(200),
        ];
        let (coerced, any) = coerce_numeric(&col);
        assert!(any);
        assert_eq!(coerced, vec![Some(10.0), Some(50.0), None, None, Some(200.0)]);
    }

    #[test]
    fn numeric_text_parses() {
        assert_eq!(coerce_cell(&" 42 ".into()), Some(42.0));
        assert_eq!(coerce_cell(&"1e3".into()), Some(1000.0));
        assert_eq!(coerce_cell(&"inf".into()), Some(f64::INFINITY));
        assert_eq!(coerce_cell(&"NaN".into()), None);
        assert_eq!(coerce_cell(&"1,000".into()), None);
    }

    #[test]
    fn nothing_parses() {
        let (coerced, any) = coerce_numeric(&["a".into(), CellValue::Missing]);
        assert!(!any);
        assert_eq!(coerced, vec![None, None]);
    }
}
