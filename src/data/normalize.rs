use super::model::{CellValue, Column, Table};

/// Trim header names and text cells. Missing cells stay missing and numeric
/// cells pass through untouched. Returns a new table.
pub fn normalize_table(table: &Table) -> Table {
    let columns = table
        .columns()
        .iter()
        .map(|c| Column {
            name: c.name.trim().to_string(),
            values: c.values.iter().map(trim_cell).collect(),
        })
        .collect();
    // Same shape as the input, so construction cannot fail.
    Table::new(columns).unwrap_or_default()
}

fn trim_cell(value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(s) => CellValue::Text(s.trim().to_string()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_headers_and_text_cells() {
        let raw = Table::new(vec![
            Column::new(" Industry ", vec!["Tech".into(), "tech ".into(), "Finance".into()]),
            Column::new("Headcount\t", vec![10i64.into(), CellValue::Missing, 2.5f64.into()]),
        ])
        .unwrap();

        let clean = normalize_table(&raw);

        assert_eq!(clean.column_names().collect::<Vec<_>>(), vec!["Industry", "Headcount"]);
        assert_eq!(
            clean.column("Industry").unwrap().values,
            vec![CellValue::from("Tech"), "tech".into(), "Finance".into()]
        );
        assert_eq!(
            clean.column("Headcount").unwrap().values,
            vec![CellValue::Integer(10), CellValue::Missing, CellValue::Float(2.5)]
        );
    }

    #[test]
    fn input_table_is_left_alone() {
        let raw = Table::new(vec![Column::new(" a", vec![" x ".into()])]).unwrap();
        let _ = normalize_table(&raw);
        assert_eq!(raw.column(" a").unwrap().values, vec![CellValue::from(" x ")]);
    }
}
