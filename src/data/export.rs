use anyhow::{Context, Result};

use super::model::Table;

/// Suggested file name of the exported CSV.
pub const EXPORT_FILE_NAME: &str = "filtered_results.csv";
/// MIME type of the exported CSV.
pub const EXPORT_MIME: &str = "text/csv";

/// Serialize `table` as UTF-8 CSV: one header row, then one record per row.
/// Cells are written exactly as displayed; missing cells become empty fields.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;
    for i in 0..table.len() {
        writer
            .write_record(table.row(i).map(|v| v.to_string()))
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.into_inner().context("flushing CSV buffer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterClause, FilterMapping, apply_filters};
    use crate::data::loader::read_csv;
    use crate::data::model::{CellValue, Column};
    use crate::data::normalize::normalize_table;
    use proptest::prelude::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::new(
                "Company Location",
                vec!["Berlin, DE".into(), CellValue::Missing, "Quote \"Q\"".into()],
            ),
            Column::new("Headcount", vec![10i64.into(), 20i64.into(), CellValue::Missing]),
            Column::new("Score", vec![1.0f64.into(), 2.5f64.into(), 3.0f64.into()]),
        ])
        .unwrap()
    }

    #[test]
    fn writes_header_and_rows_verbatim() {
        let bytes = to_csv_bytes(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "Company Location,Headcount,Score\n\
             \"Berlin, DE\",10,1.0\n\
             ,20,2.5\n\
             \"Quote \"\"Q\"\"\",,3.0\n"
        );
    }

    /// Header plus every cell as it is displayed and exported.
    fn rendered(table: &Table) -> Vec<Vec<String>> {
        let mut grid = vec![table.column_names().map(str::to_string).collect::<Vec<_>>()];
        grid.extend((0..table.len()).map(|i| table.row(i).map(|v| v.to_string()).collect()));
        grid
    }

    #[test]
    fn filtered_export_reads_back_identically() {
        let mut filters = FilterMapping::new();
        filters.insert("Headcount".into(), FilterClause::Range { low: 0, high: 15 });
        let filtered = apply_filters(&sample(), &filters);

        let bytes = to_csv_bytes(&filtered).unwrap();
        let back = read_csv(bytes.as_slice()).unwrap();

        assert_eq!(back, filtered);
    }

    #[test]
    fn numeric_looking_text_reads_back_as_the_same_text() {
        let table = Table::new(vec![Column::new(
            "Headcount",
            vec!["10".into(), "bad".into(), "007".into()],
        )])
        .unwrap();
        let mut filters = FilterMapping::new();
        filters.insert(
            "Headcount".into(),
            FilterClause::ContainsAny {
                tokens: vec!["1".into(), "7".into()],
            },
        );
        let filtered = apply_filters(&table, &filters);

        let back = read_csv(to_csv_bytes(&filtered).unwrap().as_slice()).unwrap();

        assert_eq!(rendered(&back), rendered(&filtered));
        assert_eq!(rendered(&back)[1], vec!["10"]);
        assert_eq!(rendered(&back)[2], vec!["007"]);
    }

    #[test]
    fn empty_table_exports_header_only() {
        let empty = sample().take_rows(&[]);
        let text = String::from_utf8(to_csv_bytes(&empty).unwrap()).unwrap();
        assert_eq!(text, "Company Location,Headcount,Score\n");
    }

    // -- Properties over generated tables --

    fn cell() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            Just(CellValue::Missing),
            any::<i64>().prop_map(CellValue::Integer),
            (-1e6f64..1e6).prop_map(CellValue::Float),
            (-1000i64..1000).prop_map(|i| CellValue::Float(i as f64)),
            "-?[0-9]{1,4}(\\.[0-9]{1,2})?".prop_map(CellValue::Text),
            "[a-c ,\"']{0,6}".prop_map(CellValue::Text),
        ]
    }

    /// Tables as the app holds them: normalized after loading.
    fn table() -> impl Strategy<Value = Table> {
        (0usize..10).prop_flat_map(|rows| {
            (
                proptest::collection::vec(cell(), rows),
                proptest::collection::vec(cell(), rows),
            )
                .prop_map(|(a, b)| {
                    let t = Table::new(vec![
                        Column::new("Company Location", a),
                        Column::new("Headcount", b),
                    ])
                    .unwrap();
                    normalize_table(&t)
                })
        })
    }

    proptest! {
        #[test]
        fn export_reads_back_with_the_same_cells(t in table(), keep in any::<Vec<bool>>()) {
            let indices: Vec<usize> = (0..t.len())
                .filter(|&i| keep.get(i).copied().unwrap_or(true))
                .collect();
            let filtered = t.take_rows(&indices);

            let back = read_csv(to_csv_bytes(&filtered).unwrap().as_slice()).unwrap();

            prop_assert_eq!(back.len(), filtered.len());
            prop_assert_eq!(rendered(&back), rendered(&filtered));
        }
    }
}
