use anyhow::{anyhow, Result};

use crate::data::{MetaValue, PlotData, Row};

/// Shape a table into forest-plot rows.
///
/// `id_col` defaults to the 1-based row number and `label_col` to the id.
/// Every column not used for id, label or group lands in `metadata`.
pub fn rows_from_table(
    table: &PlotData,
    id_col: Option<&str>,
    label_col: Option<&str>,
    group_col: Option<&str>,
) -> Result<Vec<Row>> {
    let id_idx = id_col.map(|c| find_col_index(&table.headers, c)).transpose()?;
    let label_idx = label_col.map(|c| find_col_index(&table.headers, c)).transpose()?;
    let group_idx = group_col.map(|c| find_col_index(&table.headers, c)).transpose()?;
    let reserved = [id_idx, label_idx, group_idx];

    let rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, cells)| {
            let text_at = |idx: Option<usize>| idx.and_then(|i| cells.get(i)).and_then(MetaValue::display_text);

            let id = text_at(id_idx).unwrap_or_else(|| (row_idx + 1).to_string());
            let label = text_at(label_idx).unwrap_or_else(|| id.clone());
            let mut row = Row::new(id, label);
            row.group_id = text_at(group_idx);

            for (col_idx, (header, cell)) in table.headers.iter().zip(cells).enumerate() {
                if !reserved.contains(&Some(col_idx)) {
                    row.metadata.insert(header.clone(), cell.clone());
                }
            }
            row
        })
        .collect();

    tracing::debug!(rows = rows.len(), columns = table.headers.len(), "built rows from table");
    Ok(rows)
}

fn find_col_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("Column '{}' not found", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PlotData {
        PlotData::from_csv_str(
            "trial,name,region,est,lo,hi\n\
             t1,Smith 2001,EU,0.4,0.1,0.7\n\
             t2,,US,-0.1,-0.6,0.3\n",
        )
        .unwrap()
    }

    #[test]
    fn test_default_ids_and_labels() {
        let rows = rows_from_table(&table(), None, None, None).unwrap();
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[1].label, "2");
        assert!(rows[0].group_id.is_none());
        assert_eq!(rows[0].number("est"), Some(0.4));
        assert!(rows[0].metadata.contains_key("trial"));
    }

    #[test]
    fn test_named_columns() {
        let rows = rows_from_table(&table(), Some("trial"), Some("name"), Some("region")).unwrap();
        assert_eq!(rows[0].id, "t1");
        assert_eq!(rows[0].label, "Smith 2001");
        assert_eq!(rows[0].group_id.as_deref(), Some("EU"));
        // empty label cell falls back to the id
        assert_eq!(rows[1].label, "t2");
        assert!(!rows[0].metadata.contains_key("name"));
        assert_eq!(rows[1].number("lo"), Some(-0.6));
    }

    #[test]
    fn test_unknown_column() {
        let err = rows_from_table(&table(), Some("nope"), None, None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
