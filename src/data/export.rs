use std::path::Path;

use anyhow::{anyhow, Context, Result};

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Filtered-view CSV export
// ---------------------------------------------------------------------------

/// Serialize the filtered view as CSV, keeping the source column order.
/// Nulls become empty fields, dates ISO-8601.
pub fn filtered_csv(dataset: &Dataset, indices: &[usize]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(dataset.columns.iter().map(|c| c.name.as_str()))
        .context("writing CSV header")?;

    for &i in indices {
        let row = dataset
            .rows
            .get(i)
            .ok_or_else(|| anyhow!("row index {i} out of bounds"))?;
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .with_context(|| format!("writing row {i}"))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("flushing CSV writer: {e}"))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Write the filtered view to disk.
pub fn write_filtered_csv(path: &Path, dataset: &Dataset, indices: &[usize]) -> Result<()> {
    let csv_text = filtered_csv(dataset, indices)?;
    std::fs::write(path, csv_text).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{build_dataset, read_source};

    fn dataset(csv_text: &str) -> Dataset {
        let (table, _) = read_source("test.csv", csv_text.as_bytes()).unwrap();
        build_dataset(vec![table])
    }

    #[test]
    fn preserves_column_order_and_rows() {
        let ds = dataset("b,a,c\n1,x,2024-01-01\n2,y,2024-01-02\n");
        let out = filtered_csv(&ds, &[0, 1]).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("b,a,c"));
        assert_eq!(lines.next(), Some("1,x,2024-01-01"));
        assert_eq!(lines.next(), Some("2,y,2024-01-02"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn exports_only_the_given_indices() {
        let ds = dataset("amount\n1\n5\n10\n15\n");
        let out = filtered_csv(&ds, &[1, 2]).unwrap();
        assert_eq!(out, "amount\n5\n10\n");
    }

    #[test]
    fn nulls_export_as_empty_fields() {
        let ds = dataset("amount,category\n1,fruit\n,fish\n");
        let out = filtered_csv(&ds, &[0, 1]).unwrap();
        assert_eq!(out, "amount,category\n1,fruit\n,fish\n");
    }
}
