use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use super::model::{CellValue, ColumnType, Dataset};

// ---------------------------------------------------------------------------
// Load issues – parse problems surfaced to the user, never fatal
// ---------------------------------------------------------------------------

/// One recoverable problem encountered while loading: a malformed row,
/// or a whole source that could not be read.
#[derive(Debug, Clone)]
pub struct LoadIssue {
    pub source: String,
    pub detail: String,
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.detail)
    }
}

/// Result of a load: the merged dataset plus everything that went wrong
/// along the way but did not stop the load.
#[derive(Debug)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    pub issues: Vec<LoadIssue>,
}

// ---------------------------------------------------------------------------
// Raw source parsing
// ---------------------------------------------------------------------------

/// One parsed delimited source, still untyped: header names plus string
/// records. Typing happens after all sources are merged.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

/// Parse a single CSV source. Malformed records (ragged rows, bad
/// quoting) are reported and skipped; they never abort the parse.
pub fn read_source<R: Read>(name: &str, reader: R) -> Result<(SourceTable, Vec<LoadIssue>)> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .with_context(|| format!("reading CSV headers of {name}"))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        bail!("{name} has no columns");
    }

    let mut records = Vec::new();
    let mut issues = Vec::new();
    for (row_no, result) in csv_reader.records().enumerate() {
        match result {
            Ok(record) => {
                records.push(record.iter().map(|c| c.to_string()).collect());
            }
            Err(e) => issues.push(LoadIssue {
                source: name.to_string(),
                detail: format!("row {} skipped: {e}", row_no + 1),
            }),
        }
    }

    Ok((
        SourceTable {
            name: name.to_string(),
            headers,
            records,
        },
        issues,
    ))
}

/// Load one or more CSV files and merge them into a single dataset.
///
/// A file that fails wholesale (unreadable, bad header) is reported and
/// excluded; the remaining files still load. Fails only when no source
/// could be read at all.
pub fn load_files(paths: &[std::path::PathBuf]) -> Result<LoadOutcome> {
    let mut tables = Vec::new();
    let mut issues = Vec::new();

    for path in paths {
        let name = source_name(path);
        match open_table(path, &name) {
            Ok((table, mut table_issues)) => {
                issues.append(&mut table_issues);
                tables.push(table);
            }
            Err(e) => issues.push(LoadIssue {
                source: name,
                detail: format!("source excluded: {e:#}"),
            }),
        }
    }

    if tables.is_empty() {
        bail!("none of the selected files could be read");
    }

    Ok(LoadOutcome {
        dataset: build_dataset(tables),
        issues,
    })
}

fn open_table(path: &Path, name: &str) -> Result<(SourceTable, Vec<LoadIssue>)> {
    if let Ok(meta) = std::fs::metadata(path) {
        log::info!("{name} – {:.2} KB", meta.len() as f64 / 1024.0);
    }
    let file = File::open(path).with_context(|| format!("opening {name}"))?;
    read_source(name, file)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Download the sample dataset from the configured URL and parse it.
pub fn fetch_sample(url: &str) -> Result<LoadOutcome> {
    let body = reqwest::blocking::get(url)
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .context("sample dataset request failed")?
        .text()
        .context("reading sample dataset body")?;

    let name = url.rsplit('/').next().unwrap_or("sample").to_string();
    let (table, issues) = read_source(&name, body.as_bytes())?;
    Ok(LoadOutcome {
        dataset: build_dataset(vec![table]),
        issues,
    })
}

// ---------------------------------------------------------------------------
// Merging and type inference
// ---------------------------------------------------------------------------

/// Concatenate the sources by row and type every merged column.
///
/// Columns align by name: the first source's order wins, columns unseen
/// so far append in the order they are encountered, and cells missing
/// from a source become nulls. Row order within each source is kept.
pub fn build_dataset(tables: Vec<SourceTable>) -> Dataset {
    let mut headers: Vec<String> = Vec::new();
    for table in &tables {
        for h in &table.headers {
            if !headers.contains(h) {
                headers.push(h.clone());
            }
        }
    }

    // merged column index → raw string per row (None = absent/empty)
    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for table in tables {
        let positions: BTreeMap<&str, usize> = table
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        for record in &table.records {
            let row = headers
                .iter()
                .map(|h| {
                    positions
                        .get(h.as_str())
                        .and_then(|&i| record.get(i))
                        .map(|s| s.trim())
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                })
                .collect();
            raw_rows.push(row);
        }
    }

    let types: Vec<ColumnType> = (0..headers.len())
        .map(|idx| infer_column_type(raw_rows.iter().map(|r| r[idx].as_deref())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&types)
                .map(|(raw, ty)| typed_cell(raw.as_deref(), *ty))
                .collect()
        })
        .collect();

    Dataset::from_cells(headers, types, rows)
}

/// Decide a column's type from its non-empty raw values: numeric if all
/// parse as numbers, temporal if all parse as dates, text otherwise.
/// An all-empty column, or any inference failure, falls back to text.
fn infer_column_type<'a>(values: impl Iterator<Item = Option<&'a str>>) -> ColumnType {
    let mut saw_value = false;
    let mut all_numeric = true;
    let mut all_dates = true;

    for raw in values.flatten() {
        saw_value = true;
        if all_numeric && raw.parse::<f64>().is_err() {
            all_numeric = false;
        }
        if all_dates && parse_date(raw).is_none() {
            all_dates = false;
        }
        if !all_numeric && !all_dates {
            return ColumnType::Text;
        }
    }

    if !saw_value {
        ColumnType::Text
    } else if all_numeric {
        ColumnType::Numeric
    } else if all_dates {
        ColumnType::Temporal
    } else {
        ColumnType::Text
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Try the supported date formats in order.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn typed_cell(raw: Option<&str>, ty: ColumnType) -> CellValue {
    let Some(raw) = raw else {
        return CellValue::Null;
    };
    match ty {
        ColumnType::Numeric => raw
            .parse::<f64>()
            .map(CellValue::Number)
            .unwrap_or(CellValue::Null),
        ColumnType::Temporal => parse_date(raw).map(CellValue::Date).unwrap_or(CellValue::Null),
        ColumnType::Text => CellValue::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnProfile;

    fn table(name: &str, csv_text: &str) -> (SourceTable, Vec<LoadIssue>) {
        read_source(name, csv_text.as_bytes()).unwrap()
    }

    #[test]
    fn parses_headers_and_rows() {
        let (t, issues) = table("a.csv", "amount,category\n1,fruit\n5,vegetable\n");
        assert!(issues.is_empty());
        assert_eq!(t.headers, vec!["amount", "category"]);
        assert_eq!(t.records.len(), 2);
        assert_eq!(t.records[1], vec!["5", "vegetable"]);
    }

    #[test]
    fn ragged_row_is_reported_and_skipped() {
        let (t, issues) = table("a.csv", "amount,category\n1,fruit\n2\n3,dairy\n");
        assert_eq!(t.records.len(), 2);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].detail.contains("row 2"));
    }

    #[test]
    fn infers_numeric_text_and_temporal() {
        let (t, _) = table(
            "a.csv",
            "amount,category,day\n1.5,fruit,2024-01-02\n3,vegetable,2024-02-03\n",
        );
        let ds = build_dataset(vec![t]);
        assert_eq!(ds.columns[0].ty, ColumnType::Numeric);
        assert_eq!(ds.columns[1].ty, ColumnType::Text);
        assert_eq!(ds.columns[2].ty, ColumnType::Temporal);
    }

    #[test]
    fn mixed_column_falls_back_to_text() {
        let (t, _) = table("a.csv", "v\n1\nfruit\n");
        let ds = build_dataset(vec![t]);
        assert_eq!(ds.columns[0].ty, ColumnType::Text);
        assert_eq!(ds.rows[0][0], CellValue::Text("1".into()));
    }

    #[test]
    fn empty_cells_become_null() {
        let (t, _) = table("a.csv", "amount\n1\n\n3\n");
        let ds = build_dataset(vec![t]);
        assert_eq!(ds.columns[0].ty, ColumnType::Numeric);
        assert_eq!(ds.rows[1][0], CellValue::Null);
    }

    #[test]
    fn concat_preserves_row_count_and_order() {
        let (a, _) = table("a.csv", "amount,category\n1,fruit\n2,dairy\n");
        let (b, _) = table("b.csv", "amount,category\n3,fish\n4,fruit\n5,bread\n");
        let ds = build_dataset(vec![a, b]);
        assert_eq!(ds.len(), 5);
        let amounts: Vec<f64> = ds.rows.iter().filter_map(|r| r[0].as_number()).collect();
        assert_eq!(amounts, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn concat_aligns_columns_by_name() {
        let (a, _) = table("a.csv", "amount,category\n1,fruit\n");
        let (b, _) = table("b.csv", "category,region\nfish,north\n");
        let ds = build_dataset(vec![a, b]);
        assert_eq!(ds.column_names(), vec!["amount", "category", "region"]);
        // First source has no region, second no amount.
        assert!(ds.rows[0][2].is_null());
        assert!(ds.rows[1][0].is_null());
        assert_eq!(ds.rows[1][1], CellValue::Text("fish".into()));
    }

    #[test]
    fn date_profile_spans_observed_range() {
        let (t, _) = table("a.csv", "day\n2024-03-05\n2024-01-02\n2024-02-03\n");
        let ds = build_dataset(vec![t]);
        match &ds.columns[0].profile {
            ColumnProfile::Temporal { min, max } => {
                assert_eq!(min.to_string(), "2024-01-02");
                assert_eq!(max.to_string(), "2024-03-05");
            }
            other => panic!("unexpected profile: {other:?}"),
        }
    }

    #[test]
    fn slash_and_dot_dates_parse() {
        assert!(parse_date("2024/01/02").is_some());
        assert!(parse_date("01/02/2024").is_some());
        assert!(parse_date("2.1.2024").is_some());
        assert!(parse_date("yesterday").is_none());
    }
}
