use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value covering the column types we infer
/// from delimited sources.
/// Using `BTreeSet` for distinct-value indices downstream so `CellValue`
/// must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in ordered collections --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Number(_) => 1,
                Text(_) => 2,
                Date(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    /// Renders exactly what the CSV export writes: numbers without
    /// trailing zeros, dates as ISO-8601, nulls as the empty field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// ColumnType – semantic type inferred once at load time
// ---------------------------------------------------------------------------

/// The semantic type of a column, decided when the dataset is built.
/// Filter widgets and constraints dispatch on this tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Numeric,
    Text,
    Temporal,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Temporal => write!(f, "date"),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnProfile – per-type facts gathered while building the dataset
// ---------------------------------------------------------------------------

/// Observed facts about a column, used to seed filter widgets:
/// numeric and temporal columns carry their value range, text columns
/// the sorted set of distinct values.
#[derive(Debug, Clone)]
pub enum ColumnProfile {
    Numeric { min: f64, max: f64 },
    Text { unique: BTreeSet<String> },
    Temporal { min: NaiveDate, max: NaiveDate },
}

// ---------------------------------------------------------------------------
// Column / Dataset
// ---------------------------------------------------------------------------

/// One named, typed column of the dataset.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub profile: ColumnProfile,
}

/// The full in-memory table: ordered columns plus row-major cells.
/// Replaced wholesale on every load; never mutated in place.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset from already-typed cells, computing each
    /// column's profile in one pass over the rows.
    pub fn from_cells(names: Vec<String>, types: Vec<ColumnType>, rows: Vec<Vec<CellValue>>) -> Self {
        let columns = names
            .into_iter()
            .zip(types)
            .enumerate()
            .map(|(idx, (name, ty))| {
                let profile = profile_column(ty, rows.iter().map(|r| &r[idx]));
                Column { name, ty, profile }
            })
            .collect();
        Dataset { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Descriptive statistics for every numeric column.
    pub fn numeric_summaries(&self) -> Vec<NumericSummary> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.ty == ColumnType::Numeric)
            .map(|(idx, c)| {
                let values: Vec<f64> = self
                    .rows
                    .iter()
                    .filter_map(|r| r[idx].as_number())
                    .collect();
                NumericSummary::from_values(&c.name, &values)
            })
            .collect()
    }
}

fn profile_column<'a>(ty: ColumnType, cells: impl Iterator<Item = &'a CellValue>) -> ColumnProfile {
    match ty {
        ColumnType::Numeric => {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for v in cells.filter_map(CellValue::as_number) {
                min = min.min(v);
                max = max.max(v);
            }
            if min > max {
                // All-null column: collapse to an empty range.
                min = 0.0;
                max = 0.0;
            }
            ColumnProfile::Numeric { min, max }
        }
        ColumnType::Text => {
            let unique = cells
                .filter_map(|c| c.as_text().map(str::to_string))
                .collect();
            ColumnProfile::Text { unique }
        }
        ColumnType::Temporal => {
            let mut min: Option<NaiveDate> = None;
            let mut max: Option<NaiveDate> = None;
            for d in cells.filter_map(CellValue::as_date) {
                min = Some(min.map_or(d, |m| m.min(d)));
                max = Some(max.map_or(d, |m| m.max(d)));
            }
            let fallback = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
            ColumnProfile::Temporal {
                min: min.unwrap_or(fallback),
                max: max.unwrap_or(fallback),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// NumericSummary – per-column describe() output
// ---------------------------------------------------------------------------

/// Count / mean / std / min / max of a numeric column, nulls excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericSummary {
    fn from_values(column: &str, values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return NumericSummary {
                column: column.to_string(),
                count: 0,
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        let mean = values.iter().sum::<f64>() / count as f64;
        // Sample standard deviation (n - 1 denominator).
        let std = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        NumericSummary {
            column: column.to_string(),
            count,
            mean,
            std,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    #[test]
    fn display_matches_export_format() {
        assert_eq!(CellValue::Number(1.0).to_string(), "1");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Text("fruit".into()).to_string(), "fruit");
        assert_eq!(
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()).to_string(),
            "2024-03-09"
        );
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn numeric_profile_covers_observed_range() {
        let ds = Dataset::from_cells(
            vec!["amount".into()],
            vec![ColumnType::Numeric],
            vec![vec![num(1.0)], vec![CellValue::Null], vec![num(15.0)]],
        );
        match &ds.columns[0].profile {
            ColumnProfile::Numeric { min, max } => {
                assert_eq!(*min, 1.0);
                assert_eq!(*max, 15.0);
            }
            other => panic!("unexpected profile: {other:?}"),
        }
    }

    #[test]
    fn text_profile_collects_distinct_values() {
        let ds = Dataset::from_cells(
            vec!["category".into()],
            vec![ColumnType::Text],
            vec![
                vec![CellValue::Text("fruit".into())],
                vec![CellValue::Text("vegetable".into())],
                vec![CellValue::Text("fruit".into())],
            ],
        );
        match &ds.columns[0].profile {
            ColumnProfile::Text { unique } => {
                let vals: Vec<&str> = unique.iter().map(String::as_str).collect();
                assert_eq!(vals, vec!["fruit", "vegetable"]);
            }
            other => panic!("unexpected profile: {other:?}"),
        }
    }

    #[test]
    fn summary_excludes_nulls() {
        let ds = Dataset::from_cells(
            vec!["v".into()],
            vec![ColumnType::Numeric],
            vec![
                vec![num(2.0)],
                vec![num(4.0)],
                vec![CellValue::Null],
                vec![num(6.0)],
            ],
        );
        let summaries = ds.numeric_summaries();
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.count, 3);
        assert!((s.mean - 4.0).abs() < 1e-12);
        assert!((s.std - 2.0).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 6.0);
    }
}
