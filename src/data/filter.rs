use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::{CellValue, Column, ColumnProfile, ColumnType, Dataset};

// ---------------------------------------------------------------------------
// Per-column constraints
// ---------------------------------------------------------------------------

/// The constraint attached to one filtered column. The variant is fixed
/// by the column's inferred type when the filter is first added.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    /// Inclusive numeric range, seeded with the observed min/max.
    Range { min: f64, max: f64 },
    /// Distinct-value selection, narrowed by a case-insensitive
    /// substring search. Every value matching the search starts
    /// selected.
    Values {
        search: String,
        selected: BTreeSet<String>,
    },
    /// Inclusive date range, seeded with the observed min/max.
    DateRange { start: NaiveDate, end: NaiveDate },
}

/// Which columns carry a constraint. Columns absent from the map are
/// never filtered.
pub type FilterSpec = BTreeMap<String, ColumnConstraint>;

impl ColumnConstraint {
    /// Whether this constraint's kind matches the column's current type.
    pub fn fits(&self, ty: ColumnType) -> bool {
        matches!(
            (self, ty),
            (ColumnConstraint::Range { .. }, ColumnType::Numeric)
                | (ColumnConstraint::Values { .. }, ColumnType::Text)
                | (ColumnConstraint::DateRange { .. }, ColumnType::Temporal)
        )
    }

    /// Pure predicate: does a single cell satisfy this constraint?
    /// Nulls never satisfy an active constraint.
    pub fn accepts(&self, cell: &CellValue) -> bool {
        match self {
            ColumnConstraint::Range { min, max } => cell
                .as_number()
                .is_some_and(|v| v >= *min && v <= *max),
            ColumnConstraint::Values { selected, .. } => {
                cell.as_text().is_some_and(|s| selected.contains(s))
            }
            ColumnConstraint::DateRange { start, end } => cell
                .as_date()
                .is_some_and(|d| d >= *start && d <= *end),
        }
    }
}

/// The default constraint for a column: everything passes.
pub fn default_constraint(column: &Column) -> ColumnConstraint {
    match &column.profile {
        ColumnProfile::Numeric { min, max } => ColumnConstraint::Range {
            min: *min,
            max: *max,
        },
        ColumnProfile::Text { unique } => ColumnConstraint::Values {
            search: String::new(),
            selected: unique.clone(),
        },
        ColumnProfile::Temporal { min, max } => ColumnConstraint::DateRange {
            start: *min,
            end: *max,
        },
    }
}

/// Distinct values of a text column matching the search term,
/// case-insensitively. An empty term matches everything.
pub fn matching_values(unique: &BTreeSet<String>, search: &str) -> Vec<String> {
    let needle = search.to_lowercase();
    unique
        .iter()
        .filter(|v| v.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Applying a filter specification
// ---------------------------------------------------------------------------

/// A constraint that could not be applied this pass and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedConstraint {
    pub column: String,
    pub reason: String,
}

/// Apply every constraint conjunctively and return the indices of rows
/// passing all of them, in dataset order.
///
/// A constraint naming a column that no longer exists, or whose kind no
/// longer matches the column's type, is reported and skipped rather
/// than aborting the whole pass.
pub fn filtered_indices(
    dataset: &Dataset,
    spec: &FilterSpec,
) -> (Vec<usize>, Vec<SkippedConstraint>) {
    let mut active: Vec<(usize, &ColumnConstraint)> = Vec::new();
    let mut skipped = Vec::new();

    for (name, constraint) in spec {
        match dataset.column_index(name) {
            Some(idx) if constraint.fits(dataset.columns[idx].ty) => {
                active.push((idx, constraint));
            }
            Some(idx) => skipped.push(SkippedConstraint {
                column: name.clone(),
                reason: format!(
                    "constraint does not apply to a {} column",
                    dataset.columns[idx].ty
                ),
            }),
            None => skipped.push(SkippedConstraint {
                column: name.clone(),
                reason: "column is no longer present".to_string(),
            }),
        }
    }

    let indices = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| active.iter().all(|(idx, c)| c.accepts(&row[*idx])))
        .map(|(i, _)| i)
        .collect();

    (indices, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{build_dataset, read_source};

    fn dataset(csv_text: &str) -> Dataset {
        let (table, issues) = read_source("test.csv", csv_text.as_bytes()).unwrap();
        assert!(issues.is_empty());
        build_dataset(vec![table])
    }

    fn sample() -> Dataset {
        dataset(
            "amount,category,day\n\
             1,fruit,2024-01-01\n\
             5,vegetable,2024-01-15\n\
             10,fruit,2024-02-01\n\
             15,dairy,2024-03-01\n",
        )
    }

    #[test]
    fn empty_spec_returns_every_row() {
        let ds = sample();
        let (idx, skipped) = filtered_indices(&ds, &FilterSpec::new());
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert!(skipped.is_empty());
    }

    #[test]
    fn filtered_view_is_a_subset_in_order() {
        let ds = sample();
        let mut spec = FilterSpec::new();
        spec.insert("amount".into(), ColumnConstraint::Range { min: 2.0, max: 20.0 });
        let (idx, _) = filtered_indices(&ds, &spec);
        assert!(idx.iter().all(|&i| i < ds.len()));
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn numeric_range_is_inclusive_at_both_bounds() {
        // amount = [1, 5, 10, 15], range [5, 10] keeps exactly {5, 10}.
        let ds = sample();
        let mut spec = FilterSpec::new();
        spec.insert("amount".into(), ColumnConstraint::Range { min: 5.0, max: 10.0 });
        let (idx, skipped) = filtered_indices(&ds, &spec);
        assert!(skipped.is_empty());
        let amounts: Vec<f64> = idx
            .iter()
            .filter_map(|&i| ds.rows[i][0].as_number())
            .collect();
        assert_eq!(amounts, vec![5.0, 10.0]);
    }

    #[test]
    fn category_search_defaults_to_all_matches() {
        let ds = sample();
        let col = ds.column("category").unwrap();
        let ColumnProfile::Text { unique } = &col.profile else {
            panic!("expected text profile");
        };
        let matches = matching_values(unique, "FRU");
        assert_eq!(matches, vec!["fruit".to_string()]);

        let mut spec = FilterSpec::new();
        spec.insert(
            "category".into(),
            ColumnConstraint::Values {
                search: "FRU".into(),
                selected: matches.into_iter().collect(),
            },
        );
        let (idx, _) = filtered_indices(&ds, &spec);
        assert_eq!(idx, vec![0, 2]);
    }

    #[test]
    fn search_matching_nothing_yields_empty_view() {
        let ds = sample();
        let mut spec = FilterSpec::new();
        spec.insert(
            "category".into(),
            ColumnConstraint::Values {
                search: "zzz".into(),
                selected: BTreeSet::new(),
            },
        );
        let (idx, _) = filtered_indices(&ds, &spec);
        assert!(idx.is_empty());
    }

    #[test]
    fn date_range_is_inclusive() {
        let ds = sample();
        let mut spec = FilterSpec::new();
        spec.insert(
            "day".into(),
            ColumnConstraint::DateRange {
                start: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            },
        );
        let (idx, _) = filtered_indices(&ds, &spec);
        assert_eq!(idx, vec![1, 2]);
    }

    #[test]
    fn constraints_combine_conjunctively() {
        let ds = sample();
        let mut spec = FilterSpec::new();
        spec.insert("amount".into(), ColumnConstraint::Range { min: 1.0, max: 10.0 });
        spec.insert(
            "category".into(),
            ColumnConstraint::Values {
                search: String::new(),
                selected: ["fruit".to_string()].into_iter().collect(),
            },
        );
        let (idx, _) = filtered_indices(&ds, &spec);
        assert_eq!(idx, vec![0, 2]);
    }

    #[test]
    fn mismatched_constraint_is_skipped_not_fatal() {
        let ds = sample();
        let mut spec = FilterSpec::new();
        // Range constraint on a text column: reported, rows unaffected.
        spec.insert("category".into(), ColumnConstraint::Range { min: 0.0, max: 1.0 });
        let (idx, skipped) = filtered_indices(&ds, &spec);
        assert_eq!(idx, vec![0, 1, 2, 3]);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].column, "category");
    }

    #[test]
    fn missing_column_is_skipped_not_fatal() {
        let ds = sample();
        let mut spec = FilterSpec::new();
        spec.insert("gone".into(), ColumnConstraint::Range { min: 0.0, max: 1.0 });
        let (idx, skipped) = filtered_indices(&ds, &spec);
        assert_eq!(idx.len(), 4);
        assert_eq!(skipped[0].column, "gone");
    }

    #[test]
    fn null_cells_fail_active_constraints() {
        let ds = dataset("amount\n1\n\n3\n");
        let mut spec = FilterSpec::new();
        spec.insert("amount".into(), ColumnConstraint::Range { min: 0.0, max: 10.0 });
        let (idx, _) = filtered_indices(&ds, &spec);
        assert_eq!(idx, vec![0, 2]);
    }

    #[test]
    fn default_constraint_passes_everything() {
        let ds = sample();
        let mut spec = FilterSpec::new();
        for col in &ds.columns {
            spec.insert(col.name.clone(), default_constraint(col));
        }
        let (idx, skipped) = filtered_indices(&ds, &spec);
        assert_eq!(idx.len(), ds.len());
        assert!(skipped.is_empty());
    }
}
