//! Dual-dataset comparison: shared column names and the row-count summary.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::dataset::Dataset;

pub const NO_COMMON_COLUMNS: &str = "No common columns found between datasets.";

/// Intersection of the two datasets' column-name sets.
pub fn common_columns(first: &Dataset, second: &Dataset) -> BTreeSet<String> {
    let theirs: BTreeSet<&str> = second.column_names().collect();
    first
        .column_names()
        .filter(|name| theirs.contains(name))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub first_dataset_rows: usize,
    pub second_dataset_rows: usize,
    pub common_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOutcome {
    NoCommonColumns,
    Common(BTreeSet<String>),
}

impl ComparisonOutcome {
    /// Whether `column` may be offered for side-by-side charts.
    pub fn offers(&self, column: &str) -> bool {
        match self {
            ComparisonOutcome::NoCommonColumns => false,
            ComparisonOutcome::Common(cols) => cols.contains(column),
        }
    }
}

pub fn compare(first: &Dataset, second: &Dataset) -> (ComparisonSummary, ComparisonOutcome) {
    let common = common_columns(first, second);
    let summary = ComparisonSummary {
        first_dataset_rows: first.row_count(),
        second_dataset_rows: second.row_count(),
        common_columns: common.iter().cloned().collect(),
    };
    let outcome = if common.is_empty() {
        ComparisonOutcome::NoCommonColumns
    } else {
        ComparisonOutcome::Common(common)
    };
    (summary, outcome)
}
