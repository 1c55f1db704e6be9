//! Tabular datasets parsed from CSV.
//!
//! The first row is always the header. Column types are inferred after
//! the whole file has been read: a column whose non-missing cells all
//! parse as floating point is numeric, anything else is text.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use serde::Serialize;
use tracing::debug;

use crate::error::{DatasetError, Result};

/// Cell contents treated as missing values.
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL",
    "None", "#N/A", "#N/A N/A", "#NA", "<NA>", "1.#IND", "1.#QNAN",
    "-1.#IND", "-1.#QNAN",
];

/// Largest magnitude below which every integer is exact in an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Every cell present and written as an integer literal.
    Integer,
    Float,
    Text,
    /// No non-missing cells at all.
    Empty,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

impl Column {
    fn infer(name: String, raw: Vec<Option<String>>) -> Self {
        let present: Vec<&str> = raw.iter().flatten().map(String::as_str).collect();

        if present.is_empty() {
            let cells = vec![Cell::Missing; raw.len()];
            return Self { name, kind: ColumnKind::Empty, cells };
        }

        let parsed: Option<Vec<f64>> = present.iter().map(|s| s.trim().parse::<f64>().ok()).collect();

        match parsed {
            Some(numbers) => {
                let has_missing = present.len() < raw.len();
                let integral = present.iter().all(|s| is_integer_literal(s.trim()));
                let kind = if integral && !has_missing { ColumnKind::Integer } else { ColumnKind::Float };

                let mut it = numbers.into_iter();
                let cells = raw
                    .iter()
                    .map(|c| match c {
                        Some(_) => it.next().map(Cell::Number).unwrap_or(Cell::Missing),
                        None => Cell::Missing,
                    })
                    .collect();
                Self { name, kind, cells }
            }
            None => {
                let cells = raw
                    .into_iter()
                    .map(|c| c.map(Cell::Text).unwrap_or(Cell::Missing))
                    .collect();
                Self { name, kind: ColumnKind::Text, cells }
            }
        }
    }

    /// Number of non-missing cells.
    pub fn present_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_missing()).count()
    }

    /// Non-missing numeric values in row order. Empty for text columns.
    pub fn numbers(&self) -> Vec<f64> {
        self.cells
            .iter()
            .filter_map(|c| match c {
                Cell::Number(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Render a number the way this column displays it.
    pub fn format_number(&self, v: f64) -> String {
        match self.kind {
            ColumnKind::Integer if v.abs() < MAX_EXACT_INTEGER => format!("{v:.0}"),
            _ => format!("{:?}", v),
        }
    }

    /// Display label of a cell, `None` for missing.
    pub fn label(&self, cell: &Cell) -> Option<String> {
        match cell {
            Cell::Missing => None,
            Cell::Number(v) => Some(self.format_number(*v)),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

/// A parsed CSV file: named columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = rdr.headers()?.clone();
        if header.is_empty() {
            return Err(DatasetError::Empty);
        }
        let names = dedupe_headers(header.iter());
        let width = names.len();

        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
        let mut row_count = 0usize;

        for (idx, record) in rdr.records().enumerate() {
            let record = record?;
            if record.len() > width {
                return Err(DatasetError::RaggedRow {
                    line: idx + 2,
                    expected: width,
                    found: record.len(),
                });
            }
            for (col, values) in raw.iter_mut().enumerate() {
                let cell = record.get(col).filter(|v| !is_missing_marker(v)).map(str::to_string);
                values.push(cell);
            }
            row_count += 1;
        }

        let columns = names
            .into_iter()
            .zip(raw)
            .map(|(name, values)| Column::infer(name, values))
            .collect::<Vec<_>>();

        debug!(columns = columns.len(), rows = row_count, "Parsed CSV dataset");
        Ok(Self { columns, row_count })
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_csv_reader(bytes)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DatasetError::NotFound(path.to_path_buf()),
            _ => DatasetError::Io(e),
        })?;
        Self::from_csv_reader(BufReader::new(file))
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// First `limit` rows as display strings, row-major.
    pub fn preview(&self, limit: usize) -> Vec<Vec<String>> {
        (0..self.row_count.min(limit))
            .map(|row| {
                self.columns
                    .iter()
                    .map(|col| col.label(&col.cells[row]).unwrap_or_else(|| "NaN".to_string()))
                    .collect()
            })
            .collect()
    }
}

fn is_missing_marker(value: &str) -> bool {
    MISSING_MARKERS.contains(&value)
}

/// Optional sign followed by ASCII digits only.
fn is_integer_literal(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Blank headers become `Unnamed: {i}`; repeats get `.1`, `.2`, ... suffixes.
fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();

    for (i, name) in raw.enumerate() {
        let base = if name.is_empty() { format!("Unnamed: {i}") } else { name.to_string() };
        let mut candidate = base.clone();
        while let Some(n) = seen.get_mut(&candidate) {
            *n += 1;
            candidate = format!("{base}.{n}");
        }
        seen.insert(candidate.clone(), 0);
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(csv: &str) -> Dataset {
        Dataset::from_csv_bytes(csv.as_bytes()).expect("valid csv")
    }

    #[test]
    fn test_infers_integer_float_and_text_columns() {
        let ds = parse("id,price,name\n1,2.5,apple\n2,3,banana\n");
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column("id").unwrap().kind, ColumnKind::Integer);
        assert_eq!(ds.column("price").unwrap().kind, ColumnKind::Float);
        assert_eq!(ds.column("name").unwrap().kind, ColumnKind::Text);
    }

    #[test]
    fn test_missing_integer_becomes_float() {
        let ds = parse("qty\n1\n3\nNA\n");
        let col = ds.column("qty").unwrap();
        assert_eq!(col.kind, ColumnKind::Float);
        assert_eq!(col.cells, vec![Cell::Number(1.0), Cell::Number(3.0), Cell::Missing]);
        assert_eq!(col.format_number(3.0), "3.0");
    }

    #[test]
    fn test_float_literals_keep_float_labels() {
        let ds = parse("x\n1.0\n2.0\n");
        let col = ds.column("x").unwrap();
        assert_eq!(col.kind, ColumnKind::Float);
        let labels: Vec<_> = col.cells.iter().filter_map(|c| col.label(c)).collect();
        assert_eq!(labels, vec!["1.0", "2.0"]);
    }

    #[test]
    fn test_huge_values_keep_distinct_labels() {
        let ds = parse("n\n1e20\n2e20\n");
        let col = ds.column("n").unwrap();
        assert_eq!(col.kind, ColumnKind::Float);
        let labels: Vec<_> = col.cells.iter().filter_map(|c| col.label(c)).collect();
        assert_eq!(labels, vec!["1e20", "2e20"]);

        let ds = parse("n\n100000000000000000000\n200000000000000000000\n");
        let col = ds.column("n").unwrap();
        assert_eq!(col.kind, ColumnKind::Integer);
        assert_ne!(col.label(&col.cells[0]), col.label(&col.cells[1]));
        assert_eq!(col.format_number(-42.0), "-42");
    }

    #[test]
    fn test_platform_nan_markers_are_missing() {
        let ds = parse("v\n1.#IND\n1.#QNAN\n-1.#IND\n-1.#QNAN\n#N/A N/A\n5\n");
        let col = ds.column("v").unwrap();
        assert_eq!(col.present_count(), 1);
        assert_eq!(col.kind, ColumnKind::Float);
    }

    #[test]
    fn test_all_missing_column_is_empty_kind() {
        let ds = parse("a,b\n1,\n2,\n");
        assert_eq!(ds.column("b").unwrap().kind, ColumnKind::Empty);
        assert_eq!(ds.column("b").unwrap().present_count(), 0);
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let ds = parse("x,x,,x\n1,2,3,4\n");
        let names: Vec<&str> = ds.column_names().collect();
        assert_eq!(names, vec!["x", "x.1", "Unnamed: 2", "x.2"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let ds = parse("a,b,c\n1,2\n");
        assert_eq!(ds.column("c").unwrap().cells, vec![Cell::Missing]);
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let err = Dataset::from_csv_bytes(b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, DatasetError::RaggedRow { line: 2, expected: 2, found: 3 }));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(Dataset::from_csv_bytes(b""), Err(DatasetError::Empty)));
    }

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err = Dataset::from_path(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));
    }

    #[test]
    fn test_preview_limits_rows() {
        let ds = parse("a,b\n1,x\n2,\n3,z\n");
        let preview = ds.preview(2);
        assert_eq!(preview, vec![
            vec!["1".to_string(), "x".to_string()],
            vec!["2".to_string(), "NaN".to_string()],
        ]);
    }
}
