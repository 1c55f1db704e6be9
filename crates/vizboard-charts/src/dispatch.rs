//! Kind → recipe dispatch.
//!
//! Each call is a pure function of its inputs. No type coercion, outlier
//! handling or imputation happens here: missing cells are dropped for
//! counting recipes and left as gaps in the line recipe.

use tracing::debug;
use vizboard_common::{Cell, Column, Dataset};

use crate::error::{ChartError, Result};
use crate::kind::ChartKind;
use crate::model::{Bar, Bin, Chart, ChartData, Slice};
use crate::stats::{self, KDE_GRID_POINTS};

/// Ring width of the donut as a fraction of the radius.
pub const DONUT_WEDGE_WIDTH: f64 = 0.4;

/// Produce the chart for `column` of `dataset`.
pub fn dispatch(dataset: &Dataset, column: &str, kind: ChartKind, title: &str) -> Result<Chart> {
    let col = dataset
        .column(column)
        .ok_or_else(|| ChartError::UnknownColumn(column.to_string()))?;
    if col.present_count() == 0 {
        return Err(ChartError::NoValues(column.to_string()));
    }

    debug!(column, kind = %kind, rows = dataset.row_count(), "Dispatching chart");

    let (x_label, y_label, data) = match kind {
        ChartKind::Donut => (None, None, proportion(col, Some(DONUT_WEDGE_WIDTH))),
        ChartKind::Bar => (Some(col.name.clone()), Some("Count".to_string()), bars(col)),
        ChartKind::Line => (Some("Index".to_string()), Some(col.name.clone()), line(col)),
        ChartKind::Pie => (None, None, proportion(col, None)),
        ChartKind::Histogram => (Some(col.name.clone()), Some("Frequency".to_string()), histogram(col)),
    };

    Ok(Chart {
        kind,
        title: title.to_string(),
        x_label,
        y_label,
        data,
    })
}

fn proportion(col: &Column, wedge_width: Option<f64>) -> ChartData {
    let counts = stats::value_counts(col);
    let total: usize = counts.iter().map(|c| c.count).sum();
    let slices = counts
        .into_iter()
        .map(|c| Slice {
            fraction: c.count as f64 / total as f64,
            label: c.label,
            count: c.count,
        })
        .collect();
    ChartData::Proportion { slices, wedge_width }
}

/// Text columns keep frequency order; numeric columns sort bars by value.
fn bars(col: &Column) -> ChartData {
    let mut counts = stats::value_counts(col);
    if col.kind.is_numeric() {
        counts.sort_by(|a, b| {
            a.value
                .unwrap_or(f64::NAN)
                .total_cmp(&b.value.unwrap_or(f64::NAN))
        });
    }
    let bars = counts
        .into_iter()
        .map(|c| Bar { label: c.label, count: c.count })
        .collect();
    ChartData::Bars { bars }
}

fn line(col: &Column) -> ChartData {
    if col.kind.is_numeric() {
        let points = col
            .cells
            .iter()
            .map(|c| match c {
                Cell::Number(v) => Some(*v),
                _ => None,
            })
            .collect();
        return ChartData::Line { points, categories: Vec::new() };
    }

    let categories = stats::categories(col);
    let points = col
        .cells
        .iter()
        .map(|c| {
            col.label(c)
                .and_then(|label| categories.iter().position(|k| *k == label))
                .map(|i| i as f64)
        })
        .collect();
    ChartData::Line { points, categories }
}

fn histogram(col: &Column) -> ChartData {
    if !col.kind.is_numeric() {
        let counts = stats::value_counts(col);
        let bins = stats::categories(col)
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                let count = counts.iter().find(|c| c.label == label).map_or(0, |c| c.count);
                Bin {
                    start: i as f64 - 0.5,
                    end: i as f64 + 0.5,
                    count,
                    label: Some(label),
                }
            })
            .collect();
        return ChartData::Histogram { bins, density: Vec::new() };
    }

    let values = col.numbers();
    let edges = stats::auto_bin_edges(&values);
    let counts = stats::histogram(&values, &edges);
    let bins: Vec<Bin> = edges
        .windows(2)
        .zip(counts)
        .map(|(w, count)| Bin { start: w[0], end: w[1], count, label: None })
        .collect();

    // Density is scaled so its area matches the bar area.
    let first = edges[0];
    let last = edges[edges.len() - 1];
    let bin_width = (last - first) / bins.len().max(1) as f64;
    let n = values.iter().filter(|v| v.is_finite()).count() as f64;
    let (lo, hi) = finite_range(&values).unwrap_or((first, last));
    let density = stats::gaussian_kde(&values, lo, hi, KDE_GRID_POINTS)
        .map(|curve| curve.into_iter().map(|(x, y)| (x, y * n * bin_width)).collect())
        .unwrap_or_default();

    ChartData::Histogram { bins, density }
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn ds(csv: &str) -> Dataset {
        Dataset::from_csv_bytes(csv.as_bytes()).unwrap()
    }

    fn mixed() -> Dataset {
        ds("Category,Sales,Note\nA,10.5,x\nA,3,\nB,7,y\nC,NA,x\n")
    }

    #[test]
    fn test_bar_heights_count_occurrences() {
        let chart = dispatch(&ds("Category\nA\nA\nB\n"), "Category", ChartKind::Bar, "t").unwrap();
        assert_eq!(chart.bar_heights(), vec![("A", 2), ("B", 1)]);
        assert_eq!(chart.x_label.as_deref(), Some("Category"));
        assert_eq!(chart.y_label.as_deref(), Some("Count"));
    }

    #[test]
    fn test_numeric_bars_sorted_by_value() {
        let chart = dispatch(&ds("n\n3\n1\n3\n2\n"), "n", ChartKind::Bar, "t").unwrap();
        assert_eq!(chart.bar_heights(), vec![("1", 1), ("2", 1), ("3", 2)]);
    }

    #[test]
    fn test_huge_numbers_stay_separate_bars() {
        let chart = dispatch(&ds("n\n1e20\n2e20\n"), "n", ChartKind::Bar, "t").unwrap();
        assert_eq!(chart.bar_heights(), vec![("1e20", 1), ("2e20", 1)]);

        let chart = dispatch(&ds("x\n1.0\n2.0\n1.0\n"), "x", ChartKind::Bar, "t").unwrap();
        assert_eq!(chart.bar_heights(), vec![("1.0", 2), ("2.0", 1)]);
    }

    #[test]
    fn test_every_kind_succeeds_on_every_column() {
        let data = mixed();
        for column in ["Category", "Sales", "Note"] {
            for kind in ChartKind::ALL {
                let chart = dispatch(&data, column, kind, "title");
                assert!(chart.is_ok(), "{kind} on {column}: {chart:?}");
            }
        }
    }

    #[test]
    fn test_dispatch_is_idempotent() {
        let data = mixed();
        for kind in ChartKind::ALL {
            let a = dispatch(&data, "Sales", kind, "same").unwrap();
            let b = dispatch(&data, "Sales", kind, "same").unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_donut_is_pie_with_hole() {
        let data = ds("k\nx\nx\ny\n");
        let pie = dispatch(&data, "k", ChartKind::Pie, "t").unwrap();
        let donut = dispatch(&data, "k", ChartKind::Donut, "t").unwrap();

        match (&pie.data, &donut.data) {
            (
                ChartData::Proportion { slices: p, wedge_width: None },
                ChartData::Proportion { slices: d, wedge_width: Some(w) },
            ) => {
                assert_eq!(p, d);
                assert_relative_eq!(*w, 0.4);
                assert_eq!(p[0].percent_label(), "66.7%");
                assert_eq!(p[1].percent_label(), "33.3%");
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn test_line_keeps_row_order_and_gaps() {
        let chart = dispatch(&mixed(), "Sales", ChartKind::Line, "t").unwrap();
        assert_eq!(chart.x_label.as_deref(), Some("Index"));
        match chart.data {
            ChartData::Line { points, categories } => {
                assert_eq!(points, vec![Some(10.5), Some(3.0), Some(7.0), None]);
                assert!(categories.is_empty());
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn test_text_line_uses_categorical_axis() {
        let chart = dispatch(&mixed(), "Note", ChartKind::Line, "t").unwrap();
        match chart.data {
            ChartData::Line { points, categories } => {
                assert_eq!(categories, vec!["x", "y"]);
                assert_eq!(points, vec![Some(0.0), None, Some(1.0), Some(0.0)]);
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn test_histogram_counts_and_density() {
        let data = ds("v\n1\n2\n2\n3\n3\n3\n4\n4\n5\n");
        let chart = dispatch(&data, "v", ChartKind::Histogram, "t").unwrap();
        assert_eq!(chart.y_label.as_deref(), Some("Frequency"));
        match chart.data {
            ChartData::Histogram { bins, density } => {
                assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 9);
                assert_eq!(density.len(), KDE_GRID_POINTS);
                assert_relative_eq!(density[0].0, 1.0);
                assert_relative_eq!(density[KDE_GRID_POINTS - 1].0, 5.0);
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn test_text_histogram_is_discrete() {
        let chart = dispatch(&mixed(), "Category", ChartKind::Histogram, "t").unwrap();
        match chart.data {
            ChartData::Histogram { bins, density } => {
                let labels: Vec<_> = bins.iter().map(|b| (b.label.clone().unwrap(), b.count)).collect();
                assert_eq!(labels, vec![("A".to_string(), 2), ("B".to_string(), 1), ("C".to_string(), 1)]);
                assert!(density.is_empty());
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn test_single_value_histogram_has_no_density() {
        let chart = dispatch(&ds("v\n7\n"), "v", ChartKind::Histogram, "t").unwrap();
        match chart.data {
            ChartData::Histogram { bins, density } => {
                assert_eq!(bins.len(), 1);
                assert!(density.is_empty());
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_column_and_all_missing() {
        let data = ds("a,b\n1,\n");
        assert_eq!(
            dispatch(&data, "zzz", ChartKind::Pie, "t").unwrap_err(),
            ChartError::UnknownColumn("zzz".to_string())
        );
        assert_eq!(
            dispatch(&data, "b", ChartKind::Pie, "t").unwrap_err(),
            ChartError::NoValues("b".to_string())
        );
    }
}
