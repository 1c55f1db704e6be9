//! Counting, binning and density estimation behind the chart recipes.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use vizboard_common::{Cell, Column};

/// Upper bound on automatically chosen histogram bins.
pub const MAX_AUTO_BINS: usize = 1_000;

/// Number of evaluation points on the density curve.
pub const KDE_GRID_POINTS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct ValueCount {
    pub label: String,
    /// Numeric value for numeric columns.
    pub value: Option<f64>,
    pub count: usize,
}

/// Distinct non-missing values with their counts, most frequent first.
/// Ties keep first-appearance order.
pub fn value_counts(column: &Column) -> Vec<ValueCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();

    for cell in &column.cells {
        let Some(label) = column.label(cell) else { continue };
        match index.get(&label) {
            Some(&i) => counts[i].count += 1,
            None => {
                let value = match cell {
                    Cell::Number(v) => Some(*v),
                    _ => None,
                };
                index.insert(label.clone(), counts.len());
                counts.push(ValueCount { label, value, count: 1 });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Distinct non-missing labels in first-appearance order.
pub fn categories(column: &Column) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for cell in &column.cells {
        if let Some(label) = column.label(cell) {
            if seen.insert(label.clone()) {
                out.push(label);
            }
        }
    }
    out
}

/// Linear-interpolated percentile of already sorted data, `q` in `[0, 100]`.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = (q / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Bin edges using the smaller of the Sturges and Freedman-Diaconis widths,
/// falling back to Sturges when the interquartile range is zero.
pub fn auto_bin_edges(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return vec![0.0, 1.0];
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    if min == max {
        return vec![min - 0.5, max + 0.5];
    }

    let n = sorted.len() as f64;
    let range = max - min;
    let sturges = range / (n.log2() + 1.0);
    let iqr = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);
    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };

    let bins = ((range / width).ceil() as usize).clamp(1, MAX_AUTO_BINS);
    linspace(min, max, bins + 1)
}

/// Counts per bin. The last bin is closed on the right.
pub fn histogram(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; bins];
    if bins == 0 {
        return counts;
    }
    let first = edges[0];
    let last = edges[bins];

    for &v in values.iter().filter(|v| v.is_finite()) {
        if v < first || v > last {
            continue;
        }
        // partition_point gives the first edge strictly greater than v
        let idx = edges.partition_point(|&e| e <= v).saturating_sub(1).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

/// Gaussian kernel density with Scott's bandwidth, evaluated on an even
/// grid over `[lo, hi]`. `None` when the data has no spread.
pub fn gaussian_kde(values: &[f64], lo: f64, hi: f64, grid_points: usize) -> Option<Vec<(f64, f64)>> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = finite.len();
    if n < 2 || grid_points < 2 {
        return None;
    }
    let std = sample_std(&finite);
    if std <= 0.0 {
        return None;
    }

    let bandwidth = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * PI).sqrt());

    let curve = linspace(lo, hi, grid_points)
        .into_iter()
        .map(|x| {
            let sum: f64 = finite
                .iter()
                .map(|xi| {
                    let z = (x - xi) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, sum * norm)
        })
        .collect();
    Some(curve)
}

pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vizboard_common::Dataset;

    fn column(csv: &str) -> Column {
        let ds = Dataset::from_csv_bytes(csv.as_bytes()).unwrap();
        ds.columns()[0].clone()
    }

    #[test]
    fn test_value_counts_orders_by_count_then_appearance() {
        let col = column("c\nB\nA\nA\nC\nB\nA\n");
        let counts: Vec<(String, usize)> =
            value_counts(&col).into_iter().map(|v| (v.label, v.count)).collect();
        assert_eq!(counts, vec![
            ("A".to_string(), 3),
            ("B".to_string(), 2),
            ("C".to_string(), 1),
        ]);
    }

    #[test]
    fn test_value_counts_skip_missing() {
        let col = column("c\nx\nNA\nx\n");
        let counts = value_counts(&col);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 2);
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&data, 25.0), 1.75);
        assert_relative_eq!(percentile(&data, 50.0), 2.5);
        assert_relative_eq!(percentile(&data, 100.0), 4.0);
    }

    #[test]
    fn test_auto_bins_constant_data_single_unit_bin() {
        assert_eq!(auto_bin_edges(&[3.0, 3.0, 3.0]), vec![2.5, 3.5]);
    }

    #[test]
    fn test_auto_bins_uses_sturges_for_small_uniform_sample() {
        // n = 8: sturges width 7/4; IQR 3.5 gives FD width 3.5, so Sturges wins
        let values: Vec<f64> = (0..8).map(f64::from).collect();
        let edges = auto_bin_edges(&values);
        assert_eq!(edges.len(), 5);
        assert_relative_eq!(edges[0], 0.0);
        assert_relative_eq!(edges[4], 7.0);
    }

    #[test]
    fn test_histogram_counts_every_value_once() {
        let values = [0.0, 0.5, 1.0, 1.5, 2.0];
        let counts = histogram(&values, &[0.0, 1.0, 2.0]);
        assert_eq!(counts, vec![2, 3]);
        assert_eq!(counts.iter().sum::<usize>(), values.len());
    }

    #[test]
    fn test_kde_integrates_to_roughly_one() {
        let values = [1.0, 2.0, 2.5, 3.0, 4.0, 6.0];
        let curve = gaussian_kde(&values, -10.0, 20.0, 2_000).unwrap();
        let dx = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, y)| y * dx).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_kde_needs_spread() {
        assert!(gaussian_kde(&[2.0, 2.0], 0.0, 4.0, 10).is_none());
        assert!(gaussian_kde(&[2.0], 0.0, 4.0, 10).is_none());
    }

    #[test]
    fn test_categories_first_appearance() {
        let col = column("c\nb\na\nb\nc\n");
        assert_eq!(categories(&col), vec!["b", "a", "c"]);
    }
}
