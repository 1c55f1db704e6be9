//! Data content of a dispatched chart, independent of how it is drawn.

use serde::Serialize;

use crate::kind::ChartKind;

/// One slice of a pie or donut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    /// Share of all non-missing values, in `[0, 1]`.
    pub fraction: f64,
}

impl Slice {
    /// Percentage label, e.g. `66.7%`.
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub label: String,
    pub count: usize,
}

/// Histogram bin. Categorical bins carry a label and span `i ± 0.5`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Proportion {
        slices: Vec<Slice>,
        /// Ring width as a fraction of the radius; `None` draws a full pie.
        wedge_width: Option<f64>,
    },
    Bars {
        bars: Vec<Bar>,
    },
    Line {
        /// One entry per row; `None` is a gap.
        points: Vec<Option<f64>>,
        /// Non-empty when the column is text; points index into it.
        categories: Vec<String>,
    },
    Histogram {
        bins: Vec<Bin>,
        /// Smoothed density scaled to counts; empty when not computed.
        density: Vec<(f64, f64)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub data: ChartData,
}

impl Chart {
    /// Bar heights keyed by label. Empty for non-bar charts.
    pub fn bar_heights(&self) -> Vec<(&str, usize)> {
        match &self.data {
            ChartData::Bars { bars } => bars.iter().map(|b| (b.label.as_str(), b.count)).collect(),
            _ => Vec::new(),
        }
    }
}
