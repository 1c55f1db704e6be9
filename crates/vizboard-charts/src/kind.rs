use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// The closed set of chart recipes offered in the chart-type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    #[serde(rename = "Donut Chart")]
    Donut,
    #[serde(rename = "Bar Graph")]
    Bar,
    #[serde(rename = "Line Graph")]
    Line,
    #[serde(rename = "Pie Chart")]
    Pie,
    #[serde(rename = "Histogram")]
    Histogram,
}

impl ChartKind {
    /// Selector order.
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Donut,
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Histogram,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Donut => "Donut Chart",
            ChartKind::Bar => "Bar Graph",
            ChartKind::Line => "Line Graph",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Histogram => "Histogram",
        }
    }
}

impl Default for ChartKind {
    fn default() -> Self {
        ChartKind::Donut
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.label() == s)
            .ok_or_else(|| ChartError::UnknownKind(s.to_string()))
    }
}
