//! vizboard-charts: The chart dispatcher.
//!
//! A [`ChartKind`] selects exactly one of five fixed recipes. [`dispatch`]
//! turns `(dataset, column, kind, title)` into a [`Chart`] holding the
//! chart's data content, and [`render_svg`] draws it.

pub mod error;
pub mod kind;
pub mod model;
pub mod stats;
pub mod dispatch;
pub mod svg;

pub use dispatch::dispatch;
pub use error::{ChartError, Result};
pub use kind::ChartKind;
pub use model::{Bar, Bin, Chart, ChartData, Slice};
pub use svg::{default_palette, render_svg, ChartStyle, DEFAULT_PALETTE};
