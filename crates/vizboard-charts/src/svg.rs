//! SVG rendering of dispatched charts via plotters.

use std::f64::consts::PI;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};
use crate::model::{Bar, Bin, Chart, ChartData, Slice};

/// Matplotlib's default categorical cycle.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

const FONT: &str = "sans-serif";
const TITLE_FONT_SIZE: f64 = 16.0;
const LABEL_FONT_SIZE: f64 = 13.0;
const TICK_FONT_SIZE: f64 = 11.0;

const MARGIN: u32 = 20;
const X_LABEL_AREA: u32 = 50;
const Y_LABEL_AREA: u32 = 70;

/// Pie label distances as fractions of the radius.
const LABEL_DISTANCE: f64 = 1.1;
const PCT_DISTANCE: f64 = 0.6;
/// Polygon vertices used for a full circle.
const ARC_STEPS: f64 = 180.0;

type DrawResult<DB> = std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<String>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            palette: default_palette(),
        }
    }
}

/// [`DEFAULT_PALETTE`] as owned strings.
pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

impl ChartStyle {
    /// Palette entry `i`, cycling. Unparsable entries fall back to the
    /// default cycle.
    fn color(&self, i: usize) -> RGBColor {
        let fallback = DEFAULT_PALETTE[i % DEFAULT_PALETTE.len()];
        let hex = if self.palette.is_empty() {
            fallback
        } else {
            self.palette[i % self.palette.len()].as_str()
        };
        parse_hex(hex).or_else(|| parse_hex(fallback)).unwrap_or(BLACK)
    }
}

/// `#rrggbb` to a colour.
pub fn parse_hex(hex: &str) -> Option<RGBColor> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Draw `chart` as a standalone SVG document.
pub fn render_svg(chart: &Chart, style: &ChartStyle) -> Result<String> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (style.width, style.height)).into_drawing_area();
        draw_chart(&root, chart, style).map_err(|e| ChartError::Render(e.to_string()))?;
    }
    Ok(buf)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &Chart,
    style: &ChartStyle,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let area = root.titled(&chart.title, (FONT, TITLE_FONT_SIZE))?;

    match &chart.data {
        ChartData::Proportion { slices, wedge_width } => {
            draw_proportion(&area, slices, *wedge_width, style)?
        }
        ChartData::Bars { bars } => draw_bars(&area, chart, bars, style)?,
        ChartData::Line { points, categories } => draw_line(&area, chart, points, categories, style)?,
        ChartData::Histogram { bins, density } => draw_histogram(&area, chart, bins, density, style)?,
    }

    root.present()
}

fn draw_proportion<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    slices: &[Slice],
    wedge_width: Option<f64>,
    style: &ChartStyle,
) -> DrawResult<DB> {
    let (w, h) = area.dim_in_pixel();
    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;
    let r = (w.min(h) as f64 / 2.0 * 0.72).max(1.0);
    let inner = wedge_width.map(|ww| r * (1.0 - ww.clamp(0.0, 1.0)));
    let pct_distance = match wedge_width {
        Some(ww) => 1.0 - ww / 2.0,
        None => PCT_DISTANCE,
    };

    // Counter-clockwise from three o'clock; pixel y grows downward.
    let point = |radius: f64, angle: f64| {
        (
            (cx + radius * angle.cos()).round() as i32,
            (cy - radius * angle.sin()).round() as i32,
        )
    };
    let label_style = TextStyle::from((FONT, LABEL_FONT_SIZE).into_font());
    let pct_style = TextStyle::from((FONT, TICK_FONT_SIZE).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut start = 0.0f64;
    for (i, slice) in slices.iter().enumerate() {
        let sweep = slice.fraction * 2.0 * PI;
        let steps = (slice.fraction * ARC_STEPS).ceil().max(2.0) as usize;
        let at = |k: usize| start + sweep * k as f64 / steps as f64;

        let mut shape: Vec<(i32, i32)> = (0..=steps).map(|k| point(r, at(k))).collect();
        match inner {
            // Inner arc runs backwards so a full ring keeps its hole.
            Some(ir) => shape.extend((0..=steps).rev().map(|k| point(ir, at(k)))),
            None => shape.push(point(0.0, 0.0)),
        }
        area.draw(&Polygon::new(shape, style.color(i).filled()))?;

        let mid = start + sweep / 2.0;
        let anchor = if mid.cos() < 0.0 { HPos::Right } else { HPos::Left };
        area.draw(&Text::new(
            slice.label.clone(),
            point(r * LABEL_DISTANCE, mid),
            label_style.pos(Pos::new(anchor, VPos::Center)),
        ))?;
        area.draw(&Text::new(
            slice.percent_label(),
            point(r * pct_distance, mid),
            pct_style.clone(),
        ))?;

        start += sweep;
    }
    Ok(())
}

fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    chart: &Chart,
    bars: &[Bar],
    style: &ChartStyle,
) -> DrawResult<DB> {
    let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
    let n = bars.len().max(1);
    let top = bars.iter().map(|b| b.count).max().unwrap_or(1).max(1) as f64 * 1.05;

    let mut ctx = ChartBuilder::on(area)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..top)?;

    let tick = |v: &f64| format_tick(*v);
    let category = |v: &f64| index_label(&labels, *v);
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&category)
        .y_label_formatter(&tick)
        .x_desc(chart.x_label.clone().unwrap_or_default())
        .y_desc(chart.y_label.clone().unwrap_or_default())
        .axis_desc_style((FONT, LABEL_FONT_SIZE))
        .label_style((FONT, TICK_FONT_SIZE))
        .draw()?;

    ctx.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, bar.count as f64)], style.color(i).filled())
    }))?;
    Ok(())
}

fn draw_line<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    chart: &Chart,
    points: &[Option<f64>],
    categories: &[String],
    style: &ChartStyle,
) -> DrawResult<DB> {
    let (x_lo, x_hi) = pad_range(0.0, points.len().saturating_sub(1) as f64);
    let (y_lo, y_hi) = if categories.is_empty() {
        let finite = points.iter().flatten().copied().filter(|v| v.is_finite());
        let lo = finite.clone().fold(f64::INFINITY, f64::min);
        let hi = finite.fold(f64::NEG_INFINITY, f64::max);
        pad_range(lo, hi)
    } else {
        (-0.5, categories.len() as f64 - 0.5)
    };

    let mut ctx = ChartBuilder::on(area)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    let tick = |v: &f64| format_tick(*v);
    let category = |v: &f64| index_label(categories, *v);
    let mut mesh = ctx.configure_mesh();
    mesh.x_label_formatter(&tick)
        .x_desc(chart.x_label.clone().unwrap_or_default())
        .y_desc(chart.y_label.clone().unwrap_or_default())
        .axis_desc_style((FONT, LABEL_FONT_SIZE))
        .label_style((FONT, TICK_FONT_SIZE));
    if categories.is_empty() {
        mesh.y_label_formatter(&tick);
    } else {
        mesh.y_labels(categories.len()).y_label_formatter(&category);
    }
    mesh.draw()?;

    let color = style.color(0);
    for run in runs(points) {
        if run.len() == 1 {
            ctx.draw_series(std::iter::once(Circle::new(run[0], 3, color.filled())))?;
        } else {
            ctx.draw_series(LineSeries::new(run, color.stroke_width(2)))?;
        }
    }
    Ok(())
}

/// Unbroken stretches of finite points, as `(row index, value)`.
fn runs(points: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, point) in points.iter().enumerate() {
        match point {
            Some(v) if v.is_finite() => current.push((i as f64, *v)),
            _ if !current.is_empty() => out.push(std::mem::take(&mut current)),
            _ => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    chart: &Chart,
    bins: &[Bin],
    density: &[(f64, f64)],
    style: &ChartStyle,
) -> DrawResult<DB> {
    let (x_lo, x_hi) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) if last.end > first.start => (first.start, last.end),
        (Some(first), Some(last)) => pad_range(first.start, last.end),
        _ => (0.0, 1.0),
    };
    let peak = bins
        .iter()
        .map(|b| b.count as f64)
        .chain(density.iter().map(|(_, y)| *y))
        .fold(1.0, f64::max);

    let mut ctx = ChartBuilder::on(area)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_lo..x_hi, 0.0..peak * 1.05)?;

    let labels: Vec<String> = bins.iter().filter_map(|b| b.label.clone()).collect();
    let tick = |v: &f64| format_tick(*v);
    let category = |v: &f64| index_label(&labels, *v);
    let mut mesh = ctx.configure_mesh();
    mesh.y_label_formatter(&tick)
        .x_desc(chart.x_label.clone().unwrap_or_default())
        .y_desc(chart.y_label.clone().unwrap_or_default())
        .axis_desc_style((FONT, LABEL_FONT_SIZE))
        .label_style((FONT, TICK_FONT_SIZE));
    if labels.is_empty() {
        mesh.x_label_formatter(&tick);
    } else {
        mesh.disable_x_mesh().x_labels(labels.len()).x_label_formatter(&category);
    }
    mesh.draw()?;

    let color = style.color(0);
    ctx.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], color.mix(0.55).filled())
    }))?;
    ctx.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], WHITE.stroke_width(1))
    }))?;
    if density.len() > 1 {
        ctx.draw_series(LineSeries::new(density.iter().copied(), color.stroke_width(2)))?;
    }
    Ok(())
}

/// Label for the category whose index `v` lands on; blank between ticks.
fn index_label(labels: &[String], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

fn pad_range(lo: f64, hi: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn format_tick(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
