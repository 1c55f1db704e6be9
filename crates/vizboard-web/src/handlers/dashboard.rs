//! Dashboard page: static and dynamic visualization modes.

use std::str::FromStr;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vizboard_charts::{dispatch, render_svg, ChartKind};
use vizboard_common::compare::{compare, ComparisonOutcome, NO_COMMON_COLUMNS};
use vizboard_common::source::load_active_dataset;
use vizboard_common::{Dataset, Notice, UploadedFile};

use crate::error::Result;
use crate::session::{CurrentSession, Session};
use crate::state::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Static,
    Dynamic,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::Static, ViewMode::Dynamic];

    pub fn value(self) -> &'static str {
        match self {
            ViewMode::Static => "static",
            ViewMode::Dynamic => "dynamic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Static => "Static Visualization",
            ViewMode::Dynamic => "Dynamic Visualization",
        }
    }

    /// Unrecognised values fall back to static.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("dynamic") => ViewMode::Dynamic,
            _ => ViewMode::Static,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct DashboardQuery {
    pub mode: Option<String>,
    pub column: Option<String>,
    pub chart: Option<String>,
}

#[derive(Serialize)]
struct ModeOption {
    value: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
pub struct ChartPanel {
    pub heading: String,
    pub svg: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize)]
struct StaticView {
    notices: Vec<Notice>,
    upload_name: Option<String>,
    columns: Vec<String>,
    selected_column: Option<String>,
    chart: Option<ChartPanel>,
}

#[derive(Serialize)]
struct DatasetPreview {
    heading: &'static str,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    total_rows: usize,
}

#[derive(Serialize, Default)]
struct DynamicView {
    first_name: Option<String>,
    second_name: Option<String>,
    notices: Vec<Notice>,
    previews: Vec<DatasetPreview>,
    summary_json: Option<String>,
    common_columns: Vec<String>,
    selected_column: Option<String>,
    charts: Vec<ChartPanel>,
}

pub async fn dashboard(
    State(state): State<SharedState>,
    current: CurrentSession,
    Query(query): Query<DashboardQuery>,
) -> Result<Response> {
    if !current.session.is_logged_in() {
        return Ok((current.jar, Redirect::to("/login")).into_response());
    }

    let flash = state
        .sessions
        .update(current.id, |s| std::mem::take(&mut s.flash))
        .await;

    let mode = ViewMode::from_param(query.mode.as_deref());
    let (kind, kind_notice) = parse_chart_kind(query.chart.as_deref());

    let (static_view, dynamic_view) = match mode {
        ViewMode::Static => {
            let mut view = build_static_view(&state, &current.session, query.column.as_deref(), kind);
            view.notices.extend(kind_notice);
            (Some(view), None)
        }
        ViewMode::Dynamic => {
            let mut view = build_dynamic_view(&state, &current.session, query.column.as_deref(), kind);
            view.notices.extend(kind_notice);
            (None, Some(view))
        }
    };

    let modes: Vec<ModeOption> = ViewMode::ALL
        .iter()
        .map(|m| ModeOption { value: m.value(), label: m.label() })
        .collect();
    let chart_kinds: Vec<&str> = ChartKind::ALL.iter().map(|k| k.label()).collect();

    let html = state.templates.render(
        "dashboard.html",
        context! {
            modes => modes,
            mode => mode.value(),
            flash => flash,
            chart_kinds => chart_kinds,
            selected_chart => kind.label(),
            static_view => static_view,
            dynamic_view => dynamic_view,
        },
    )?;
    Ok((current.jar, Html(html)).into_response())
}

/// Chart kind from the query string; unknown labels fall back to the default.
fn parse_chart_kind(param: Option<&str>) -> (ChartKind, Option<Notice>) {
    match param.filter(|p| !p.is_empty()) {
        None => (ChartKind::default(), None),
        Some(raw) => match ChartKind::from_str(raw) {
            Ok(kind) => (kind, None),
            Err(e) => {
                warn!(chart = raw, "Unknown chart type requested");
                (ChartKind::default(), Some(Notice::warning(e.to_string())))
            }
        },
    }
}

/// Pick the requested column when `allowed`, else the first candidate.
fn choose_column<'a>(
    requested: Option<&str>,
    mut candidates: impl Iterator<Item = &'a str>,
    allowed: impl Fn(&str) -> bool,
) -> Option<String> {
    match requested {
        Some(col) if allowed(col) => Some(col.to_string()),
        _ => candidates.next().map(str::to_string),
    }
}

fn chart_panel(
    state: &SharedState,
    dataset: &Dataset,
    column: &str,
    kind: ChartKind,
    title: &str,
    heading: String,
) -> ChartPanel {
    match dispatch(dataset, column, kind, title).and_then(|chart| render_svg(&chart, &state.chart_style)) {
        Ok(svg) => ChartPanel { heading, svg: Some(svg), error: None },
        Err(e) => {
            debug!(column, kind = %kind, error = %e, "Chart not drawn");
            ChartPanel { heading, svg: None, error: Some(e.to_string()) }
        }
    }
}

fn build_static_view(
    state: &SharedState,
    session: &Session,
    requested: Option<&str>,
    kind: ChartKind,
) -> StaticView {
    let resolution = load_active_dataset(
        state.config.dataset.default_path.as_deref(),
        session.static_upload.as_deref(),
    );
    let mut view = StaticView {
        notices: resolution.notices,
        upload_name: session.static_upload.as_ref().map(|f| f.name.clone()),
        columns: Vec::new(),
        selected_column: None,
        chart: None,
    };
    let Some(dataset) = resolution.dataset else {
        return view;
    };

    view.columns = dataset.column_names().map(str::to_string).collect();
    view.selected_column =
        choose_column(requested, dataset.column_names(), |c| dataset.column(c).is_some());

    if let Some(column) = view.selected_column.as_deref() {
        let title = format!("Static Visualization: {column}");
        let panel = chart_panel(state, &dataset, column, kind, &title, column.to_string());
        if let Some(err) = &panel.error {
            view.notices.push(Notice::error(err.clone()));
        }
        view.chart = Some(panel);
    }
    view
}

fn parse_upload(file: &UploadedFile, notices: &mut Vec<Notice>) -> Option<Dataset> {
    match file.parse() {
        Ok(ds) => Some(ds),
        Err(e) => {
            warn!(file = %file.name, error = %e, "Comparison dataset unreadable");
            notices.push(Notice::error(format!("Could not read {}: {e}", file.name)));
            None
        }
    }
}

fn preview(state: &SharedState, dataset: &Dataset, heading: &'static str) -> DatasetPreview {
    DatasetPreview {
        heading,
        columns: dataset.column_names().map(str::to_string).collect(),
        rows: dataset.preview(state.config.dataset.preview_rows),
        total_rows: dataset.row_count(),
    }
}

fn build_dynamic_view(
    state: &SharedState,
    session: &Session,
    requested: Option<&str>,
    kind: ChartKind,
) -> DynamicView {
    let mut view = DynamicView {
        first_name: session.first_upload.as_ref().map(|f| f.name.clone()),
        second_name: session.second_upload.as_ref().map(|f| f.name.clone()),
        ..DynamicView::default()
    };

    // Nothing is compared until both files are present.
    let (Some(first_file), Some(second_file)) = (&session.first_upload, &session.second_upload)
    else {
        return view;
    };
    let first = parse_upload(first_file, &mut view.notices);
    let second = parse_upload(second_file, &mut view.notices);
    let (Some(first), Some(second)) = (first, second) else {
        return view;
    };

    view.previews.push(preview(state, &first, "First Dataset Preview:"));
    view.previews.push(preview(state, &second, "Second Dataset Preview:"));

    let (summary, outcome) = compare(&first, &second);
    view.summary_json = serde_json::to_string_pretty(&summary).ok();

    let common = match &outcome {
        ComparisonOutcome::NoCommonColumns => {
            view.notices.push(Notice::warning(NO_COMMON_COLUMNS));
            return view;
        }
        ComparisonOutcome::Common(cols) => cols,
    };

    view.common_columns = common.iter().cloned().collect();
    view.selected_column =
        choose_column(requested, common.iter().map(String::as_str), |c| outcome.offers(c));

    if let Some(column) = view.selected_column.as_deref() {
        view.charts.push(chart_panel(
            state,
            &first,
            column,
            kind,
            "First Dataset",
            "First Dataset".to_string(),
        ));
        view.charts.push(chart_panel(
            state,
            &second,
            column,
            kind,
            "Second Dataset",
            "Second Dataset".to_string(),
        ));
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_param_defaults_to_static() {
        assert_eq!(ViewMode::from_param(None), ViewMode::Static);
        assert_eq!(ViewMode::from_param(Some("bogus")), ViewMode::Static);
        assert_eq!(ViewMode::from_param(Some("dynamic")), ViewMode::Dynamic);
    }

    #[test]
    fn test_chart_kind_param() {
        assert_eq!(parse_chart_kind(None), (ChartKind::Donut, None));
        assert_eq!(parse_chart_kind(Some("")), (ChartKind::Donut, None));
        assert_eq!(parse_chart_kind(Some("Histogram")), (ChartKind::Histogram, None));
        let (kind, notice) = parse_chart_kind(Some("Radar"));
        assert_eq!(kind, ChartKind::Donut);
        assert!(notice.is_some());
    }

    #[test]
    fn test_choose_column() {
        let cols = ["a", "b"];
        assert_eq!(
            choose_column(Some("b"), cols.iter().copied(), |c| cols.contains(&c)),
            Some("b".to_string())
        );
        assert_eq!(
            choose_column(Some("zz"), cols.iter().copied(), |c| cols.contains(&c)),
            Some("a".to_string())
        );
        assert_eq!(choose_column(None, std::iter::empty(), |_| true), None);
    }
}
