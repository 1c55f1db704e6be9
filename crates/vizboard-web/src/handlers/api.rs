//! JSON / SVG endpoints over the session's datasets.

use std::str::FromStr;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use vizboard_charts::{dispatch, render_svg, ChartKind};
use vizboard_common::compare::compare;
use vizboard_common::source::load_active_dataset;
use vizboard_common::{Dataset, UploadedFile};

use crate::error::{Result, WebError};
use crate::session::{CurrentSession, Session};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ChartQuery {
    #[serde(default = "default_source")]
    pub source: String,
    pub column: String,
    pub chart: Option<String>,
    pub format: Option<String>,
}

fn default_source() -> String { "static".to_string() }

fn uploaded(file: Option<&UploadedFile>, which: &str) -> Result<Dataset> {
    let file = file.ok_or_else(|| WebError::NotFound(format!("no {which} dataset uploaded")))?;
    Ok(file.parse()?)
}

fn resolve_source(state: &SharedState, session: &Session, source: &str) -> Result<Dataset> {
    match source {
        "static" => load_active_dataset(
            state.config.dataset.default_path.as_deref(),
            session.static_upload.as_deref(),
        )
        .dataset
        .ok_or_else(|| WebError::NotFound("no dataset available".to_string())),
        "first" => uploaded(session.first_upload.as_deref(), "first"),
        "second" => uploaded(session.second_upload.as_deref(), "second"),
        other => Err(WebError::BadRequest(format!("unknown source: {other}"))),
    }
}

/// GET /api/chart?source=static|first|second&column=..&chart=..&format=svg|json
pub async fn api_chart(
    State(state): State<SharedState>,
    current: CurrentSession,
    Query(q): Query<ChartQuery>,
) -> Result<Response> {
    if !current.session.is_logged_in() {
        return Err(WebError::Unauthorized);
    }
    let kind = match q.chart.as_deref() {
        Some(label) => ChartKind::from_str(label)?,
        None => ChartKind::default(),
    };
    let dataset = resolve_source(&state, &current.session, &q.source)?;
    let title = match q.source.as_str() {
        "first" => "First Dataset".to_string(),
        "second" => "Second Dataset".to_string(),
        _ => format!("Static Visualization: {}", q.column),
    };
    let chart = dispatch(&dataset, &q.column, kind, &title)?;
    debug!(source = %q.source, column = %q.column, kind = %kind, "Chart served");

    match q.format.as_deref() {
        Some("json") => Ok((current.jar, Json(chart)).into_response()),
        None | Some("svg") => {
            let svg = render_svg(&chart, &state.chart_style)?;
            Ok((current.jar, [(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
        }
        Some(other) => Err(WebError::BadRequest(format!("unknown format: {other}"))),
    }
}

/// GET /api/compare/summary
pub async fn api_compare_summary(current: CurrentSession) -> Result<Response> {
    if !current.session.is_logged_in() {
        return Err(WebError::Unauthorized);
    }
    let first = uploaded(current.session.first_upload.as_deref(), "first")?;
    let second = uploaded(current.session.second_upload.as_deref(), "second")?;
    let (summary, _) = compare(&first, &second);
    Ok((current.jar, Json(summary)).into_response())
}
