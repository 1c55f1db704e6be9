//! Shared application state for the web server.

use std::sync::Arc;

use vizboard_charts::ChartStyle;
use vizboard_config::Config;

use crate::error::WebError;
use crate::session::SessionStore;
use crate::templates::Templates;

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub templates: Templates,
    /// Canvas size and palette derived from `[chart]`.
    pub chart_style: ChartStyle,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, WebError> {
        let chart_style = ChartStyle {
            width: config.chart.width,
            height: config.chart.height,
            palette: config.chart.palette.clone(),
        };
        Ok(Self {
            config,
            sessions: SessionStore::new(),
            templates: Templates::new()?,
            chart_style,
        })
    }
}

pub type SharedState = Arc<AppState>;
