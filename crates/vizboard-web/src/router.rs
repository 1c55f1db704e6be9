//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{
    api::{api_chart, api_compare_summary},
    dashboard::dashboard,
    login::{index, login_page, login_submit},
    upload::{upload_dynamic, upload_static},
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;
    let static_dir = state.config.server.static_dir.clone();
    let shared: SharedState = Arc::new(state);

    let mut router = Router::new()
        // Pages
        .route("/",          get(index))
        .route("/login",     get(login_page).post(login_submit))
        .route("/dashboard", get(dashboard))

        // Uploads
        .route("/upload/static",  post(upload_static))
        .route("/upload/dynamic", post(upload_dynamic))

        // API endpoints
        .route("/api/chart",           get(api_chart))
        .route("/api/compare/summary", get(api_compare_summary));

    // Static files
    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
