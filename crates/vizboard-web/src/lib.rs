//! vizboard-web: Web front end for Vizboard
//! Provides a login-gated dashboard with:
//!   - Static visualization of one dataset (default file or upload)
//!   - Dynamic side-by-side comparison of two uploaded datasets
//!   - SVG and JSON chart endpoints

pub mod error;
pub mod handlers;
pub mod router;
pub mod session;
pub mod state;
pub mod templates;

pub use error::WebError;
pub use router::build_router;
pub use state::{AppState, SharedState};
