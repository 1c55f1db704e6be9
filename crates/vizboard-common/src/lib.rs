//! vizboard-common: Shared dataset types used across all Vizboard crates.
//!
//! Provides:
//!   - CSV dataset parsing with per-column type inference
//!   - Active dataset resolution (default path, then upload)
//!   - Column-set comparison between two datasets
//!   - User-facing notices (success / warning / error)

pub mod error;
pub mod dataset;
pub mod source;
pub mod compare;
pub mod notice;

// Re-export commonly used types
pub use dataset::{Cell, Column, ColumnKind, Dataset};
pub use error::{DatasetError, Result};
pub use notice::{Notice, NoticeLevel};
pub use source::UploadedFile;
