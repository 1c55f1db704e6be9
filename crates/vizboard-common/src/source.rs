//! Resolution of the active dataset for the single-dataset view.
//!
//! Order: the configured default file first, then an uploaded file which
//! replaces it when present. With neither available the view cannot
//! proceed for this request.

use std::path::Path;

use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::error::DatasetError;
use crate::notice::Notice;

pub const DEFAULT_LOADED: &str = "Default dataset loaded successfully!";
pub const DEFAULT_MISSING: &str = "Default dataset not found. Please upload a dataset.";
pub const UPLOAD_LOADED: &str = "Uploaded dataset loaded successfully!";
pub const NO_DATASET: &str =
    "No dataset available to proceed. Please check the file path or upload a dataset.";

/// An uploaded file as received from the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    pub fn parse(&self) -> crate::Result<Dataset> {
        Dataset::from_csv_bytes(&self.bytes)
    }
}

#[derive(Debug)]
pub struct DatasetResolution {
    /// `None` means the view must stop after showing the notices.
    pub dataset: Option<Dataset>,
    pub notices: Vec<Notice>,
}

/// Resolve the active dataset, re-parsing from scratch every call.
pub fn load_active_dataset(
    default_path: Option<&Path>,
    upload: Option<&UploadedFile>,
) -> DatasetResolution {
    let mut dataset = None;
    let mut notices = Vec::new();

    if let Some(path) = default_path {
        match Dataset::from_path(path) {
            Ok(ds) => {
                info!(path = %path.display(), rows = ds.row_count(), "Default dataset loaded");
                dataset = Some(ds);
                notices.push(Notice::success(DEFAULT_LOADED));
            }
            Err(DatasetError::NotFound(_)) => {
                warn!(path = %path.display(), "Default dataset not found");
                notices.push(Notice::warning(DEFAULT_MISSING));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Default dataset unreadable");
                notices.push(Notice::error(format!("Default dataset could not be read: {e}")));
            }
        }
    }

    if let Some(file) = upload {
        match file.parse() {
            Ok(ds) => {
                dataset = Some(ds);
                notices.push(Notice::success(UPLOAD_LOADED));
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "Uploaded dataset unreadable");
                notices.push(Notice::error(format!("Could not read {}: {e}", file.name)));
            }
        }
    }

    if dataset.is_none() {
        notices.push(Notice::error(NO_DATASET));
    }

    DatasetResolution { dataset, notices }
}
