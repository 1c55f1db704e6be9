use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is empty: no header row")]
    Empty,

    #[error("Line {line} has {found} fields but the header declares {expected}")]
    RaggedRow { line: usize, expected: usize, found: usize },
}
