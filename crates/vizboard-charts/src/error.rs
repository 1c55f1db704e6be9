use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChartError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column {0} has no non-missing values to plot")]
    NoValues(String),

    #[error("Unknown chart type: {0}")]
    UnknownKind(String),

    #[error("Chart rendering failed: {0}")]
    Render(String),
}
