use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Dataset contains no records")]
    EmptyDataset,

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
