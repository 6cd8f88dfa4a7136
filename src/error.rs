use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Timestamp parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Observation validation error: {message}")]
    ObservationValidation { message: String },

    #[error("Invalid timestamp '{value}' at row {row}")]
    InvalidTimestamp { row: usize, value: String },

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
