use thiserror::Error;

pub type CellforgeResult<T> = Result<T, CellforgeError>;

/// Pipeline-level failure. Formula errors never surface here; they are
/// carried in-band as `Value::Error`.
#[derive(Error, Debug)]
pub enum CellforgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid reference: {0}")]
    Reference(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
