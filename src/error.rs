#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The observation store timed out or failed. Never turned into an empty result.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Invalid window: {0} days (supported: 7, 30, 90)")]
    InvalidWindow(u32),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, PriceError>;
