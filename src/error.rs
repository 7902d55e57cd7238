use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required credential or setting is absent. Fatal before any row is read.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input file not found: {0}")]
    MissingInputFile(String),

    #[error("Input table is missing required column: {0}")]
    MissingColumn(String),

    #[error("API error: {message}")]
    Api { message: String },
}

impl IngestError {
    /// Errors that stop a run before the first row is processed.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            IngestError::Config(_) | IngestError::MissingInputFile(_) | IngestError::MissingColumn(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
