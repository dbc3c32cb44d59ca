//! Error types for the shorts product filter

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Error types for filter operations
#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Classifier artifact error: {0}")]
    Artifact(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Platform API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}
