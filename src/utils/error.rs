use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Spreadsheet fetch failed: {message}")]
    Sheet { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Render failed: {message}")]
    Render {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Conversion failed: {message}")]
    Conversion { message: String },

    #[error("Upload failed: {message}")]
    Upload { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{stage} timed out after {seconds}s")]
    Timeout { stage: &'static str, seconds: u64 },
}

impl ReportError {
    pub fn validation(message: impl Into<String>) -> Self {
        ReportError::Validation {
            message: message.into(),
        }
    }

    pub fn render(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ReportError::Render {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        ReportError::Conversion {
            message: message.into(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        ReportError::Upload {
            message: message.into(),
        }
    }

    pub fn sheet(message: impl Into<String>) -> Self {
        ReportError::Sheet {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
