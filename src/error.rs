use thiserror::Error;

/// Main error type for the tabulador engine
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("CSS selector compilation failed: {message}")]
    Selector { message: String },

    #[error("pattern compilation failed")]
    Pattern {
        #[from]
        source: regex::Error,
    },

    #[error("table sub-step '{step}' failed: {message}")]
    TableStep { step: String, message: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("file I/O error: {path}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("general error: {0}")]
    General(#[from] anyhow::Error),
}

impl ExtractionError {
    /// Create a selector error from scraper's borrowed error kind
    pub fn selector(err: scraper::error::SelectorErrorKind) -> Self {
        Self::Selector {
            message: format!("{:?}", err),
        }
    }

    /// Create a per-table sub-step error
    pub fn table_step(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TableStep {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a file I/O error
    pub fn file_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Check if error is recoverable (extraction can continue with defaults)
    pub fn is_recoverable(&self) -> bool {
        match self {
            ExtractionError::TableStep { .. } => true,
            ExtractionError::Selector { .. } => false,
            ExtractionError::Pattern { .. } => false,
            ExtractionError::Configuration { .. } => false,
            ExtractionError::FileIo { .. } => false,
            ExtractionError::General(_) => false,
        }
    }
}

/// Result type alias for convenience
pub type ExtractionResult<T> = Result<T, ExtractionError>;
