use thiserror::Error;

/// Unified error type for gitflow-release operations
#[derive(Error, Debug)]
pub enum GitflowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0}")]
    CredentialMissing(String),

    #[error("Invalid channel configuration: {0}")]
    ConfigParse(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Version computation failed: {0}")]
    VersionComputation(String),

    #[error("API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in gitflow-release
pub type Result<T> = std::result::Result<T, GitflowError>;

impl GitflowError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitflowError::Config(msg.into())
    }

    /// Create a missing-credential error naming the variable
    pub fn credential_missing(msg: impl Into<String>) -> Self {
        GitflowError::CredentialMissing(msg.into())
    }

    /// Create a channel configuration parse error
    pub fn config_parse(msg: impl Into<String>) -> Self {
        GitflowError::ConfigParse(msg.into())
    }

    /// Create a precondition (assertion) error
    pub fn precondition(msg: impl Into<String>) -> Self {
        GitflowError::Precondition(msg.into())
    }

    /// Create a version computation error
    pub fn version(msg: impl Into<String>) -> Self {
        GitflowError::VersionComputation(msg.into())
    }

    /// Create an API error from a status code and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        GitflowError::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether this error means the remote resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GitflowError::NotFound(_) | GitflowError::Api { status: 404, .. }
        )
    }
}
