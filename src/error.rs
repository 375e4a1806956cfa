//! Error types for session storage operations

/// Result type for session storage operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors that can occur during session storage operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to establish a connection to the column store
    #[error("Connection error: {0}")]
    Connection(String),

    /// A query was rejected or failed on the column store
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration parsing error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a query error
    pub fn query<S: Into<String>>(msg: S) -> Self {
        Self::Query(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
