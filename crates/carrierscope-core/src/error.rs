//! Error types for CarrierScope

/// Result type alias using CarrierScope's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for CarrierScope operations
///
/// Detection itself never fails: these errors only surface at the fallible
/// edges (registry endpoints, configuration loading) and are recovered
/// before a `DetectionResult` is produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Registry endpoint could not be reached or refused the query
    #[error("network error: {0}")]
    Network(String),

    /// Registry endpoint answered but had no record for the address
    #[error("no record: {0}")]
    NoRecord(String),

    /// Registry response could not be parsed
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout errors
    #[error("operation timed out")]
    Timeout,
}

impl Error {
    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new no-record error
    pub fn no_record(msg: impl Into<String>) -> Self {
        Self::NoRecord(msg.into())
    }

    /// Create a new malformed-response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::NoRecord(_) => "no_record",
            Self::Malformed(_) => "malformed",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Timeout => "timeout",
        }
    }
}
