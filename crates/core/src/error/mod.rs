mod builder;
mod config;
mod content;
mod network;
mod quota;
mod storage;

pub use builder::ErrorBuilder;
pub use config::ConfigError;
pub use content::ContentError;
pub use network::NetworkError;
pub use quota::QuotaError;
pub use storage::StorageError;

use thiserror::Error;

/// Main error type that encompasses all domain-specific errors
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Circuit breaker open for {service}")]
    CircuitOpen { service: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn circuit_open(service: impl Into<String>) -> Self {
        Self::CircuitOpen {
            service: service.into(),
        }
    }

    /// Check if this error is recoverable (can retry the operation)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_recoverable(),
            Error::Quota(e) => e.is_recoverable(),
            Error::Storage(e) => e.is_recoverable(),
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// Check if this error indicates a temporary issue
    pub fn is_temporary(&self) -> bool {
        match self {
            Error::Network(e) => e.is_temporary(),
            Error::Quota(_) => true,
            _ => false,
        }
    }

    /// Get error category for logging and metrics
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network(_) => ErrorCategory::Network,
            Error::Quota(_) => ErrorCategory::Quota,
            Error::Content(_) => ErrorCategory::Content,
            Error::Storage(_) => ErrorCategory::Storage,
            Error::Config(_) => ErrorCategory::Configuration,
            Error::Serialization(_) | Error::UrlParse(_) => ErrorCategory::Data,
            Error::Io(_) => ErrorCategory::Io,
            Error::Cancelled => ErrorCategory::Cancelled,
            Error::CircuitOpen { .. } => ErrorCategory::CircuitOpen,
            Error::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Error categories for classification and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Network,
    Quota,
    Content,
    Storage,
    Data,
    Io,
    Configuration,
    Cancelled,
    CircuitOpen,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Quota => write!(f, "quota"),
            ErrorCategory::Content => write!(f, "content"),
            ErrorCategory::Storage => write!(f, "storage"),
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Io => write!(f, "io"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Cancelled => write!(f, "cancelled"),
            ErrorCategory::CircuitOpen => write!(f, "circuit_open"),
            ErrorCategory::Internal => write!(f, "internal"),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
