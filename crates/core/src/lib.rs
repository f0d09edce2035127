pub mod error;
pub mod models;

pub use error::{Error, ErrorBuilder, ErrorCategory, Result};

// Re-export commonly used models for convenience
pub use models::{ErrorContext, ErrorReport, RetryConfig, RetryReason};
